//! Reaction mechanism model
//!
//! A mechanism is the already-parsed description of a kinetics model: the
//! ordered species (name and molar mass) and the ordered reactions (only the
//! reversibility, third-body and pressure-dependence flags matter here).
//!
//! # Overview
//!
//! Mechanisms are handed over as JSON:
//!
//! ```ignore
//! use mechgen::mechanism::{load_json, FeatureSet};
//!
//! let json = r#"{
//!     "name": "h2-air",
//!     "species": [
//!         { "name": "H2", "molarMass": 2.016 },
//!         { "name": "O2", "molarMass": 31.998 },
//!         { "name": "N2", "molarMass": 28.014 }
//!     ],
//!     "reactions": [
//!         { "reversible": true },
//!         { "reversible": true, "thirdBody": true },
//!         { "pressureDependent": true }
//!     ],
//!     "initialMoles": { "H2": 2.0, "O2": 1.0, "N2": 3.76 }
//! }"#;
//!
//! let mech = load_json(json)?;
//! let features = FeatureSet::classify(mech.inner());
//! assert!(features.has_reversible());
//! ```
//!
//! # JSON Schema
//!
//! | Field | Description |
//! |-------|-------------|
//! | `name` | Optional mechanism name |
//! | `species` | `[{ "name", "molarMass" }]` in index order |
//! | `reactions` | `[{ "reversible", "thirdBody", "pressureDependent" }]`, all flags default to `false` |
//! | `initialMoles` | Optional map of species name to mole amount |

mod errors;
mod features;
mod model;
mod moles;
mod types;
mod validation;

pub use errors::MechanismError;
pub use features::{FeatureSet, RateCounts};
pub use model::Mechanism;
pub use moles::MoleFractions;
pub use types::*;
pub use validation::{ValidatedMechanism, Validator};

/// Parse and validate a mechanism from JSON
pub fn load_json(json: &str) -> Result<ValidatedMechanism, MechanismError> {
    let mech = Mechanism::from_str(json)?;
    Validator::new().validate(&mech)
}

/// Read, parse and validate a mechanism file
pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<ValidatedMechanism, MechanismError> {
    let mech = Mechanism::from_file(path)?;
    Validator::new().validate(&mech)
}
