//! Kinetics source generator
//!
//! `mechgen` reads a chemical kinetics mechanism (species with molar masses
//! and reaction flags) and emits the C or CUDA scaffolding around the
//! mechanism's numerical routines: sizing constants, accelerator kernel
//! wrappers, a host driver with a regression harness, and the device memory
//! allocator.
//!
//! ```ignore
//! use mechgen::prelude::*;
//!
//! let artifacts = mechgen::generate(json, &BuildMode::accelerator(), Some("H2=1.0,N2=3.0"))?;
//! artifacts.write_to("out")?;
//! ```

pub mod codegen;
pub mod error;
pub mod mechanism;

pub use crate::codegen::{
    ArtifactKind, ArtifactSet, Backend, BuildMode, CodeGenerator, CodegenError, Formulation,
    GeneratedArtifact, Instrumentation, MemoryLayout,
};
pub use crate::mechanism::{
    FeatureSet, Mechanism, MechanismError, MoleFractions, RateCounts, Reaction, Species,
    ValidatedMechanism,
};
pub use error::MechGenError;

/// Parse and validate a mechanism from JSON
pub fn load_mechanism(json: &str) -> Result<ValidatedMechanism, MechGenError> {
    Ok(mechanism::load_json(json)?)
}

/// Load a mechanism, resolve its initial mole fractions and render every artifact
///
/// `overrides` is a `name=value` list such as `"H2=1.0,N2=3.0"`; when it is
/// `None` or empty the mechanism's own `initialMoles` are used.
pub fn generate(
    json: &str,
    mode: &BuildMode,
    overrides: Option<&str>,
) -> Result<ArtifactSet, MechGenError> {
    let mech = load_mechanism(json)?;
    let moles = MoleFractions::resolve(mech.inner(), overrides)?;
    Ok(CodeGenerator::new(&mech, *mode, moles).generate()?)
}

pub mod prelude {
    pub use crate::codegen::{ArtifactSet, Backend, BuildMode, CodeGenerator};
    pub use crate::codegen::{Formulation, Instrumentation, MemoryLayout};
    pub use crate::mechanism::{FeatureSet, Mechanism, MoleFractions, Reaction, Species};
    pub use crate::MechGenError;
}
