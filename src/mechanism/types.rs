//! Core type definitions for reaction mechanisms

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// Species
// ═══════════════════════════════════════════════════════════════════════════════

/// A chemical species with its molar mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Species {
    /// Unique species identifier (e.g. `"H2O"`)
    pub name: String,

    /// Molar mass in g/mol
    #[serde(rename = "molarMass", alias = "mw")]
    pub molar_mass: f64,
}

impl Species {
    /// Create a new species
    pub fn new(name: impl Into<String>, molar_mass: f64) -> Self {
        Self {
            name: name.into(),
            molar_mass,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reaction
// ═══════════════════════════════════════════════════════════════════════════════

/// The flags of a reaction that matter for code generation
///
/// The position of a reaction inside [`crate::Mechanism::reactions`] fixes its
/// offset in every generated rate array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reaction {
    /// Reaction has a reverse rate
    #[serde(default)]
    pub reversible: bool,

    /// Reaction is enhanced by a third body
    #[serde(default, rename = "thirdBody")]
    pub third_body: bool,

    /// Falloff or chemically activated reaction
    #[serde(default, rename = "pressureDependent")]
    pub pressure_dependent: bool,
}

impl Reaction {
    /// An irreversible, pressure independent reaction
    pub fn irreversible() -> Self {
        Self::default()
    }

    /// A reversible, pressure independent reaction
    pub fn reversible() -> Self {
        Self {
            reversible: true,
            ..Self::default()
        }
    }

    /// Mark the reaction as third-body enhanced
    pub fn with_third_body(mut self) -> Self {
        self.third_body = true;
        self
    }

    /// Mark the reaction as pressure dependent (falloff)
    pub fn with_pressure_dependence(mut self) -> Self {
        self.pressure_dependent = true;
        self
    }

    /// Whether the reaction needs a pressure-modification term
    pub fn has_pressure_modification(&self) -> bool {
        self.third_body || self.pressure_dependent
    }
}
