//! Error types for mechanism loading, validation and mole-fraction overrides

use thiserror::Error;

/// Errors that can occur when working with a reaction mechanism
#[derive(Debug, Error)]
pub enum MechanismError {
    // ─────────────────────────────────────────────────────────────────────────
    // Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse the mechanism description
    #[error("Failed to parse mechanism JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read the mechanism description from disk
    #[error("Failed to read mechanism file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A mechanism needs at least one species
    #[error("Mechanism must declare at least one species")]
    EmptySpecies,

    /// Species names must be non-empty identifiers
    #[error("Species at index {index} has an empty name")]
    EmptySpeciesName { index: usize },

    /// Species name cannot be written into a C comment
    #[error("Species name '{name}' is invalid: {reason}")]
    InvalidSpeciesName { name: String, reason: &'static str },

    /// Mechanism name cannot be written into a C comment
    #[error("Mechanism name '{name}' is invalid: {reason}")]
    InvalidMechanismName { name: String, reason: &'static str },

    /// Duplicate species name
    #[error("Duplicate species name: '{name}'")]
    DuplicateSpecies { name: String },

    /// Molar mass is not a finite positive number
    #[error("Species '{name}' has invalid molar mass {value}; expected a finite positive number")]
    InvalidMolarMass { name: String, value: f64 },

    /// A species name referenced somewhere is not part of the mechanism
    #[error("Unknown species '{name}' referenced in {context}")]
    UnknownSpecies { name: String, context: String },

    /// Initial mole fraction given in the mechanism is not usable
    #[error("Initial mole fraction for '{name}' is {value}; expected a finite non-negative number")]
    InvalidInitialMoleFraction { name: String, value: f64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Mole Fraction Override Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Override token is not of the form `SPECIES=VALUE`
    #[error("Malformed mole fraction override '{token}': expected SPECIES_NAME=VALUE")]
    MalformedOverride { token: String },

    /// Override value does not parse as a finite non-negative real
    #[error("Invalid mole fraction value '{value}' in override '{token}'")]
    InvalidMoleValue { token: String, value: String },

    /// Species given twice in the override list
    #[error("Species '{name}' appears more than once in the mole fraction overrides")]
    DuplicateOverride { name: String },

    /// Overrides sum to zero and cannot be normalized
    #[error("Mole fractions sum to zero; at least one species needs a positive value")]
    ZeroMoleSum,
}

impl MechanismError {
    /// Create an unknown species error
    pub fn unknown_species(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownSpecies {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a malformed override error
    pub fn malformed(token: impl Into<String>) -> Self {
        Self::MalformedOverride {
            token: token.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(token: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidMoleValue {
            token: token.into(),
            value: value.into(),
        }
    }
}
