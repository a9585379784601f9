//! Validation for mechanisms

use std::collections::HashSet;

use crate::mechanism::errors::MechanismError;
use crate::mechanism::model::Mechanism;

/// A validated mechanism
///
/// This wrapper type guarantees that the contained mechanism has passed
/// all validation checks and is ready for code generation.
#[derive(Debug, Clone)]
pub struct ValidatedMechanism(Mechanism);

impl ValidatedMechanism {
    /// Get the inner Mechanism
    pub fn inner(&self) -> &Mechanism {
        &self.0
    }

    /// Consume the wrapper and return the inner Mechanism
    pub fn into_inner(self) -> Mechanism {
        self.0
    }
}

/// Validator for mechanisms
#[derive(Debug, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a mechanism
    pub fn validate(&self, mech: &Mechanism) -> Result<ValidatedMechanism, MechanismError> {
        // 1. Names and molar masses
        self.validate_name(mech)?;
        self.validate_species(mech)?;

        // 2. Initial mole fractions must reference known species
        self.validate_initial_moles(mech)?;

        if mech.reactions.is_empty() {
            tracing::warn!(
                "mechanism has no reactions; generated kernels will evaluate empty rate arrays"
            );
        }

        Ok(ValidatedMechanism(mech.clone()))
    }

    fn validate_name(&self, mech: &Mechanism) -> Result<(), MechanismError> {
        let Some(name) = &mech.name else {
            return Ok(());
        };
        match comment_hazard(name) {
            Some(reason) => Err(MechanismError::InvalidMechanismName {
                name: name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn validate_species(&self, mech: &Mechanism) -> Result<(), MechanismError> {
        if mech.species.is_empty() {
            return Err(MechanismError::EmptySpecies);
        }

        let mut seen = HashSet::new();
        for (index, species) in mech.species.iter().enumerate() {
            if species.name.trim().is_empty() {
                return Err(MechanismError::EmptySpeciesName { index });
            }
            let reason = comment_hazard(&species.name).or_else(|| {
                species
                    .name
                    .chars()
                    .any(char::is_whitespace)
                    .then_some("contains whitespace")
            });
            if let Some(reason) = reason {
                return Err(MechanismError::InvalidSpeciesName {
                    name: species.name.clone(),
                    reason,
                });
            }
            if !seen.insert(species.name.as_str()) {
                return Err(MechanismError::DuplicateSpecies {
                    name: species.name.clone(),
                });
            }
            if !species.molar_mass.is_finite() || species.molar_mass <= 0.0 {
                return Err(MechanismError::InvalidMolarMass {
                    name: species.name.clone(),
                    value: species.molar_mass,
                });
            }
        }
        Ok(())
    }

    fn validate_initial_moles(&self, mech: &Mechanism) -> Result<(), MechanismError> {
        for (name, &value) in &mech.initial_moles {
            if mech.species_index(name).is_none() {
                return Err(MechanismError::unknown_species(name, "initialMoles"));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(MechanismError::InvalidInitialMoleFraction {
                    name: name.clone(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Names are echoed inside `/* */` and `//` comments of the generated sources
fn comment_hazard(name: &str) -> Option<&'static str> {
    if name.chars().any(char::is_control) {
        Some("contains control characters")
    } else if name.contains("*/") || name.contains("/*") {
        Some("contains a comment delimiter")
    } else {
        None
    }
}
