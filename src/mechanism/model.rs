//! Main mechanism struct

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::mechanism::errors::MechanismError;
use crate::mechanism::types::*;

/// A reaction mechanism as handed over by the mechanism loader
///
/// Species and reactions are kept in declaration order; that order defines
/// the species indexes and rate-array offsets of every generated artifact.
///
/// # Example
///
/// ```ignore
/// use mechgen::Mechanism;
///
/// let json = r#"{
///     "species": [
///         { "name": "H2", "molarMass": 2.016 },
///         { "name": "O2", "molarMass": 31.998 }
///     ],
///     "reactions": [
///         { "reversible": true },
///         { "thirdBody": true }
///     ]
/// }"#;
///
/// let mech = Mechanism::from_str(json)?;
/// assert_eq!(mech.species_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mechanism {
    /// Optional mechanism name, only used in generated comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Species in index order
    pub species: Vec<Species>,

    /// Reactions in index order
    #[serde(default)]
    pub reactions: Vec<Reaction>,

    /// Initial mole fractions by species name
    #[serde(
        default,
        rename = "initialMoles",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub initial_moles: BTreeMap<String, f64>,
}

impl Mechanism {
    /// Build a mechanism from its parts
    pub fn new(species: Vec<Species>, reactions: Vec<Reaction>) -> Self {
        Self {
            name: None,
            species,
            reactions,
            initial_moles: BTreeMap::new(),
        }
    }

    /// Attach initial mole fractions
    pub fn with_initial_moles<I, S>(mut self, moles: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.initial_moles = moles.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Parse a mechanism from a JSON string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, MechanismError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a mechanism JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MechanismError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| MechanismError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&contents)
    }

    /// Number of species (`NSP` in generated code)
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Number of reactions
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Index of a species by name
    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    /// `<index>  <name>` lines used in generated header comments
    pub fn species_listing(&self) -> Vec<String> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}  {}", i, s.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_mechanism() {
        let json = r#"{
            "species": [
                { "name": "H2", "molarMass": 2.016 },
                { "name": "O2", "mw": 31.998 }
            ],
            "reactions": [
                { "reversible": true },
                { "thirdBody": true },
                {}
            ]
        }"#;

        let mech = Mechanism::from_str(json).unwrap();
        assert_eq!(mech.species_count(), 2);
        assert_eq!(mech.reaction_count(), 3);
        assert!(mech.reactions[0].reversible);
        assert!(mech.reactions[1].third_body);
        assert_eq!(mech.reactions[2], Reaction::irreversible());
        assert!(mech.initial_moles.is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let json = r#"{
            "species": [{ "name": "H2", "molarMass": 2.016, "charge": 0 }]
        }"#;

        assert!(matches!(
            Mechanism::from_str(json),
            Err(MechanismError::Parse(_))
        ));
    }

    #[test]
    fn test_species_lookup_and_listing() {
        let mech = Mechanism::new(
            vec![Species::new("H2", 2.016), Species::new("N2", 28.014)],
            vec![],
        );

        assert_eq!(mech.species_index("N2"), Some(1));
        assert_eq!(mech.species_index("AR"), None);
        assert_eq!(mech.species_listing(), vec!["0  H2", "1  N2"]);
    }
}
