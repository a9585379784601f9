//! Initial mole fractions from `SPECIES=VALUE` override lists

use std::collections::HashSet;

use crate::mechanism::errors::MechanismError;
use crate::mechanism::model::Mechanism;

/// Normalized initial composition of a mechanism
///
/// An empty value means no composition was supplied; the generated
/// initial-condition setter then has to be completed by hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleFractions {
    mole: Vec<f64>,
    mass: Vec<f64>,
    assigned: Vec<usize>,
}

impl MoleFractions {
    /// No initial composition
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a comma separated override list such as `"H2=1.0, N2=3.0"`
    ///
    /// Every token must contain exactly one `=`, name a species of the
    /// mechanism and carry a finite non-negative value. The result is
    /// normalized to sum to one.
    pub fn parse(mech: &Mechanism, raw: &str) -> Result<Self, MechanismError> {
        if raw.trim().is_empty() {
            return Ok(Self::none());
        }

        let mut pairs = Vec::new();
        for token in raw.split(',').map(str::trim) {
            let mut parts = token.split('=');
            let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(MechanismError::malformed(token));
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                return Err(MechanismError::malformed(token));
            }

            let parsed = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| MechanismError::invalid_value(token, value))?;

            if mech.species_index(name).is_none() {
                return Err(MechanismError::unknown_species(
                    name,
                    format!("mole fraction override '{token}'"),
                ));
            }
            pairs.push((name, parsed));
        }

        Self::from_assignments(mech, pairs)
    }

    /// Build from already parsed `(species, value)` pairs
    pub fn from_assignments<'a, I>(mech: &Mechanism, pairs: I) -> Result<Self, MechanismError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut mole = vec![0.0; mech.species_count()];
        let mut assigned = Vec::new();
        let mut seen = HashSet::new();

        for (name, value) in pairs {
            let index = mech
                .species_index(name)
                .ok_or_else(|| MechanismError::unknown_species(name, "initial mole fractions"))?;
            if !seen.insert(index) {
                return Err(MechanismError::DuplicateOverride {
                    name: name.to_string(),
                });
            }
            if !value.is_finite() || value < 0.0 {
                return Err(MechanismError::InvalidInitialMoleFraction {
                    name: name.to_string(),
                    value,
                });
            }
            mole[index] = value;
            assigned.push(index);
        }

        if assigned.is_empty() {
            return Ok(Self::none());
        }

        // scale by the largest amount first so the sum cannot overflow
        let max = mole.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(MechanismError::ZeroMoleSum);
        }
        mole.iter_mut().for_each(|x| *x /= max);
        let sum: f64 = mole.iter().sum();
        mole.iter_mut().for_each(|x| *x /= sum);
        assigned.sort_unstable();

        let mass = mole_to_mass(mech, &mole);
        Ok(Self {
            mole,
            mass,
            assigned,
        })
    }

    /// Resolve the composition for a generation run
    ///
    /// A non-empty override string takes precedence over the mechanism's
    /// own `initialMoles`.
    pub fn resolve(mech: &Mechanism, overrides: Option<&str>) -> Result<Self, MechanismError> {
        match overrides {
            Some(raw) if !raw.trim().is_empty() => Self::parse(mech, raw),
            _ => Self::from_assignments(
                mech,
                mech.initial_moles.iter().map(|(k, &v)| (k.as_str(), v)),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Normalized mole fractions, one entry per species
    pub fn mole_fractions(&self) -> &[f64] {
        &self.mole
    }

    /// Mass fractions matching [`Self::mole_fractions`]
    pub fn mass_fractions(&self) -> &[f64] {
        &self.mass
    }

    /// Species indexes that were explicitly assigned, ascending
    pub fn assigned(&self) -> &[usize] {
        &self.assigned
    }

    pub fn sum(&self) -> f64 {
        self.mole.iter().sum()
    }
}

/// Y_k = X_k W_k / sum_j X_j W_j
fn mole_to_mass(mech: &Mechanism, mole: &[f64]) -> Vec<f64> {
    let mean: f64 = mole
        .iter()
        .zip(&mech.species)
        .map(|(x, s)| x * s.molar_mass)
        .sum();
    mole.iter()
        .zip(&mech.species)
        .map(|(x, s)| x * s.molar_mass / mean)
        .collect()
}
