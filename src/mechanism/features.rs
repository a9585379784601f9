//! Reduction of a mechanism to the features that drive code generation

use crate::mechanism::model::Mechanism;

/// How reaction rates are laid out in the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCounts {
    /// No reversible reactions: one `RATES` array
    Single { rates: usize },
    /// At least one reversible reaction: `FWD_RATES` and `REV_RATES` arrays
    Split { forward: usize, reverse: usize },
}

/// Features of a mechanism, derived once and shared by every emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    species: usize,
    rates: RateCounts,
    pres_mod: Option<usize>,
}

impl FeatureSet {
    /// Classify a mechanism in a single pass over its reactions
    pub fn classify(mech: &Mechanism) -> Self {
        let (reversible, pres_mod) =
            mech.reactions
                .iter()
                .fold((0usize, 0usize), |(rev, pdep), reac| {
                    (
                        rev + usize::from(reac.reversible),
                        pdep + usize::from(reac.has_pressure_modification()),
                    )
                });

        let total = mech.reaction_count();
        let rates = if reversible > 0 {
            RateCounts::Split {
                forward: total,
                reverse: reversible,
            }
        } else {
            RateCounts::Single { rates: total }
        };

        let features = Self {
            species: mech.species_count(),
            rates,
            pres_mod: (pres_mod > 0).then_some(pres_mod),
        };
        tracing::debug!(?features, "classified mechanism");
        features
    }

    /// Whether any reaction is reversible
    pub fn has_reversible(&self) -> bool {
        matches!(self.rates, RateCounts::Split { .. })
    }

    /// Whether any reaction is third-body enhanced or pressure dependent
    pub fn has_pressure_dependent(&self) -> bool {
        self.pres_mod.is_some()
    }

    pub fn rate_counts(&self) -> RateCounts {
        self.rates
    }

    /// Number of pressure-modified rates, if any
    pub fn pres_mod_rates(&self) -> Option<usize> {
        self.pres_mod
    }

    /// `NSP`
    pub fn species_count(&self) -> usize {
        self.species
    }

    /// `NN`, species plus temperature
    pub fn state_size(&self) -> usize {
        self.species + 1
    }
}
