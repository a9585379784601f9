//! Sizing constants and state buffers shared by all emitters
//!
//! Every loop bound, array declaration and allocation in the generated code
//! is rendered from the [`SizeConst`] and [`Buffer`] values produced here, so
//! the header, the kernel shells, the host driver and the device allocator
//! cannot disagree about which arrays exist or how large they are.

use crate::codegen::mode::Formulation;
use crate::mechanism::{FeatureSet, RateCounts};

/// A symbolic array size in the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeConst {
    Nsp,
    Nn,
    /// `NN * NN`
    Jacobian,
    FwdRates,
    RevRates,
    Rates,
    PresModRates,
    /// One value per cell
    Scalar,
}

impl SizeConst {
    /// The expression used in generated code
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Nsp => "NSP",
            Self::Nn => "NN",
            Self::Jacobian => "NN * NN",
            Self::FwdRates => "FWD_RATES",
            Self::RevRates => "REV_RATES",
            Self::Rates => "RATES",
            Self::PresModRates => "PRES_MOD_RATES",
            Self::Scalar => "1",
        }
    }

    /// Numeric value for a mechanism, `None` if the constant is not emitted
    pub fn value(&self, features: &FeatureSet) -> Option<usize> {
        let rates = features.rate_counts();
        match (self, rates) {
            (Self::Nsp, _) => Some(features.species_count()),
            (Self::Nn, _) => Some(features.state_size()),
            (Self::Jacobian, _) => Some(features.state_size() * features.state_size()),
            (Self::FwdRates, RateCounts::Split { forward, .. }) => Some(forward),
            (Self::RevRates, RateCounts::Split { reverse, .. }) => Some(reverse),
            (Self::Rates, RateCounts::Single { rates }) => Some(rates),
            (Self::FwdRates | Self::RevRates, RateCounts::Single { .. }) => None,
            (Self::Rates, RateCounts::Split { .. }) => None,
            (Self::PresModRates, _) => features.pres_mod_rates(),
            (Self::Scalar, _) => Some(1),
        }
    }

    /// `padded * NSP`, `padded * (NN * NN)` ...
    pub fn times(&self, count: &str) -> String {
        match self {
            Self::Scalar => count.to_string(),
            other => format!("{} * {}", count, other.symbol()),
        }
    }
}

/// A `#define` of the mechanism header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Define {
    pub size: SizeConst,
    pub value: usize,
    pub comment: &'static str,
}

/// The sizing constants of a mechanism in header order
pub fn defines(features: &FeatureSet) -> Vec<Define> {
    let mut out = vec![
        Define {
            size: SizeConst::Nsp,
            value: features.species_count(),
            comment: "Number of species",
        },
        Define {
            size: SizeConst::Nn,
            value: features.state_size(),
            comment: "Number of variables. NN = NSP + 1 (temperature)",
        },
    ];
    match features.rate_counts() {
        RateCounts::Split { forward, reverse } => {
            out.push(Define {
                size: SizeConst::FwdRates,
                value: forward,
                comment: "Number of forward reactions",
            });
            out.push(Define {
                size: SizeConst::RevRates,
                value: reverse,
                comment: "Number of reversible reactions",
            });
        }
        RateCounts::Single { rates } => out.push(Define {
            size: SizeConst::Rates,
            value: rates,
            comment: "Number of reactions",
        }),
    }
    if let Some(count) = features.pres_mod_rates() {
        out.push(Define {
            size: SizeConst::PresModRates,
            value: count,
            comment: "Number of reactions with pressure modified rates",
        });
    }
    out
}

/// A per-cell state array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Buffer {
    pub name: &'static str,
    pub size: SizeConst,
    /// Section header in the regression report
    pub label: &'static str,
}

impl Buffer {
    pub const fn new(name: &'static str, size: SizeConst, label: &'static str) -> Self {
        Self { name, size, label }
    }

    /// Thread-local copy inside a kernel shell
    pub fn local(&self) -> String {
        format!("{}_local", self.name)
    }

    /// Single-cell host array
    pub fn host(&self) -> String {
        format!("{}_host", self.name)
    }

    /// Padded host staging array covering every cell
    pub fn host_full(&self) -> String {
        format!("{}_host_full", self.name)
    }
}

pub const Y: Buffer = Buffer::new("y", SizeConst::Nn, "y");
pub const DY: Buffer = Buffer::new("dy", SizeConst::Nn, "dy");
pub const JAC: Buffer = Buffer::new("jac", SizeConst::Jacobian, "Jacob");
pub const CONC: Buffer = Buffer::new("conc", SizeConst::Nsp, "Conc");
pub const SPEC_RATES: Buffer = Buffer::new("spec_rates", SizeConst::Nsp, "Spec Rates");
pub const F_TEMP: Buffer = Buffer::new("f_temp", SizeConst::Nn, "f_temp");
pub const ERROR: Buffer = Buffer::new("error", SizeConst::Nn, "error");

const FWD_RATES: Buffer = Buffer::new("fwd_rates", SizeConst::FwdRates, "Forward Rates");
const REV_RATES: Buffer = Buffer::new("rev_rates", SizeConst::RevRates, "Rev Rates");
const RATES: Buffer = Buffer::new("rates", SizeConst::Rates, "Rates");
const PRES_MOD: Buffer = Buffer::new("pres_mod", SizeConst::PresModRates, "Pres Mod Rates");

/// Reaction-rate outputs: `fwd_rates, rev_rates` or `rates`
pub fn rate_buffers(features: &FeatureSet) -> Vec<Buffer> {
    match features.rate_counts() {
        RateCounts::Split { .. } => vec![FWD_RATES, REV_RATES],
        RateCounts::Single { .. } => vec![RATES],
    }
}

/// The pressure-modification array, if the mechanism needs one
pub fn pres_mod_buffer(features: &FeatureSet) -> Option<Buffer> {
    features.has_pressure_dependent().then_some(PRES_MOD)
}

/// Rate buffers followed by the pressure-modification array
pub fn reaction_buffers(features: &FeatureSet) -> Vec<Buffer> {
    let mut out = rate_buffers(features);
    out.extend(pres_mod_buffer(features));
    out
}

/// Thermodynamic work arrays and the per-cell scalar of a formulation
pub fn formulation_buffers(formulation: Formulation) -> [Buffer; 3] {
    match formulation {
        Formulation::ConstantPressure => [
            Buffer::new("h", SizeConst::Nsp, "h"),
            Buffer::new("cp", SizeConst::Nsp, "cp"),
            Buffer::new("pres", SizeConst::Scalar, "pres"),
        ],
        Formulation::ConstantVolume => [
            Buffer::new("u", SizeConst::Nsp, "u"),
            Buffer::new("cv", SizeConst::Nsp, "cv"),
            Buffer::new("rho", SizeConst::Scalar, "rho"),
        ],
    }
}

/// The per-cell scalar of a formulation (`pres` or `rho`)
pub fn scalar_buffer(formulation: Formulation) -> Buffer {
    let [_, _, scalar] = formulation_buffers(formulation);
    scalar
}

/// Every buffer of the device memory descriptor, in declaration order
pub fn device_buffers(features: &FeatureSet, formulation: Formulation) -> Vec<Buffer> {
    let mut out = formulation_buffers(formulation).to_vec();
    out.extend([JAC, Y, DY, F_TEMP, ERROR, CONC, SPEC_RATES]);
    out.extend(reaction_buffers(features));
    out
}
