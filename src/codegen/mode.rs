//! Build-mode switches selecting the branches of every emitter

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::codegen::errors::CodegenError;

// ═══════════════════════════════════════════════════════════════════════════════
// Backend
// ═══════════════════════════════════════════════════════════════════════════════

/// Target language of the generated sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Backend {
    /// Plain C, evaluated on the host
    #[default]
    Host,
    /// CUDA kernels plus host orchestration
    Accelerator,
}

impl Backend {
    /// Extension of the mechanism header (`h` or `cuh`)
    pub fn header_ext(&self) -> &'static str {
        match self {
            Self::Host => "h",
            Self::Accelerator => "cuh",
        }
    }

    /// Extension of implementation files (`c` or `cu`)
    pub fn source_ext(&self) -> &'static str {
        match self {
            Self::Host => "c",
            Self::Accelerator => "cu",
        }
    }
}

impl FromStr for Backend {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "host" => Ok(Self::Host),
            "cuda" | "accelerator" => Ok(Self::Accelerator),
            _ => Err(CodegenError::UnsupportedBackend(s.to_string())),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = CodegenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Backend> for String {
    fn from(value: Backend) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "c"),
            Self::Accelerator => write!(f, "cuda"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Accelerator Options
// ═══════════════════════════════════════════════════════════════════════════════

/// Addressing of per-cell state in device memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryLayout {
    /// Each thread marshals its cell into local arrays; `INDEX(I)` is `I`
    #[default]
    PerThread,
    /// Kernels address one strided global buffer through `memory_pointers`
    Global,
}

/// Which body of the test harness and kernel shells the header suggests compiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instrumentation {
    /// `PROFILER`: synthetic inputs, no marshaling
    Profiling,
    /// `RATES_TEST`: marshal real state and write the regression report
    #[default]
    CorrectnessTest,
}

impl Instrumentation {
    pub fn define(&self) -> &'static str {
        match self {
            Self::Profiling => "PROFILER",
            Self::CorrectnessTest => "RATES_TEST",
        }
    }
}

/// State formulation of the ODE system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formulation {
    /// Constant pressure (`CONP`): a per-cell pressure is carried
    #[default]
    ConstantPressure,
    /// Constant volume (`CONV`): a per-cell density is carried
    ConstantVolume,
}

impl Formulation {
    pub fn define(&self) -> &'static str {
        match self {
            Self::ConstantPressure => "CONP",
            Self::ConstantVolume => "CONV",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BuildMode
// ═══════════════════════════════════════════════════════════════════════════════

/// External configuration of a generation run
///
/// This value is threaded explicitly into every emitter so that no two
/// artifacts can disagree about the active mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildMode {
    pub backend: Backend,
    /// Only consulted by the accelerator backend
    pub memory_layout: MemoryLayout,
    pub instrumentation: Instrumentation,
    pub formulation: Formulation,
}

impl BuildMode {
    /// Default C build
    pub fn host() -> Self {
        Self::default()
    }

    /// Default CUDA build (per-thread layout)
    pub fn accelerator() -> Self {
        Self {
            backend: Backend::Accelerator,
            ..Self::default()
        }
    }

    pub fn with_memory_layout(mut self, layout: MemoryLayout) -> Self {
        self.memory_layout = layout;
        self
    }

    pub fn with_instrumentation(mut self, instrumentation: Instrumentation) -> Self {
        self.instrumentation = instrumentation;
        self
    }

    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// Whether global-memory addressing is active
    pub fn is_global(&self) -> bool {
        self.backend == Backend::Accelerator && self.memory_layout == MemoryLayout::Global
    }

    /// Parse a build mode from JSON
    pub fn from_json(json: &str) -> Result<Self, CodegenError> {
        serde_json::from_str(json).map_err(|e| CodegenError::InvalidBuildMode(e.to_string()))
    }
}
