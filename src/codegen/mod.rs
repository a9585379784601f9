//! Generation of the C / CUDA source set for a validated mechanism
//!
//! A [`CodeGenerator`] classifies the mechanism once and renders every
//! artifact of the selected [`Backend`] from that single [`FeatureSet`]:
//!
//! | Backend | Artifacts |
//! |---|---|
//! | `c` | `mechanism.h`, `mechanism.c` |
//! | `cuda` | `mechanism.cuh`, `mechanism.cu`, `gpu_memory.cuh`, `gpu_memory.cu`, `gpu_macros.cuh` |
//!
//! Every builder is a pure function of its inputs, so the same mechanism and
//! build mode always produce byte-identical text.
//!
//! # Example
//!
//! ```ignore
//! use mechgen::codegen::{BuildMode, CodeGenerator};
//! use mechgen::mechanism::{load_json, MoleFractions};
//!
//! let mech = load_json(json)?;
//! let artifacts = CodeGenerator::new(&mech, BuildMode::accelerator(), MoleFractions::none())
//!     .generate()?;
//! artifacts.write_to("out")?;
//! ```

pub mod buffers;
pub mod driver;
mod errors;
pub mod header;
pub mod kernels;
pub mod memory;
mod mode;
mod persist;
pub mod source;

pub use errors::CodegenError;
pub use mode::{Backend, BuildMode, Formulation, Instrumentation, MemoryLayout};

use crate::mechanism::{FeatureSet, Mechanism, MoleFractions, ValidatedMechanism};

/// Role of a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Header,
    Source,
}

/// One generated file: name, role and full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub contents: String,
}

impl GeneratedArtifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            contents: contents.into(),
        }
    }
}

/// The complete, ordered output of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<GeneratedArtifact>,
}

impl ArtifactSet {
    pub fn new(artifacts: Vec<GeneratedArtifact>) -> Self {
        Self { artifacts }
    }

    /// Look up an artifact by file name
    pub fn get(&self, name: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a GeneratedArtifact;
    type IntoIter = std::slice::Iter<'a, GeneratedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

/// Renders the artifact set of one mechanism under one build mode
#[derive(Debug, Clone)]
pub struct CodeGenerator<'a> {
    mechanism: &'a Mechanism,
    mode: BuildMode,
    moles: MoleFractions,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(mechanism: &'a ValidatedMechanism, mode: BuildMode, moles: MoleFractions) -> Self {
        Self {
            mechanism: mechanism.inner(),
            mode,
            moles,
        }
    }

    pub fn mode(&self) -> &BuildMode {
        &self.mode
    }

    /// Render every artifact of the selected backend
    pub fn generate(&self) -> Result<ArtifactSet, CodegenError> {
        let features = FeatureSet::classify(self.mechanism);
        let mode = &self.mode;
        tracing::info!(
            backend = %mode.backend,
            layout = ?mode.memory_layout,
            formulation = ?mode.formulation,
            "Generating {} species, {} reactions",
            features.species_count(),
            self.mechanism.reaction_count()
        );

        let h = mode.backend.header_ext();
        let c = mode.backend.source_ext();
        let (header, implementation) = rayon::join(
            || header::mechanism_header(self.mechanism, &features, mode),
            || driver::write_implementation(self.mechanism, &features, mode, &self.moles),
        );
        let mut artifacts = vec![
            GeneratedArtifact::new(format!("mechanism.{h}"), ArtifactKind::Header, header),
            GeneratedArtifact::new(format!("mechanism.{c}"), ArtifactKind::Source, implementation),
        ];

        if mode.backend == Backend::Accelerator {
            let ((memory_header, memory_source), macros) = rayon::join(
                || {
                    rayon::join(
                        || memory::memory_header(&features, mode),
                        || memory::memory_source(&features, mode),
                    )
                },
                || header::gpu_macros(mode),
            );
            artifacts.extend([
                GeneratedArtifact::new("gpu_memory.cuh", ArtifactKind::Header, memory_header),
                GeneratedArtifact::new("gpu_memory.cu", ArtifactKind::Source, memory_source),
                GeneratedArtifact::new("gpu_macros.cuh", ArtifactKind::Header, macros),
            ]);
        }

        tracing::debug!("Generated {:?}", artifacts.iter().map(|a| &a.name).collect::<Vec<_>>());
        Ok(ArtifactSet::new(artifacts))
    }
}
