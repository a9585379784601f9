use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use mechgen::{Backend, BuildMode, Formulation, Instrumentation, MemoryLayout};

#[derive(Parser)]
#[command(
    name = "mechgen",
    about = "Generate C/CUDA kinetics sources for a reaction mechanism",
    version,
    author
)]
pub struct Cli {
    /// Mechanism description (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Directory receiving the generated sources
    #[arg(short, long, value_name = "DIR", default_value = "out")]
    pub output: PathBuf,

    #[command(flatten)]
    pub build: BuildOptions,

    /// Initial mole amounts, e.g. "H2=1.0,N2=3.0"
    #[arg(short, long, value_name = "LIST")]
    pub moles: Option<String>,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Build-mode switches.
#[derive(Args)]
#[command(next_help_heading = "Build Mode")]
pub struct BuildOptions {
    /// Target language (c, cuda)
    #[arg(short, long, value_name = "LANG", default_value = "c")]
    pub backend: Backend,

    /// Device memory layout
    #[arg(long, value_name = "LAYOUT", default_value = "per-thread")]
    pub layout: LayoutArg,

    /// Instrumentation suggested in the header comment
    #[arg(long, value_name = "MODE", default_value = "rates-test")]
    pub instrumentation: InstrumentationArg,

    /// State formulation
    #[arg(long, value_name = "STATE", default_value = "conp")]
    pub formulation: FormulationArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    PerThread,
    Global,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InstrumentationArg {
    Profiler,
    RatesTest,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormulationArg {
    /// Constant pressure
    Conp,
    /// Constant volume
    Conv,
}

impl From<LayoutArg> for MemoryLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::PerThread => MemoryLayout::PerThread,
            LayoutArg::Global => MemoryLayout::Global,
        }
    }
}

impl From<InstrumentationArg> for Instrumentation {
    fn from(arg: InstrumentationArg) -> Self {
        match arg {
            InstrumentationArg::Profiler => Instrumentation::Profiling,
            InstrumentationArg::RatesTest => Instrumentation::CorrectnessTest,
        }
    }
}

impl From<FormulationArg> for Formulation {
    fn from(arg: FormulationArg) -> Self {
        match arg {
            FormulationArg::Conp => Formulation::ConstantPressure,
            FormulationArg::Conv => Formulation::ConstantVolume,
        }
    }
}

impl BuildOptions {
    pub fn mode(&self) -> BuildMode {
        BuildMode {
            backend: self.backend,
            ..BuildMode::default()
        }
        .with_memory_layout(self.layout.into())
        .with_instrumentation(self.instrumentation.into())
        .with_formulation(self.formulation.into())
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
