//! Accelerator kernel shells
//!
//! Each numerical routine (`eval_rxn_rates`, `get_rxn_pres_mod`,
//! `eval_spec_rates`, `dydt`, `eval_jacob`) is called from a thin
//! `__global__` wrapper. The wrappers are described once as [`KernelShell`]
//! values and rendered into:
//!
//! - a `PROFILER` body that feeds the routine synthetic inputs,
//! - a `RATES_TEST` body that copies one thread's slice of the device
//!   buffers into local arrays and back,
//! - a global-layout body that hands the routine the `memory_pointers`
//!   descriptor directly.
//!
//! The host driver launches the wrappers from the same descriptions, so a
//! launch can never pass a different argument list than the wrapper declares.

use crate::codegen::buffers::{self, Buffer, SizeConst, CONC, DY, JAC, SPEC_RATES, Y};
use crate::codegen::mode::BuildMode;
use crate::codegen::source::Source;
use crate::mechanism::FeatureSet;

/// Which rendering of a wrapper is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Profiling,
    CorrectnessTest,
    Global,
}

/// One formal parameter of a wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Logical problem size `NUM`
    Num,
    /// Integration time `t`
    Time,
    /// A `const double` scalar such as `T` or `P`
    Scalar(&'static str),
    Input(Buffer),
    Output(Buffer),
}

impl Param {
    fn declaration(&self) -> String {
        match self {
            Self::Num => "const int NUM".to_string(),
            Self::Time => "const double t".to_string(),
            Self::Scalar(name) => format!("const double {name}"),
            Self::Input(b) => format!("const double* {}", b.name),
            Self::Output(b) => format!("double* {}", b.name),
        }
    }
}

/// A `__global__` wrapper around one numerical routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelShell {
    pub name: &'static str,
    pub routine: &'static str,
    /// Routine takes the integration time as its first argument
    pub takes_time: bool,
    pub scalars: &'static [&'static str],
    pub inputs: Vec<Buffer>,
    pub outputs: Vec<Buffer>,
}

/// The wrappers of a mechanism in emission order
pub fn kernel_shells(features: &FeatureSet) -> Vec<KernelShell> {
    let mut shells = vec![KernelShell {
        name: "k_eval_rxn_rates",
        routine: "eval_rxn_rates",
        takes_time: false,
        scalars: &["T"],
        inputs: vec![CONC],
        outputs: buffers::rate_buffers(features),
    }];
    if let Some(pres_mod) = buffers::pres_mod_buffer(features) {
        shells.push(KernelShell {
            name: "k_get_rxn_pres_mod",
            routine: "get_rxn_pres_mod",
            takes_time: false,
            scalars: &["T", "P"],
            inputs: vec![CONC],
            outputs: vec![pres_mod],
        });
    }
    shells.push(KernelShell {
        name: "k_eval_spec_rates",
        routine: "eval_spec_rates",
        takes_time: false,
        scalars: &[],
        inputs: buffers::reaction_buffers(features),
        outputs: vec![SPEC_RATES],
    });
    shells.push(KernelShell {
        name: "k_eval_dy",
        routine: "dydt",
        takes_time: false,
        scalars: &["T", "P"],
        inputs: vec![Y],
        outputs: vec![DY],
    });
    shells.push(KernelShell {
        name: "k_eval_jacob",
        routine: "eval_jacob",
        takes_time: true,
        scalars: &["P"],
        inputs: vec![Y],
        outputs: vec![JAC],
    });
    shells
}

impl KernelShell {
    /// Formal parameters of the wrapper for a body
    pub fn params(&self, body: Body) -> Vec<Param> {
        let mut params = Vec::new();
        match body {
            Body::Profiling => {
                // the synthetic state vector is seeded with the temperature
                if self.inputs.contains(&Y) && !self.scalars.contains(&"T") {
                    params.push(Param::Scalar("T"));
                }
                params.extend(self.scalars.iter().copied().map(Param::Scalar));
            }
            Body::CorrectnessTest => {
                params.push(Param::Num);
                if self.takes_time {
                    params.push(Param::Time);
                }
                params.extend(self.scalars.iter().copied().map(Param::Scalar));
                params.extend(self.inputs.iter().copied().map(Param::Input));
                params.extend(self.outputs.iter().copied().map(Param::Output));
            }
            Body::Global => {
                if self.takes_time {
                    params.push(Param::Time);
                }
                params.extend(self.scalars.iter().copied().map(Param::Scalar));
            }
        }
        params
    }

    fn signature(&self, body: Body) -> String {
        let params: Vec<_> = self.params(body).iter().map(Param::declaration).collect();
        format!("__global__ void {}({})", self.name, params.join(", "))
    }

    /// Call of the wrapped routine; scalars and buffers are renamed by the closures
    pub fn routine_call(
        &self,
        time: &str,
        scalar: impl Fn(&str) -> String,
        buffer: impl Fn(&Buffer) -> String,
    ) -> String {
        let mut args = Vec::new();
        if self.takes_time {
            args.push(time.to_string());
        }
        args.extend(self.scalars.iter().map(|s| scalar(s)));
        args.extend(self.inputs.iter().chain(&self.outputs).map(buffer));
        format!("{}({});", self.routine, args.join(", "))
    }

    /// Host-side launch of the wrapper, one argument per formal parameter
    pub fn launch(&self, body: Body, arg: impl Fn(&Param) -> String) -> String {
        let args: Vec<_> = self.params(body).iter().map(arg).collect();
        format!("{}<<<grid_size, block_size>>>({});", self.name, args.join(", "))
    }

    fn call(&self, time: &str, buffer: impl Fn(&Buffer) -> String) -> String {
        self.routine_call(time, |s| s.to_string(), buffer)
    }

    fn render_profiling(&self, features: &FeatureSet) -> Source {
        let mut src = Source::new();
        src.open(self.signature(Body::Profiling));
        for input in &self.inputs {
            src.line(format!(
                "double {}[{}] = {};",
                input.local(),
                extent(input, features),
                synthetic(input, features)
            ));
        }
        for output in &self.outputs {
            src.line(format!("double {}[{}];", output.local(), extent(output, features)));
        }
        src.line(self.call("0", Buffer::local));
        src.close();
        src
    }

    fn render_test(&self, features: &FeatureSet) -> Source {
        let mut src = Source::new();
        src.open(self.signature(Body::CorrectnessTest));
        for input in &self.inputs {
            src.line(format!("double {}[{}];", input.local(), extent(input, features)));
        }
        for output in &self.outputs {
            src.line(format!(
                "double {}[{}] = {{0.0}};",
                output.local(),
                extent(output, features)
            ));
        }
        src.line("//copy in");
        for input in &self.inputs {
            src.for_loop(
                "i",
                input.size.symbol(),
                format!("{}[i] = {}[{}];", input.local(), input.name, THREAD_SLICE),
            );
        }
        src.line(self.call("t", Buffer::local));
        src.line("//copy back");
        for output in &self.outputs {
            src.for_loop(
                "i",
                output.size.symbol(),
                format!("{}[{}] = {}[i];", output.name, THREAD_SLICE, output.local()),
            );
        }
        src.close();
        src
    }

    fn render_global(&self) -> Source {
        let mut src = Source::new();
        src.open(self.signature(Body::Global));
        src.line(self.call("t", |b| format!("memory_pointers.{}", b.name)));
        src.close();
        src
    }
}

/// Offset of element `i` of this thread's cell in a `NUM`-strided buffer
const THREAD_SLICE: &str = "i * NUM + threadIdx.x + blockIdx.x * blockDim.x";

/// Declared extent of a local array; zero-length arrays are widened to one
pub(crate) fn extent(buffer: &Buffer, features: &FeatureSet) -> &'static str {
    match buffer.size.value(features) {
        Some(0) => "1",
        _ => buffer.size.symbol(),
    }
}

/// Fixed profiling input: unit concentrations/rates, equal mass fractions
fn synthetic(buffer: &Buffer, features: &FeatureSet) -> String {
    if buffer.size == SizeConst::Nn {
        return "{T, [1 ... NN - 1] = 1.0 / NSP}".to_string();
    }
    match buffer.size.value(features) {
        Some(0) => "{0.0}".to_string(),
        _ => format!("{{[0 ... {} - 1] = 1.0}}", buffer.size.symbol()),
    }
}

/// All kernel shells of a mechanism
///
/// Per-thread layout emits the `PROFILER` and `RATES_TEST` bodies side by
/// side so the same file serves both purposes; global layout emits the
/// `memory_pointers` body.
pub fn write_kernels(features: &FeatureSet, mode: &BuildMode) -> String {
    let mut src = Source::new();
    for shell in kernel_shells(features) {
        if mode.is_global() {
            src.append(shell.render_global());
        } else {
            src.directive("#ifdef PROFILER")
                .append(shell.render_profiling(features))
                .directive("#elif defined(RATES_TEST)")
                .append(shell.render_test(features))
                .directive("#endif");
        }
    }
    src.finish()
}
