//! Mechanism header and accelerator indexing macros
//!
//! The header publishes the sizing constants of [`buffers::defines`], the
//! build-mode switches and the prototypes of the host driver.

use crate::codegen::buffers::{self, scalar_buffer};
use crate::codegen::mode::{Backend, BuildMode, MemoryLayout};
use crate::codegen::source::Source;
use crate::mechanism::{FeatureSet, Mechanism};

/// Include guard of the mechanism header (`MECHANISM_H` / `MECHANISM_CUH`)
fn guard(backend: Backend) -> String {
    format!("MECHANISM_{}", backend.header_ext().to_ascii_uppercase())
}

/// Prototype of the initial-condition setter
pub fn initial_conditions_signature(mode: &BuildMode) -> String {
    let scalar = scalar_buffer(mode.formulation);
    match mode.backend {
        Backend::Host => format!(
            "void set_same_initial_conditions(int NUM, double** y_host, double** {})",
            scalar.host()
        ),
        Backend::Accelerator => format!(
            "int set_same_initial_conditions(int NUM, int block_size, int grid_size, \
             gpuMemory** host_memory, double** y_host, double** {})",
            scalar.host()
        ),
    }
}

/// Prototype of the regression/profiling harness
pub fn harness_signature(backend: Backend) -> &'static str {
    match backend {
        Backend::Host => "void write_jacobian_and_rates_output()",
        Backend::Accelerator => {
            "void write_jacobian_and_rates_output(int NUM, int block_size, int grid_size)"
        }
    }
}

/// `mechanism.h` / `mechanism.cuh`
pub fn mechanism_header(mech: &Mechanism, features: &FeatureSet, mode: &BuildMode) -> String {
    let guard = guard(mode.backend);
    let mut src = Source::new();

    src.directive(format!("#ifndef {guard}"))
        .directive(format!("#define {guard}"))
        .blank();

    if let Some(name) = &mech.name {
        src.line(format!("/* Mechanism: {name} */"));
    }
    src.line("/* Species Indexes");
    for entry in mech.species_listing() {
        src.line(entry);
    }
    src.line("*/").blank();

    src.line("//State formulation")
        .directive(format!("#define {}", mode.formulation.define()))
        .line(format!(
            "//Test harness is compiled only with -DPROFILER or -DRATES_TEST (suggested: -D{})",
            mode.instrumentation.define()
        ))
        .blank();

    if mode.is_global() {
        src.line("//Global Memory").directive("#define GLOBAL_MEM").blank();
    }

    for define in buffers::defines(features) {
        src.line(format!("//{}", define.comment))
            .directive(format!("#define {} {}", define.size.symbol(), define.value));
    }
    src.blank();

    if mode.backend == Backend::Accelerator {
        src.line("struct gpuMemory;")
            .blank()
            .directive("#ifdef __cplusplus")
            .line("extern \"C\" {")
            .directive("#endif");
    }
    src.line(format!(
        "    //Must be implemented by user on a per mechanism basis in mechanism.{}",
        mode.backend.source_ext()
    ))
    .line(format!("    {};", initial_conditions_signature(mode)))
    .directive("#if defined (RATES_TEST) || defined (PROFILER)")
    .line(format!("    {};", harness_signature(mode.backend)))
    .directive("#endif");
    if mode.backend == Backend::Accelerator {
        src.directive("#ifdef __cplusplus")
            .line("}")
            .directive("#endif");
    }

    src.blank().directive("#endif");
    src.finish()
}

/// `gpu_macros.cuh`: `INDEX(I)` for the selected layout and `cudaErrorCheck`
pub fn gpu_macros(mode: &BuildMode) -> String {
    let mut src = Source::new();
    src.directive("#ifndef GPU_MACROS_CUH")
        .directive("#define GPU_MACROS_CUH")
        .directive("#include <stdio.h>")
        .directive("#include <cuda.h>")
        .directive("#include <cuda_runtime.h>")
        .directive("#include <helper_cuda.h>")
        .blank();

    src.directive(
        "#define CU_LINEAR_OFFSET(I) (threadIdx.x + blockIdx.x * blockDim.x + (I) * blockDim.x * gridDim.x)",
    )
    .blank();
    match mode.memory_layout {
        MemoryLayout::Global => {
            src.directive("#define GLOBAL_MEM")
                .line("//strided across every thread of the launch")
                .directive("#define INDEX(I) (CU_LINEAR_OFFSET((I)))");
        }
        MemoryLayout::PerThread => {
            src.line("//thread-local arrays")
                .directive("#define INDEX(I) ((I))");
        }
    }
    src.blank();

    src.directive("#define cudaErrorCheck(ans) { gpuAssert((ans), __FILE__, __LINE__); }")
        .open("inline void gpuAssert(cudaError_t code, const char *file, int line, bool abort=true)")
        .open("if (code != cudaSuccess)")
        .line(r#"fprintf(stderr,"GPUassert: %s %s %d\n", cudaGetErrorString(code), file, line);"#)
        .line("if (abort) exit(code);")
        .close()
        .close()
        .directive("#endif");
    src.finish()
}
