//! Device memory descriptor, allocator and deallocator (`gpu_memory.cu[h]`)
//!
//! The descriptor fields, the allocations and the frees are all rendered
//! from [`buffers::device_buffers`], which keeps the three lists equal.

use crate::codegen::buffers::{self, Buffer};
use crate::codegen::mode::BuildMode;
use crate::codegen::source::Source;
use crate::mechanism::FeatureSet;

const ALLOCATOR: &str =
    "int initialize_gpu_memory(int NUM, int block_size, int grid_size, gpuMemory** host_memory)";
const DEALLOCATOR: &str = "void free_gpu_memory(gpuMemory** host_memory)";

/// `gpu_memory.cuh`
pub fn memory_header(features: &FeatureSet, mode: &BuildMode) -> String {
    let mut src = Source::new();
    src.directive("#ifndef GPU_MEMORY_CUH")
        .directive("#define GPU_MEMORY_CUH")
        .blank()
        .directive("#include \"mechanism.cuh\"")
        .directive("#include \"gpu_macros.cuh\"")
        .blank();

    src.open("struct gpuMemory");
    for buffer in buffers::device_buffers(features, mode.formulation) {
        src.line(format!("double* {};", buffer.name));
    }
    src.close_with(";").blank();
    src.line("typedef struct gpuMemory gpuMemory;").blank();
    if mode.is_global() {
        src.line("extern __constant__ gpuMemory memory_pointers;").blank();
    }
    src.line(format!("{ALLOCATOR};"))
        .line(format!("{DEALLOCATOR};"))
        .blank()
        .directive("#endif");
    src.finish()
}

/// `gpu_memory.cu`
pub fn memory_source(features: &FeatureSet, mode: &BuildMode) -> String {
    let device = buffers::device_buffers(features, mode.formulation);
    let mut src = Source::new();
    src.directive("#include \"gpu_memory.cuh\"").blank();

    if mode.is_global() {
        src.line("__constant__ gpuMemory memory_pointers;").blank();
    }

    src.open("void initialize_pointer(double** ptr, int size)")
        .line("cudaErrorCheck(cudaMalloc(ptr, size * sizeof(double)));")
        .line("cudaErrorCheck(cudaMemset(*ptr, 0, size * sizeof(double)));")
        .close()
        .blank();

    src.open(ALLOCATOR)
        .line("int padded = grid_size * block_size > NUM ? grid_size * block_size : NUM;")
        .line("*host_memory = (gpuMemory*)malloc(sizeof(gpuMemory));");
    for buffer in &device {
        src.line(allocation(buffer));
    }
    if mode.is_global() {
        src.line("cudaErrorCheck(cudaMemcpyToSymbol(memory_pointers, *host_memory, sizeof(gpuMemory)));");
    }
    src.line("return padded;").close().blank();

    src.open(DEALLOCATOR);
    for buffer in &device {
        src.line(format!("cudaErrorCheck(cudaFree((*host_memory)->{}));", buffer.name));
    }
    src.line("free(*host_memory);")
        .line("*host_memory = NULL;")
        .close();
    src.finish()
}

fn allocation(buffer: &Buffer) -> String {
    format!(
        "initialize_pointer(&((*host_memory)->{}), {});",
        buffer.name,
        buffer.size.times("padded")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::mode::{Formulation, MemoryLayout};
    use crate::mechanism::{Mechanism, Reaction, Species};
    use std::collections::BTreeSet;

    fn features(reactions: Vec<Reaction>) -> FeatureSet {
        let species = (0..10).map(|i| Species::new(format!("S{i}"), 4.0)).collect();
        FeatureSet::classify(&Mechanism::new(species, reactions))
    }

    /// Names captured between `prefix` and `suffix` on each line
    fn captured(text: &str, prefix: &str, suffix: &str) -> BTreeSet<String> {
        text.lines()
            .filter_map(|l| l.trim().strip_prefix(prefix))
            .filter_map(|l| l.split(suffix).next())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_descriptor_allocation_and_free_agree() {
        let f = features(vec![
            Reaction::reversible(),
            Reaction::irreversible().with_pressure_dependence(),
        ]);
        for formulation in [Formulation::ConstantPressure, Formulation::ConstantVolume] {
            let mode = BuildMode::accelerator().with_formulation(formulation);
            let header = memory_header(&f, &mode);
            let source = memory_source(&f, &mode);

            let fields = captured(&header, "double* ", ";");
            let allocated = captured(&source, "initialize_pointer(&((*host_memory)->", ")");
            let freed = captured(&source, "cudaErrorCheck(cudaFree((*host_memory)->", ")");

            assert_eq!(fields.len(), 13);
            assert_eq!(fields, allocated);
            assert_eq!(fields, freed);
            assert!(fields.contains("spec_rates"));
            assert!(fields.contains("pres_mod"));
        }
    }

    #[test]
    fn test_formulation_buffers() {
        let f = features(vec![Reaction::irreversible()]);
        let conv = memory_source(
            &f,
            &BuildMode::accelerator().with_formulation(Formulation::ConstantVolume),
        );
        assert!(conv.contains("    initialize_pointer(&((*host_memory)->rho), padded);"));
        assert!(conv.contains("cudaFree((*host_memory)->cv)"));
        assert!(!conv.contains("->pres)"));

        let conp = memory_source(&f, &BuildMode::accelerator());
        assert!(conp.contains("    initialize_pointer(&((*host_memory)->jac), padded * NN * NN);"));
        assert!(conp.contains("    initialize_pointer(&((*host_memory)->rates), padded * RATES);"));
        assert!(!conp.contains("->rho)"));
    }

    #[test]
    fn test_global_layout_publishes_descriptor() {
        let f = features(vec![Reaction::irreversible()]);
        let mode = BuildMode::accelerator().with_memory_layout(MemoryLayout::Global);
        let source = memory_source(&f, &mode);

        assert!(source.contains("__constant__ gpuMemory memory_pointers;"));
        let copy = source.find("cudaMemcpyToSymbol").unwrap();
        let last_alloc = source.rfind("initialize_pointer(&").unwrap();
        assert!(copy > last_alloc);
        assert!(memory_header(&f, &mode).contains("extern __constant__ gpuMemory memory_pointers;"));

        let local = memory_source(&f, &BuildMode::accelerator());
        assert!(!local.contains("memory_pointers"));
    }

    #[test]
    fn test_padding_and_release() {
        let source = memory_source(&features(vec![]), &BuildMode::accelerator());
        assert!(source.contains(
            "    int padded = grid_size * block_size > NUM ? grid_size * block_size : NUM;"
        ));
        assert!(source.contains("    free(*host_memory);\n    *host_memory = NULL;\n}"));
    }
}
