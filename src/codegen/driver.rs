//! Host driver: initial conditions, concentrations and the test harness
//!
//! The harness evaluates every numerical routine at three fixed
//! (temperature, pressure) points and writes each intermediate array to
//! `rates_data.txt` in a fixed format, so that reports of two builds can be
//! compared line by line.

use crate::codegen::buffers::{self, scalar_buffer, Buffer, CONC, DY, JAC, SPEC_RATES, Y};
use crate::codegen::header;
use crate::codegen::kernels::{self, extent, Body, KernelShell, Param};
use crate::codegen::mode::{Backend, BuildMode, Formulation};
use crate::codegen::source::{c_double, Source};
use crate::mechanism::{FeatureSet, Mechanism, MoleFractions};

/// One atmosphere in dyn/cm^2
pub const ONE_ATM: f64 = 1.01325e6;

/// Universal gas constant in erg/(mol K)
pub const RU: f64 = 8.3144621e7;

/// Initial temperature written by the initial-condition setter, in K
pub const INITIAL_TEMPERATURE: f64 = 1600.0;

/// Width after which the density sum is continued on a new line
const WRAP_COLUMN: usize = 70;

/// A state at which the harness evaluates every routine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestPoint {
    /// K
    pub temperature: f64,
    /// atm
    pub pressure_atm: f64,
}

impl TestPoint {
    /// Pressure in dyn/cm^2
    pub fn pressure(&self) -> f64 {
        self.pressure_atm * ONE_ATM
    }

    /// Report header, e.g. `800K, 1 atm`
    pub fn label(&self) -> String {
        format!("{}K, {} atm", self.temperature, self.pressure_atm)
    }

    fn scalar(&self, name: &str) -> String {
        match name {
            "T" => c_double(self.temperature),
            "P" => c_double(self.pressure()),
            other => other.to_string(),
        }
    }
}

pub const TEST_POINTS: [TestPoint; 3] = [
    TestPoint {
        temperature: 800.0,
        pressure_atm: 1.0,
    },
    TestPoint {
        temperature: 1600.0,
        pressure_atm: 1.0,
    },
    TestPoint {
        temperature: 800.0,
        pressure_atm: 10.0,
    },
];

/// Arrays printed by `write_rates`, in report order
pub fn report_buffers(features: &FeatureSet) -> Vec<Buffer> {
    let mut out = buffers::reaction_buffers(features);
    out.extend([SPEC_RATES, DY]);
    out
}

/// `mechanism.c` / `mechanism.cu`
pub fn write_implementation(
    mech: &Mechanism,
    features: &FeatureSet,
    mode: &BuildMode,
    moles: &MoleFractions,
) -> String {
    let mut src = Source::new();
    src.append(includes(mode));
    if mode.backend == Backend::Accelerator {
        if mode.is_global() {
            src.blank()
                .line("extern __constant__ gpuMemory memory_pointers;")
                .blank();
        }
        src.directive(kernels::write_kernels(features, mode).trim_end());
        src.blank();
    }

    src.append(initial_conditions(mech, mode, moles)).blank();

    src.directive("#if defined (RATES_TEST) || defined (PROFILER)");
    src.append(concentrations(mech)).blank();
    src.append(write_rates(features)).blank();
    src.append(write_jacob()).blank();
    match mode.backend {
        Backend::Host => src.append(host_harness(features)),
        Backend::Accelerator => src.append(accelerator_harness(features, mode)),
    };
    src.directive("#endif");
    src.finish()
}

fn includes(mode: &BuildMode) -> Source {
    let h = mode.backend.header_ext();
    let mut src = Source::new();
    src.directive("#include <stdio.h>")
        .directive("#include <stdlib.h>")
        .directive("#include \"mass_mole.h\"")
        .directive(format!("#include \"mechanism.{h}\""))
        .directive("#if defined (RATES_TEST) || defined (PROFILER)")
        .line(format!("    #include \"rates.{h}\""))
        .line(format!("    #include \"jacob.{h}\""))
        .line(format!("    #include \"dydt.{h}\""))
        .directive("#endif");
    if mode.backend == Backend::Accelerator {
        src.directive("#include <cuda.h>")
            .directive("#include <cuda_runtime.h>")
            .directive("#include <helper_cuda.h>")
            .directive("#ifdef PROFILER")
            .line("    #include \"cuda_profiler_api.h\"")
            .line("    #include \"cudaProfiler.h\"")
            .directive("#endif")
            .directive("#include \"gpu_macros.cuh\"")
            .directive("#include \"gpu_memory.cuh\"");
    }
    src
}

// ═══════════════════════════════════════════════════════════════════════════════
// Initial Conditions
// ═══════════════════════════════════════════════════════════════════════════════

fn initial_conditions(mech: &Mechanism, mode: &BuildMode, moles: &MoleFractions) -> Source {
    let scalar = scalar_buffer(mode.formulation).host();
    let mut src = Source::new();

    src.open(header::initial_conditions_signature(mode));
    match mode.backend {
        Backend::Host => src.line("int padded = NUM;"),
        Backend::Accelerator => {
            src.line("int padded = initialize_gpu_memory(NUM, block_size, grid_size, host_memory);")
        }
    };
    src.line("double Xi[NSP] = {0.0};")
        .line("double Yi[NSP] = {0.0};");

    if moles.is_empty() {
        src.line("//set initial mole fractions here")
            .blank()
            .line("//Normalize mole fractions to sum to one")
            .line("double Xsum = 0.0;")
            .for_loop("j", "NSP", "Xsum += Xi[j];")
            .open("if (Xsum == 0.0)")
            .line(r#"printf("Use of the set initial conditions function requires user implementation!\n");"#)
            .line("exit(-1);")
            .close()
            .for_loop("j", "NSP", "Xi[j] /= Xsum;")
            .blank()
            .line("//convert to mass fractions")
            .line("mole2mass(Xi, Yi);");
    } else {
        src.line("//initial mole fractions, normalized to sum to one");
        for &k in moles.assigned() {
            src.line(format!(
                "Xi[{k}] = {}; // {}",
                c_double(moles.mole_fractions()[k]),
                mech.species[k].name
            ));
        }
        src.line("//corresponding mass fractions");
        for &k in moles.assigned() {
            src.line(format!("Yi[{k}] = {};", c_double(moles.mass_fractions()[k])));
        }
    }

    src.blank()
        .line("//set initial pressure, units [dyn/cm^2]")
        .line(format!("double P = {};", c_double(ONE_ATM)))
        .line("//set initial temperature, units [K]")
        .line(format!("double T0 = {};", c_double(INITIAL_TEMPERATURE)))
        .blank()
        .line("*y_host = (double*)malloc(padded * NN * sizeof(double));")
        .line(format!("*{scalar} = (double*)malloc(padded * sizeof(double));"))
        .line("//load temperature and mass fractions for all threads (cells)")
        .open("for (int i = 0; i < padded; ++i)")
        .line("(*y_host)[i] = T0;")
        .line("//loop through species")
        .open("for (int j = 1; j < NN; ++j)")
        .line("(*y_host)[i + padded * j] = Yi[j - 1];")
        .close()
        .close()
        .blank();

    let value = match mode.formulation {
        Formulation::ConstantPressure => "P",
        Formulation::ConstantVolume => {
            src.line("//calculate density")
                .line("double rho = getDensity(T0, P, Xi);");
            "rho"
        }
    };
    src.for_loop("i", "padded", format!("(*{scalar})[i] = {value};"));

    if mode.backend == Backend::Accelerator {
        let device = scalar_buffer(mode.formulation);
        src.line(format!(
            "cudaErrorCheck(cudaMemcpy((*host_memory)->y, *y_host, {} * sizeof(double), cudaMemcpyHostToDevice));",
            Y.size.times("padded")
        ))
        .line(format!(
            "cudaErrorCheck(cudaMemcpy((*host_memory)->{}, *{scalar}, {} * sizeof(double), cudaMemcpyHostToDevice));",
            device.name,
            device.size.times("padded")
        ))
        .line("return padded;");
    }
    src.close();
    src
}

// ═══════════════════════════════════════════════════════════════════════════════
// Concentrations and Report Writers
// ═══════════════════════════════════════════════════════════════════════════════

fn concentrations(mech: &Mechanism) -> Source {
    let mut src = Source::new();
    src.open("void get_concentrations(double P, const double* y_host, double* conc_host)")
        .line("double rho;");

    // mixture mean inverse molar mass, wrapped like hand-written C
    let mut lines = Vec::new();
    let mut line = String::from("rho = ");
    for (i, sp) in mech.species.iter().enumerate() {
        if line.len() > WRAP_COLUMN {
            lines.push(std::mem::replace(&mut line, String::from("     ")));
        }
        if i > 0 {
            line.push_str(" + ");
        }
        line.push_str(&format!("(y_host[{}] / {})", i + 1, c_double(sp.molar_mass)));
    }
    line.push(';');
    lines.push(line);
    for line in lines {
        src.line(line);
    }

    src.line(format!("rho = P / ({RU:.8e} * y_host[0] * rho);"))
        .blank()
        .line("// species molar concentrations");
    for (i, sp) in mech.species.iter().enumerate() {
        src.line(format!(
            "conc_host[{i}] = rho * y_host[{}] / {};",
            i + 1,
            c_double(sp.molar_mass)
        ));
    }
    src.close();
    src
}

fn write_rates(features: &FeatureSet) -> Source {
    let report = report_buffers(features);
    let params: Vec<_> = report
        .iter()
        .map(|b| format!("const double* {}", b.host()))
        .collect();

    let mut src = Source::new();
    src.open(format!("void write_rates(FILE* fp, {})", params.join(", ")));
    for buffer in &report {
        write_section(&mut src, buffer);
    }
    src.close();
    src
}

fn write_jacob() -> Source {
    let mut src = Source::new();
    src.open(format!("void write_jacob(FILE* fp, const double* {})", JAC.host()));
    write_section(&mut src, &JAC);
    src.close();
    src
}

fn write_section(src: &mut Source, buffer: &Buffer) {
    src.line(format!(r#"fprintf(fp, "{}\n");"#, buffer.label))
        .for_loop(
            "i",
            buffer.size.symbol(),
            format!(r#"fprintf(fp, "%.15le\n", {}[i]);"#, buffer.host()),
        );
}

fn write_rates_call(features: &FeatureSet) -> String {
    let args: Vec<_> = report_buffers(features).iter().map(Buffer::host).collect();
    format!("write_rates(fp, {});", args.join(", "))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Harnesses
// ═══════════════════════════════════════════════════════════════════════════════

/// `y_host` with equal mass fractions so every reaction is active
fn uniform_state(src: &mut Source) {
    src.line("//set mass fractions to unity to turn on all reactions")
        .line("double y_host[NN] = {0.0};")
        .open("for (int i = 1; i < NN; ++i)")
        .line("y_host[i] = 1.0 / ((double)NSP);")
        .close();
}

fn host_harness(features: &FeatureSet) -> Source {
    let shells = kernels::kernel_shells(features);
    let mut src = Source::new();
    src.open(header::harness_signature(Backend::Host));
    uniform_state(&mut src);
    src.line(format!("double {}[NSP] = {{0.0}};", CONC.host()));
    for buffer in outputs(&shells) {
        src.line(format!(
            "double {}[{}] = {{0.0}};",
            buffer.host(),
            extent(&buffer, features)
        ));
    }
    src.line("//evaluate and write rates for various conditions")
        .line(r#"FILE* fp = fopen("rates_data.txt", "w");"#);

    for point in TEST_POINTS {
        src.open("");
        src.line(format!(r#"fprintf(fp, "{}\n");"#, point.label()))
            .line(format!("y_host[0] = {};", c_double(point.temperature)))
            .line(format!(
                "get_concentrations({}, y_host, conc_host);",
                c_double(point.pressure())
            ));
        for shell in &shells {
            src.line(shell.routine_call("0.0", |s| point.scalar(s), Buffer::host));
            if shell.outputs.contains(&DY) {
                src.line(write_rates_call(features));
            }
        }
        src.line(format!("write_jacob(fp, {});", JAC.host()));
        src.close();
    }

    src.line("fclose(fp);");
    src.close();
    src
}

/// Every wrapper output, in launch order
fn outputs(shells: &[KernelShell]) -> Vec<Buffer> {
    shells
        .iter()
        .flat_map(|s| s.outputs.iter().copied())
        .collect()
}

fn accelerator_harness(features: &FeatureSet, mode: &BuildMode) -> Source {
    let shells = kernels::kernel_shells(features);
    let scalar = scalar_buffer(mode.formulation);
    let mut src = Source::new();

    src.open(header::harness_signature(Backend::Accelerator))
        .line("cudaErrorCheck(cudaSetDevice(0));")
        .directive("#ifdef PROFILER")
        .line("//bump up shared mem bank size")
        .line("cudaErrorCheck(cudaDeviceSetSharedMemConfig(cudaSharedMemBankSizeEightByte));")
        .line("//and L1 size")
        .line("cudaErrorCheck(cudaDeviceSetCacheConfig(cudaFuncCachePreferL1));")
        .directive("#endif")
        .line("gpuMemory* host_memory = NULL;")
        .line("int padded = initialize_gpu_memory(NUM, block_size, grid_size, &host_memory);");

    uniform_state(&mut src);
    let staged: Vec<Buffer> = [Y, CONC, scalar]
        .into_iter()
        .chain(outputs(&shells))
        .collect();
    for buffer in &staged {
        src.line(format!(
            "double* {} = (double*)malloc({} * sizeof(double));",
            buffer.host_full(),
            buffer.size.times("padded")
        ));
    }
    src.for_loop(
        "i",
        "NN",
        "for (int j = 0; j < padded; ++j) y_host_full[j + i * padded] = y_host[i];",
    );
    if mode.formulation == Formulation::ConstantVolume {
        src.line("double Xi[NSP] = {0.0};")
            .line("mass2mole(&y_host[1], Xi);");
    }
    src.line(format!("double {}[NSP] = {{0.0}};", CONC.host()));
    for buffer in outputs(&shells) {
        src.line(format!(
            "double {}[{}] = {{0.0}};",
            buffer.host(),
            extent(&buffer, features)
        ));
    }
    src.line("//evaluate and write rates for various conditions")
        .line(r#"FILE* fp = fopen("rates_data.txt", "w");"#);

    for point in TEST_POINTS {
        src.open("");
        src.append(accelerator_point(&shells, features, mode, point));
        src.close();
    }

    src.line("fclose(fp);");
    for buffer in &staged {
        src.line(format!("free({});", buffer.host_full()));
    }
    src.line("free_gpu_memory(&host_memory);")
        .line("cudaErrorCheck(cudaDeviceReset());");
    src.close();
    src
}

fn accelerator_point(
    shells: &[KernelShell],
    features: &FeatureSet,
    mode: &BuildMode,
    point: TestPoint,
) -> Source {
    let scalar = scalar_buffer(mode.formulation);
    let temperature = c_double(point.temperature);
    let pressure = c_double(point.pressure());
    let mut src = Source::new();

    src.line(format!(r#"fprintf(fp, "{}\n");"#, point.label()))
        .line(format!("y_host[0] = {temperature};"))
        .line(format!("get_concentrations({pressure}, y_host, conc_host);"));
    let cell_scalar = match mode.formulation {
        Formulation::ConstantPressure => pressure.clone(),
        Formulation::ConstantVolume => {
            src.line(format!("double rho = getDensity({temperature}, {pressure}, Xi);"));
            "rho".to_string()
        }
    };
    src.open("for (int i = 0; i < padded; ++i)")
        .for_loop("j", "NSP", "conc_host_full[i + j * padded] = conc_host[j];")
        .line(format!("y_host_full[i] = {temperature};"))
        .line(format!("{}[i] = {cell_scalar};", scalar.host_full()))
        .close();
    for buffer in [CONC, Y, scalar] {
        src.line(copy_to_device(&buffer));
    }

    let launch_arg = |param: &Param| match param {
        Param::Num => "padded".to_string(),
        Param::Time => "0.0".to_string(),
        Param::Scalar(name) => point.scalar(name),
        Param::Input(b) | Param::Output(b) => format!("host_memory->{}", b.name),
    };
    let (profiling, testing) = if mode.is_global() {
        (Body::Global, Body::Global)
    } else {
        (Body::Profiling, Body::CorrectnessTest)
    };

    for shell in shells {
        src.directive("#ifdef PROFILER")
            .line("cuProfilerStart();")
            .line(shell.launch(profiling, &launch_arg))
            .line("cuProfilerStop();")
            .directive("#elif defined(RATES_TEST)")
            .line(shell.launch(testing, &launch_arg));
        for output in &shell.outputs {
            src.line(copy_to_host(output)).for_loop(
                "j",
                output.size.symbol(),
                format!("{}[j] = {}[j * padded];", output.host(), output.host_full()),
            );
        }
        src.directive("#endif");
    }

    src.directive("#ifdef RATES_TEST")
        .line(write_rates_call(features))
        .line(format!("write_jacob(fp, {});", JAC.host()))
        .directive("#endif");
    src
}

fn copy_to_device(buffer: &Buffer) -> String {
    format!(
        "cudaErrorCheck(cudaMemcpy(host_memory->{}, {}, {} * sizeof(double), cudaMemcpyHostToDevice));",
        buffer.name,
        buffer.host_full(),
        buffer.size.times("padded")
    )
}

fn copy_to_host(buffer: &Buffer) -> String {
    format!(
        "cudaErrorCheck(cudaMemcpy({}, host_memory->{}, {} * sizeof(double), cudaMemcpyDeviceToHost));",
        buffer.host_full(),
        buffer.name,
        buffer.size.times("padded")
    )
}
