//! Integration tests for mechanism loading and source generation
//!
//! These tests drive the public API from mechanism JSON to the artifact set
//! on disk.

use std::collections::BTreeSet;

use approx::assert_relative_eq;
use mechgen::prelude::*;
use mechgen::{generate, load_mechanism, ArtifactKind, CodegenError, MechanismError};

const SPECIES: &str = r#"[
    {"name": "H2", "molarMass": 2.016},
    {"name": "O2", "molarMass": 31.998},
    {"name": "H2O", "molarMass": 18.015},
    {"name": "OH", "molarMass": 17.007},
    {"name": "H", "molarMass": 1.008},
    {"name": "O", "molarMass": 15.999},
    {"name": "HO2", "molarMass": 33.006},
    {"name": "H2O2", "molarMass": 34.014},
    {"name": "N2", "molarMass": 28.014},
    {"name": "AR", "molarMass": 39.948}
]"#;

fn mechanism(reactions: &str) -> String {
    format!(r#"{{"name": "h2o2", "species": {SPECIES}, "reactions": {reactions}}}"#)
}

fn irreversible() -> String {
    mechanism("[{}, {}, {}, {}, {}]")
}

fn mixed() -> String {
    mechanism(
        r#"[
        {"reversible": true},
        {"reversible": true},
        {"pressureDependent": true},
        {},
        {}
    ]"#,
    )
}

fn contents<'a>(set: &'a ArtifactSet, name: &str) -> &'a str {
    &set.get(name)
        .unwrap_or_else(|| panic!("missing {name}"))
        .contents
}

/// `#define NAME value` lines of a header
fn defines(header: &str) -> Vec<(String, String)> {
    header
        .lines()
        .filter_map(|l| l.strip_prefix("#define "))
        .filter_map(|l| l.split_once(' '))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn define(header: &str, name: &str) -> Option<usize> {
    defines(header)
        .into_iter()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse().ok())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Header Constants
// ═══════════════════════════════════════════════════════════════════════════════

mod header_constants {
    use super::*;

    #[test]
    fn test_irreversible_scenario() {
        let set = generate(&irreversible(), &BuildMode::accelerator(), None).unwrap();
        let header = contents(&set, "mechanism.cuh");

        assert_eq!(define(header, "NSP"), Some(10));
        assert_eq!(define(header, "NN"), Some(11));
        assert_eq!(define(header, "RATES"), Some(5));
        assert_eq!(define(header, "FWD_RATES"), None);
        assert_eq!(define(header, "REV_RATES"), None);
        assert_eq!(define(header, "PRES_MOD_RATES"), None);

        let kernels = contents(&set, "mechanism.cu");
        assert!(kernels.contains("double* rates)"));
        assert!(!kernels.contains("fwd_rates"));
    }

    #[test]
    fn test_reversible_pressure_dependent_scenario() {
        let set = generate(&mixed(), &BuildMode::accelerator(), None).unwrap();
        let header = contents(&set, "mechanism.cuh");

        assert_eq!(define(header, "FWD_RATES"), Some(5));
        assert_eq!(define(header, "REV_RATES"), Some(2));
        assert_eq!(define(header, "PRES_MOD_RATES"), Some(1));
        assert_eq!(define(header, "RATES"), None);

        let memory = contents(&set, "gpu_memory.cuh");
        for field in ["fwd_rates", "rev_rates", "pres_mod"] {
            assert!(memory.contains(&format!("double* {field};")), "{field}");
        }
        let kernels = contents(&set, "mechanism.cu");
        assert!(kernels.contains(
            "__global__ void k_eval_spec_rates(const int NUM, const double* fwd_rates, const double* rev_rates, const double* pres_mod, double* spec_rates)"
        ));
    }

    #[test]
    fn test_state_size_tracks_species() {
        for n in [1, 3, 53] {
            let species: Vec<_> = (0..n)
                .map(|i| format!(r#"{{"name": "S{i}", "molarMass": 12.0}}"#))
                .collect();
            let json = format!(r#"{{"species": [{}]}}"#, species.join(","));
            let set = generate(&json, &BuildMode::host(), None).unwrap();
            let header = contents(&set, "mechanism.h");
            assert_eq!(define(header, "NSP"), Some(n));
            assert_eq!(define(header, "NN"), Some(n + 1));
        }
    }

    #[test]
    fn test_zero_reactions_still_type_check() {
        let json = mechanism("[]");

        let set = generate(&json, &BuildMode::host(), None).unwrap();
        assert_eq!(define(contents(&set, "mechanism.h"), "RATES"), Some(0));
        let c = contents(&set, "mechanism.c");
        assert!(c.contains("double rates_host[1] = {0.0};"));
        assert!(c.contains("for (int i = 0; i < RATES; ++i) {"));

        let set = generate(&json, &BuildMode::accelerator(), None).unwrap();
        assert!(contents(&set, "mechanism.cuh").contains("#define RATES 0\n"));
        let cu = contents(&set, "mechanism.cu");
        assert!(cu.contains("double rates_local[1] = {0.0};"));
        assert!(cu.contains("double rates_host[1] = {0.0};"));
        assert!(!cu.contains("[RATES]"));
        assert!(!cu.contains("[0 ... RATES - 1]"));
        assert!(contents(&set, "gpu_memory.cu").contains("(*host_memory)->rates), padded * RATES);"));
    }

    #[test]
    fn test_third_body_counts_as_pressure_modified() {
        let json = mechanism(r#"[{"thirdBody": true}, {"thirdBody": true, "pressureDependent": true}, {}]"#);
        let set = generate(&json, &BuildMode::host(), None).unwrap();
        assert_eq!(define(contents(&set, "mechanism.h"), "PRES_MOD_RATES"), Some(2));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Cross-Artifact Consistency
// ═══════════════════════════════════════════════════════════════════════════════

mod consistency {
    use super::*;

    const SIZE_SYMBOLS: [&str; 6] = ["NSP", "NN", "RATES", "FWD_RATES", "REV_RATES", "PRES_MOD_RATES"];

    /// Size constants referenced by loop bounds and allocation sizes
    fn referenced(text: &str) -> BTreeSet<String> {
        text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|tok| SIZE_SYMBOLS.contains(tok))
            .map(str::to_string)
            .collect()
    }

    fn modes() -> Vec<BuildMode> {
        let mut modes = vec![BuildMode::host()];
        for layout in [MemoryLayout::PerThread, MemoryLayout::Global] {
            for formulation in [Formulation::ConstantPressure, Formulation::ConstantVolume] {
                modes.push(
                    BuildMode::accelerator()
                        .with_memory_layout(layout)
                        .with_formulation(formulation),
                );
            }
        }
        modes
    }

    #[test]
    fn test_every_size_constant_is_defined() {
        for json in [irreversible(), mixed()] {
            for mode in modes() {
                let set = generate(&json, &mode, None).unwrap();
                let header = contents(&set, &format!("mechanism.{}", mode.backend.header_ext()));
                let defined: BTreeSet<_> = defines(header).into_iter().map(|(k, _)| k).collect();

                for artifact in &set {
                    for symbol in referenced(&artifact.contents) {
                        assert!(
                            defined.contains(&symbol),
                            "{symbol} used in {} but not defined ({mode:?})",
                            artifact.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_launches_match_wrapper_arity() {
        let set = generate(&mixed(), &BuildMode::accelerator(), None).unwrap();
        let cu = contents(&set, "mechanism.cu");

        for line in cu.lines().map(str::trim) {
            let Some((name, rest)) = line.split_once("<<<grid_size, block_size>>>(") else {
                continue;
            };
            let args = rest.trim_end_matches(");").split(", ").count();
            let declared: Vec<_> = cu
                .lines()
                .filter_map(|l| l.strip_prefix(&format!("__global__ void {name}(")))
                .map(|l| l.trim_end_matches(") {").split(", ").count())
                .collect();
            assert!(
                declared.contains(&args),
                "{name} launched with {args} arguments, declared {declared:?}"
            );
        }
    }

    #[test]
    fn test_memory_descriptor_covers_kernel_buffers() {
        let mode = BuildMode::accelerator().with_memory_layout(MemoryLayout::Global);
        let set = generate(&mixed(), &mode, None).unwrap();
        let memory = contents(&set, "gpu_memory.cuh");
        let cu = contents(&set, "mechanism.cu");

        let used: BTreeSet<_> = cu
            .match_indices("memory_pointers.")
            .map(|(i, m)| {
                cu[i + m.len()..]
                    .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .next()
                    .unwrap_or_default()
            })
            .collect();
        assert!(used.contains("spec_rates"));
        for field in used {
            assert!(memory.contains(&format!("double* {field};")), "{field}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Determinism
// ═══════════════════════════════════════════════════════════════════════════════

mod determinism {
    use super::*;

    #[test]
    fn test_identical_inputs_give_identical_artifacts() {
        let mode = BuildMode::accelerator().with_memory_layout(MemoryLayout::Global);
        let first = generate(&mixed(), &mode, Some("H2=2.0,O2=1.0")).unwrap();
        let second = generate(&mixed(), &mode, Some("H2=2.0,O2=1.0")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_artifact_kinds() {
        let set = generate(&irreversible(), &BuildMode::accelerator(), None).unwrap();
        let headers: Vec<_> = set
            .iter()
            .filter(|a| a.kind == ArtifactKind::Header)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(headers, vec!["mechanism.cuh", "gpu_memory.cuh", "gpu_macros.cuh"]);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Mole Fractions
// ═══════════════════════════════════════════════════════════════════════════════

mod mole_fractions {
    use super::*;

    #[test]
    fn test_normalized_overrides() {
        let mech = load_mechanism(&irreversible()).unwrap();
        let moles = MoleFractions::parse(mech.inner(), "H2=1.0,N2=3.0").unwrap();

        assert_relative_eq!(moles.mole_fractions()[0], 0.25);
        assert_relative_eq!(moles.mole_fractions()[8], 0.75);
        assert_relative_eq!(moles.mole_fractions().iter().sum::<f64>(), 1.0);
        assert_relative_eq!(moles.mass_fractions().iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        let set = generate(&irreversible(), &BuildMode::host(), Some("H2=1.0,N2=3.0")).unwrap();
        let c = contents(&set, "mechanism.c");
        assert!(c.contains("Xi[0] = 0.25; // H2"));
        assert!(c.contains("Xi[8] = 0.75; // N2"));
    }

    #[test]
    fn test_mechanism_initial_moles_are_used() {
        let json = format!(
            r#"{{"species": {SPECIES}, "initialMoles": {{"O2": 1.0, "AR": 1.0}}}}"#
        );
        let set = generate(&json, &BuildMode::host(), None).unwrap();
        let c = contents(&set, "mechanism.c");
        assert!(c.contains("Xi[1] = 0.5; // O2"));
        assert!(c.contains("Xi[9] = 0.5; // AR"));

        let set = generate(&json, &BuildMode::host(), Some("N2=1")).unwrap();
        let c = contents(&set, "mechanism.c");
        assert!(c.contains("Xi[8] = 1.0; // N2"));
        assert!(!c.contains("// O2"));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let err = generate(&irreversible(), &BuildMode::host(), Some("H2=0.5,O2=undefined"))
            .unwrap_err();
        assert!(matches!(
            err,
            MechGenError::Mechanism(MechanismError::InvalidMoleValue { .. })
        ));
        assert!(err.to_string().contains("O2=undefined"));
    }

    #[test]
    fn test_huge_amounts_stay_finite() {
        let set = generate(&irreversible(), &BuildMode::host(), Some("H2=1e308,N2=1e308")).unwrap();
        let c = contents(&set, "mechanism.c");
        assert!(c.contains("Xi[0] = 0.5; // H2"));
        assert!(c.contains("Xi[8] = 0.5; // N2"));
        for line in c.lines().filter(|l| l.trim_start().starts_with("Yi[")) {
            assert!(!line.contains("NaN") && !line.contains("inf"), "{line}");
        }
    }

    #[test]
    fn test_zero_sum_rejected() {
        let err = generate(&irreversible(), &BuildMode::host(), Some("H2=0,N2=0.0")).unwrap_err();
        assert!(matches!(
            err,
            MechGenError::Mechanism(MechanismError::ZeroMoleSum)
        ));
    }

    #[test]
    fn test_unknown_species_rejected() {
        let err = generate(&irreversible(), &BuildMode::host(), Some("XE=1.0")).unwrap_err();
        assert!(matches!(
            err,
            MechGenError::Mechanism(MechanismError::UnknownSpecies { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors and Persistence
// ═══════════════════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn test_unsupported_backend() {
        let err = "fortran".parse::<Backend>().unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedBackend(ref b) if b == "fortran"));

        let err = BuildMode::from_json(r#"{"backend": "matlab"}"#).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidBuildMode(_)));
    }

    #[test]
    fn test_write_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let set = generate(&mixed(), &BuildMode::accelerator(), None).unwrap();
        let written = set.write_to(dir.path()).unwrap();

        assert_eq!(written.len(), 5);
        for artifact in &set {
            let on_disk = std::fs::read_to_string(dir.path().join(&artifact.name)).unwrap();
            assert_eq!(on_disk, artifact.contents);
        }
    }

    #[test]
    fn test_nothing_written_on_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate(&irreversible(), &BuildMode::host(), Some("H2==1"))
            .map(|set| set.write_to(dir.path()));

        assert!(matches!(
            result,
            Err(MechGenError::Mechanism(MechanismError::MalformedOverride { .. }))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_species_names_must_be_comment_safe() {
        let json = r#"{"species": [{"name": "A*/x", "molarMass": 2.0}]}"#;
        assert!(matches!(
            load_mechanism(json),
            Err(MechGenError::Mechanism(MechanismError::InvalidSpeciesName { .. }))
        ));

        let json = r#"{"name": "h2\nint x;", "species": [{"name": "H2", "molarMass": 2.0}]}"#;
        assert!(matches!(
            load_mechanism(json),
            Err(MechGenError::Mechanism(MechanismError::InvalidMechanismName { .. }))
        ));
    }

    #[test]
    fn test_harness_is_optional() {
        for mode in [BuildMode::host(), BuildMode::accelerator()] {
            let set = generate(&mixed(), &mode, None).unwrap();
            let header = contents(&set, &format!("mechanism.{}", mode.backend.header_ext()));
            assert!(!header.contains("#define RATES_TEST"));
            assert!(!header.contains("#define PROFILER"));
        }
    }

    #[test]
    fn test_invalid_mechanism_rejected() {
        let json = r#"{"species": [{"name": "H2", "molarMass": 2.016}, {"name": "H2", "molarMass": 2.016}]}"#;
        assert!(matches!(
            load_mechanism(json),
            Err(MechGenError::Mechanism(MechanismError::DuplicateSpecies { .. }))
        ));
        assert!(matches!(
            load_mechanism("{"),
            Err(MechGenError::Mechanism(MechanismError::Parse(_)))
        ));
    }
}
