//! Every host variant against the reference kernel.

use commutator_bench::backend::DirectBackend;
use commutator_bench::bench::{initial_hamiltonian, initial_sigma, BenchConfig, Harness};
use commutator_bench::core::{commutator_reference, compare_batches, max_magnitude, relative_tolerance};
use commutator_bench::kernels::{KernelArgs, Seed, Variant};
use commutator_bench::transform::{scale_batch, transform_scale, transform_to_canonical};
use commutator_bench::types::{Complex, Hamiltonian, Real, SigmaBatch};
use commutator_bench::Error;
use proptest::prelude::*;

/// Apply `variant`'s plan, run it `runs` times, return canonical output.
fn run_variant(
    variant: Variant,
    hamiltonian: &Hamiltonian,
    sigma_in: &SigmaBatch,
    vec_len: usize,
    factor: Real,
    seed: Seed,
    runs: usize,
) -> Result<SigmaBatch, Error> {
    let plan = variant.plan();
    let mut h = hamiltonian.clone();
    plan.prepare_hamiltonian(&mut h, factor)?;
    let mut s_in = sigma_in.clone();
    plan.sigma.apply(&mut s_in, vec_len)?;
    let mut s_out = SigmaBatch::zeros(sigma_in.dim(), sigma_in.num());
    plan.sigma.apply(&mut s_out, vec_len)?;

    for _ in 0..runs {
        let args = KernelArgs {
            sigma_in: &s_in,
            sigma_out: &mut s_out,
            hamiltonian: &h,
            hbar: 0.0,
            dt: 0.0,
        };
        variant.run(seed, args)?;
    }
    transform_to_canonical(&mut s_out)?;
    Ok(s_out)
}

fn reference(hamiltonian: &Hamiltonian, sigma_in: &SigmaBatch, runs: usize) -> SigmaBatch {
    let mut out = SigmaBatch::zeros(sigma_in.dim(), sigma_in.num());
    for _ in 0..runs {
        commutator_reference(sigma_in, &mut out, hamiltonian, 1.0, 1.0).unwrap();
    }
    out
}

/// Relative deviation of every variant from the reference.
fn check_all_variants(dim: usize, num: usize, vec_len: usize, seed: Seed) {
    let factor = 0.25;
    let h = initial_hamiltonian(dim, 3);
    let (s_in, _) = initial_sigma(dim, num, 3);
    let expected = reference(&h, &s_in, 2);
    let mut expected_scaled = expected.clone();
    scale_batch(&mut expected_scaled, factor);
    assert!(max_magnitude(&expected) > 0.0);
    let bound = relative_tolerance(dim) * max_magnitude(&expected).max(1.0);

    for &variant in Variant::ALL {
        if variant == Variant::Empty {
            continue;
        }
        let out = run_variant(variant, &h, &s_in, vec_len, factor, seed, 2)
            .unwrap_or_else(|e| panic!("{variant}: {e}"));
        let target = if variant.plan().scale_hamiltonian {
            &expected_scaled
        } else {
            &expected
        };
        let deviation = compare_batches(&out, target).unwrap();
        assert!(
            deviation <= bound,
            "{variant} deviates by {deviation:e} (dim={dim}, num={num}, vec_len={vec_len})"
        );
    }
}

#[test]
fn test_small_configuration() {
    check_all_variants(2, 16, 4, Seed::FromOutput);
}

#[test]
fn test_larger_configuration() {
    check_all_variants(5, 64, 8, Seed::FromOutput);
}

#[test]
fn test_odd_dim_with_partial_fused_groups() {
    // 12 packages of 2: fused groups of 4 packages are full, lane chunks of
    // 5 are not
    check_all_variants(7, 24, 2, Seed::FromOutput);
}

#[test]
fn test_scalar_packages() {
    check_all_variants(3, 6, 1, Seed::FromOutput);
}

#[test]
fn test_init_zero_matches_default() {
    check_all_variants(4, 32, 4, Seed::Zero);
}

#[test]
fn test_hand_computed_scenario() {
    // H = diag(1, 2) gives [H, σ]_ij = (h_i − h_j)·σ_ij
    let dim = 2;
    let num = 4;
    let mut h = Hamiltonian::zeros(dim);
    h.set(0, 0, Complex::new(1.0, 0.0));
    h.set(1, 1, Complex::new(2.0, 0.0));

    let entry = |p: usize, i: usize, j: usize| Complex::new((4 * p + 2 * i + j) as Real, p as Real);
    let mut s_in = SigmaBatch::zeros(dim, num);
    for p in 0..num {
        for i in 0..dim {
            for j in 0..dim {
                s_in.set(p, i, j, entry(p, i, j));
            }
        }
    }

    let mut expected = SigmaBatch::zeros(dim, num);
    for p in 0..num {
        expected.set(p, 0, 1, -entry(p, 0, 1));
        expected.set(p, 1, 0, entry(p, 1, 0));
    }

    let got = reference(&h, &s_in, 1);
    assert_eq!(compare_batches(&got, &expected).unwrap(), 0.0);

    for &variant in Variant::ALL {
        if variant == Variant::Empty {
            continue;
        }
        let out = run_variant(variant, &h, &s_in, 2, 1.0, Seed::FromOutput, 1).unwrap();
        let deviation = compare_batches(&out, &expected).unwrap();
        // small integers: every kernel is exact
        assert_eq!(deviation, 0.0, "{variant}");
    }
}

#[test]
fn test_empty_variant_leaves_output_untouched() {
    let h = initial_hamiltonian(3, 1);
    let (s_in, _) = initial_sigma(3, 8, 1);
    let (prefilled, _) = initial_sigma(3, 8, 2);
    let mut s_out = prefilled.clone();

    let args = KernelArgs {
        sigma_in: &s_in,
        sigma_out: &mut s_out,
        hamiltonian: &h,
        hbar: 0.0,
        dt: 0.0,
    };
    Variant::Empty.run(Seed::FromOutput, args).unwrap();
    assert_eq!(s_out, prefilled);
}

#[test]
fn test_pre_scaling_is_linear() {
    let dim = 4;
    let a = 0.37;
    let h = initial_hamiltonian(dim, 9);
    let (s_in, _) = initial_sigma(dim, 8, 9);

    let mut scaled_h = h.clone();
    transform_scale(&mut scaled_h, a);
    let from_scaled_h = reference(&scaled_h, &s_in, 1);

    let mut scaled_result = reference(&h, &s_in, 1);
    scale_batch(&mut scaled_result, a);

    let deviation = compare_batches(&from_scaled_h, &scaled_result).unwrap();
    assert!(deviation <= relative_tolerance(dim) * max_magnitude(&scaled_result).max(1.0));
}

#[test]
fn test_constant_extents_are_never_substituted() {
    let dim = 9;
    let h = initial_hamiltonian(dim, 0);
    let (s_in, _) = initial_sigma(dim, 4, 0);

    let err = run_variant(Variant::AosoaConstants, &h, &s_in, 4, 1.0, Seed::FromOutput, 1);
    assert!(matches!(err, Err(Error::UnsupportedExtents { dim: 9, vec_len: 4 })));

    // runtime-extent kernels have no such limit
    run_variant(Variant::Aosoa, &h, &s_in, 4, 1.0, Seed::FromOutput, 1).unwrap();
    run_variant(Variant::ManualAosoa, &h, &s_in, 4, 1.0, Seed::FromOutput, 1).unwrap();
}

#[test]
fn test_harness_reports_every_variant() {
    let config = BenchConfig::new()
        .with_dim(3)
        .with_num(16)
        .with_vec_len(4)
        .with_runs(4, 1);
    let mut harness = Harness::new(config, DirectBackend::default()).unwrap();
    let reports = harness.run_all(Variant::ALL, |_| Ok(())).unwrap();

    assert_eq!(reports.len(), Variant::ALL.len() + 1);
    let bound = relative_tolerance(3) * max_magnitude(harness.reference().unwrap()).max(1.0);
    for report in &reports {
        assert_eq!(report.statistics.count, 3, "{}", report.name);
        let deviation = report.deviation.unwrap();
        if report.name == "commutator_empty" {
            assert!(deviation > 0.0);
        } else {
            assert!(deviation <= bound, "{}: {deviation:e}", report.name);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_variants_match_reference(
        dim in 1usize..=6,
        packages in 1usize..=5,
        vec_len in prop::sample::select(vec![1usize, 2, 4, 8]),
        seed in any::<u64>(),
    ) {
        let num = packages * vec_len;
        let h = initial_hamiltonian(dim, seed);
        let (s_in, _) = initial_sigma(dim, num, seed);
        let expected = reference(&h, &s_in, 1);
        let bound = relative_tolerance(dim) * max_magnitude(&expected).max(1.0);

        for &variant in Variant::ALL {
            if variant == Variant::Empty {
                continue;
            }
            let out = run_variant(variant, &h, &s_in, vec_len, 1.0, Seed::FromOutput, 1).unwrap();
            let deviation = compare_batches(&out, &expected).unwrap();
            prop_assert!(deviation <= bound, "{} deviates by {:e}", variant, deviation);
        }
    }
}
