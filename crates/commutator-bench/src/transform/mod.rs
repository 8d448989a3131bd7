//! Layout transforms and Hamiltonian pre-scaling.
//!
//! The layout transforms are pure permutations of a whole buffer: applying a
//! transform and then its inverse reproduces the input bit for bit. They are
//! exposed both as free functions and as [`SigmaTransform`] /
//! [`HamiltonianTransform`] objects, so a kernel descriptor can name "no
//! transform" through the same call signature as a real one.

use crate::error::Result;
use crate::types::{check_packaging, BatchLayout, Hamiltonian, HamiltonianLayout, Real, SigmaBatch};

/// Convert an AoS batch to AoSoA with packages of `vec_len` matrices.
///
/// Fails if the batch is not AoS or `num` is not a multiple of `vec_len`.
pub fn transform_aos_to_aosoa(batch: &mut SigmaBatch, vec_len: usize) -> Result<()> {
    batch.expect_layout(BatchLayout::Aos)?;
    check_packaging(batch.num(), vec_len)?;

    let target = BatchLayout::Aosoa { vec_len };
    let permuted = permute(batch, BatchLayout::Aos, target);
    batch.replace_storage(permuted, target);
    Ok(())
}

/// Convert an AoSoA batch back to AoS.
pub fn transform_aosoa_to_aos(batch: &mut SigmaBatch) -> Result<()> {
    let source = batch.layout();
    if source == BatchLayout::Aos {
        return Err(crate::Error::Shape(
            "batch is already in aos layout".to_string(),
        ));
    }
    let permuted = permute(batch, source, BatchLayout::Aos);
    batch.replace_storage(permuted, BatchLayout::Aos);
    Ok(())
}

/// Bring a batch of any layout into canonical AoS; no-op if already AoS.
pub fn transform_to_canonical(batch: &mut SigmaBatch) -> Result<()> {
    match batch.layout() {
        BatchLayout::Aos => Ok(()),
        BatchLayout::Aosoa { .. } => transform_aosoa_to_aos(batch),
    }
}

fn permute(batch: &SigmaBatch, from: BatchLayout, to: BatchLayout) -> Vec<Real> {
    let dim = batch.dim();
    let src = batch.as_slice();
    let mut dst = vec![0.0; src.len()];
    for p in 0..batch.num() {
        for i in 0..dim {
            for j in 0..dim {
                dst[to.real(dim, p, i, j)] = src[from.real(dim, p, i, j)];
                dst[to.imag(dim, p, i, j)] = src[from.imag(dim, p, i, j)];
            }
        }
    }
    dst
}

/// Split an interleaved Hamiltonian into a real and an imaginary plane.
pub fn transform_hamiltonian_aos_to_soa(hamiltonian: &mut Hamiltonian) -> Result<()> {
    hamiltonian.expect_layout(HamiltonianLayout::Interleaved)?;
    let planar = relayout(hamiltonian, HamiltonianLayout::Planar);
    hamiltonian.replace_storage(planar, HamiltonianLayout::Planar);
    Ok(())
}

/// Interleave a planar Hamiltonian again.
pub fn transform_hamiltonian_soa_to_aos(hamiltonian: &mut Hamiltonian) -> Result<()> {
    hamiltonian.expect_layout(HamiltonianLayout::Planar)?;
    let interleaved = relayout(hamiltonian, HamiltonianLayout::Interleaved);
    hamiltonian.replace_storage(interleaved, HamiltonianLayout::Interleaved);
    Ok(())
}

fn relayout(hamiltonian: &Hamiltonian, to: HamiltonianLayout) -> Vec<Real> {
    let dim = hamiltonian.dim();
    let from = hamiltonian.layout();
    let src = hamiltonian.as_slice();
    let mut dst = vec![0.0; src.len()];
    for i in 0..dim {
        for j in 0..dim {
            dst[to.real(dim, i, j)] = src[from.real(dim, i, j)];
            dst[to.imag(dim, i, j)] = src[from.imag(dim, i, j)];
        }
    }
    dst
}

/// Multiply every entry of the Hamiltonian by `factor`, in place.
///
/// Used to bake `dt / hbar` into the matrix so kernel inner loops skip the
/// per-element multiply. Layout independent.
pub fn transform_scale(hamiltonian: &mut Hamiltonian, factor: Real) {
    hamiltonian.as_mut_slice().iter_mut().for_each(|x| *x *= factor);
}

/// Multiply every entry of a batch by `factor`, in place.
///
/// The commutator is linear in `H`, so a reference computed with `H` maps to
/// the result for `factor · H` through this scaling.
pub fn scale_batch(batch: &mut SigmaBatch, factor: Real) {
    batch.as_mut_slice().iter_mut().for_each(|x| *x *= factor);
}

// ============================================================================
// Transform objects
// ============================================================================

/// A layout change applied to a sigma batch.
pub trait SigmaTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply to `batch`, packaging `vec_len` matrices where relevant.
    fn apply(&self, batch: &mut SigmaBatch, vec_len: usize) -> Result<()>;

    /// Layout a canonical batch ends up in.
    fn target_layout(&self, vec_len: usize) -> BatchLayout;
}

/// A layout change applied to the Hamiltonian.
pub trait HamiltonianTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply to `hamiltonian`.
    fn apply(&self, hamiltonian: &mut Hamiltonian) -> Result<()>;

    /// Layout an interleaved Hamiltonian ends up in.
    fn target_layout(&self) -> HamiltonianLayout;
}

/// Identity transform, valid for both batches and Hamiltonians.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransform;

impl SigmaTransform for NoTransform {
    fn name(&self) -> &'static str {
        "none"
    }

    fn apply(&self, _batch: &mut SigmaBatch, _vec_len: usize) -> Result<()> {
        Ok(())
    }

    fn target_layout(&self, _vec_len: usize) -> BatchLayout {
        BatchLayout::Aos
    }
}

impl HamiltonianTransform for NoTransform {
    fn name(&self) -> &'static str {
        "none"
    }

    fn apply(&self, _hamiltonian: &mut Hamiltonian) -> Result<()> {
        Ok(())
    }

    fn target_layout(&self) -> HamiltonianLayout {
        HamiltonianLayout::Interleaved
    }
}

/// [`transform_aos_to_aosoa`] as an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AosToAosoa;

impl SigmaTransform for AosToAosoa {
    fn name(&self) -> &'static str {
        "aos_to_aosoa"
    }

    fn apply(&self, batch: &mut SigmaBatch, vec_len: usize) -> Result<()> {
        transform_aos_to_aosoa(batch, vec_len)
    }

    fn target_layout(&self, vec_len: usize) -> BatchLayout {
        BatchLayout::Aosoa { vec_len }
    }
}

/// [`transform_hamiltonian_aos_to_soa`] as an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AosToSoa;

impl HamiltonianTransform for AosToSoa {
    fn name(&self) -> &'static str {
        "aos_to_soa"
    }

    fn apply(&self, hamiltonian: &mut Hamiltonian) -> Result<()> {
        transform_hamiltonian_aos_to_soa(hamiltonian)
    }

    fn target_layout(&self) -> HamiltonianLayout {
        HamiltonianLayout::Planar
    }
}

/// Transforms a kernel expects on its inputs.
#[derive(Clone, Copy)]
pub struct TransformPlan {
    /// Applied to `sigma_in` and to the reference copy.
    pub sigma: &'static dyn SigmaTransform,
    /// Applied to the Hamiltonian after the optional scale.
    pub hamiltonian: &'static dyn HamiltonianTransform,
    /// Pre-scale the Hamiltonian by `dt / hbar`.
    pub scale_hamiltonian: bool,
}

impl TransformPlan {
    /// Canonical layouts, unscaled Hamiltonian.
    pub const IDENTITY: TransformPlan = TransformPlan {
        sigma: &NoTransform,
        hamiltonian: &NoTransform,
        scale_hamiltonian: false,
    };

    /// Canonical layouts, pre-scaled Hamiltonian.
    pub const SCALED: TransformPlan = TransformPlan {
        sigma: &NoTransform,
        hamiltonian: &NoTransform,
        scale_hamiltonian: true,
    };

    /// AoSoA batch, planar pre-scaled Hamiltonian.
    pub const AOSOA: TransformPlan = TransformPlan {
        sigma: &AosToAosoa,
        hamiltonian: &AosToSoa,
        scale_hamiltonian: true,
    };

    /// Apply the Hamiltonian half of the plan.
    pub fn prepare_hamiltonian(&self, hamiltonian: &mut Hamiltonian, factor: Real) -> Result<()> {
        if self.scale_hamiltonian {
            transform_scale(hamiltonian, factor);
        }
        self.hamiltonian.apply(hamiltonian)
    }
}

impl std::fmt::Debug for TransformPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPlan")
            .field("sigma", &self.sigma.name())
            .field("hamiltonian", &self.hamiltonian.name())
            .field("scale_hamiltonian", &self.scale_hamiltonian)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Complex;
    use proptest::prelude::*;

    fn numbered_batch(dim: usize, num: usize) -> SigmaBatch {
        let entries: Vec<Complex> = (0..dim * dim * num)
            .map(|x| Complex::new(x as Real, 0.5 + x as Real))
            .collect();
        SigmaBatch::from_complex(&entries, dim, num).unwrap()
    }

    #[test]
    fn test_aos_to_aosoa_places_lanes_contiguously() {
        let mut batch = numbered_batch(2, 4);
        transform_aos_to_aosoa(&mut batch, 4).unwrap();

        assert_eq!(batch.layout(), BatchLayout::Aosoa { vec_len: 4 });
        // entry (0,0) of matrices 0..4: reals then imaginaries
        let s = batch.as_slice();
        assert_eq!(&s[0..4], &[0.0, 4.0, 8.0, 12.0]);
        assert_eq!(&s[4..8], &[0.5, 4.5, 8.5, 12.5]);
        // logical access is unchanged
        assert_eq!(batch.get(2, 1, 1), Complex::new(11.0, 11.5));
    }

    #[test]
    fn test_aos_to_aosoa_rejects_partial_package() {
        let mut batch = numbered_batch(2, 6);
        assert!(transform_aos_to_aosoa(&mut batch, 4).is_err());
        // unchanged on failure
        assert_eq!(batch.layout(), BatchLayout::Aos);
    }

    #[test]
    fn test_aos_to_aosoa_rejects_non_aos_input() {
        let mut batch = numbered_batch(2, 4);
        transform_aos_to_aosoa(&mut batch, 2).unwrap();
        assert!(transform_aos_to_aosoa(&mut batch, 2).is_err());
    }

    #[test]
    fn test_aosoa_to_aos_rejects_aos_input() {
        let mut batch = numbered_batch(2, 4);
        assert!(transform_aosoa_to_aos(&mut batch).is_err());
    }

    #[test]
    fn test_hamiltonian_soa_roundtrip() {
        let entries: Vec<Complex> = (0..9).map(|x| Complex::new(x as Real, -(x as Real))).collect();
        let mut h = Hamiltonian::from_complex(&entries, 3).unwrap();
        let original = h.clone();

        transform_hamiltonian_aos_to_soa(&mut h).unwrap();
        assert_eq!(h.layout(), HamiltonianLayout::Planar);
        assert_eq!(&h.as_slice()[0..3], &[0.0, 1.0, 2.0]);
        assert_eq!(h.as_slice()[9], 0.0);
        assert_eq!(h.as_slice()[10], -1.0);
        assert_eq!(h.get(2, 1), Complex::new(7.0, -7.0));

        transform_hamiltonian_soa_to_aos(&mut h).unwrap();
        assert_eq!(h, original);
    }

    #[test]
    fn test_transform_scale() {
        let entries = vec![Complex::new(1.0, -2.0); 4];
        let mut h = Hamiltonian::from_complex(&entries, 2).unwrap();
        transform_scale(&mut h, 0.5);
        assert_eq!(h.get(1, 1), Complex::new(0.5, -1.0));
    }

    #[test]
    fn test_no_transform_is_identity() {
        let mut batch = numbered_batch(3, 2);
        let before = batch.clone();
        SigmaTransform::apply(&NoTransform, &mut batch, 2).unwrap();
        assert_eq!(batch, before);
    }

    #[test]
    fn test_plan_prepares_hamiltonian() {
        let entries = vec![Complex::new(2.0, 4.0); 4];
        let mut h = Hamiltonian::from_complex(&entries, 2).unwrap();
        TransformPlan::AOSOA.prepare_hamiltonian(&mut h, 0.25).unwrap();
        assert_eq!(h.layout(), HamiltonianLayout::Planar);
        assert_eq!(h.get(0, 1), Complex::new(0.5, 1.0));
    }

    proptest! {
        #[test]
        fn prop_aosoa_roundtrip_is_exact(
            dim in 1usize..6,
            packages in 1usize..5,
            vec_pow in 0u32..4,
            seed in any::<u64>(),
        ) {
            let vec_len = 1usize << vec_pow;
            let num = packages * vec_len;
            let entries: Vec<Complex> = (0..dim * dim * num)
                .map(|x| {
                    let v = (x as u64).wrapping_mul(seed | 1) % 10_007;
                    Complex::new(v as Real * 1.0e-3, -(v as Real) * 3.0e-4)
                })
                .collect();
            let original = SigmaBatch::from_complex(&entries, dim, num).unwrap();

            let mut batch = original.clone();
            transform_aos_to_aosoa(&mut batch, vec_len).unwrap();
            transform_aosoa_to_aos(&mut batch).unwrap();

            prop_assert_eq!(batch, original);
        }
    }
}
