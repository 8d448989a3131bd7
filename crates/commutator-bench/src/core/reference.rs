//! Scalar reference commutator.

use crate::error::{Error, Result};
use crate::types::{BatchLayout, Complex, Hamiltonian, HamiltonianLayout, Real, SigmaBatch};

/// Reference commutator over a whole AoS batch.
///
/// # Arguments
/// - `sigma_in`: input batch, AoS
/// - `sigma_out`: output batch, AoS, same extents; accumulated into
/// - `hamiltonian`: interleaved Hamiltonian of the same `dim`
/// - `hbar`, `dt`: accepted, not applied
///
/// # Example
///
/// ```
/// use commutator_bench::core::commutator_reference;
/// use commutator_bench::types::{Complex, Hamiltonian, SigmaBatch};
///
/// let h = Hamiltonian::from_complex(&[Complex::new(1.0, 0.0); 4], 2).unwrap();
/// let s_in = SigmaBatch::from_complex(&[Complex::new(0.0, 1.0); 4], 2, 1).unwrap();
/// let mut s_out = SigmaBatch::zeros(2, 1);
///
/// commutator_reference(&s_in, &mut s_out, &h, 1.0, 1.0).unwrap();
/// // all-equal matrices commute
/// assert_eq!(s_out.get(0, 1, 0), Complex::new(0.0, 0.0));
/// ```
pub fn commutator_reference(
    sigma_in: &SigmaBatch,
    sigma_out: &mut SigmaBatch,
    hamiltonian: &Hamiltonian,
    _hbar: Real,
    _dt: Real,
) -> Result<()> {
    sigma_in.expect_layout(BatchLayout::Aos)?;
    sigma_out.expect_layout(BatchLayout::Aos)?;
    sigma_in.check_same_extents(sigma_out)?;
    hamiltonian.expect_layout(HamiltonianLayout::Interleaved)?;
    if hamiltonian.dim() != sigma_in.dim() {
        return Err(Error::Shape(format!(
            "Hamiltonian dim {} does not match batch dim {}",
            hamiltonian.dim(),
            sigma_in.dim()
        )));
    }

    let dim = sigma_in.dim();
    let h: Vec<Complex> = (0..dim * dim)
        .map(|idx| hamiltonian.get(idx / dim, idx % dim))
        .collect();

    for p in 0..sigma_in.num() {
        for i in 0..dim {
            for j in 0..dim {
                let mut acc = sigma_out.get(p, i, j);
                for k in 0..dim {
                    acc += h[i * dim + k] * sigma_in.get(p, k, j);
                    acc -= sigma_in.get(p, i, k) * h[k * dim + j];
                }
                sigma_out.set(p, i, j, acc);
            }
        }
    }
    Ok(())
}

/// Commutator `H·σ − σ·H` of two row-major complex matrices.
///
/// Convenience for tests and hand checks.
pub fn commutator_reference_matrix(h: &[Complex], sigma: &[Complex], dim: usize) -> Result<Vec<Complex>> {
    for (name, len) in [("H", h.len()), ("sigma", sigma.len())] {
        if len != dim * dim {
            return Err(Error::Shape(format!(
                "{name} has {len} entries, expected {} for dim {dim}",
                dim * dim
            )));
        }
    }

    let mut out = vec![Complex::new(0.0, 0.0); dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            for k in 0..dim {
                out[i * dim + j] += h[i * dim + k] * sigma[k * dim + j];
                out[i * dim + j] -= sigma[i * dim + k] * h[k * dim + j];
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: Real, im: Real) -> Complex {
        Complex::new(re, im)
    }

    #[test]
    fn test_pauli_commutator() {
        // [σx, σy] = 2i σz
        let sx = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)];
        let sy = vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)];

        let h = Hamiltonian::from_complex(&sx, 2).unwrap();
        let s_in = SigmaBatch::from_complex(&sy, 2, 1).unwrap();
        let mut s_out = SigmaBatch::zeros(2, 1);

        commutator_reference(&s_in, &mut s_out, &h, 1.0, 1.0).unwrap();

        assert_eq!(s_out.get(0, 0, 0), c(0.0, 2.0));
        assert_eq!(s_out.get(0, 0, 1), c(0.0, 0.0));
        assert_eq!(s_out.get(0, 1, 0), c(0.0, 0.0));
        assert_eq!(s_out.get(0, 1, 1), c(0.0, -2.0));
    }

    #[test]
    fn test_accumulates_into_output() {
        let sx = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)];
        let sy = vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)];

        let h = Hamiltonian::from_complex(&sx, 2).unwrap();
        let s_in = SigmaBatch::from_complex(&sy, 2, 1).unwrap();
        let mut s_out = SigmaBatch::from_complex(&[c(1.0, 1.0); 4], 2, 1).unwrap();

        commutator_reference(&s_in, &mut s_out, &h, 1.0, 1.0).unwrap();

        assert_eq!(s_out.get(0, 0, 0), c(1.0, 3.0));
        assert_eq!(s_out.get(0, 1, 1), c(1.0, -1.0));
    }

    #[test]
    fn test_matches_matrix_helper() {
        let dim = 3;
        let h: Vec<Complex> = (0..9).map(|x| c(x as Real * 0.5, 1.0 - x as Real)).collect();
        let s: Vec<Complex> = (0..9).map(|x| c(2.0 - x as Real, x as Real * 0.25)).collect();

        let expected = commutator_reference_matrix(&h, &s, dim).unwrap();

        let hamiltonian = Hamiltonian::from_complex(&h, dim).unwrap();
        let s_in = SigmaBatch::from_complex(&s, dim, 1).unwrap();
        let mut s_out = SigmaBatch::zeros(dim, 1);
        commutator_reference(&s_in, &mut s_out, &hamiltonian, 1.0, 1.0).unwrap();

        assert_eq!(s_out.to_complex_aos(), expected);
    }

    #[test]
    fn test_matrix_helper_rejects_bad_extents() {
        let h = vec![c(1.0, 0.0); 4];
        let s = vec![c(1.0, 0.0); 9];
        assert!(matches!(commutator_reference_matrix(&h, &s, 2), Err(Error::Shape(_))));
        assert!(matches!(commutator_reference_matrix(&h, &h, 3), Err(Error::Shape(_))));
    }

    #[test]
    fn test_rejects_aosoa_input() {
        let mut s_in = SigmaBatch::zeros(2, 2);
        crate::transform::transform_aos_to_aosoa(&mut s_in, 2).unwrap();
        let mut s_out = SigmaBatch::zeros(2, 2);
        let h = Hamiltonian::zeros(2);
        assert!(commutator_reference(&s_in, &mut s_out, &h, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_dim_mismatch() {
        let s_in = SigmaBatch::zeros(2, 2);
        let mut s_out = SigmaBatch::zeros(2, 2);
        let h = Hamiltonian::zeros(3);
        assert!(commutator_reference(&s_in, &mut s_out, &h, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_bit_identical_reruns() {
        let dim = 4;
        let num = 8;
        let h: Vec<Complex> = (0..dim * dim).map(|x| c((x as Real).sin(), (x as Real).cos())).collect();
        let s: Vec<Complex> = (0..dim * dim * num)
            .map(|x| c((x as Real * 0.3).cos(), (x as Real * 0.7).sin()))
            .collect();
        let hamiltonian = Hamiltonian::from_complex(&h, dim).unwrap();
        let s_in = SigmaBatch::from_complex(&s, dim, num).unwrap();

        let mut first = SigmaBatch::zeros(dim, num);
        let mut second = SigmaBatch::zeros(dim, num);
        commutator_reference(&s_in, &mut first, &hamiltonian, 1.0, 1.0).unwrap();
        commutator_reference(&s_in, &mut second, &hamiltonian, 1.0, 1.0).unwrap();

        let bits = |b: &SigmaBatch| b.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }
}
