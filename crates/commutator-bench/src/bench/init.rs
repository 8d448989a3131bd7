//! Deterministic benchmark inputs.
//!
//! The same seed always yields the same Hamiltonian and batch, so every
//! variant of a run (and every run with that seed) sees identical data.

use super::config::BenchConfig;
use crate::backend::Workspace;
use crate::types::{Complex, Hamiltonian, SigmaBatch};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const HAMILTONIAN_STREAM: u64 = 0;
const SIGMA_STREAM: u64 = 1;

fn rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Random Hermitian Hamiltonian with entries in `[-1, 1)`, interleaved.
pub fn initial_hamiltonian(dim: usize, seed: u64) -> Hamiltonian {
    let mut rng = rng(seed, HAMILTONIAN_STREAM);
    let mut h = Hamiltonian::zeros(dim);
    for i in 0..dim {
        h.set(i, i, Complex::new(rng.gen_range(-1.0..1.0), 0.0));
        for j in i + 1..dim {
            let value = Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            h.set(i, j, value);
            h.set(j, i, value.conj());
        }
    }
    h
}

/// Random AoS `sigma_in` with entries in `[-1, 1)` and a zero `sigma_out`.
pub fn initial_sigma(dim: usize, num: usize, seed: u64) -> (SigmaBatch, SigmaBatch) {
    let mut rng = rng(seed, SIGMA_STREAM);
    let mut sigma_in = SigmaBatch::zeros(dim, num);
    sigma_in
        .as_mut_slice()
        .iter_mut()
        .for_each(|x| *x = rng.gen_range(-1.0..1.0));
    (sigma_in, SigmaBatch::zeros(dim, num))
}

/// Fresh canonical workspace for `config`.
pub fn initial_workspace(config: &BenchConfig) -> Workspace {
    let (sigma_in, sigma_out) = initial_sigma(config.dim, config.num, config.seed);
    Workspace {
        hamiltonian: initial_hamiltonian(config.dim, config.seed),
        sigma_in,
        sigma_out,
        hbar: config.hbar,
        dt: config.dt,
    }
}
