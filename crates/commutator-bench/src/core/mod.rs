//! Reference commutator and the deviation metric.
//!
//! The reference is the correctness oracle for every other kernel: a plain
//! triple loop over complex numbers, single-threaded, canonical AoS layout,
//! no layout tricks. For every matrix `p` it performs the update
//!
//! ```text
//! σ_out[p] += H·σ_in[p] − σ_in[p]·H
//! ```
//!
//! so a zero-initialised `σ_out` holds the literal commutator after one call.
//! `hbar` and `dt` are accepted for signature compatibility; scaling by
//! `dt / hbar` is applied to the Hamiltonian separately
//! (see [`crate::transform::transform_scale`]).
//!
//! [`compare_batches`] reduces the difference between two batches to the
//! largest elementwise complex magnitude; [`relative_tolerance`] is the
//! bound two correct kernels stay within, scaled by the output magnitude.

mod compare;
mod reference;

pub use compare::{compare_batches, max_magnitude, relative_tolerance};
pub use reference::{commutator_reference, commutator_reference_matrix};
