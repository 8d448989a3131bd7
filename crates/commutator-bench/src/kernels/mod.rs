//! Kernel variants computing `σ_out += H·σ_in − σ_in·H` for a whole batch.
//!
//! A variant is a point in a small strategy space:
//!
//! | Axis | Choices |
//! |------|---------|
//! | [`LayoutKind`] | AoS matrices, AoSoA packages |
//! | [`Vectorisation`] | scalar body per lane, explicit [`RealVec`] body |
//! | [`Indexing`] | runtime extents, [`ConstExtents`] |
//! | [`Accumulation`] | register accumulate, direct compound assign |
//! | [`LoopOrder`] | `ijk`, `ikj` |
//! | [`Fusion`] | none, `2to3`, `2to5`, `4to5` |
//! | [`Unroll`] | none, `j` stepped by two |
//!
//! The arithmetic lives in one set of generic bodies; each variant is an
//! instantiation of them. Groups (matrices, packages, fused packages) are
//! independent and run in parallel when the `parallel` feature is on.
//!
//! # Example
//!
//! ```rust
//! use commutator_bench::kernels::{KernelArgs, Seed, Variant};
//! use commutator_bench::types::{Hamiltonian, SigmaBatch};
//!
//! let sigma_in = SigmaBatch::zeros(3, 4);
//! let mut sigma_out = SigmaBatch::zeros(3, 4);
//! let hamiltonian = Hamiltonian::zeros(3);
//!
//! let args = KernelArgs {
//!     sigma_in: &sigma_in,
//!     sigma_out: &mut sigma_out,
//!     hamiltonian: &hamiltonian,
//!     hbar: 0.0,
//!     dt: 0.0,
//! };
//! Variant::Aos.run(Seed::FromOutput, args).unwrap();
//! assert!(sigma_out.as_slice().iter().all(|&x| x == 0.0));
//! ```

mod body;
mod extent;
mod launch;
mod parallel;
mod strategy;
mod variants;
mod vector;

pub use extent::{
    ConstExtents, Extents, LaneExtents, RuntimeExtents, MAX_CONST_DIM, SUPPORTED_VEC_LENS,
};
pub use launch::{launch, KernelArgs};
pub use strategy::{
    Accumulation, Fusion, Indexing, KernelConfig, LayoutKind, LoopOrder, Seed, Unroll,
    Vectorisation,
};
pub use variants::Variant;
pub use vector::{Lane, RealVec};
