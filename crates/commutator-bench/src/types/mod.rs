//! Data model: complex matrix batches and the Hamiltonian.
//!
//! Every buffer is an owned, contiguous `Vec<Real>` that carries its logical
//! shape (`dim`, `num`) and a layout tag, so transforms and kernels can check
//! their preconditions instead of trusting caller arithmetic.
//!
//! # Batch Layouts
//!
//! | Layout | Offset of `re(σ_p[i,j])` | Contiguous unit |
//! |--------|--------------------------|-----------------|
//! | [`BatchLayout::Aos`] | `2·((p·dim + i)·dim + j)` | one matrix |
//! | [`BatchLayout::Aosoa`] | `P·2V·dim² + 2V·(dim·i + j) + lane` | one entry across `V` matrices |
//!
//! with `P = p / V` the package and `lane = p % V`. The imaginary part sits
//! right after the real part (AoS) or `V` reals later (AoSoA), so a SIMD load
//! in AoSoA fetches the same entry of `V` different matrices.
//!
//! # Hamiltonian Layouts
//!
//! | Layout | Real part | Imaginary part |
//! |--------|-----------|----------------|
//! | [`HamiltonianLayout::Interleaved`] | `2·(i·dim + j)` | `2·(i·dim + j) + 1` |
//! | [`HamiltonianLayout::Planar`] | `i·dim + j` | `dim² + i·dim + j` |
//!
//! # Example
//!
//! ```rust
//! use commutator_bench::types::{BatchLayout, Complex, SigmaBatch};
//!
//! let mut batch = SigmaBatch::zeros(2, 4);
//! batch.set(3, 1, 0, Complex::new(1.0, -1.0));
//! assert_eq!(batch.layout(), BatchLayout::Aos);
//! assert_eq!(batch.get(3, 1, 0).im, -1.0);
//! ```

mod batch;
mod hamiltonian;
mod layout;
mod scalar;

pub use batch::{check_packaging, SigmaBatch};
pub use hamiltonian::Hamiltonian;
pub use layout::{BatchLayout, HamiltonianLayout};
pub use scalar::{Complex, Real, REAL_C_NAME};
