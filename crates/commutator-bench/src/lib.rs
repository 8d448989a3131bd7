//! Benchmark and validation suite for batched quantum commutator kernels.
//!
//! Every kernel computes the update
//!
//! ```text
//! σ_out += H·σ_in − σ_in·H
//! ```
//!
//! for a batch of `num` complex `dim × dim` matrices sharing one
//! Hamiltonian `H`. The variants differ only in layout and code shape, so
//! their outputs agree with a scalar reference up to rounding.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | owned batches, Hamiltonian, layout tags |
//! | [`transform`] | AoS ↔ AoSoA, Hamiltonian planes, pre-scaling |
//! | [`core`] | reference kernel and deviation metric |
//! | [`kernels`] | strategy axes and the named host variants |
//! | [`backend`] | prepare/stage/invoke/retrieve abstraction |
//! | [`bench`] | harness, statistics, results stream |
//!
//! # Features
//!
//! - `parallel` (default): groups run on the rayon thread pool
//! - `single-precision`: [`Real`] is `f32` instead of `f64`
//!
//! # Example
//!
//! ```rust
//! use commutator_bench::core::{compare_batches, max_magnitude, relative_tolerance};
//! use commutator_bench::kernels::{KernelArgs, Seed, Variant};
//! use commutator_bench::types::{Complex, Hamiltonian, Real, SigmaBatch};
//!
//! let dim = 2;
//! let num = 4;
//! let h = Hamiltonian::from_complex(&[Complex::new(0.5, 0.0); 4], dim).unwrap();
//! let entries: Vec<Complex> = (0..dim * dim * num)
//!     .map(|x| Complex::new(x as Real, 1.0))
//!     .collect();
//! let sigma_in = SigmaBatch::from_complex(&entries, dim, num).unwrap();
//!
//! let mut expected = SigmaBatch::zeros(dim, num);
//! commutator_bench::core::commutator_reference(&sigma_in, &mut expected, &h, 1.0, 1.0).unwrap();
//!
//! // the AoS variant takes canonical inputs
//! let mut sigma_out = SigmaBatch::zeros(dim, num);
//! let args = KernelArgs {
//!     sigma_in: &sigma_in,
//!     sigma_out: &mut sigma_out,
//!     hamiltonian: &h,
//!     hbar: 1.0,
//!     dt: 1.0,
//! };
//! Variant::Aos.run(Seed::FromOutput, args).unwrap();
//! let bound = relative_tolerance(dim) * max_magnitude(&expected).max(1.0);
//! assert!(compare_batches(&sigma_out, &expected).unwrap() <= bound);
//! ```

pub mod backend;
pub mod bench;
pub mod cli;
pub mod core;
mod error;
pub mod kernels;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use types::{Complex, Real};

pub use backend::{DirectBackend, ExecutionBackend, PreparedKernel, Workspace};
pub use bench::{BenchConfig, Harness, ReportWriter, VariantReport};
pub use kernels::{KernelConfig, Seed, Variant};
