//! Benchmark harness: configuration, deterministic inputs, timing
//! statistics and the results stream.
//!
//! Per kernel the [`Harness`] walks
//!
//! ```text
//! INIT → TRANSFORM → WARMUP → MEASURE → COMPARE → REPORT
//! ```
//!
//! after an initial reference run whose frozen output every comparison
//! uses.
//!
//! # Example
//!
//! ```rust
//! use commutator_bench::backend::DirectBackend;
//! use commutator_bench::bench::{BenchConfig, Harness, ReportWriter};
//! use commutator_bench::core::{max_magnitude, relative_tolerance};
//! use commutator_bench::kernels::Variant;
//!
//! let config = BenchConfig::new().with_dim(2).with_num(8).with_vec_len(4).with_runs(2, 1);
//! let mut harness = Harness::new(config, DirectBackend::default()).unwrap();
//! let mut writer = ReportWriter::new(Vec::new());
//! writer.write_header().unwrap();
//!
//! let reports = harness
//!     .run_all(&[Variant::Aosoa], |report| writer.write_row(report))
//!     .unwrap();
//! let bound = relative_tolerance(2) * max_magnitude(harness.reference().unwrap()).max(1.0);
//! assert!(reports[1].deviation.unwrap() <= bound);
//! ```

mod config;
mod harness;
mod init;
mod report;
mod statistics;

pub use config::{BenchConfig, DEFAULT_DT, DEFAULT_HBAR};
pub use harness::{Harness, VariantReport, REFERENCE_NAME};
pub use init::{initial_hamiltonian, initial_sigma, initial_workspace};
pub use report::{scientific, ReportWriter};
pub use statistics::{Statistics, StatisticsAggregator};
