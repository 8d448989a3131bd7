//! OpenCL backend for the commutator kernel benchmark.
//!
//! Every device kernel lives in one OpenCL C program that is rebuilt per
//! kernel with the problem extents baked in as preprocessor defines, so the
//! compiler sees the same constants the host `*_constants_*` variants do.
//! Build time is reported next to the runtime statistics; runtimes come from
//! device profiling events.
//!
//! # Quick Start
//!
//! ```ignore
//! use commutator_bench::bench::{BenchConfig, Harness};
//! use commutator_bench::ExecutionBackend;
//! use commutator_bench_opencl::{init_global_context, BuildOptions, DeviceKind, OclBackend};
//!
//! let config = BenchConfig::new().with_dim(7).with_num(4096);
//! let ctx = init_global_context(DeviceKind::Gpu)?;
//! let options = BuildOptions::new(config.num, config.dim, config.vec_len, config.packages_per_wg);
//! let mut harness = Harness::new(config, OclBackend::new(ctx, options))?;
//! let kernels = harness.backend().kernels();
//! harness.run_all(&kernels, |report| { println!("{}", report.name); Ok(()) })?;
//! ```

mod buffer;
mod context;
mod error;
mod kernels;
mod program;

use once_cell::sync::OnceCell;
use std::sync::Mutex;

/// Global OpenCL context, created on first use and kept for the process
/// lifetime.
static GLOBAL_CONTEXT: OnceCell<OclContext> = OnceCell::new();

/// Serialises context creation.
static INIT_MUTEX: Mutex<()> = Mutex::new(());

/// Get the global context, opening the first device of any type if none
/// exists yet.
pub fn get_global_context() -> Result<&'static OclContext> {
    init_global_context(DeviceKind::Any)
}

/// Get the global context, opening the first device of `kind` if none exists
/// yet.
///
/// Once a context exists it is returned regardless of `kind`.
pub fn init_global_context(kind: DeviceKind) -> Result<&'static OclContext> {
    // Fast path: already initialized
    if let Some(ctx) = GLOBAL_CONTEXT.get() {
        return Ok(ctx);
    }

    let _lock = INIT_MUTEX.lock().map_err(|_| OpenClError::Poisoned)?;

    // Double-check after acquiring lock
    if let Some(ctx) = GLOBAL_CONTEXT.get() {
        return Ok(ctx);
    }

    let ctx = OclContext::new(kind)?;
    Ok(GLOBAL_CONTEXT.get_or_init(|| ctx))
}

pub use buffer::{Access, DeviceBuffer};
pub use context::{DeviceKind, OclContext};
pub use error::{OpenClError, Result};
pub use kernels::{NdRange, OclBackend, OclPrepared, OclVariant, RangeShape};
pub use program::{BuildOptions, BuiltProgram, KernelToolchain, KERNEL_SOURCE};
