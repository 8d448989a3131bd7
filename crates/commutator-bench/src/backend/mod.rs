//! Execution backends: how a kernel is made callable and how its elapsed
//! time is measured.
//!
//! The harness only sees two traits. An [`ExecutionBackend`] turns a kernel
//! identifier into a [`PreparedKernel`]; the prepared kernel brackets the
//! timed loop with `stage` (inputs to wherever the kernel runs) and
//! `retrieve` (results back into the workspace), neither of which is timed.

mod direct;

pub use direct::{DirectBackend, DirectKernel};

use crate::error::Result;
use crate::kernels::Variant;
use crate::transform::TransformPlan;
use crate::types::{Hamiltonian, Real, SigmaBatch};
use std::time::Duration;

/// Identifier of a kernel an [`ExecutionBackend`] knows how to prepare.
pub trait KernelDescriptor: Copy + Send + Sync {
    /// Reported name.
    fn name(&self) -> &'static str;

    /// Transforms the kernel expects on its inputs.
    fn plan(&self) -> TransformPlan;
}

impl KernelDescriptor for Variant {
    fn name(&self) -> &'static str {
        Variant::name(*self)
    }

    fn plan(&self) -> TransformPlan {
        Variant::plan(*self)
    }
}

/// Live buffers of one variant run, owned by the harness.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub hamiltonian: Hamiltonian,
    pub sigma_in: SigmaBatch,
    pub sigma_out: SigmaBatch,
    pub hbar: Real,
    pub dt: Real,
}

/// A kernel ready to be invoked repeatedly.
pub trait PreparedKernel {
    /// Time spent compiling and loading the kernel, if the backend does.
    fn build_time(&self) -> Option<Duration> {
        None
    }

    /// Make the workspace inputs visible to the kernel.
    fn stage(&mut self, workspace: &Workspace) -> Result<()>;

    /// Run once and return the elapsed time of this call.
    fn invoke(&mut self, workspace: &mut Workspace) -> Result<Duration>;

    /// Bring the kernel's output back into `workspace.sigma_out`.
    fn retrieve(&mut self, workspace: &mut Workspace) -> Result<()>;
}

/// Strategy for turning kernels into timed calls.
pub trait ExecutionBackend {
    type Kernel: KernelDescriptor;
    type Prepared: PreparedKernel;

    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Kernels this backend can run, in benchmark order.
    fn kernels(&self) -> Vec<Self::Kernel>;

    /// Build (if needed) and bind `kernel` for the given workspace extents.
    fn prepare(&mut self, kernel: &Self::Kernel, workspace: &Workspace) -> Result<Self::Prepared>;
}
