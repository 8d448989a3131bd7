//! Device kernel catalogue and the OpenCL execution backend.

use crate::buffer::{Access, DeviceBuffer};
use crate::context::OclContext;
use crate::error::{OpenClError, Result};
use crate::program::{BuildOptions, BuiltProgram, KernelToolchain, KERNEL_SOURCE};
use commutator_bench::backend::{ExecutionBackend, KernelDescriptor, PreparedKernel, Workspace};
use commutator_bench::transform::TransformPlan;
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::ClMem;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// How a device kernel maps work-items onto matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeShape {
    /// One work-item per matrix.
    PerMatrix,
    /// `(lane, package)` grid with `packages_per_wg` packages per group.
    LanePackage,
    /// One work-item per package.
    PerPackage,
}

/// Work-item layout of one launch; an empty vector is the null range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdRange {
    pub offset: Vec<usize>,
    pub global: Vec<usize>,
    pub local: Vec<usize>,
}

impl NdRange {
    /// Range of `shape` for the given extents.
    pub fn new(shape: RangeShape, options: &BuildOptions) -> Result<Self> {
        let BuildOptions {
            num,
            vec_len,
            packages_per_wg,
            ..
        } = *options;
        if vec_len == 0 || num % vec_len != 0 {
            return Err(OpenClError::Launch(format!(
                "num={num} is not a multiple of vec_len={vec_len}"
            )));
        }
        let packages = num / vec_len;
        Ok(match shape {
            RangeShape::PerMatrix => Self {
                global: vec![num],
                ..Self::default()
            },
            RangeShape::LanePackage => {
                if packages_per_wg == 0 || packages % packages_per_wg != 0 {
                    return Err(OpenClError::Launch(format!(
                        "{packages} packages do not split into work-groups of {packages_per_wg}"
                    )));
                }
                Self {
                    offset: Vec::new(),
                    global: vec![vec_len, packages],
                    local: vec![vec_len, packages_per_wg],
                }
            }
            RangeShape::PerPackage => Self {
                global: vec![packages],
                ..Self::default()
            },
        })
    }
}

macro_rules! ocl_variants {
    ($($variant:ident => $name:literal, $shape:ident, $plan:ident;)*) => {
        /// Kernels in the device program, in benchmark order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum OclVariant {
            $($variant,)*
        }

        impl OclVariant {
            pub const ALL: &'static [OclVariant] = &[$(OclVariant::$variant,)*];

            /// Entry point in the device program.
            pub fn name(self) -> &'static str {
                match self {
                    $(OclVariant::$variant => $name,)*
                }
            }

            pub fn range_shape(self) -> RangeShape {
                match self {
                    $(OclVariant::$variant => RangeShape::$shape,)*
                }
            }

            pub fn plan(self) -> TransformPlan {
                match self {
                    $(OclVariant::$variant => TransformPlan::$plan,)*
                }
            }
        }
    };
}

ocl_variants! {
    Empty => "commutator_ocl_empty", PerMatrix, IDENTITY;
    Initial => "commutator_ocl_initial", PerMatrix, IDENTITY;
    Refactored => "commutator_ocl_refactored", PerMatrix, IDENTITY;
    RefactoredDirect => "commutator_ocl_refactored_direct", PerMatrix, SCALED;
    AosoaNaive => "commutator_ocl_aosoa_naive", PerMatrix, AOSOA;
    AosoaNaiveConstants => "commutator_ocl_aosoa_naive_constants", PerMatrix, AOSOA;
    AosoaNaiveDirect => "commutator_ocl_aosoa_naive_direct", PerMatrix, AOSOA;
    AosoaNaiveConstantsDirect => "commutator_ocl_aosoa_naive_constants_direct", PerMatrix, AOSOA;
    Aosoa => "commutator_ocl_aosoa", LanePackage, AOSOA;
    AosoaConstants => "commutator_ocl_aosoa_constants", LanePackage, AOSOA;
    AosoaDirect => "commutator_ocl_aosoa_direct", LanePackage, AOSOA;
    AosoaConstantsDirect => "commutator_ocl_aosoa_constants_direct", LanePackage, AOSOA;
    AosoaConstantsDirectPerm => "commutator_ocl_aosoa_constants_direct_perm", LanePackage, AOSOA;
    ManualAosoa => "commutator_ocl_manual_aosoa", PerPackage, AOSOA;
    ManualAosoaConstants => "commutator_ocl_manual_aosoa_constants", PerPackage, AOSOA;
    ManualAosoaDirect => "commutator_ocl_manual_aosoa_direct", PerPackage, AOSOA;
    ManualAosoaConstantsDirect => "commutator_ocl_manual_aosoa_constants_direct", PerPackage, AOSOA;
    ManualAosoaConstantsDirectPerm => "commutator_ocl_manual_aosoa_constants_direct_perm", PerPackage, AOSOA;
}

impl OclVariant {
    /// Whether the kernel uses OpenCL vector types of width `vec_len`.
    pub fn needs_vector_type(self) -> bool {
        self.range_shape() == RangeShape::PerPackage
    }

    /// Whether the kernel indexes with the compile-time `DIM`.
    pub fn uses_constant_dim(self) -> bool {
        self.name().contains("_constants")
    }
}

impl fmt::Display for OclVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl KernelDescriptor for OclVariant {
    fn name(&self) -> &'static str {
        OclVariant::name(*self)
    }

    fn plan(&self) -> TransformPlan {
        OclVariant::plan(*self)
    }
}

/// Vector widths OpenCL C has built-in types for.
const VECTOR_WIDTHS: [usize; 4] = [2, 4, 8, 16];

/// Builds each device kernel in its own program and times it with
/// profiling events.
pub struct OclBackend {
    ctx: &'static OclContext,
    options: BuildOptions,
}

impl OclBackend {
    pub fn new(ctx: &'static OclContext, options: BuildOptions) -> Self {
        Self { ctx, options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn check_extents(&self, workspace: &Workspace) -> Result<()> {
        let (dim, num) = (workspace.sigma_in.dim(), workspace.sigma_in.num());
        if dim != self.options.dim || num != self.options.num {
            return Err(OpenClError::Launch(format!(
                "workspace is dim={dim} num={num}, program built for dim={} num={}",
                self.options.dim, self.options.num
            )));
        }
        Ok(())
    }
}

impl ExecutionBackend for OclBackend {
    type Kernel = OclVariant;
    type Prepared = OclPrepared;

    fn name(&self) -> &'static str {
        "opencl"
    }

    /// Kernels that can launch with the configured extents; the rest are
    /// skipped with a warning.
    fn kernels(&self) -> Vec<OclVariant> {
        OclVariant::ALL
            .iter()
            .copied()
            .filter(|v| {
                if v.needs_vector_type() && !VECTOR_WIDTHS.contains(&self.options.vec_len) {
                    warn!(kernel = v.name(), vec_len = self.options.vec_len, "no vector type, skipping");
                    return false;
                }
                if let Err(e) = NdRange::new(v.range_shape(), &self.options) {
                    warn!(kernel = v.name(), error = %e, "skipping");
                    return false;
                }
                true
            })
            .collect()
    }

    fn prepare(
        &mut self,
        kernel: &OclVariant,
        workspace: &Workspace,
    ) -> commutator_bench::Result<OclPrepared> {
        self.check_extents(workspace)?;
        let range = NdRange::new(kernel.range_shape(), &self.options)?;

        let toolchain = KernelToolchain::new(self.ctx);
        let program = toolchain.build(KERNEL_SOURCE, &self.options, kernel.name())?;
        let entry = toolchain.load(&program, kernel.name())?;
        debug!(kernel = kernel.name(), ?range, "kernel loaded");

        let ctx = self.ctx;
        Ok(OclPrepared {
            ctx,
            hamiltonian: DeviceBuffer::alloc(ctx, workspace.hamiltonian.as_slice().len(), Access::ReadOnly, "hamiltonian")?,
            sigma_in: DeviceBuffer::alloc(ctx, workspace.sigma_in.len(), Access::ReadOnly, "sigma_in")?,
            sigma_out: DeviceBuffer::alloc(ctx, workspace.sigma_out.len(), Access::ReadWrite, "sigma_out")?,
            kernel: entry,
            program,
            range,
        })
    }
}

/// A built device kernel with its buffers.
pub struct OclPrepared {
    ctx: &'static OclContext,
    kernel: Kernel,
    program: BuiltProgram,
    range: NdRange,
    hamiltonian: DeviceBuffer,
    sigma_in: DeviceBuffer,
    sigma_out: DeviceBuffer,
}

impl OclPrepared {
    fn launch(&self, workspace: &Workspace) -> Result<Duration> {
        let num = i32::try_from(workspace.sigma_in.num())
            .map_err(|_| OpenClError::Launch("num exceeds the device int range".into()))?;
        let dim = i32::try_from(workspace.sigma_in.dim())
            .map_err(|_| OpenClError::Launch("dim exceeds the device int range".into()))?;

        // SAFETY: argument order and types match KERNEL_ARGS in the program,
        // buffers are sized for the workspace.
        let event = unsafe {
            let mut exec = ExecuteKernel::new(&self.kernel);
            exec.set_arg(&self.sigma_in.raw().get())
                .set_arg(&self.sigma_out.raw().get())
                .set_arg(&self.hamiltonian.raw().get())
                .set_arg(&num)
                .set_arg(&dim)
                .set_arg(&workspace.hbar)
                .set_arg(&workspace.dt)
                .set_global_work_sizes(&self.range.global);
            if !self.range.offset.is_empty() {
                exec.set_global_work_offsets(&self.range.offset);
            }
            if !self.range.local.is_empty() {
                exec.set_local_work_sizes(&self.range.local);
            }
            exec.enqueue_nd_range(self.ctx.queue())
                .map_err(|e| OpenClError::api("enqueue_nd_range", e))?
        };
        event.wait().map_err(|e| OpenClError::api("wait", e))?;

        let start = event
            .profiling_command_start()
            .map_err(|e| OpenClError::api("profiling_command_start", e))?;
        let end = event
            .profiling_command_end()
            .map_err(|e| OpenClError::api("profiling_command_end", e))?;
        Ok(Duration::from_nanos(end.saturating_sub(start)))
    }
}

impl PreparedKernel for OclPrepared {
    fn build_time(&self) -> Option<Duration> {
        Some(self.program.build_time())
    }

    fn stage(&mut self, workspace: &Workspace) -> commutator_bench::Result<()> {
        self.hamiltonian.write(self.ctx, workspace.hamiltonian.as_slice())?;
        self.sigma_in.write(self.ctx, workspace.sigma_in.as_slice())?;
        self.sigma_out.write(self.ctx, workspace.sigma_out.as_slice())?;
        Ok(())
    }

    fn invoke(&mut self, workspace: &mut Workspace) -> commutator_bench::Result<Duration> {
        Ok(self.launch(workspace)?)
    }

    fn retrieve(&mut self, workspace: &mut Workspace) -> commutator_bench::Result<()> {
        self.sigma_out.read(self.ctx, workspace.sigma_out.as_mut_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        assert_eq!(OclVariant::ALL.len(), 18);
        assert!(OclVariant::ALL.iter().all(|v| v.name().starts_with("commutator_ocl_")));
        assert!(!OclVariant::Initial.plan().scale_hamiltonian);
        assert!(OclVariant::RefactoredDirect.plan().scale_hamiltonian);
        assert_eq!(OclVariant::Aosoa.plan().sigma.name(), "aos_to_aosoa");
        assert!(OclVariant::ManualAosoa.needs_vector_type());
        assert!(!OclVariant::AosoaNaive.needs_vector_type());
    }

    #[test]
    fn test_constant_kernels_mirror_runtime_kernels() {
        let constant: Vec<_> = OclVariant::ALL.iter().filter(|v| v.uses_constant_dim()).collect();
        assert_eq!(constant.len(), 8);
        for v in constant {
            let runtime_name = v.name().replace("_constants", "");
            match OclVariant::ALL.iter().find(|r| r.name() == runtime_name) {
                Some(r) => {
                    assert_eq!(r.range_shape(), v.range_shape(), "{v}");
                    assert_eq!(r.plan().sigma.name(), v.plan().sigma.name(), "{v}");
                }
                // the permuted loop order only exists with constants
                None => assert!(v.name().ends_with("_perm"), "{v} has no runtime twin"),
            }
        }
    }

    #[test]
    fn test_nd_ranges() {
        let opts = BuildOptions::new(64, 3, 4, 2);
        assert_eq!(NdRange::new(RangeShape::PerMatrix, &opts).unwrap().global, vec![64]);
        let grid = NdRange::new(RangeShape::LanePackage, &opts).unwrap();
        assert_eq!(grid.global, vec![4, 16]);
        assert_eq!(grid.local, vec![4, 2]);
        assert!(grid.offset.is_empty());
        assert_eq!(NdRange::new(RangeShape::PerPackage, &opts).unwrap().global, vec![16]);
    }

    #[test]
    fn test_nd_range_rejects_uneven_split() {
        let opts = BuildOptions::new(64, 3, 4, 3);
        assert!(NdRange::new(RangeShape::LanePackage, &opts).is_err());
        assert!(NdRange::new(RangeShape::PerMatrix, &BuildOptions::new(10, 3, 4, 1)).is_err());
    }
}
