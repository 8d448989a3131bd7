//! Runtime compilation of the device kernels.

use crate::context::OclContext;
use crate::error::{OpenClError, Result};
use commutator_bench::types::REAL_C_NAME;
use opencl3::kernel::Kernel;
use opencl3::program::Program;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// OpenCL C source of every device kernel.
pub const KERNEL_SOURCE: &str = include_str!("../shaders/commutator.cl");

/// Preprocessor defines and compiler flags for one program build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub num: usize,
    pub dim: usize,
    pub vec_len: usize,
    pub packages_per_wg: usize,
    /// Work-items per chunk, GPU kernels only.
    pub chunk_size: Option<usize>,
    /// Sub-groups per work-group, GPU kernels only.
    pub num_sub_groups: Option<usize>,
    /// `-auto-prefetch-level` for accelerator compilers.
    pub prefetch_level: Option<u32>,
    /// Start accumulate registers at zero.
    pub init_zero: bool,
}

impl BuildOptions {
    pub fn new(num: usize, dim: usize, vec_len: usize, packages_per_wg: usize) -> Self {
        Self {
            num,
            dim,
            vec_len,
            packages_per_wg,
            chunk_size: None,
            num_sub_groups: None,
            prefetch_level: None,
            init_zero: false,
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, num_sub_groups: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self.num_sub_groups = Some(num_sub_groups);
        self
    }

    pub fn with_prefetch_level(mut self, level: Option<u32>) -> Self {
        self.prefetch_level = level;
        self
    }

    pub fn with_init_zero(mut self, init_zero: bool) -> Self {
        self.init_zero = init_zero;
        self
    }
}

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-DNUM={} -DDIM={} -DVEC_LENGTH={} -DPACKAGES_PER_WG={} -DREAL_T={}",
            self.num, self.dim, self.vec_len, self.packages_per_wg, REAL_C_NAME
        )?;
        if REAL_C_NAME == "double" {
            f.write_str(" -DUSE_FP64")?;
        }
        if let Some(chunk) = self.chunk_size {
            write!(f, " -DCHUNK_SIZE={chunk}")?;
        }
        if let Some(groups) = self.num_sub_groups {
            write!(f, " -DNUM_SUB_GROUPS={groups}")?;
        }
        if self.init_zero {
            f.write_str(" -DUSE_INITZERO")?;
        }
        f.write_str(" -cl-mad-enable")?;
        if let Some(level) = self.prefetch_level {
            write!(f, " -auto-prefetch-level={level}")?;
        }
        Ok(())
    }
}

/// A compiled program and how long the compiler took.
pub struct BuiltProgram {
    program: Program,
    build_time: Duration,
}

impl BuiltProgram {
    pub fn build_time(&self) -> Duration {
        self.build_time
    }
}

/// Compiles sources and extracts kernels on one device.
#[derive(Clone, Copy)]
pub struct KernelToolchain<'a> {
    ctx: &'a OclContext,
}

impl<'a> KernelToolchain<'a> {
    pub fn new(ctx: &'a OclContext) -> Self {
        Self { ctx }
    }

    /// Compile `source` with `options`, timing the compiler.
    ///
    /// `entry` only labels the build in errors and logs.
    pub fn build(&self, source: &str, options: &BuildOptions, entry: &str) -> Result<BuiltProgram> {
        let flags = options.to_string();
        debug!(kernel = entry, %flags, "building program");

        let start = Instant::now();
        let program = Program::create_and_build_from_source(self.ctx.context(), source, &flags);
        let build_time = start.elapsed();

        match program {
            Ok(program) => Ok(BuiltProgram { program, build_time }),
            Err(log) => {
                warn!(kernel = entry, "program build failed");
                Err(OpenClError::Build {
                    kernel: entry.to_string(),
                    log,
                })
            }
        }
    }

    /// Extract entry point `entry` from a built program.
    pub fn load(&self, program: &BuiltProgram, entry: &str) -> Result<Kernel> {
        Kernel::create(&program.program, entry)
            .map_err(|e| OpenClError::api(format!("create_kernel({entry})"), e))
    }
}
