use crate::error::{Error, Result};
use crate::kernels::Seed;
use crate::types::{check_packaging, Real};

/// Reduced Planck constant used by the benchmark, `1/π`.
pub const DEFAULT_HBAR: Real = (1.0 / std::f64::consts::PI) as Real;

/// Time step used by the benchmark.
pub const DEFAULT_DT: Real = 1.0e-3;

/// Problem size, run counts and numeric constants of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Matrix dimension.
    pub dim: usize,
    /// Number of matrices in the batch.
    pub num: usize,
    /// Matrices per AoSoA package.
    pub vec_len: usize,
    /// Packages per device work-group.
    pub packages_per_wg: usize,
    /// Invocations per variant, warm-up included.
    pub overall_runs: usize,
    /// Leading invocations whose timings are discarded.
    pub warmup_runs: usize,
    /// Run the reference and report deviations.
    pub check: bool,
    /// Seed for input initialisation.
    pub seed: u64,
    pub hbar: Real,
    pub dt: Real,
    /// Starting value of accumulate registers.
    pub accumulation: Seed,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dim: 7,
            num: 4096,
            vec_len: 4,
            packages_per_wg: 4,
            overall_runs: 25,
            warmup_runs: 5,
            check: true,
            seed: 42,
            hbar: DEFAULT_HBAR,
            dt: DEFAULT_DT,
            accumulation: Seed::FromOutput,
        }
    }
}

impl BenchConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    #[must_use]
    pub fn with_num(mut self, num: usize) -> Self {
        self.num = num;
        self
    }

    #[must_use]
    pub fn with_vec_len(mut self, vec_len: usize) -> Self {
        self.vec_len = vec_len;
        self
    }

    #[must_use]
    pub fn with_packages_per_wg(mut self, packages: usize) -> Self {
        self.packages_per_wg = packages;
        self
    }

    /// Set total and warm-up invocation counts.
    #[must_use]
    pub fn with_runs(mut self, overall_runs: usize, warmup_runs: usize) -> Self {
        self.overall_runs = overall_runs;
        self.warmup_runs = warmup_runs;
        self
    }

    #[must_use]
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_accumulation(mut self, accumulation: Seed) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// Set `ħ` and `dt`.
    #[must_use]
    pub fn with_constants(mut self, hbar: Real, dt: Real) -> Self {
        self.hbar = hbar;
        self.dt = dt;
        self
    }

    /// Factor a pre-scaled Hamiltonian is multiplied by.
    pub fn scale_factor(&self) -> Real {
        self.dt / self.hbar
    }

    /// Reject configurations that cannot be benchmarked.
    ///
    /// Called before anything is allocated or timed.
    pub fn validate(&self) -> Result<()> {
        if self.warmup_runs > self.overall_runs {
            return Err(Error::Config(format!(
                "warm-up runs ({}) exceed overall runs ({})",
                self.warmup_runs, self.overall_runs
            )));
        }
        if self.dim == 0 || self.num == 0 {
            return Err(Error::Config(format!(
                "empty problem: dim={}, num={}",
                self.dim, self.num
            )));
        }
        if self.packages_per_wg == 0 {
            return Err(Error::Config("packages per work-group must be positive".into()));
        }
        check_packaging(self.num, self.vec_len).map_err(|e| Error::Config(e.to_string()))?;
        if self.hbar == 0.0 || !self.hbar.is_finite() || !self.dt.is_finite() {
            return Err(Error::Config(format!(
                "invalid constants: hbar={}, dt={}",
                self.hbar, self.dt
            )));
        }
        Ok(())
    }
}
