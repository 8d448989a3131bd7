use super::config::BenchConfig;
use super::init::initial_workspace;
use super::statistics::{Statistics, StatisticsAggregator};
use crate::backend::{ExecutionBackend, KernelDescriptor, PreparedKernel};
use crate::core::{commutator_reference, compare_batches};
use crate::error::{Error, Result};
use crate::transform::{scale_batch, transform_to_canonical};
use crate::types::{Real, SigmaBatch};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Name under which the reference run is reported.
pub const REFERENCE_NAME: &str = "commutator_reference";

/// Outcome of benchmarking one kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub name: String,
    pub statistics: Statistics,
    /// Largest elementwise deviation from the reference; `None` when
    /// checking is disabled.
    pub deviation: Option<Real>,
    /// Compile and load time for backends that build kernels.
    pub build_time: Option<Duration>,
}

/// Drives kernels of one backend through init, transform, warm-up,
/// measurement and comparison.
///
/// The harness is single-threaded: every invocation and transfer completes
/// before the next step starts.
pub struct Harness<B: ExecutionBackend> {
    config: BenchConfig,
    backend: B,
    /// Reference output for canonical inputs, frozen once computed.
    reference: Option<SigmaBatch>,
}

impl<B: ExecutionBackend> Harness<B> {
    /// Validate `config` and bind it to `backend`.
    pub fn new(config: BenchConfig, backend: B) -> Result<Self> {
        config.validate()?;
        info!(
            backend = backend.name(),
            dim = config.dim,
            num = config.num,
            vec_len = config.vec_len,
            overall_runs = config.overall_runs,
            warmup_runs = config.warmup_runs,
            check = config.check,
            "benchmark configuration"
        );
        Ok(Self {
            config,
            backend,
            reference: None,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Frozen reference output, once [`Harness::run_reference`] has run.
    pub fn reference(&self) -> Option<&SigmaBatch> {
        self.reference.as_ref()
    }

    /// Time the reference kernel and freeze its output.
    ///
    /// The reference runs `overall_runs` times like every variant, so its
    /// output matches theirs. Returns `None` when checking is disabled.
    pub fn run_reference(&mut self) -> Result<Option<VariantReport>> {
        if !self.config.check {
            return Ok(None);
        }
        info!(variant = REFERENCE_NAME, "running");

        let mut ws = initial_workspace(&self.config);
        let mut aggregator = StatisticsAggregator::new(self.config.overall_runs, self.config.warmup_runs);
        for _ in 0..self.config.overall_runs {
            let start = Instant::now();
            commutator_reference(&ws.sigma_in, &mut ws.sigma_out, &ws.hamiltonian, ws.hbar, ws.dt)?;
            aggregator.add(start.elapsed());
        }
        self.reference = Some(ws.sigma_out);

        let report = VariantReport {
            name: REFERENCE_NAME.to_string(),
            statistics: aggregator.finish(),
            deviation: Some(0.0),
            build_time: None,
        };
        log_report(&report);
        Ok(Some(report))
    }

    /// Benchmark one kernel.
    ///
    /// Inputs are reinitialised from the seed first, so no state leaks
    /// between kernels. With checking enabled, [`Harness::run_reference`]
    /// must have run first.
    pub fn run_variant(&mut self, kernel: &B::Kernel) -> Result<VariantReport> {
        let name = kernel.name();
        let plan = kernel.plan();
        let vec_len = self.config.vec_len;
        let factor = self.config.scale_factor();
        info!(variant = name, plan = ?plan, "running");

        // INIT
        let mut ws = initial_workspace(&self.config);

        // TRANSFORM
        plan.prepare_hamiltonian(&mut ws.hamiltonian, factor)?;
        plan.sigma.apply(&mut ws.sigma_in, vec_len)?;
        plan.sigma.apply(&mut ws.sigma_out, vec_len)?;
        let expected = match (&self.reference, self.config.check) {
            (Some(reference), true) => {
                let mut expected = reference.clone();
                if plan.scale_hamiltonian {
                    scale_batch(&mut expected, factor);
                }
                Some(expected)
            }
            (None, true) => {
                return Err(Error::Config(format!(
                    "cannot check {name}: reference not run"
                )));
            }
            (_, false) => None,
        };

        let mut prepared = self.backend.prepare(kernel, &ws)?;
        let build_time = prepared.build_time();
        if let Some(t) = build_time {
            debug!(variant = name, build_time = t.as_secs_f64(), "kernel built");
        }

        // WARMUP + MEASURE
        prepared.stage(&ws)?;
        let mut aggregator = StatisticsAggregator::new(self.config.overall_runs, self.config.warmup_runs);
        for _ in 0..self.config.overall_runs {
            aggregator.add(prepared.invoke(&mut ws)?);
        }
        prepared.retrieve(&mut ws)?;

        // COMPARE
        let deviation = match expected {
            Some(expected) => {
                transform_to_canonical(&mut ws.sigma_out)?;
                Some(compare_batches(&ws.sigma_out, &expected)?)
            }
            None => None,
        };

        let report = VariantReport {
            name: name.to_string(),
            statistics: aggregator.finish(),
            deviation,
            build_time,
        };
        log_report(&report);
        Ok(report)
    }

    /// Reference first (when checking), then every kernel in order.
    ///
    /// `sink` sees each report as soon as it exists; an error from the
    /// sink or any kernel stops the run.
    pub fn run_all<F>(&mut self, kernels: &[B::Kernel], mut sink: F) -> Result<Vec<VariantReport>>
    where
        F: FnMut(&VariantReport) -> Result<()>,
    {
        let mut reports = Vec::with_capacity(kernels.len() + 1);
        if let Some(report) = self.run_reference()? {
            sink(&report)?;
            reports.push(report);
        }
        for kernel in kernels {
            let report = self.run_variant(kernel)?;
            sink(&report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}

fn log_report(report: &VariantReport) {
    info!(
        variant = %report.name,
        samples = report.statistics.count,
        mean = report.statistics.mean,
        deviation = ?report.deviation,
        "finished"
    );
}
