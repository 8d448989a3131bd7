//! Command-line options shared by the benchmark binaries.

use crate::backend::KernelDescriptor;
use crate::bench::BenchConfig;
use crate::error::{Error, Result};
use crate::kernels::Seed;
use clap::Args;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Benchmark options.
#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Invocations per kernel, warm-up included
    #[arg(short = 'r', long, default_value_t = 25)]
    pub runs: usize,

    /// Leading invocations whose timings are discarded
    #[arg(short = 'w', long, default_value_t = 5)]
    pub warmup_runs: usize,

    /// Matrix dimension
    #[arg(long, default_value_t = 7)]
    pub dim: usize,

    /// Number of matrices
    #[arg(long, default_value_t = 4096)]
    pub num: usize,

    /// Matrices per AoSoA package
    #[arg(long, default_value_t = 4)]
    pub vec_len: usize,

    /// AoSoA packages per device work-group
    #[arg(long, default_value_t = 4)]
    pub packages_per_wg: usize,

    /// Disable the correctness check, speeds up the benchmark
    #[arg(short = 'n', long)]
    pub no_check: bool,

    /// Start accumulate registers at zero instead of the current output
    #[arg(long)]
    pub init_zero: bool,

    /// Seed for input initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file for benchmark data (default: stdout)
    #[arg(short = 'd', long)]
    pub data_file: Option<PathBuf>,

    /// Output file for program messages (default: stderr)
    #[arg(short = 'm', long)]
    pub message_file: Option<PathBuf>,

    /// Only run kernels with these names (repeatable)
    #[arg(long = "variant")]
    pub variants: Vec<String>,
}

impl BenchArgs {
    /// Benchmark configuration described by the options.
    pub fn config(&self) -> BenchConfig {
        BenchConfig::new()
            .with_dim(self.dim)
            .with_num(self.num)
            .with_vec_len(self.vec_len)
            .with_packages_per_wg(self.packages_per_wg)
            .with_runs(self.runs, self.warmup_runs)
            .with_check(!self.no_check)
            .with_seed(self.seed)
            .with_accumulation(if self.init_zero {
                Seed::Zero
            } else {
                Seed::FromOutput
            })
    }

    /// Install the global tracing subscriber.
    ///
    /// Filter comes from `RUST_LOG`, defaulting to `info`. Messages go to
    /// the message file if one was given.
    pub fn init_logging(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match &self.message_file {
            Some(path) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(File::create(path)?))
                .try_init(),
            None => builder.with_writer(io::stderr).try_init(),
        };
        installed.map_err(|e| Error::Config(format!("logging: {e}")))
    }

    /// Where result rows go.
    pub fn data_sink(&self) -> Result<Box<dyn Write>> {
        Ok(match &self.data_file {
            Some(path) => Box::new(io::BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout()),
        })
    }

    /// Keep the kernels named by `--variant`, or all of them.
    ///
    /// Names match with or without the `commutator_` prefix; an unknown
    /// name is a configuration error.
    pub fn select<K: KernelDescriptor>(&self, kernels: Vec<K>) -> Result<Vec<K>> {
        if self.variants.is_empty() {
            return Ok(kernels);
        }
        let short = |name: &str| name.strip_prefix("commutator_").unwrap_or(name).to_string();
        let wanted: Vec<String> = self.variants.iter().map(|v| short(v.as_str())).collect();
        if let Some(unknown) = wanted
            .iter()
            .find(|w| !kernels.iter().any(|k| short(k.name()) == **w))
        {
            return Err(Error::Config(format!("unknown kernel '{unknown}'")));
        }
        Ok(kernels
            .into_iter()
            .filter(|k| wanted.contains(&short(k.name())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::Variant;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        bench: BenchArgs,
    }

    #[test]
    fn test_defaults_match_bench_config() {
        let cli = Cli::parse_from(["bench"]);
        assert_eq!(cli.bench.config(), BenchConfig::default());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "bench", "-r", "10", "-w", "2", "--dim", "3", "--num", "16", "-n", "--init-zero",
        ]);
        let cfg = cli.bench.config();
        assert_eq!((cfg.overall_runs, cfg.warmup_runs), (10, 2));
        assert_eq!((cfg.dim, cfg.num), (3, 16));
        assert!(!cfg.check);
        assert_eq!(cfg.accumulation, Seed::Zero);
    }

    #[test]
    fn test_select_filters_and_rejects_unknown() {
        let cli = Cli::parse_from(["bench", "--variant", "aos", "--variant", "commutator_manual_aosoa"]);
        let kept = cli.bench.select(Variant::ALL.to_vec()).unwrap();
        assert_eq!(kept, vec![Variant::Aos, Variant::ManualAosoa]);

        let cli = Cli::parse_from(["bench", "--variant", "nope"]);
        assert!(cli.bench.select(Variant::ALL.to_vec()).is_err());
    }
}
