//! Host benchmark: every kernel variant on the CPU, timed in-process.
//!
//! ```bash
//! commutator-bench --dim 7 --num 8192 --vec-len 4 -r 25 -w 5 -d results.tsv
//! RUST_LOG=debug commutator-bench --variant aosoa_constants_direct_perm
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use commutator_bench::bench::{Harness, ReportWriter};
use commutator_bench::cli::BenchArgs;
use commutator_bench::types::REAL_C_NAME;
use commutator_bench::{DirectBackend, ExecutionBackend};

/// Batched commutator kernel benchmark (host backend)
#[derive(Parser, Debug)]
#[command(name = "commutator-bench")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    bench: BenchArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.bench.init_logging().context("failed to set up logging")?;

    tracing::info!(
        real = REAL_C_NAME,
        parallel = cfg!(feature = "parallel"),
        "build configuration"
    );

    let config = cli.bench.config();
    let backend = DirectBackend::new(config.accumulation);
    let mut harness = Harness::new(config, backend).context("invalid benchmark configuration")?;
    let kernels = cli.bench.select(harness.backend().kernels())?;

    let mut writer = ReportWriter::new(cli.bench.data_sink()?);
    writer.write_header()?;
    harness.run_all(&kernels, |report| writer.write_row(report))?;
    Ok(())
}
