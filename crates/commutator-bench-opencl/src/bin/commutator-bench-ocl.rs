//! Device benchmark: every OpenCL kernel, timed with profiling events.
//!
//! ```bash
//! commutator-bench-ocl --device-type gpu --dim 7 --num 8192 -d results.tsv
//! commutator-bench-ocl --device-type accelerator --prefetch-level 2
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use commutator_bench::bench::{Harness, ReportWriter};
use commutator_bench::cli::BenchArgs;
use commutator_bench::kernels::Seed;
use commutator_bench::types::REAL_C_NAME;
use commutator_bench::ExecutionBackend;
use commutator_bench_opencl::{init_global_context, BuildOptions, DeviceKind, OclBackend};

/// Batched commutator kernel benchmark (OpenCL backend)
#[derive(Parser, Debug)]
#[command(name = "commutator-bench-ocl")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    bench: BenchArgs,

    /// Device type: any, gpu, cpu or accelerator
    #[arg(long, default_value = "any")]
    device_type: DeviceKind,

    /// Compiler prefetch level for accelerator devices
    #[arg(long)]
    prefetch_level: Option<u32>,

    /// Work-items per chunk for GPU kernels
    #[arg(long, requires = "num_sub_groups")]
    chunk_size: Option<usize>,

    /// Sub-groups per work-group for GPU kernels
    #[arg(long, requires = "chunk_size")]
    num_sub_groups: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.bench.init_logging().context("failed to set up logging")?;
    tracing::info!(real = REAL_C_NAME, "build configuration");

    let config = cli.bench.config();
    let ctx = init_global_context(cli.device_type).context("failed to open an OpenCL device")?;
    tracing::info!(
        platform = ctx.platform_name(),
        device = ctx.device_name(),
        fp64 = ctx.supports_fp64(),
        "device"
    );

    let mut options = BuildOptions::new(config.num, config.dim, config.vec_len, config.packages_per_wg)
        .with_prefetch_level(cli.prefetch_level)
        .with_init_zero(config.accumulation == Seed::Zero);
    if let (Some(chunk), Some(groups)) = (cli.chunk_size, cli.num_sub_groups) {
        options = options.with_chunking(chunk, groups);
    }

    let backend = OclBackend::new(ctx, options);
    let mut harness = Harness::new(config, backend).context("invalid benchmark configuration")?;
    let kernels = cli.bench.select(harness.backend().kernels())?;

    let mut writer = ReportWriter::new(cli.bench.data_sink()?).with_build_time();
    writer.write_header()?;
    harness.run_all(&kernels, |report| writer.write_row(report))?;
    Ok(())
}
