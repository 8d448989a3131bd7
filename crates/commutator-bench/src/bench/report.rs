//! Tab-separated results stream.

use super::harness::VariantReport;
use super::statistics::Statistics;
use crate::error::Result;
use std::io::Write;

/// Writes one header line and one row per [`VariantReport`].
///
/// Values use C-style scientific notation (`1.234500e-03`); absent values
/// are written as `NA`.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    out: W,
    build_time: bool,
}

impl<W: Write> ReportWriter<W> {
    /// Writer without a `build_time` column.
    pub fn new(out: W) -> Self {
        Self {
            out,
            build_time: false,
        }
    }

    /// Add a `build_time` column, for backends that compile kernels.
    #[must_use]
    pub fn with_build_time(mut self) -> Self {
        self.build_time = true;
        self
    }

    pub fn write_header(&mut self) -> Result<()> {
        let mut line = String::from("name");
        for column in Statistics::COLUMNS {
            line.push('\t');
            line.push_str(column);
        }
        line.push_str("\tresult_deviation");
        if self.build_time {
            line.push_str("\tbuild_time");
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    pub fn write_row(&mut self, report: &VariantReport) -> Result<()> {
        let stats = &report.statistics;
        let mut line = format!("{}\t{}", report.name, stats.count);
        for value in &stats.values()[1..] {
            line.push('\t');
            line.push_str(&scientific(*value));
        }
        line.push('\t');
        line.push_str(&optional(report.deviation.map(f64::from)));
        if self.build_time {
            line.push('\t');
            line.push_str(&optional(report.build_time.map(|t| t.as_secs_f64())));
        }
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), scientific)
}

/// `x` as `d.dddddde±XX`.
pub fn scientific(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string().to_lowercase();
    }
    let formatted = format!("{x:.6e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}
