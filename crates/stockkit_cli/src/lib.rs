//! `stockkit_cli` v1:
//! Command-line front end for the inventory filter.
//!
//! This is the only crate that touches the filesystem: it reads the input
//! workbook, runs the in-memory pipeline and writes the result file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use stockkit_inventory::conf::{
    N_DAYS_AVAILABLE_INCOMING_MAX, N_DAYS_AVAILABLE_MAX, N_ROWS_SKIP_LEADING, N_SALES_MULTIPLIER,
};
use stockkit_inventory::{
    C_FILE_NAME_OUT, ReportInventory, SpecFilterThresholds, SpecInventoryFilterOptions,
    filter_inventory_bytes,
};
use stockkit_log::C_LOG_LEVEL_DEFAULT;
use tracing::info;

/// Filter an inventory export down to SKUs that need replenishment review.
#[derive(Parser, Debug, Clone)]
#[command(name = "stockkit", version, about)]
pub struct Args {
    /// Inventory export workbook (first sheet is read).
    pub input: PathBuf,

    /// Directory receiving the filtered workbook.
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Output file name.
    #[arg(long = "file-name", value_name = "NAME", default_value = C_FILE_NAME_OUT)]
    pub file_name: String,

    /// Non-blank rows preceding the header row; blank leading rows are ignored.
    #[arg(long = "skip-rows", value_name = "N", default_value_t = N_ROWS_SKIP_LEADING)]
    pub skip_rows: usize,

    /// Upper bound for FBA available days.
    #[arg(long = "days-available-max", value_name = "X", default_value_t = N_DAYS_AVAILABLE_MAX)]
    pub days_available_max: f64,

    /// Upper bound for FBA available plus inbound days.
    #[arg(long = "days-incoming-max", value_name = "X", default_value_t = N_DAYS_AVAILABLE_INCOMING_MAX)]
    pub days_incoming_max: f64,

    /// Multiplier on the larger daily-sales average.
    #[arg(long = "sales-multiplier", value_name = "X", default_value_t = N_SALES_MULTIPLIER)]
    pub sales_multiplier: f64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long = "log-level", value_name = "LEVEL", default_value = C_LOG_LEVEL_DEFAULT)]
    pub log_level: String,
}

impl Args {
    /// Filter options derived from the command line.
    pub fn to_filter_options(&self) -> SpecInventoryFilterOptions {
        SpecInventoryFilterOptions {
            n_rows_skip_leading: self.skip_rows,
            thresholds: SpecFilterThresholds {
                days_available_max: self.days_available_max,
                days_available_incoming_max: self.days_incoming_max,
                sales_multiplier: self.sales_multiplier,
            },
            ..Default::default()
        }
    }

    /// Destination path; the file name must be a bare name.
    pub fn path_file_out(&self) -> Result<PathBuf> {
        let path_name = Path::new(&self.file_name);
        ensure!(
            !self.file_name.is_empty()
                && path_name.file_name().is_some_and(|name| name == path_name.as_os_str()),
            "--file-name must be a plain file name, got '{}'",
            self.file_name
        );
        Ok(self.out_dir.join(path_name))
    }
}

/// Run one filter invocation; returns the written path and the run report.
///
/// Nothing is written unless the whole workbook was filtered and serialized.
pub fn run(args: &Args) -> Result<(PathBuf, ReportInventory)> {
    let path_file_out = args.path_file_out()?;

    let v_bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read input workbook {}", args.input.display()))?;
    info!(path = %args.input.display(), n_bytes = v_bytes.len(), "input loaded");

    let output = filter_inventory_bytes(&v_bytes, &args.to_filter_options())
        .with_context(|| format!("failed to filter {}", args.input.display()))?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {}", args.out_dir.display()))?;
    fs::write(&path_file_out, &output.v_bytes)
        .with_context(|| format!("failed to write {}", path_file_out.display()))?;
    info!(path = %path_file_out.display(), "output written");

    Ok((path_file_out, output.report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["stockkit", "export.xlsx"]).expect("parse");
        assert_eq!(args.input, PathBuf::from("export.xlsx"));
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.file_name, C_FILE_NAME_OUT);
        assert_eq!(args.skip_rows, 1);
        assert_eq!(args.log_level, "info");

        let options = args.to_filter_options();
        assert_eq!(options.thresholds, SpecFilterThresholds::default());
        assert_eq!(options.n_rows_skip_leading, 1);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "stockkit",
            "export.xlsx",
            "-o",
            "out",
            "--file-name",
            "picked.xlsx",
            "--skip-rows",
            "0",
            "--days-available-max",
            "14",
            "--days-incoming-max",
            "30.5",
            "--sales-multiplier",
            "3",
        ])
        .expect("parse");

        let options = args.to_filter_options();
        assert_eq!(options.n_rows_skip_leading, 0);
        assert_eq!(options.thresholds.days_available_max, 14.0);
        assert_eq!(options.thresholds.days_available_incoming_max, 30.5);
        assert_eq!(options.thresholds.sales_multiplier, 3.0);
        assert_eq!(
            args.path_file_out().expect("path"),
            PathBuf::from("out").join("picked.xlsx")
        );
    }

    #[test]
    fn test_args_require_input() {
        assert!(Args::try_parse_from(["stockkit"]).is_err());
        assert!(Args::try_parse_from(["stockkit", "a.xlsx", "--skip-rows", "-1"]).is_err());
    }

    #[test]
    fn test_path_file_out_rejects_nested_names() {
        let args = Args::try_parse_from(["stockkit", "a.xlsx", "--file-name", "../x.xlsx"])
            .expect("parse");
        assert!(args.path_file_out().is_err());
    }
}
