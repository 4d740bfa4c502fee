//! Workbook bytes in, filtered workbook bytes out.
//!
//! No filesystem access happens here; callers decide where bytes come from and
//! where the output lands.

use stockkit_io_xlsx::{EnumCellValue, SpecTable, XlsxWriter, read_first_sheet_grid};
use tracing::{debug, info, warn};

use crate::conf::C_WARN_EMPTY_RESULT;
use crate::fill::fill_missing_with_zero;
use crate::filter::{SpecFilterOutcome, filter_table};
use crate::header::normalize_header;
use crate::report::ReportInventory;
use crate::spec::{InventoryError, MalformedInputError, SpecGroupVerdict, SpecInventoryFilterOptions};

/// Result of a full bytes-to-bytes run.
#[derive(Debug, Clone)]
pub struct SpecInventoryOutput {
    /// Filtered table that was serialized.
    pub table: SpecTable,
    /// Verdict for every SKU group, in first-seen order.
    pub verdicts: Vec<SpecGroupVerdict>,
    /// Serialized single-sheet xlsx workbook.
    pub v_bytes: Vec<u8>,
    /// Run counters and warnings.
    pub report: ReportInventory,
}

/// Normalize, zero-fill and filter a raw worksheet grid.
pub fn filter_inventory_grid(
    l_grid: Vec<Vec<EnumCellValue>>,
    options: &SpecInventoryFilterOptions,
) -> Result<(SpecFilterOutcome, ReportInventory), InventoryError> {
    options
        .thresholds
        .validate()
        .map_err(InventoryError::InvalidOptions)?;

    let mut table = normalize_header(l_grid, options.n_rows_skip_leading)?;
    debug!(
        n_cols = table.width(),
        n_rows = table.height(),
        "header normalized"
    );

    let cnt_cells_filled = fill_missing_with_zero(&mut table);
    let outcome = filter_table(&table, &options.thresholds)?;

    let mut report = ReportInventory {
        cnt_rows_in: table.height() as u64,
        cnt_cells_filled: cnt_cells_filled as u64,
        cnt_groups: outcome.verdicts.len() as u64,
        cnt_groups_accepted: outcome.cnt_groups_accepted() as u64,
        cnt_rows_out: outcome.table.height() as u64,
        warnings: Vec::new(),
    };
    if report.cnt_groups_accepted == 0 {
        warn!(cnt_groups = report.cnt_groups, "{C_WARN_EMPTY_RESULT}");
        report.add_warning(C_WARN_EMPTY_RESULT);
    }

    Ok((outcome, report))
}

/// Serialize a filtered table into a single-sheet workbook buffer.
///
/// Writer warnings (sheet splits, duplicate column names) are merged into
/// `report`.
pub fn write_inventory_table(
    table: &SpecTable,
    options: &SpecInventoryFilterOptions,
    report: &mut ReportInventory,
) -> Result<Vec<u8>, InventoryError> {
    let mut writer = XlsxWriter::with_default_formats(options.write_options.clone())
        .map_err(InventoryError::Write)?;
    writer
        .write_sheet_from_table(table, &options.sheet_name_out, &options.sheet_write_options)
        .map_err(InventoryError::Write)?;

    for report_xlsx in writer.report() {
        if report_xlsx.sheets.len() > 1 {
            warn!(n_sheets = report_xlsx.sheets.len(), "output split across sheets");
        }
        for c_warning in report_xlsx.warnings {
            warn!("{c_warning}");
            report.add_warning(c_warning);
        }
    }

    writer.save_to_buffer().map_err(InventoryError::Write)
}

/// Filter an uploaded workbook and return the serialized result.
///
/// Only the first worksheet is read. Any failure leaves nothing behind: the
/// output exists only in the returned buffer.
pub fn filter_inventory_bytes(
    v_bytes: &[u8],
    options: &SpecInventoryFilterOptions,
) -> Result<SpecInventoryOutput, InventoryError> {
    let l_grid = read_first_sheet_grid(v_bytes).map_err(MalformedInputError::from)?;
    let (outcome, mut report) = filter_inventory_grid(l_grid, options)?;
    let v_bytes_out = write_inventory_table(&outcome.table, options, &mut report)?;

    info!(
        rows_in = report.cnt_rows_in,
        groups = report.cnt_groups,
        accepted = report.cnt_groups_accepted,
        rows_out = report.cnt_rows_out,
        n_bytes = v_bytes_out.len(),
        "inventory filtered"
    );

    Ok(SpecInventoryOutput {
        table: outcome.table,
        verdicts: outcome.verdicts,
        v_bytes: v_bytes_out,
        report,
    })
}
