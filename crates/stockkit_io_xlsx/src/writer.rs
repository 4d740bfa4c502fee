//! XLSX writer kernel that renders in-memory tables into workbook output.

use std::collections::BTreeSet;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, derive_default_xlsx_formats};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecSheetSlice, SpecTable, SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{
    convert_cell_value, derive_duplicate_columns_message, plan_sheet_slices, sanitize_sheet_name,
};

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Number of frozen columns.
    pub col_freeze: usize,
    /// Frozen row index; defaults to header height when `None`.
    pub row_freeze: Option<usize>,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

/// Stateful workbook writer.
///
/// Sheets are buffered in memory; call [`Self::save_to_buffer`] once all
/// sheets are written.
pub struct XlsxWriter {
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_integer: SpecCellFormat,
    fmt_decimal: SpecCellFormat,
    fmt_header: SpecCellFormat,
    fmt_date: SpecCellFormat,
    fmt_datetime: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
}

impl XlsxWriter {
    /// Create writer with explicit format presets.
    ///
    /// Date cells use `fmt_date` when they hold whole days and `fmt_datetime`
    /// otherwise, regardless of their column.
    pub fn new(
        fmt_text: SpecCellFormat,
        fmt_integer: SpecCellFormat,
        fmt_decimal: SpecCellFormat,
        fmt_header: SpecCellFormat,
        (fmt_date, fmt_datetime): (SpecCellFormat, SpecCellFormat),
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_text,
            fmt_integer,
            fmt_decimal,
            fmt_header,
            fmt_date,
            fmt_datetime,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
        }
    }

    /// Create writer from [`derive_default_xlsx_formats`] presets.
    pub fn with_default_formats(write_options: SpecXlsxWriteOptions) -> Result<Self, String> {
        let dict_default_fmts = derive_default_xlsx_formats();
        let fetch_fmt = |key: &str| {
            dict_default_fmts
                .get(key)
                .cloned()
                .ok_or_else(|| format!("Missing default format: {key}"))
        };
        Ok(Self::new(
            fetch_fmt("text")?,
            fetch_fmt("integer")?,
            fetch_fmt("decimal")?,
            fetch_fmt("header")?,
            (fetch_fmt("date")?, fetch_fmt("datetime")?),
            write_options,
        ))
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Serialize workbook into an in-memory xlsx buffer.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, String> {
        self.workbook
            .save_to_buffer()
            .map_err(derive_xlsx_error_text)
    }

    /// Write one table as a sheet (header row + data rows).
    ///
    /// Tables taller/wider than Excel limits are split into suffixed sheets.
    pub fn write_sheet_from_table(
        &mut self,
        table: &SpecTable,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        validate_policy_autofit(&options.policy_autofit)?;

        let l_colnames = table.columns();
        let n_width_table = table.width();
        let n_height_table = table.height();
        let n_rows_header = 1usize;

        let mut report = SpecXlsxReport::default();
        if let Some(c_msg) = derive_duplicate_columns_message(l_colnames) {
            report.warn(c_msg);
        }

        let l_cols_idx_numeric = if self.write_options.infer_numeric_cols {
            derive_numeric_column_indices(table)
        } else {
            vec![]
        };
        let l_cols_idx_integer = if self.write_options.infer_integer_cols {
            derive_integer_column_indices(table, &l_cols_idx_numeric)
        } else {
            vec![]
        };

        let l_sheet_parts = plan_sheet_slices(
            n_height_table,
            n_width_table,
            n_rows_header,
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        )?;

        let n_row_freeze = options.row_freeze.unwrap_or(n_rows_header);
        let if_autofit_columns = !matches!(
            options.policy_autofit.rule_columns,
            EnumAutofitColumnsRule::None
        );

        let fmt_header = derive_rust_xlsx_format(&self.fmt_header);
        let fmt_date =
            derive_rust_xlsx_format(&self.fmt_date.merge(&self.write_options.base_format_patch));
        let fmt_datetime = derive_rust_xlsx_format(
            &self.fmt_datetime.merge(&self.write_options.base_format_patch),
        );

        for sheet_slice in l_sheet_parts {
            let n_col_start = sheet_slice.col_start_inclusive;
            let n_col_end = sheet_slice.col_end_exclusive;
            let l_cols_idx_numeric_slice =
                derive_slice_indices(&l_cols_idx_numeric, n_col_start, n_col_end);
            let l_cols_idx_integer_slice =
                derive_slice_indices(&l_cols_idx_integer, n_col_start, n_col_end);

            let l_fmt_data_by_col: Vec<Format> = self
                .plan_column_formats(
                    n_col_end - n_col_start,
                    &l_cols_idx_numeric_slice,
                    &l_cols_idx_integer_slice,
                )
                .iter()
                .map(derive_rust_xlsx_format)
                .collect();

            // Everything read from `self` is planned before the worksheet
            // borrows the workbook mutably.
            let sheet_name_unique = self.derive_unique_sheet_name(&sheet_slice.sheet_name);
            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&sheet_name_unique)
                .map_err(derive_xlsx_error_text)?;

            let l_header_slice = &l_colnames[n_col_start..n_col_end];
            let mut l_width_by_col_header = vec![0usize; l_fmt_data_by_col.len()];
            let mut l_width_by_col_body = vec![0usize; l_fmt_data_by_col.len()];

            if if_autofit_columns {
                for (n_idx_col, c_name) in l_header_slice.iter().enumerate() {
                    l_width_by_col_header[n_idx_col] = estimate_unicode_string_width(c_name);
                }
            }

            write_header(worksheet, l_header_slice, &fmt_header)?;

            worksheet
                .set_freeze_panes(
                    cast_row_num(n_row_freeze)?,
                    cast_col_num(options.col_freeze)?,
                )
                .map_err(derive_xlsx_error_text)?;

            let set_cols_idx_integer: BTreeSet<usize> =
                l_cols_idx_integer_slice.iter().copied().collect();

            let n_rows_autofit_max = options
                .policy_autofit
                .height_body_inferred_max
                .unwrap_or(usize::MAX);
            let l_rows_slice =
                &table.rows()[sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive];

            for (n_row_local, row) in l_rows_slice.iter().enumerate() {
                let if_measure_row = if_autofit_columns && n_row_local < n_rows_autofit_max;
                for (n_idx_col, value_raw) in row[n_col_start..n_col_end].iter().enumerate() {
                    let if_is_integer_col = set_cols_idx_integer.contains(&n_idx_col);
                    let value = convert_cell_value(value_raw);

                    if if_measure_row {
                        l_width_by_col_body[n_idx_col] = usize::max(
                            l_width_by_col_body[n_idx_col],
                            estimate_width_len(&value, if_is_integer_col),
                        );
                    }

                    let fmt_cell = match &value {
                        EnumCellValue::DateTime(n) if n.fract() == 0.0 => &fmt_date,
                        EnumCellValue::DateTime(_) => &fmt_datetime,
                        _ => &l_fmt_data_by_col[n_idx_col],
                    };
                    write_cell_with_format(
                        worksheet,
                        n_rows_header + n_row_local,
                        n_idx_col,
                        &value,
                        fmt_cell,
                    )?;
                }
            }

            if if_autofit_columns {
                let n_min = usize::max(1, options.policy_autofit.width_cell_min);
                let n_max = usize::min(
                    255,
                    usize::max(n_min, options.policy_autofit.width_cell_max),
                );
                let n_pad = options.policy_autofit.width_cell_padding;

                for n_idx_col in 0..l_fmt_data_by_col.len() {
                    let n_width_recorded = match options.policy_autofit.rule_columns {
                        EnumAutofitColumnsRule::Body => l_width_by_col_body[n_idx_col],
                        EnumAutofitColumnsRule::All => usize::max(
                            l_width_by_col_header[n_idx_col],
                            l_width_by_col_body[n_idx_col],
                        ),
                        EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::None => {
                            l_width_by_col_header[n_idx_col]
                        }
                    };
                    let n_width_final =
                        usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad));
                    worksheet
                        .set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)
                        .map_err(derive_xlsx_error_text)?;
                }
            }

            report.sheets.push(SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..sheet_slice
            });
        }

        self.l_reports.push(report);
        Ok(())
    }

    /// Per-column formats for one sheet slice: integer, decimal or text base,
    /// each overlaid with the writer-wide patch.
    fn plan_column_formats(
        &self,
        width_data: usize,
        cols_idx_numeric: &[usize],
        cols_idx_integer: &[usize],
    ) -> Vec<SpecCellFormat> {
        (0..width_data)
            .map(|col_idx| {
                let fmt_base = if cols_idx_integer.contains(&col_idx) {
                    &self.fmt_integer
                } else if cols_idx_numeric.contains(&col_idx) {
                    &self.fmt_decimal
                } else {
                    &self.fmt_text
                };
                fmt_base.merge(&self.write_options.base_format_patch)
            })
            .collect()
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

/// Estimate displayed width units for one normalized cell value.
///
/// Used by autofit inference logic.
pub fn estimate_width_len(value: &EnumCellValue, if_is_integer_col: bool) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::DateTime(n) if n.fract() == 0.0 => "yyyy-mm-dd".len(),
        EnumCellValue::DateTime(_) => "yyyy-mm-dd hh:mm:ss".len(),
        EnumCellValue::Number(n) => {
            if if_is_integer_col || n.fract() == 0.0 {
                format!("{n:.0}").len()
            } else {
                format!("{n:.2}").len()
            }
        }
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// A column is numeric when it holds at least one number and every non-blank
/// cell is a number. Text and date cells keep the text format.
fn derive_numeric_column_indices(table: &SpecTable) -> Vec<usize> {
    (0..table.width())
        .filter(|n_idx| {
            let mut if_has_number = false;
            for row in table.rows() {
                match &row[*n_idx] {
                    EnumCellValue::Number(_) => if_has_number = true,
                    value if value.is_blank() => {}
                    _ => return false,
                }
            }
            if_has_number
        })
        .collect()
}

fn derive_integer_column_indices(table: &SpecTable, cols_idx_numeric: &[usize]) -> Vec<usize> {
    cols_idx_numeric
        .iter()
        .copied()
        .filter(|n_idx| {
            table.rows().iter().all(|row| match row[*n_idx] {
                EnumCellValue::Number(n_value) => n_value.is_finite() && n_value.fract() == 0.0,
                _ => true,
            })
        })
        .collect()
}

fn derive_slice_indices(
    indices: &[usize],
    col_start_inclusive: usize,
    col_end_exclusive: usize,
) -> Vec<usize> {
    indices
        .iter()
        .filter(|idx| **idx >= col_start_inclusive && **idx < col_end_exclusive)
        .map(|idx| *idx - col_start_inclusive)
        .collect()
}

fn write_header(
    worksheet: &mut Worksheet,
    header: &[String],
    fmt_header: &Format,
) -> Result<(), String> {
    for (col_idx, cell_value) in header.iter().enumerate() {
        if cell_value.is_empty() {
            worksheet
                .write_blank(0, cast_col_num(col_idx)?, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        } else {
            worksheet
                .write_string_with_format(0, cast_col_num(col_idx)?, cell_value, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) if val.is_empty() => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) | EnumCellValue::DateTime(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    for c_align in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(c_align) {
            format = format.set_align(align);
        }
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = spec.border
        && val > 0
    {
        format = format.set_border(FormatBorder::Thin);
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        "bottom" => Some(FormatAlign::Bottom),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
