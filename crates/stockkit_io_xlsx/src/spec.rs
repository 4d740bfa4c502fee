//! Shared table, cell and write-option models.

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Normalized cell value shared by the reader, the writer and table consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Date or date-time as an Excel serial (days since 1899-12-30).
    DateTime(f64),
}

impl EnumCellValue {
    /// Empty string value used for visually blank cells.
    pub fn blank() -> Self {
        EnumCellValue::String(String::new())
    }

    /// True for missing cells and for empty/whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            EnumCellValue::None => true,
            EnumCellValue::String(s) => s.trim().is_empty(),
            EnumCellValue::Number(_) | EnumCellValue::DateTime(_) => false,
        }
    }

    /// Numeric view of the cell. Text is parsed after trimming; dates yield
    /// their serial.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EnumCellValue::Number(n) | EnumCellValue::DateTime(n) => Some(*n),
            EnumCellValue::String(s) => s.trim().parse::<f64>().ok(),
            EnumCellValue::None => None,
        }
    }

    /// Render the value as header/label text.
    ///
    /// Integral numbers drop their fractional part (`2024.0` -> `"2024"`).
    pub fn to_label(&self) -> String {
        match self {
            EnumCellValue::None => String::new(),
            EnumCellValue::String(s) => s.clone(),
            EnumCellValue::Number(n) | EnumCellValue::DateTime(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Table

/// In-memory table: ordered column names plus row-major cells.
///
/// Column names may repeat. Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    columns: Vec<String>,
    rows: Vec<Vec<EnumCellValue>>,
}

impl SpecTable {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, validating that every row matches the column count.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<EnumCellValue>>,
    ) -> Result<Self, String> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order.
    pub fn rows(&self) -> &[Vec<EnumCellValue>] {
        &self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (header excluded).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Append one row.
    pub fn push_row(&mut self, row: Vec<EnumCellValue>) -> Result<(), String> {
        if row.len() != self.columns.len() {
            return Err(format!(
                "Row width mismatch: expected {}, got {}.",
                self.columns.len(),
                row.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append one row where every cell is an empty string.
    pub fn push_blank_row(&mut self) {
        self.rows.push(vec![EnumCellValue::blank(); self.columns.len()]);
    }

    /// Mutable access to every cell, row by row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut EnumCellValue> {
        self.rows.iter_mut().flat_map(|row| row.iter_mut())
    }

    /// Indices of every column whose name equals `name`.
    pub fn find_column_indices(&self, name: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(n_idx, c_name)| (c_name == name).then_some(n_idx))
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields inherit from the base format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment (`left`, `center`, `right`).
    pub align: Option<String>,
    /// Vertical alignment (`top`, `vcenter`, `bottom`).
    pub valign: Option<String>,
    /// Thin border on all sides when `> 0`.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,
    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only (default).
    #[default]
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells.
    All,
}

/// Autofit policy for per-sheet write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options controlling value conversion and formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Infer numeric columns from cell values.
    pub infer_numeric_cols: bool,
    /// Infer integer subset from numeric columns.
    pub infer_integer_cols: bool,
    /// Base patch merged into all per-column formats.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            infer_numeric_cols: true,
            infer_integer_cols: true,
            base_format_patch: SpecCellFormat {
                border: Some(0),
                ..Default::default()
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Concrete sheet part emitted to workbook (after Excel-limit slicing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
    /// Inclusive source column start.
    pub col_start_inclusive: usize,
    /// Exclusive source column end.
    pub col_end_exclusive: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet slices produced by the write call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{EnumCellValue, SpecCellFormat, SpecTable};

    #[test]
    fn test_cell_value_blank_and_numeric_views() {
        assert!(EnumCellValue::None.is_blank());
        assert!(EnumCellValue::String("  ".to_string()).is_blank());
        assert!(!EnumCellValue::Number(0.0).is_blank());

        assert_eq!(EnumCellValue::String(" 12.5 ".to_string()).as_f64(), Some(12.5));
        assert_eq!(EnumCellValue::String("abc".to_string()).as_f64(), None);
        assert_eq!(EnumCellValue::None.as_f64(), None);
    }

    #[test]
    fn test_cell_value_to_label_drops_integral_fraction() {
        assert_eq!(EnumCellValue::Number(2024.0).to_label(), "2024");
        assert_eq!(EnumCellValue::Number(1.5).to_label(), "1.5");
        assert_eq!(EnumCellValue::None.to_label(), "");
    }

    #[test]
    fn test_cell_format_merge_prefers_patch_fields() {
        let fmt_base = SpecCellFormat {
            font_size: Some(11),
            num_format: Some("0".to_string()),
            ..Default::default()
        };
        let fmt = fmt_base.with_(SpecCellFormat {
            num_format: Some("0.00".to_string()),
            bold: Some(true),
            ..Default::default()
        });
        assert_eq!(fmt.font_size, Some(11));
        assert_eq!(fmt.num_format.as_deref(), Some("0.00"));
        assert_eq!(fmt.bold, Some(true));
    }

    #[test]
    fn test_table_rejects_ragged_rows_and_keeps_duplicate_names() {
        let mut table = SpecTable::new(vec!["A".to_string(), "A".to_string()]);
        assert!(table.push_row(vec![EnumCellValue::Number(1.0)]).is_err());
        table
            .push_row(vec![EnumCellValue::Number(1.0), EnumCellValue::None])
            .expect("push row");
        table.push_blank_row();

        assert_eq!(table.height(), 2);
        assert_eq!(table.find_column_indices("A"), vec![0, 1]);
        assert!(table.rows()[1].iter().all(EnumCellValue::is_blank));
    }
}
