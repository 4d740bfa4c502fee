//! First-sheet grid reader built on `calamine`.
//!
//! The grid is rectangular and addressed in absolute worksheet coordinates:
//! leading empty rows/columns are kept as [`EnumCellValue::None`] so row 0 of
//! the grid is always worksheet row 1.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto, open_workbook_auto_from_rs};

use crate::spec::EnumCellValue;

/// Workbook read failures.
#[derive(Debug)]
pub enum XlsxReadError {
    /// Bytes/file could not be opened or parsed as a workbook.
    Workbook(String),
    /// Workbook parsed but carries no worksheet.
    NoSheet,
}

impl fmt::Display for XlsxReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(msg) => write!(f, "Failed to read workbook: {msg}"),
            Self::NoSheet => write!(f, "Workbook contains no worksheet."),
        }
    }
}

impl std::error::Error for XlsxReadError {}

/// Read the first worksheet of an in-memory workbook into a cell grid.
///
/// The workbook format (xlsx/xlsm/xlsb/xls/ods) is detected from the bytes.
pub fn read_first_sheet_grid(v_bytes: &[u8]) -> Result<Vec<Vec<EnumCellValue>>, XlsxReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(v_bytes))
        .map_err(|err| XlsxReadError::Workbook(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(XlsxReadError::NoSheet)?
        .map_err(|err| XlsxReadError::Workbook(err.to_string()))?;
    Ok(derive_grid_from_range(&range))
}

/// Read the first worksheet of a workbook file into a cell grid.
pub fn read_first_sheet_grid_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<Vec<EnumCellValue>>, XlsxReadError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| XlsxReadError::Workbook(format!("{}: {err}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(XlsxReadError::NoSheet)?
        .map_err(|err| XlsxReadError::Workbook(err.to_string()))?;
    Ok(derive_grid_from_range(&range))
}

fn derive_grid_from_range(range: &Range<Data>) -> Vec<Vec<EnumCellValue>> {
    if range.is_empty() {
        return Vec::new();
    }

    // NOTE: `Range` rows are relative to `range.start()`, not to A1.
    let (n_row_start, n_col_start) = range.start().unwrap_or((0, 0));
    let n_row_start = n_row_start as usize;
    let n_col_start = n_col_start as usize;
    let n_width = n_col_start + range.width();

    let mut l_grid = Vec::with_capacity(n_row_start + range.height());
    for _ in 0..n_row_start {
        l_grid.push(vec![EnumCellValue::None; n_width]);
    }
    for row in range.rows() {
        let mut l_row = Vec::with_capacity(n_width);
        l_row.resize(n_col_start, EnumCellValue::None);
        l_row.extend(row.iter().map(derive_cell_value_from_data));
        l_row.resize(n_width, EnumCellValue::None);
        l_grid.push(l_row);
    }
    l_grid
}

fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty => EnumCellValue::None,
        // Error cells carry no usable value.
        Data::Error(_) => EnumCellValue::None,
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Bool(val) => EnumCellValue::String(if *val { "True" } else { "False" }.to_string()),
        Data::DateTime(val) if val.is_duration() => EnumCellValue::Number(val.as_f64()),
        Data::DateTime(val) => EnumCellValue::DateTime(val.as_f64()),
        Data::DateTimeIso(val) => EnumCellValue::String(val.clone()),
        Data::DurationIso(val) => EnumCellValue::String(val.clone()),
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::{Format, Workbook};

    use super::*;

    #[test]
    fn test_read_first_sheet_grid_keeps_absolute_coordinates() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(1, 1, "SKU").expect("write");
        worksheet.write_number(2, 1, 42.0).expect("write");
        worksheet.write_boolean(2, 2, true).expect("write");
        workbook.add_worksheet().write_string(0, 0, "ignored").expect("write");
        let v_bytes = workbook.save_to_buffer().expect("save");

        let l_grid = read_first_sheet_grid(&v_bytes).expect("read");
        assert_eq!(l_grid.len(), 3);
        assert!(l_grid.iter().all(|row| row.len() == 3));
        assert!(l_grid[0].iter().all(|cell| *cell == EnumCellValue::None));
        assert_eq!(l_grid[1][0], EnumCellValue::None);
        assert_eq!(l_grid[1][1], EnumCellValue::String("SKU".to_string()));
        assert_eq!(l_grid[2][1], EnumCellValue::Number(42.0));
        assert_eq!(l_grid[2][2], EnumCellValue::String("True".to_string()));
    }

    #[test]
    fn test_read_first_sheet_grid_keeps_date_cells_apart_from_numbers() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let fmt_date = Format::new().set_num_format("yyyy-mm-dd");
        worksheet
            .write_number_with_format(0, 0, 45444.0, &fmt_date)
            .expect("write");
        worksheet.write_number(0, 1, 45444.0).expect("write");
        let v_bytes = workbook.save_to_buffer().expect("save");

        let l_grid = read_first_sheet_grid(&v_bytes).expect("read");
        assert_eq!(l_grid[0][0], EnumCellValue::DateTime(45444.0));
        assert_eq!(l_grid[0][1], EnumCellValue::Number(45444.0));
    }

    #[test]
    fn test_read_first_sheet_grid_rejects_non_workbook_bytes() {
        let err = read_first_sheet_grid(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, XlsxReadError::Workbook(_)));
    }

    #[test]
    fn test_read_first_sheet_grid_empty_sheet_yields_empty_grid() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let v_bytes = workbook.save_to_buffer().expect("save");

        let l_grid = read_first_sheet_grid(&v_bytes).expect("read");
        assert!(l_grid.is_empty());
    }
}
