//! `stockkit_io_xlsx` v1:
//! Tabular I/O kernel for spreadsheet workbooks.
//!
//! Modules:
//! - `conf`   : constants and default presets
//! - `spec`   : table/cell models and options
//! - `util`   : pure helper functions
//! - `reader` : first-sheet grid reader
//! - `writer` : single-table workbook writer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
pub use reader::{XlsxReadError, read_first_sheet_grid, read_first_sheet_grid_from_path};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecSheetSlice, SpecTable, SpecXlsxReport, SpecXlsxWriteOptions,
};
pub use util::{convert_cell_value, create_sheet_identifier, plan_sheet_slices, sanitize_sheet_name};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter};
