//! `stockkit_inventory` v1:
//! Inventory export filter kernel.
//!
//! Modules:
//! - `conf`     : column names, thresholds and file-name presets
//! - `spec`     : options, verdicts and error types
//! - `report`   : run-time report model
//! - `header`   : header promotion and positional facility rename
//! - `fill`     : missing-value normalization
//! - `filter`   : SKU grouping and threshold predicate
//! - `pipeline` : workbook bytes in, workbook bytes out
pub mod conf;
pub mod fill;
pub mod filter;
pub mod header;
pub mod pipeline;
pub mod report;
pub mod spec;

pub use conf::{
    C_COL_DAYS_AVAILABLE, C_COL_DAYS_AVAILABLE_INCOMING, C_COL_SALES_2D, C_COL_SALES_7D,
    C_COL_SKU, C_COL_STOCK_PA, C_COL_STOCK_STL, C_FILE_NAME_OUT, TUP_COLS_REQUIRED,
};
pub use fill::fill_missing_with_zero;
pub use filter::{SpecFilterOutcome, filter_table};
pub use header::{normalize_header, rename_facility_columns, resolve_required_columns};
pub use pipeline::{
    SpecInventoryOutput, filter_inventory_bytes, filter_inventory_grid, write_inventory_table,
};
pub use report::ReportInventory;
pub use spec::{
    InventoryError, MalformedInputError, SpecFilterThresholds, SpecGroupVerdict,
    SpecInventoryFilterOptions, SpecRequiredColumns,
};
