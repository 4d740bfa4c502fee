//! Column names, threshold defaults and output presets.
//!
//! Column labels are kept in Chinese to match the inventory exports.

/// Product key column; rows are grouped by it.
pub const C_COL_SKU: &str = "SKU";
/// FBA available days.
pub const C_COL_DAYS_AVAILABLE: &str = "FBA可用天数";
/// FBA available plus inbound days.
pub const C_COL_DAYS_AVAILABLE_INCOMING: &str = "FBA可用+入库天数";
/// Average daily sales over the last 7 days.
pub const C_COL_SALES_7D: &str = "近7天日均销量";
/// Average daily sales over the last 2 days.
pub const C_COL_SALES_2D: &str = "近2天日均销量";

/// Raw header of the STL overseas warehouse (appears twice in exports).
pub const C_FACILITY_STL: &str = "易捷快递:STL-Warehouse";
/// Raw header of the PA overseas warehouse (appears twice in exports).
pub const C_FACILITY_PA: &str = "易捷快递:PA Warehouse";
/// Facilities whose duplicated headers are renamed positionally.
pub const TUP_FACILITIES: [&str; 2] = [C_FACILITY_STL, C_FACILITY_PA];
/// Suffix for the first occurrence: current stock.
pub const C_SUFFIX_STOCK: &str = "-海外仓库存";
/// Suffix for later occurrences: in-transit stock.
pub const C_SUFFIX_IN_TRANSIT: &str = "-海外仓在途库存";

/// Current stock at the STL warehouse (after rename).
pub const C_COL_STOCK_STL: &str = "易捷快递:STL-Warehouse-海外仓库存";
/// Current stock at the PA warehouse (after rename).
pub const C_COL_STOCK_PA: &str = "易捷快递:PA Warehouse-海外仓库存";
/// In-transit stock to the STL warehouse (after rename).
pub const C_COL_IN_TRANSIT_STL: &str = "易捷快递:STL-Warehouse-海外仓在途库存";
/// In-transit stock to the PA warehouse (after rename).
pub const C_COL_IN_TRANSIT_PA: &str = "易捷快递:PA Warehouse-海外仓在途库存";

/// Columns that must exist exactly once after header normalization.
pub const TUP_COLS_REQUIRED: [&str; 7] = [
    C_COL_SKU,
    C_COL_DAYS_AVAILABLE,
    C_COL_DAYS_AVAILABLE_INCOMING,
    C_COL_STOCK_STL,
    C_COL_STOCK_PA,
    C_COL_SALES_7D,
    C_COL_SALES_2D,
];

/// Inclusive upper bound for FBA available days.
pub const N_DAYS_AVAILABLE_MAX: f64 = 20.0;
/// Inclusive upper bound for FBA available plus inbound days.
pub const N_DAYS_AVAILABLE_INCOMING_MAX: f64 = 40.0;
/// Daily-sales multiplier compared against warehouse stock.
pub const N_SALES_MULTIPLIER: f64 = 5.0;

/// Worksheet rows preceding the real header row in exports.
pub const N_ROWS_SKIP_LEADING: usize = 1;

/// Fixed output workbook name.
pub const C_FILE_NAME_OUT: &str = "库存管理_筛选.xlsx";

/// Warning recorded when no group passes the filter.
pub const C_WARN_EMPTY_RESULT: &str =
    "EmptyResultWarning: no SKU group passed the filter; output holds the header only.";
