//! Filter options, per-group verdicts and top-level error types.

use stockkit_io_xlsx::reader::XlsxReadError;
use stockkit_io_xlsx::{
    C_SHEET_NAME_DEFAULT, EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy,
    SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions,
};
use thiserror::Error;

use crate::conf::{
    N_DAYS_AVAILABLE_INCOMING_MAX, N_DAYS_AVAILABLE_MAX, N_ROWS_SKIP_LEADING, N_SALES_MULTIPLIER,
};

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Thresholds of the group acceptance predicate.
///
/// A group passes when some row has `0 < days_available <= days_available_max`
/// or some row has `0 < days_available_incoming <= days_available_incoming_max`,
/// and some row has `max(stock) > max(daily sales) * sales_multiplier`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecFilterThresholds {
    /// Inclusive upper bound for `FBA可用天数`.
    pub days_available_max: f64,
    /// Inclusive upper bound for `FBA可用+入库天数`.
    pub days_available_incoming_max: f64,
    /// Multiplier applied to the larger daily-sales average.
    pub sales_multiplier: f64,
}

impl Default for SpecFilterThresholds {
    fn default() -> Self {
        Self {
            days_available_max: N_DAYS_AVAILABLE_MAX,
            days_available_incoming_max: N_DAYS_AVAILABLE_INCOMING_MAX,
            sales_multiplier: N_SALES_MULTIPLIER,
        }
    }
}

impl SpecFilterThresholds {
    /// Reject non-finite or negative thresholds.
    pub fn validate(&self) -> Result<(), String> {
        for (c_name, n_value) in [
            ("days_available_max", self.days_available_max),
            ("days_available_incoming_max", self.days_available_incoming_max),
            ("sales_multiplier", self.sales_multiplier),
        ] {
            if !n_value.is_finite() || n_value < 0.0 {
                return Err(format!("{c_name} must be a finite value >= 0, got {n_value}."));
            }
        }
        Ok(())
    }
}

/// Input options for one filter run.
#[derive(Debug, Clone)]
pub struct SpecInventoryFilterOptions {
    /// Non-blank worksheet rows skipped before the header row.
    pub n_rows_skip_leading: usize,
    /// Acceptance thresholds.
    pub thresholds: SpecFilterThresholds,
    /// Output sheet name.
    pub sheet_name_out: String,
    /// Writer-wide options for the output workbook.
    pub write_options: SpecXlsxWriteOptions,
    /// Per-sheet options for the output workbook.
    pub sheet_write_options: SpecXlsxSheetWriteOptions,
}

impl Default for SpecInventoryFilterOptions {
    fn default() -> Self {
        Self {
            n_rows_skip_leading: N_ROWS_SKIP_LEADING,
            thresholds: SpecFilterThresholds::default(),
            sheet_name_out: C_SHEET_NAME_DEFAULT.to_string(),
            write_options: SpecXlsxWriteOptions::default(),
            sheet_write_options: SpecXlsxSheetWriteOptions {
                policy_autofit: SpecAutofitCellsPolicy {
                    rule_columns: EnumAutofitColumnsRule::All,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ResolvedColumns

/// Positions of the predicate columns in a normalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRequiredColumns {
    pub idx_sku: usize,
    pub idx_days_available: usize,
    pub idx_days_available_incoming: usize,
    pub idx_stock_stl: usize,
    pub idx_stock_pa: usize,
    pub idx_sales_7d: usize,
    pub idx_sales_2d: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Verdicts

/// Outcome of the predicate for one SKU group.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecGroupVerdict {
    /// Group key as it appears in the first row of the group.
    pub key: EnumCellValue,
    /// Number of rows in the group.
    pub n_rows: usize,
    /// Some row has available days within the short window.
    pub if_condition1: bool,
    /// Some row has available+inbound days within the extended window.
    pub if_condition2: bool,
    /// Some row has warehouse stock above the sales threshold.
    pub if_condition3: bool,
    /// `(condition1 || condition2) && condition3`.
    pub if_accepted: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// The uploaded workbook cannot be turned into a filterable table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error("cannot parse workbook: {0}")]
    Workbook(String),

    #[error("workbook has no worksheet")]
    NoSheet,

    #[error("first worksheet has no header row")]
    EmptyTable,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("required column '{0}' appears more than once")]
    AmbiguousColumn(String),

    #[error("non-numeric value '{value}' in column '{column}' at data row {row}")]
    NonNumericCell {
        column: String,
        /// 1-based data row (header excluded).
        row: usize,
        value: String,
    },
}

impl From<XlsxReadError> for MalformedInputError {
    fn from(err: XlsxReadError) -> Self {
        match err {
            XlsxReadError::Workbook(msg) => Self::Workbook(msg),
            XlsxReadError::NoSheet => Self::NoSheet,
        }
    }
}

/// Top-level failure of a filter run.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInputError),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("failed to write output workbook: {0}")]
    Write(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_match_business_rule() {
        let thresholds = SpecFilterThresholds::default();
        assert_eq!(thresholds.days_available_max, 20.0);
        assert_eq!(thresholds.days_available_incoming_max, 40.0);
        assert_eq!(thresholds.sales_multiplier, 5.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_thresholds_validate_rejects_nan_and_negative() {
        let thresholds = SpecFilterThresholds {
            sales_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = SpecFilterThresholds {
            days_available_max: -1.0,
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_malformed_input_messages_name_the_missing_element() {
        let err = MalformedInputError::MissingColumn("SKU".to_string());
        assert_eq!(err.to_string(), "missing required column 'SKU'");

        let err: InventoryError = MalformedInputError::from(XlsxReadError::NoSheet).into();
        assert_eq!(err.to_string(), "malformed input: workbook has no worksheet");
    }
}
