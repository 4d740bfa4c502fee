//! Filter run report.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one filter run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportInventory {
    /// Data rows after header promotion.
    pub cnt_rows_in: u64,
    /// Missing cells replaced with `0`.
    pub cnt_cells_filled: u64,
    /// Distinct SKU groups.
    pub cnt_groups: u64,
    /// Groups that passed the predicate.
    pub cnt_groups_accepted: u64,
    /// Output rows, separators included.
    pub cnt_rows_out: u64,
    /// Non-fatal warnings from filtering and writing.
    pub warnings: Vec<String>,
}

impl ReportInventory {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_in".to_string(), self.cnt_rows_in);
        dict_counts.insert("cnt_cells_filled".to_string(), self.cnt_cells_filled);
        dict_counts.insert("cnt_groups".to_string(), self.cnt_groups);
        dict_counts.insert("cnt_groups_accepted".to_string(), self.cnt_groups_accepted);
        dict_counts.insert("cnt_rows_out".to_string(), self.cnt_rows_out);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} rows_in={} groups={} accepted={} rows_out={} filled={} warnings={}",
            dict_counts["cnt_rows_in"],
            dict_counts["cnt_groups"],
            dict_counts["cnt_groups_accepted"],
            dict_counts["cnt_rows_out"],
            dict_counts["cnt_cells_filled"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FILTER]"))
    }
}
