//! SKU grouping and the group acceptance predicate.

use std::collections::BTreeMap;

use stockkit_io_xlsx::{EnumCellValue, SpecTable};
use tracing::debug;

use crate::header::resolve_required_columns;
use crate::spec::{
    MalformedInputError, SpecFilterThresholds, SpecGroupVerdict, SpecRequiredColumns,
};

/// Filtered table plus one verdict per distinct SKU, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFilterOutcome {
    /// Accepted groups, each followed by one all-blank row.
    pub table: SpecTable,
    /// Verdicts for every group, accepted or not.
    pub verdicts: Vec<SpecGroupVerdict>,
}

impl SpecFilterOutcome {
    /// Number of accepted groups.
    pub fn cnt_groups_accepted(&self) -> usize {
        self.verdicts.iter().filter(|v| v.if_accepted).count()
    }
}

/// Hashable/ordered identity of a SKU cell.
///
/// Numbers compare by value (`1 == 1.0`, `-0.0 == 0.0`); text compares exactly.
/// Numbers, dates and text never equal each other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum EnumGroupKey {
    Number(u64),
    DateTime(u64),
    Text(String),
}

fn derive_group_key(value: &EnumCellValue) -> EnumGroupKey {
    match value {
        EnumCellValue::Number(n) if *n == 0.0 => EnumGroupKey::Number(0f64.to_bits()),
        EnumCellValue::Number(n) => EnumGroupKey::Number(n.to_bits()),
        EnumCellValue::DateTime(n) => EnumGroupKey::DateTime(n.to_bits()),
        EnumCellValue::String(s) => EnumGroupKey::Text(s.clone()),
        EnumCellValue::None => EnumGroupKey::Number(0f64.to_bits()),
    }
}

/// Partition row indices by SKU, keeping first-seen key order and row order.
fn partition_rows_by_key(table: &SpecTable, idx_key: usize) -> Vec<Vec<usize>> {
    let mut dict_group_pos: BTreeMap<EnumGroupKey, usize> = BTreeMap::new();
    let mut l_groups: Vec<Vec<usize>> = Vec::new();

    for (n_idx_row, row) in table.rows().iter().enumerate() {
        let n_pos = *dict_group_pos
            .entry(derive_group_key(&row[idx_key]))
            .or_insert_with(|| {
                l_groups.push(Vec::new());
                l_groups.len() - 1
            });
        l_groups[n_pos].push(n_idx_row);
    }

    l_groups
}

/// Per-row values of the predicate columns.
#[derive(Debug, Clone, Copy)]
struct SpecRowMetrics {
    days_available: f64,
    days_available_incoming: f64,
    stock_max: f64,
    sales_max: f64,
}

fn read_numeric(
    table: &SpecTable,
    n_idx_row: usize,
    n_idx_col: usize,
) -> Result<f64, MalformedInputError> {
    let value = &table.rows()[n_idx_row][n_idx_col];
    if value.is_blank() {
        return Ok(0.0);
    }
    value
        .as_f64()
        .ok_or_else(|| MalformedInputError::NonNumericCell {
            column: table.columns()[n_idx_col].clone(),
            row: n_idx_row + 1,
            value: value.to_label(),
        })
}

fn read_row_metrics(
    table: &SpecTable,
    cols: &SpecRequiredColumns,
    n_idx_row: usize,
) -> Result<SpecRowMetrics, MalformedInputError> {
    let stock_stl = read_numeric(table, n_idx_row, cols.idx_stock_stl)?;
    let stock_pa = read_numeric(table, n_idx_row, cols.idx_stock_pa)?;
    let sales_7d = read_numeric(table, n_idx_row, cols.idx_sales_7d)?;
    let sales_2d = read_numeric(table, n_idx_row, cols.idx_sales_2d)?;
    Ok(SpecRowMetrics {
        days_available: read_numeric(table, n_idx_row, cols.idx_days_available)?,
        days_available_incoming: read_numeric(
            table,
            n_idx_row,
            cols.idx_days_available_incoming,
        )?,
        stock_max: f64::max(stock_stl, stock_pa),
        sales_max: f64::max(sales_7d, sales_2d),
    })
}

fn is_within_window(n_days: f64, n_days_max: f64) -> bool {
    n_days > 0.0 && n_days <= n_days_max
}

/// Evaluate the predicate for one group.
///
/// Each condition is an OR across the group's rows on its own; the three
/// conditions may be met by different rows.
fn evaluate_group(
    table: &SpecTable,
    cols: &SpecRequiredColumns,
    thresholds: &SpecFilterThresholds,
    l_idx_rows: &[usize],
) -> Result<SpecGroupVerdict, MalformedInputError> {
    let mut if_condition1 = false;
    let mut if_condition2 = false;
    let mut if_condition3 = false;

    for n_idx_row in l_idx_rows {
        let metrics = read_row_metrics(table, cols, *n_idx_row)?;
        if_condition1 |= is_within_window(metrics.days_available, thresholds.days_available_max);
        if_condition2 |= is_within_window(
            metrics.days_available_incoming,
            thresholds.days_available_incoming_max,
        );
        if_condition3 |= metrics.stock_max > metrics.sales_max * thresholds.sales_multiplier;
    }

    let key = l_idx_rows
        .first()
        .map(|n_idx_row| table.rows()[*n_idx_row][cols.idx_sku].clone())
        .unwrap_or(EnumCellValue::None);

    Ok(SpecGroupVerdict {
        key,
        n_rows: l_idx_rows.len(),
        if_condition1,
        if_condition2,
        if_condition3,
        if_accepted: (if_condition1 || if_condition2) && if_condition3,
    })
}

/// Keep SKU groups that pass the predicate, separated by blank rows.
///
/// Groups are emitted in first-seen key order with their rows in input
/// order, each followed by exactly one all-blank row. The output has the same
/// columns as `table`; when nothing passes it has zero rows. Missing cells in
/// predicate columns read as `0`.
pub fn filter_table(
    table: &SpecTable,
    thresholds: &SpecFilterThresholds,
) -> Result<SpecFilterOutcome, MalformedInputError> {
    let cols = resolve_required_columns(table)?;
    let l_groups = partition_rows_by_key(table, cols.idx_sku);

    let mut table_out = SpecTable::new(table.columns().to_vec());
    let mut l_verdicts = Vec::with_capacity(l_groups.len());

    for l_idx_rows in &l_groups {
        let verdict = evaluate_group(table, &cols, thresholds, l_idx_rows)?;
        debug!(
            key = %verdict.key.to_label(),
            n_rows = verdict.n_rows,
            condition1 = verdict.if_condition1,
            condition2 = verdict.if_condition2,
            condition3 = verdict.if_condition3,
            accepted = verdict.if_accepted,
            "group evaluated"
        );

        if verdict.if_accepted {
            for n_idx_row in l_idx_rows {
                table_out
                    .push_row(table.rows()[*n_idx_row].clone())
                    .map_err(MalformedInputError::Workbook)?;
            }
            table_out.push_blank_row();
        }
        l_verdicts.push(verdict);
    }

    Ok(SpecFilterOutcome {
        table: table_out,
        verdicts: l_verdicts,
    })
}
