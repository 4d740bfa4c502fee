//! Header promotion and positional disambiguation of facility columns.

use std::collections::BTreeMap;

use stockkit_io_xlsx::{EnumCellValue, SpecTable};

use crate::conf::{
    C_COL_DAYS_AVAILABLE, C_COL_DAYS_AVAILABLE_INCOMING, C_COL_SALES_2D, C_COL_SALES_7D,
    C_COL_SKU, C_COL_STOCK_PA, C_COL_STOCK_STL, C_SUFFIX_IN_TRANSIT, C_SUFFIX_STOCK,
    TUP_FACILITIES,
};
use crate::spec::{MalformedInputError, SpecRequiredColumns};

/// Rename duplicated facility headers by order of appearance.
///
/// The 1st occurrence of a facility label gets [`C_SUFFIX_STOCK`], every later
/// occurrence gets [`C_SUFFIX_IN_TRANSIT`]. Other names pass through.
pub fn rename_facility_columns(columns: &[String]) -> Vec<String> {
    let mut dict_cnt_seen: BTreeMap<&str, usize> = BTreeMap::new();
    columns
        .iter()
        .map(|c_name| {
            let Some(c_facility) = TUP_FACILITIES.iter().find(|c_fac| **c_fac == c_name.as_str())
            else {
                return c_name.clone();
            };
            let n_seen = dict_cnt_seen.entry(*c_facility).or_default();
            *n_seen += 1;
            if *n_seen == 1 {
                format!("{c_facility}{C_SUFFIX_STOCK}")
            } else {
                format!("{c_facility}{C_SUFFIX_IN_TRANSIT}")
            }
        })
        .collect()
}

/// Promote the header row of a raw worksheet grid and rename facility columns.
///
/// Fully blank leading rows are ignored. `n_rows_skip_leading` non-blank rows
/// are then dropped, along with blank rows right after them; the next row
/// becomes the column names and the remaining rows become data. Fails when no
/// header row exists or a required column is absent/ambiguous after renaming.
pub fn normalize_header(
    l_grid: Vec<Vec<EnumCellValue>>,
    n_rows_skip_leading: usize,
) -> Result<SpecTable, MalformedInputError> {
    let if_row_blank = |row: &Vec<EnumCellValue>| row.iter().all(EnumCellValue::is_blank);
    let mut iter_rows = l_grid
        .into_iter()
        .skip_while(if_row_blank)
        .skip(n_rows_skip_leading)
        .skip_while(if_row_blank);
    let l_header = iter_rows.next().ok_or(MalformedInputError::EmptyTable)?;

    let l_colnames_raw: Vec<String> = l_header.iter().map(EnumCellValue::to_label).collect();
    let l_colnames = rename_facility_columns(&l_colnames_raw);
    let n_width = l_colnames.len();

    let mut table = SpecTable::new(l_colnames);
    for mut l_row in iter_rows {
        l_row.resize(n_width, EnumCellValue::None);
        table
            .push_row(l_row)
            .map_err(MalformedInputError::Workbook)?;
    }

    resolve_required_columns(&table)?;
    Ok(table)
}

/// Locate every predicate column; each must appear exactly once.
pub fn resolve_required_columns(
    table: &SpecTable,
) -> Result<SpecRequiredColumns, MalformedInputError> {
    let find_unique = |c_name: &str| -> Result<usize, MalformedInputError> {
        match table.find_column_indices(c_name).as_slice() {
            [] => Err(MalformedInputError::MissingColumn(c_name.to_string())),
            [n_idx] => Ok(*n_idx),
            _ => Err(MalformedInputError::AmbiguousColumn(c_name.to_string())),
        }
    };

    Ok(SpecRequiredColumns {
        idx_sku: find_unique(C_COL_SKU)?,
        idx_days_available: find_unique(C_COL_DAYS_AVAILABLE)?,
        idx_days_available_incoming: find_unique(C_COL_DAYS_AVAILABLE_INCOMING)?,
        idx_stock_stl: find_unique(C_COL_STOCK_STL)?,
        idx_stock_pa: find_unique(C_COL_STOCK_PA)?,
        idx_sales_7d: find_unique(C_COL_SALES_7D)?,
        idx_sales_2d: find_unique(C_COL_SALES_2D)?,
    })
}
