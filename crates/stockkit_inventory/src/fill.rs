//! Missing-value normalization.

use stockkit_io_xlsx::{EnumCellValue, SpecTable};

/// Replace every missing cell with numeric `0`, in every column.
///
/// Blank text counts as missing. Text columns are not special-cased: a missing
/// product name also becomes `0`. Returns the number of filled cells.
pub fn fill_missing_with_zero(table: &mut SpecTable) -> usize {
    let mut cnt_filled = 0usize;
    for cell in table.cells_mut() {
        if cell.is_blank() {
            *cell = EnumCellValue::Number(0.0);
            cnt_filled += 1;
        }
    }
    cnt_filled
}
