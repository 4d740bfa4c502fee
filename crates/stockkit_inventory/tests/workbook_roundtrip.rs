use rust_xlsxwriter::{Format, Workbook};
use stockkit_inventory::{
    C_COL_DAYS_AVAILABLE, C_COL_DAYS_AVAILABLE_INCOMING, C_COL_SALES_2D, C_COL_SALES_7D,
    C_COL_SKU, C_COL_STOCK_PA, C_COL_STOCK_STL, InventoryError, MalformedInputError,
    SpecInventoryFilterOptions, filter_inventory_bytes,
};
use stockkit_io_xlsx::{EnumCellValue, read_first_sheet_grid};

const C_FACILITY_STL: &str = "易捷快递:STL-Warehouse";
const C_FACILITY_PA: &str = "易捷快递:PA Warehouse";

/// `(sku, days, days_incoming, stl, pa, stl_in_transit, pa_in_transit, sales_7d, sales_2d)`
type FixtureRow<'a> = (&'a str, f64, f64, f64, f64, f64, f64, f64, f64);

fn build_export_workbook(l_header: &[&str], l_rows: &[FixtureRow<'_>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "库存管理 2024-06-01").expect("banner");
    for (n_col, c_name) in l_header.iter().enumerate() {
        worksheet
            .write_string(1, n_col as u16, *c_name)
            .expect("header");
    }
    for (n_idx, row) in l_rows.iter().enumerate() {
        let n_row = (n_idx + 2) as u32;
        let (sku, d1, d2, s1, s2, t1, t2, v7, v2) = *row;
        worksheet.write_string(n_row, 0, sku).expect("sku");
        for (n_col, n_value) in [d1, d2, s1, s2, t1, t2, v7, v2].into_iter().enumerate() {
            // Zero cells are left empty to exercise missing-value filling.
            if n_value != 0.0 {
                worksheet
                    .write_number(n_row, (n_col + 1) as u16, n_value)
                    .expect("number");
            }
        }
    }
    workbook.save_to_buffer().expect("save")
}

fn build_default_header() -> Vec<&'static str> {
    vec![
        C_COL_SKU,
        C_COL_DAYS_AVAILABLE,
        C_COL_DAYS_AVAILABLE_INCOMING,
        C_FACILITY_STL,
        C_FACILITY_PA,
        C_FACILITY_STL,
        C_FACILITY_PA,
        C_COL_SALES_7D,
        C_COL_SALES_2D,
    ]
}

fn column_labels(l_row: &[EnumCellValue]) -> Vec<String> {
    l_row.iter().map(EnumCellValue::to_label).collect()
}

#[test]
fn test_filter_inventory_bytes_end_to_end() {
    let v_bytes = build_export_workbook(
        &build_default_header(),
        &[
            ("A", 15.0, 0.0, 100.0, 0.0, 40.0, 0.0, 5.0, 3.0),
            ("B", 0.0, 0.0, 1000.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            ("C", 0.0, 35.0, 0.0, 60.0, 0.0, 0.0, 2.0, 2.0),
            ("A", 90.0, 90.0, 0.0, 0.0, 0.0, 0.0, 9.0, 9.0),
        ],
    );

    let output =
        filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default()).expect("filter");
    assert_eq!(output.report.cnt_rows_in, 4);
    assert_eq!(output.report.cnt_groups, 3);
    assert_eq!(output.report.cnt_groups_accepted, 2);
    assert_eq!(output.report.cnt_rows_out, 5);

    let l_grid = read_first_sheet_grid(&output.v_bytes).expect("read output");
    let l_colnames = column_labels(&l_grid[0]);
    assert_eq!(l_colnames[0], C_COL_SKU);
    assert_eq!(l_colnames[3], C_COL_STOCK_STL);
    assert_eq!(l_colnames[4], C_COL_STOCK_PA);
    assert_eq!(l_colnames[5], "易捷快递:STL-Warehouse-海外仓在途库存");
    assert_eq!(l_colnames[6], "易捷快递:PA Warehouse-海外仓在途库存");

    let l_skus: Vec<String> = (1..=5)
        .map(|n_row| {
            l_grid
                .get(n_row)
                .and_then(|row| row.first())
                .map(EnumCellValue::to_label)
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(l_skus, vec!["A", "A", "", "C", ""]);

    // Filled zeros are written as numbers, not left empty.
    assert_eq!(l_grid[1][2], EnumCellValue::Number(0.0));
}

#[test]
fn test_filter_inventory_bytes_is_idempotent_on_its_output() {
    let v_bytes = build_export_workbook(
        &build_default_header(),
        &[
            ("A", 15.0, 0.0, 100.0, 0.0, 0.0, 0.0, 5.0, 3.0),
            ("B", 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            ("C", 3.0, 0.0, 0.0, 60.0, 0.0, 0.0, 2.0, 2.0),
        ],
    );
    let options = SpecInventoryFilterOptions::default();
    let output_first = filter_inventory_bytes(&v_bytes, &options).expect("first pass");

    // The output carries no banner row.
    let options_rerun = SpecInventoryFilterOptions {
        n_rows_skip_leading: 0,
        ..Default::default()
    };
    let output_second =
        filter_inventory_bytes(&output_first.v_bytes, &options_rerun).expect("second pass");

    let l_keys_accepted = |verdicts: &[stockkit_inventory::SpecGroupVerdict]| -> Vec<String> {
        verdicts
            .iter()
            .filter(|v| v.if_accepted)
            .map(|v| v.key.to_label())
            .collect()
    };
    assert_eq!(
        l_keys_accepted(&output_first.verdicts),
        l_keys_accepted(&output_second.verdicts)
    );
    assert_eq!(output_first.table, output_second.table);
}

#[test]
fn test_filter_inventory_bytes_reports_missing_column() {
    let mut l_header = build_default_header();
    l_header[7] = "近30天日均销量";
    let v_bytes = build_export_workbook(
        &l_header,
        &[("A", 15.0, 0.0, 100.0, 0.0, 0.0, 0.0, 5.0, 3.0)],
    );

    let err = filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default())
        .unwrap_err();
    match err {
        InventoryError::MalformedInput(MalformedInputError::MissingColumn(c_name)) => {
            assert_eq!(c_name, C_COL_SALES_7D);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_filter_inventory_bytes_single_facility_column_is_missing_stock() {
    // Without the duplicated facility headers there is no stock column for PA.
    let mut l_header = build_default_header();
    l_header[4] = "PA";
    l_header[6] = "PA in transit";
    let v_bytes = build_export_workbook(&l_header, &[]);

    let err = filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::MalformedInput(MalformedInputError::MissingColumn(ref c_name))
            if c_name == C_COL_STOCK_PA
    ));
}

#[test]
fn test_filter_inventory_bytes_empty_sheet_is_malformed() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    let v_bytes = workbook.save_to_buffer().expect("save");

    let err = filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::MalformedInput(MalformedInputError::EmptyTable)
    ));
}

#[test]
fn test_filter_inventory_bytes_keeps_text_skus_verbatim() {
    let v_bytes = build_export_workbook(
        &build_default_header(),
        &[
            ("00123", 15.0, 0.0, 100.0, 0.0, 0.0, 0.0, 5.0, 3.0),
            ("12345678901234567890", 15.0, 0.0, 100.0, 0.0, 0.0, 0.0, 5.0, 3.0),
        ],
    );

    let output =
        filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default()).expect("filter");
    assert_eq!(output.report.cnt_groups_accepted, 2);

    let l_grid = read_first_sheet_grid(&output.v_bytes).expect("read output");
    assert_eq!(l_grid[1][0], EnumCellValue::String("00123".to_string()));
    assert_eq!(
        l_grid[3][0],
        EnumCellValue::String("12345678901234567890".to_string())
    );
}

#[test]
fn test_filter_inventory_bytes_carries_date_columns() {
    let mut l_header = build_default_header();
    l_header.push("上架日期");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "库存管理").expect("banner");
    for (n_col, c_name) in l_header.iter().enumerate() {
        worksheet
            .write_string(1, n_col as u16, *c_name)
            .expect("header");
    }
    worksheet.write_string(2, 0, "A").expect("sku");
    worksheet.write_number(2, 1, 15.0).expect("days");
    worksheet.write_number(2, 3, 100.0).expect("stock");
    worksheet.write_number(2, 7, 5.0).expect("sales");
    let fmt_date = Format::new().set_num_format("yyyy-mm-dd");
    worksheet
        .write_number_with_format(2, 9, 45444.0, &fmt_date)
        .expect("date");
    let v_bytes = workbook.save_to_buffer().expect("save");

    let output =
        filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default()).expect("filter");
    assert_eq!(output.report.cnt_groups_accepted, 1);

    let l_grid = read_first_sheet_grid(&output.v_bytes).expect("read output");
    assert_eq!(l_grid[0][9], EnumCellValue::String("上架日期".to_string()));
    assert_eq!(l_grid[1][9], EnumCellValue::DateTime(45444.0));
}

#[test]
fn test_filter_inventory_bytes_ignores_blank_rows_above_banner() {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(2, 0, "库存管理").expect("banner");
    for (n_col, c_name) in build_default_header().iter().enumerate() {
        worksheet
            .write_string(3, n_col as u16, *c_name)
            .expect("header");
    }
    worksheet.write_string(4, 0, "A").expect("sku");
    worksheet.write_number(4, 1, 15.0).expect("days");
    worksheet.write_number(4, 3, 100.0).expect("stock");
    worksheet.write_number(4, 7, 5.0).expect("sales");
    let v_bytes = workbook.save_to_buffer().expect("save");

    let output =
        filter_inventory_bytes(&v_bytes, &SpecInventoryFilterOptions::default()).expect("filter");
    assert_eq!(output.report.cnt_rows_in, 1);
    assert_eq!(output.report.cnt_groups_accepted, 1);
}
