// Shared test fixtures: SPD-shaped workbooks built with rust_xlsxwriter
// and a couple of known records.

use rust_xlsxwriter::Workbook;

use spdgen_core::Record;

pub(crate) fn budi() -> Record {
    Record {
        name: "Budi".into(),
        prep_amount: 500_000.0,
        briefing_amount: 300_000.0,
        execution_amount: 200_000.0,
        withholding_tax: 100_000.0,
    }
}

/// Tax larger than the gross: net amount goes negative.
pub(crate) fn siti() -> Record {
    Record {
        name: "Siti".into(),
        prep_amount: 0.0,
        briefing_amount: 0.0,
        execution_amount: 100.0,
        withholding_tax: 500.0,
    }
}

/// A template resembling the real SPD form: labels next to the contract
/// cells, a placeholder where the name goes, one amount cell that already
/// holds a number. Exercises both the replace path (D26, C11) and the
/// insert paths (C12..C18, including inserting before an existing D16).
pub(crate) fn spd_template() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(9, 1, "Rincian Honorarium").unwrap();
    sheet.write_string(10, 1, "Honorarium Persiapan").unwrap();
    sheet.write_string(11, 1, "Honorarium Pemantauan Briefing").unwrap();
    sheet.write_string(12, 1, "Honorarium Pelaksanaan").unwrap();
    sheet.write_string(13, 1, "Jumlah").unwrap();
    sheet.write_string(15, 1, "PPH21").unwrap();
    sheet.write_string(15, 3, "(dipotong)").unwrap();
    sheet.write_string(17, 1, "Jumlah Diterima").unwrap();
    sheet.write_string(25, 2, "Nama:").unwrap();
    sheet.write_string(25, 3, "____________").unwrap();
    sheet.write_number(10, 2, 0.0).unwrap();
    workbook.save_to_buffer().unwrap()
}

/// Near-empty template: every contract row and cell must be inserted.
pub(crate) fn sparse_template() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "SPD").unwrap();
    workbook.save_to_buffer().unwrap()
}

/// Template whose last row sits far below the contract cells, so the
/// filled rows land between existing rows rather than at the end.
pub(crate) fn footer_template() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "SPD").unwrap();
    sheet.write_string(99, 0, "Mengetahui,").unwrap();
    workbook.save_to_buffer().unwrap()
}
