// Integration tests for spdgen: preview, names, single and batch generation.
// Run with: cargo test -p spdgen-cli --test generate_tests

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use calamine::{Data, Reader, Xlsx};

fn spdgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_spdgen"))
}

const DB_CSV: &str = "\
Nama,Honorarium Persiapan UKOMNAS,Honorarium Pemantauan Briefing UKOMNAS,Honorarium Pelaksanaan UKOMNAS,PPH21
Budi,500000,300000,200000,100000
Siti,250000,0,abc,50000
Agus/Jr,100,0,0,500
";

fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let db = dir.join("db.csv");
    fs::write(&db, DB_CSV).unwrap();

    let template = dir.join("template.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(9, 1, "Rincian Honorarium").unwrap();
    sheet.write_string(25, 2, "Nama:").unwrap();
    workbook.save(&template).unwrap();

    (db, template)
}

fn cell(bytes: &[u8], pos: (u32, u32)) -> Data {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec())).unwrap();
    let name = workbook.sheet_names().to_vec()[0].clone();
    let range = workbook.worksheet_range(&name).unwrap();
    range.get_value(pos).cloned().unwrap_or(Data::Empty)
}

// ---------------------------------------------------------------------------
// generate: contract cells, derived amounts, default filename
// ---------------------------------------------------------------------------

#[test]
fn generate_fills_contract_cells() {
    let dir = tempfile::tempdir().unwrap();
    let (db, template) = write_fixtures(dir.path());
    let out = dir.path().join("budi.xlsx");

    let output = spdgen()
        .args([
            "generate",
            db.to_str().unwrap(),
            template.to_str().unwrap(),
            "--name",
            "Budi",
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("spdgen generate");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&out).unwrap();
    assert_eq!(cell(&bytes, (25, 3)), Data::String("Budi".into()));
    assert_eq!(cell(&bytes, (10, 2)), Data::Float(500_000.0));
    assert_eq!(cell(&bytes, (11, 2)), Data::Float(300_000.0));
    assert_eq!(cell(&bytes, (12, 2)), Data::Float(200_000.0));
    assert_eq!(cell(&bytes, (13, 2)), Data::Float(1_000_000.0));
    assert_eq!(cell(&bytes, (15, 2)), Data::Float(100_000.0));
    assert_eq!(cell(&bytes, (17, 2)), Data::Float(900_000.0));
    // Template content untouched
    assert_eq!(cell(&bytes, (25, 2)), Data::String("Nama:".into()));
}

#[test]
fn generate_default_filename_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let (db, template) = write_fixtures(dir.path());

    let output = spdgen()
        .current_dir(dir.path())
        .args([
            "generate",
            db.to_str().unwrap(),
            template.to_str().unwrap(),
            "--name",
            "Agus/Jr",
        ])
        .output()
        .expect("spdgen generate");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("Template_Agus_Jr.xlsx").exists());
}

#[test]
fn generate_unknown_name_exits_with_name_code() {
    let dir = tempfile::tempdir().unwrap();
    let (db, template) = write_fixtures(dir.path());

    let output = spdgen()
        .args([
            "generate",
            db.to_str().unwrap(),
            template.to_str().unwrap(),
            "--name",
            "Joko",
        ])
        .output()
        .expect("spdgen generate");

    assert_eq!(output.status.code(), Some(7));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Joko"), "stderr: {stderr}");
    assert!(stderr.contains("spdgen names"), "hint missing: {stderr}");
}

// ---------------------------------------------------------------------------
// generate-all: entry count, sanitized names, coercion, negative net
// ---------------------------------------------------------------------------

#[test]
fn generate_all_produces_one_entry_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let (db, template) = write_fixtures(dir.path());
    let out = dir.path().join("batch.zip");

    let output = spdgen()
        .args([
            "generate-all",
            db.to_str().unwrap(),
            template.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("spdgen generate-all");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let file = fs::File::open(&out).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 3);

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        ["Template_Budi.xlsx", "Template_Siti.xlsx", "Template_Agus_Jr.xlsx"]
    );

    // Coerced "abc" lands as 0; Siti's total is just the prep amount
    let mut siti = Vec::new();
    std::io::copy(&mut archive.by_name("Template_Siti.xlsx").unwrap(), &mut siti).unwrap();
    assert_eq!(cell(&siti, (12, 2)), Data::Float(0.0));
    assert_eq!(cell(&siti, (13, 2)), Data::Float(250_000.0));

    // Tax above gross: net goes negative, no clamping
    let mut agus = Vec::new();
    std::io::copy(&mut archive.by_name("Template_Agus_Jr.xlsx").unwrap(), &mut agus).unwrap();
    assert_eq!(cell(&agus, (13, 2)), Data::Float(100.0));
    assert_eq!(cell(&agus, (17, 2)), Data::Float(-400.0));
}

// ---------------------------------------------------------------------------
// schema errors: full required set, exit code, nothing generated
// ---------------------------------------------------------------------------

#[test]
fn missing_columns_fail_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let (_, template) = write_fixtures(dir.path());
    let db = dir.path().join("bad.csv");
    fs::write(&db, "Nama,PPH21\nBudi,100\n").unwrap();
    let out = dir.path().join("batch.zip");

    let output = spdgen()
        .args([
            "generate-all",
            db.to_str().unwrap(),
            template.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("spdgen generate-all");

    assert_eq!(output.status.code(), Some(5));
    assert!(!out.exists(), "no archive may be produced on schema failure");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for column in [
        "Nama",
        "Honorarium Persiapan UKOMNAS",
        "Honorarium Pemantauan Briefing UKOMNAS",
        "Honorarium Pelaksanaan UKOMNAS",
        "PPH21",
    ] {
        assert!(stderr.contains(column), "stderr should list {column:?}: {stderr}");
    }
}

// ---------------------------------------------------------------------------
// preview / names
// ---------------------------------------------------------------------------

#[test]
fn preview_json_emits_normalized_records() {
    let dir = tempfile::tempdir().unwrap();
    let (db, _) = write_fixtures(dir.path());

    let output = spdgen()
        .args(["preview", db.to_str().unwrap(), "--limit", "2", "--json"])
        .output()
        .expect("spdgen preview");

    assert!(output.status.success());
    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("valid JSON array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Budi");
    assert_eq!(records[0]["prep_amount"], 500_000.0);
    // "abc" coerced to zero during normalization
    assert_eq!(records[1]["execution_amount"], 0.0);
}

#[test]
fn preview_table_shows_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (db, _) = write_fixtures(dir.path());

    let output = spdgen()
        .args(["preview", db.to_str().unwrap()])
        .output()
        .expect("spdgen preview");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Budi"));
    assert!(stdout.contains("1000000"), "derived total missing: {stdout}");
}

#[test]
fn names_lists_each_name_once() {
    let dir = tempfile::tempdir().unwrap();
    let (db, _) = write_fixtures(dir.path());

    let output = spdgen()
        .args(["names", db.to_str().unwrap()])
        .output()
        .expect("spdgen names");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names, ["Budi", "Siti", "Agus/Jr"]);
}
