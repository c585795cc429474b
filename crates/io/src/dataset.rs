// Database import: delimited text and spreadsheet-native tabular files.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use spdgen_core::record::{COL_BRIEFING, COL_EXECUTION, COL_NAME, COL_PREP, COL_TAX};
use spdgen_core::{Record, REQUIRED_COLUMNS};

use crate::error::GenError;

/// Load and normalize the per-person database.
///
/// The format is chosen by the file's extension, not its content:
/// `.csv`/`.tsv`/`.txt` go through the delimited-text reader, everything
/// else (xlsx, xls, xlsb, ods) through calamine. The first row is the
/// header; records come back in source row order.
pub fn load_records(path: &Path) -> Result<Vec<Record>, GenError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" | "tsv" | "txt" => delimited_rows(path)?,
        _ => spreadsheet_rows(path)?,
    };

    normalize(rows)
}

fn delimited_rows(path: &Path) -> Result<Vec<Vec<String>>, GenError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| GenError::Parse(e.to_string()))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, GenError> {
    let bytes = std::fs::read(path)
        .map_err(|e| GenError::Io(format!("cannot read {}: {}", path.display(), e)))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    // Excel writes a BOM on UTF-8 CSVs; left in place it glues onto the
    // first header name and breaks the column check
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines. Semicolon CSVs are the norm for Excel exports in
/// comma-decimal locales, so comma is only the fallback, not an assumption.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines with the same field count as line 1) * field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn spreadsheet_rows(path: &Path) -> Result<Vec<Vec<String>>, GenError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| GenError::Parse(format!("cannot open spreadsheet: {e}")))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| GenError::Parse("spreadsheet contains no sheets".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| GenError::Parse(format!("cannot read sheet '{first}': {e}")))?;

    let mut rows = Vec::new();
    for row in range.rows() {
        rows.push(row.iter().map(data_to_string).collect());
    }
    Ok(rows)
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals, matching how the numbers will be
            // written back into the template
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn normalize(rows: Vec<Vec<String>>) -> Result<Vec<Record>, GenError> {
    let mut iter = rows.into_iter();
    let header: Vec<String> = iter
        .next()
        .ok_or_else(|| GenError::Parse("database has no header row".to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !header.iter().any(|h| h == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(GenError::MissingColumns(missing));
    }

    let idx = |name: &str| -> Result<usize, GenError> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| GenError::MissingColumns(vec![name.to_string()]))
    };

    let name_idx = idx(COL_NAME)?;
    let prep_idx = idx(COL_PREP)?;
    let briefing_idx = idx(COL_BRIEFING)?;
    let execution_idx = idx(COL_EXECUTION)?;
    let tax_idx = idx(COL_TAX)?;

    let mut records = Vec::new();
    for row in iter {
        // Hand-edited CSVs routinely end with blank lines
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        records.push(Record {
            name: cell(name_idx).to_string(),
            prep_amount: coerce_amount(cell(prep_idx)),
            briefing_amount: coerce_amount(cell(briefing_idx)),
            execution_amount: coerce_amount(cell(execution_idx)),
            withholding_tax: coerce_amount(cell(tax_idx)),
        });
    }
    Ok(records)
}

/// Coerce a monetary cell to a number. Anything unparseable — text,
/// blanks, a row too short to have the cell — normalizes to exactly 0.0
/// instead of failing the load.
fn coerce_amount(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}
