// Template filling: patch the contract cells inside an xlsx document
// without disturbing anything else in it.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use spdgen_core::cellref::{cell_address, parse_cell_ref};
use spdgen_core::{CellWrite, Record, TemplateLayout};

use crate::error::GenError;

/// Content type of a filled document.
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The uploaded template, held as an immutable byte buffer.
///
/// A parsing session over an xlsx archive is stateful and single-use, so
/// the buffer is never opened in place: every fill clones it and opens
/// the clone. The source stays pristine and reusable for any number of
/// fills, which is what makes batch generation safe.
pub struct TemplateSource {
    bytes: Vec<u8>,
}

impl TemplateSource {
    pub fn from_path(path: &Path) -> Result<Self, GenError> {
        let bytes = std::fs::read(path)
            .map_err(|e| GenError::Io(format!("cannot read template {}: {}", path.display(), e)))?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Produce a filled document for one record.
    ///
    /// The first worksheet's contract cells are overwritten with the
    /// record's values and derived totals; every other cell and every
    /// other archive part is copied through verbatim. The returned bytes
    /// share nothing with the source buffer.
    pub fn fill(&self, record: &Record, layout: &TemplateLayout) -> Result<Vec<u8>, GenError> {
        let mut targets: BTreeMap<(usize, usize), CellWrite> = BTreeMap::new();
        for (addr, write) in layout.writes(record) {
            let (row, col) = parse_cell_ref(addr)
                .ok_or_else(|| GenError::Template(format!("invalid layout address {addr:?}")))?;
            targets.insert((row, col), write);
        }

        let mut archive = ZipArchive::new(Cursor::new(self.bytes.clone()))
            .map_err(|e| GenError::Template(format!("not an xlsx archive: {e}")))?;

        let sheet_path = first_worksheet_path(&mut archive)?;

        let mut out = ZipWriter::new(Cursor::new(Vec::new()));
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| GenError::Template(format!("archive entry {index}: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| GenError::Template(format!("archive entry {name}: {e}")))?;

            let data = if name == sheet_path {
                patch_sheet_xml(&data, &targets)?
            } else {
                data
            };

            out.start_file(name, entry_options())
                .map_err(|e| GenError::Io(format!("cannot write document entry: {e}")))?;
            out.write_all(&data)
                .map_err(|e| GenError::Io(format!("cannot write document entry: {e}")))?;
        }

        let cursor = out
            .finish()
            .map_err(|e| GenError::Io(format!("cannot finalize document: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// Entry options for output archives. The timestamp is pinned so that
/// repeated fills of the same record are byte-identical.
pub(crate) fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

/// Resolve the first worksheet's part path from workbook.xml and its rels.
///
/// Sheet order in workbook.xml is the workbook's declared order; the
/// single-sheet template contract makes the first sheet the one to fill.
fn first_worksheet_path(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Result<String, GenError> {
    let workbook_xml = read_entry(archive, "xl/workbook.xml")?;
    let rels_xml = read_entry(archive, "xl/_rels/workbook.xml.rels")?;

    // Step 1: rId of the first <sheet>
    let mut rid = None;
    let mut reader = Reader::from_str(&workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        rid = Some(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
                if rid.is_some() {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    let rid = rid.ok_or_else(|| GenError::Template("workbook has no sheets".to_string()))?;

    // Step 2: rId -> target path
    let mut target = None;
    let mut reader = Reader::from_str(&rels_xml);
    reader.config_mut().trim_text(true);
    buf.clear();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.name().as_ref() == b"Relationship" => {
                if attr_value(e, b"Id").as_deref() == Some(rid.as_str()) {
                    target = attr_value(e, b"Target");
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    let target = target
        .ok_or_else(|| GenError::Template(format!("unresolved worksheet relationship {rid}")))?;

    // Rooted targets are package-absolute; relative ones hang off xl/
    Ok(match target.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("xl/{target}"),
    })
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<String, GenError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| GenError::Template(format!("missing {name}: {e}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| GenError::Template(format!("cannot read {name}: {e}")))?;
    Ok(content)
}

/// Rewrite worksheet XML, overwriting the target cells and passing
/// everything else through untouched.
///
/// Existing target cells keep their style attribute and lose their old
/// type and children. Targets with no cell — or no row — in the template
/// are inserted at the correct sorted position, the same thing a
/// load-modify-save spreadsheet library would produce.
fn patch_sheet_xml(
    xml: &[u8],
    targets: &BTreeMap<(usize, usize), CellWrite>,
) -> Result<Vec<u8>, GenError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut pending = targets.clone();

    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut current_row: Option<usize> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Eof => break,

            Event::Start(e) if e.name().as_ref() == b"row" => {
                let row = row_index(&e);
                if let Some(row) = row {
                    flush_rows_before(&mut writer, &mut pending, Some(row))?;
                }
                current_row = row;
                writer.write_event(Event::Start(e)).map_err(xml_err)?;
            }

            Event::Empty(e) if e.name().as_ref() == b"row" => {
                if let Some(row) = row_index(&e) {
                    flush_rows_before(&mut writer, &mut pending, Some(row))?;
                    if pending.range((row, 0)..=(row, usize::MAX)).next().is_some() {
                        // Self-closing row that now needs cells: reopen it
                        writer.write_event(Event::Start(e.clone())).map_err(xml_err)?;
                        flush_cells_before(&mut writer, &mut pending, row, None)?;
                        writer
                            .write_event(Event::End(BytesEnd::new("row")))
                            .map_err(xml_err)?;
                        continue;
                    }
                }
                writer.write_event(Event::Empty(e)).map_err(xml_err)?;
            }

            Event::End(e) if e.name().as_ref() == b"row" => {
                if let Some(row) = current_row.take() {
                    flush_cells_before(&mut writer, &mut pending, row, None)?;
                }
                writer.write_event(Event::End(e)).map_err(xml_err)?;
            }

            Event::Start(e) if e.name().as_ref() == b"c" => {
                if let Some((row, col)) = attr_value(&e, b"r").and_then(|v| parse_cell_ref(&v)) {
                    flush_cells_before(&mut writer, &mut pending, row, Some(col))?;
                    if let Some(write) = pending.remove(&(row, col)) {
                        let style = attr_value(&e, b"s");
                        write_cell(&mut writer, row, col, &write, style.as_deref())?;
                        // Drop the original children (old value, formula)
                        skip_element(&mut reader, &mut skip_buf)?;
                        continue;
                    }
                }
                writer.write_event(Event::Start(e)).map_err(xml_err)?;
            }

            Event::Empty(e) if e.name().as_ref() == b"c" => {
                if let Some((row, col)) = attr_value(&e, b"r").and_then(|v| parse_cell_ref(&v)) {
                    flush_cells_before(&mut writer, &mut pending, row, Some(col))?;
                    if let Some(write) = pending.remove(&(row, col)) {
                        let style = attr_value(&e, b"s");
                        write_cell(&mut writer, row, col, &write, style.as_deref())?;
                        continue;
                    }
                }
                writer.write_event(Event::Empty(e)).map_err(xml_err)?;
            }

            Event::End(e) if e.name().as_ref() == b"sheetData" => {
                // Targets on rows below the template's last row
                flush_rows_before(&mut writer, &mut pending, None)?;
                writer.write_event(Event::End(e)).map_err(xml_err)?;
            }

            Event::Empty(e) if e.name().as_ref() == b"sheetData" => {
                if pending.is_empty() {
                    writer.write_event(Event::Empty(e)).map_err(xml_err)?;
                } else {
                    writer.write_event(Event::Start(e.clone())).map_err(xml_err)?;
                    flush_rows_before(&mut writer, &mut pending, None)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("sheetData")))
                        .map_err(xml_err)?;
                }
            }

            event => writer.write_event(event).map_err(xml_err)?,
        }
    }

    if !pending.is_empty() {
        return Err(GenError::Template("worksheet has no sheetData element".to_string()));
    }

    Ok(writer.into_inner().into_inner())
}

/// 0-indexed row number from a `<row r="N">` element.
fn row_index(e: &BytesStart) -> Option<usize> {
    attr_value(e, b"r")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|r| *r >= 1)
        .map(|r| r - 1)
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Emit whole `<row>` elements for pending targets on rows before
/// `before_row` (or all remaining rows when None).
fn flush_rows_before(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    pending: &mut BTreeMap<(usize, usize), CellWrite>,
    before_row: Option<usize>,
) -> Result<(), GenError> {
    let mut rows: Vec<usize> = pending
        .keys()
        .map(|(row, _)| *row)
        .filter(|row| before_row.map_or(true, |b| *row < b))
        .collect();
    rows.dedup();

    for row in rows {
        let mut open = BytesStart::new("row");
        let number = (row + 1).to_string();
        open.push_attribute(("r", number.as_str()));
        writer.write_event(Event::Start(open)).map_err(xml_err)?;
        flush_cells_before(writer, pending, row, None)?;
        writer.write_event(Event::End(BytesEnd::new("row"))).map_err(xml_err)?;
    }
    Ok(())
}

/// Emit pending cells on `row` with column before `before_col` (or all
/// remaining cells on the row when None).
fn flush_cells_before(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    pending: &mut BTreeMap<(usize, usize), CellWrite>,
    row: usize,
    before_col: Option<usize>,
) -> Result<(), GenError> {
    let cols: Vec<usize> = pending
        .range((row, 0)..=(row, usize::MAX))
        .map(|((_, col), _)| *col)
        .filter(|col| before_col.map_or(true, |b| *col < b))
        .collect();

    for col in cols {
        if let Some(write) = pending.remove(&(row, col)) {
            // Cells the template never had get no style attribute
            write_cell(writer, row, col, &write, None)?;
        }
    }
    Ok(())
}

fn write_cell(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    row: usize,
    col: usize,
    value: &CellWrite,
    style: Option<&str>,
) -> Result<(), GenError> {
    let addr = cell_address(row, col);
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", addr.as_str()));
    if let Some(style) = style {
        cell.push_attribute(("s", style));
    }

    match value {
        CellWrite::Text(text) => {
            cell.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(cell)).map_err(xml_err)?;
            writer.write_event(Event::Start(BytesStart::new("is"))).map_err(xml_err)?;
            writer.write_event(Event::Start(BytesStart::new("t"))).map_err(xml_err)?;
            writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("t"))).map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("is"))).map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("c"))).map_err(xml_err)?;
        }
        CellWrite::Number(n) => {
            let text = format_number(*n);
            writer.write_event(Event::Start(cell)).map_err(xml_err)?;
            writer.write_event(Event::Start(BytesStart::new("v"))).map_err(xml_err)?;
            writer.write_event(Event::Text(BytesText::new(&text))).map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("v"))).map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("c"))).map_err(xml_err)?;
        }
    }
    Ok(())
}

/// Consume events up to and including the end tag of an element whose
/// start tag was just read.
fn skip_element(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> Result<(), GenError> {
    let mut depth = 1usize;
    loop {
        buf.clear();
        match reader.read_event_into(buf).map_err(xml_err)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(GenError::Template("unexpected end of worksheet xml".to_string()))
            }
            _ => {}
        }
    }
}

/// Integers without decimals, everything else via shortest round-trip.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn xml_err<E: std::fmt::Display>(e: E) -> GenError {
    GenError::Template(format!("worksheet xml: {e}"))
}
