// Batch generation: one filled template per record, packed into a ZIP.

use std::io::{Cursor, Write};

use zip::ZipWriter;

use spdgen_core::{Record, TemplateLayout};

use crate::error::GenError;
use crate::template::{entry_options, TemplateSource};

/// Content type of the batch archive.
pub const ZIP_MIME: &str = "application/zip";

/// Default batch archive filename.
pub const BATCH_ARCHIVE_NAME: &str = "Semua_Template_SPD.zip";

/// File/entry name for one record's filled template.
pub fn document_name(name: &str) -> String {
    format!("Template_{}.xlsx", sanitize_entry_name(name))
}

/// Replace path separators so a record name cannot become a nested path
/// inside the archive.
pub fn sanitize_entry_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Fill the template once per record and pack the results into a ZIP.
///
/// Each iteration gets its own fresh copy of the template source via
/// [`TemplateSource::fill`]; no record ever sees another record's writes.
/// Entries appear in input order, one per record. Two records that
/// sanitize to the same entry name are appended as duplicate entries and
/// left to ZIP duplicate semantics.
pub fn generate_all(
    template: &TemplateSource,
    records: &[Record],
    layout: &TemplateLayout,
) -> Result<Vec<u8>, GenError> {
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));

    for record in records {
        let document = template.fill(record, layout)?;
        out.start_file(document_name(&record.name), entry_options())
            .map_err(|e| GenError::Io(format!("cannot add archive entry: {e}")))?;
        out.write_all(&document)
            .map_err(|e| GenError::Io(format!("cannot write archive entry: {e}")))?;
    }

    let cursor = out
        .finish()
        .map_err(|e| GenError::Io(format!("cannot finalize archive: {e}")))?;
    Ok(cursor.into_inner())
}
