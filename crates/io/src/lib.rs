// File I/O operations

pub mod archive;
pub mod dataset;
pub mod error;
pub mod template;

pub use archive::{generate_all, BATCH_ARCHIVE_NAME, ZIP_MIME};
pub use dataset::load_records;
pub use error::GenError;
pub use template::{TemplateSource, XLSX_MIME};

#[cfg(test)]
pub(crate) mod fixtures;
