use std::fmt;

use spdgen_core::REQUIRED_COLUMNS;

#[derive(Debug)]
pub enum GenError {
    /// File open/read/write failure.
    Io(String),
    /// Database source unreadable or corrupt.
    Parse(String),
    /// Required columns absent from the database header.
    MissingColumns(Vec<String>),
    /// Template archive or worksheet XML structurally unreadable.
    Template(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Parse(msg) => write!(f, "cannot read database: {msg}"),
            Self::MissingColumns(missing) => {
                // The full required set is part of the user-facing message,
                // not just the columns that happened to be absent.
                write!(
                    f,
                    "database is missing column(s): {}; required columns are: {}",
                    missing.join(", "),
                    REQUIRED_COLUMNS.join(", ")
                )
            }
            Self::Template(msg) => write!(f, "cannot read template: {msg}"),
        }
    }
}

impl std::error::Error for GenError {}
