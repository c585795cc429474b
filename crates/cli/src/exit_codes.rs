//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                 |
//! |------|-----------------------------------------|
//! | 0    | Success                                 |
//! | 1    | General error (unspecified)             |
//! | 2    | CLI usage error (clap's own exit)       |
//! | 3    | I/O error (file open/read/write)        |
//! | 4    | Database parse error                    |
//! | 5    | Database schema error (missing columns) |
//! | 6    | Template unreadable                     |
//! | 7    | Name not found in database              |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap produces this itself on argument parse failures.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// I/O error - a file could not be opened, read, or written.
pub const EXIT_IO: u8 = 3;

/// Parse error - the database file is unreadable or corrupt.
pub const EXIT_PARSE: u8 = 4;

/// Schema error - required database columns are missing.
pub const EXIT_SCHEMA: u8 = 5;

/// Template error - the template is not a readable xlsx document.
pub const EXIT_TEMPLATE: u8 = 6;

/// The requested name has no row in the database.
pub const EXIT_NAME: u8 = 7;
