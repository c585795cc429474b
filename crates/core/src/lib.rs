//! `spdgen-core` — Domain model for SPD honorarium template generation.
//!
//! Pure types crate: records and their derived amounts, the database
//! column contract, A1 cell references, and the fixed template layout.
//! No CLI or IO dependencies.

pub mod cellref;
pub mod layout;
pub mod record;

pub use layout::{CellWrite, TemplateLayout, SPD_LAYOUT};
pub use record::{Record, REQUIRED_COLUMNS};
