//! Roster-to-CSV export: projection of a snapshot into a table, then encoding.

pub mod encode;
pub mod project;
pub mod table;

pub use encode::{encode, encode_in, file_name_for, quote_field, ExportFile};
pub use project::{project, project_in};
pub use table::{ExportTable, FIXED_COLUMNS};
