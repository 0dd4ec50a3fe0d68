/// Fixed leading columns: join date, display name, username, user id, nickname.
pub const FIXED_COLUMNS: [&str; 5] = [
    "Discord加入日",
    "表示名",
    "ユーザー名",
    "ユーザーID",
    "ニックネーム",
];

/// Header + rows of one export. Built per invocation and dropped after encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Build a table from raw parts.
    ///
    /// Row widths are not checked here; the encoder rejects mismatches.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of role columns after the fixed ones.
    pub fn role_columns(&self) -> usize {
        self.header.len().saturating_sub(FIXED_COLUMNS.len())
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}
