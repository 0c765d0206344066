use serde::{Deserialize, Serialize};

pub const DOI_COLUMN: &str = "doi";
pub const REF_TEXT_COLUMN: &str = "ref_text";
pub const TITLE_DOI_COLUMN: &str = "titleDoi";
pub const FIRST_AUTH_DOI_COLUMN: &str = "firstAuthDoi";
pub const AUTHOR_SIMILARITY_COLUMN: &str = "author_similarity";
pub const TITLE_SIMILARITY_COLUMN: &str = "title_similarity";

/// 依輸出順序排列的衍生欄位
pub const DERIVED_COLUMNS: [&str; 4] = [
    TITLE_DOI_COLUMN,
    FIRST_AUTH_DOI_COLUMN,
    AUTHOR_SIMILARITY_COLUMN,
    TITLE_SIMILARITY_COLUMN,
];

/// Title and first author of a work, as returned by the metadata service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkMetadata {
    pub title: String,
    pub first_author: String,
}

impl WorkMetadata {
    pub fn new(title: impl Into<String>, first_author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            first_author: first_author.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityScores {
    pub author_similarity: u8,
    pub title_similarity: u8,
}

/// A delimited table whose first column is a row index.
///
/// `rows` hold the remaining fields, aligned with `headers`. The index value of
/// each row is kept separately so it can be used in log output and dropped
/// when the table is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    pub index_header: String,
    pub headers: Vec<String>,
    pub index: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the position of `name`, appending an empty column when absent.
    ///
    /// Existing columns are reused so re-running over an already enriched
    /// table overwrites the derived values instead of duplicating them.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(pos) = self.column_position(name) {
            return pos;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }
}
