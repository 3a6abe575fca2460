//! Document-level record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Table;

/// Page identifier for a 0-based page index (`page_1` for the first page).
pub fn page_key(page_index: usize) -> String {
    format!("page_{}", page_index + 1)
}

/// Everything extracted from one document.
///
/// Serializes as a JSON object with exactly `text`, `tables` and `images`,
/// in that order. Page maps keep insertion order, so pages appear in the
/// order they were processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Normalized segments per page
    pub text: IndexMap<String, Vec<String>>,

    /// Detected tables per page, cells kept verbatim
    pub tables: IndexMap<String, Vec<Table>>,

    /// Images written next to the record, in discovery order
    pub images: Vec<ImageDescriptor>,
}

impl ExtractedDocument {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the segments of a page. Nothing is stored for an empty list.
    pub fn add_segments(&mut self, page: impl Into<String>, segments: Vec<String>) {
        if !segments.is_empty() {
            self.text.insert(page.into(), segments);
        }
    }

    /// Store the tables of a page. Nothing is stored for an empty list.
    pub fn add_tables(&mut self, page: impl Into<String>, tables: Vec<Table>) {
        if !tables.is_empty() {
            self.tables.insert(page.into(), tables);
        }
    }

    /// Record an image that has already been written to disk.
    pub fn add_image(&mut self, descriptor: ImageDescriptor) {
        self.images.push(descriptor);
    }

    /// Total number of segments across all pages.
    pub fn segment_count(&self) -> usize {
        self.text.values().map(Vec::len).sum()
    }

    /// Total number of tables across all pages.
    pub fn table_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Check whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tables.is_empty() && self.images.is_empty()
    }
}

/// Reference to an image file written for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// File name inside the document's image directory
    pub filename: String,

    /// 1-based page number the image came from
    pub page_number: u32,
}
