//! Page-level extraction contract.
//!
//! The aggregation layer only ever talks to a [`PageSource`]: give it a page
//! index and it hands back raw text, detected tables and raw image bytes.
//! [`LopdfOpener`] is the shipped implementation; tests and other engines
//! plug in their own.

mod backend;
mod layout;
mod tables;

pub use backend::{LopdfOpener, LopdfSource};
pub use layout::{extract_page_spans, extract_page_text, TextSpan};
pub use tables::{TableDetector, TableDetectorConfig};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Table;

/// An image as found on a page, before it is named and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Engine-specific identifier (the XObject resource name for lopdf)
    pub id: String,

    /// Image bytes, not re-encoded
    pub data: Vec<u8>,
}

impl RawImage {
    /// Create a raw image.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Per-page access to an opened document.
///
/// Page indices are 0-based. Empty results are never errors; an `Err` means
/// the engine failed on that page.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Raw text of a page. May contain newlines.
    fn get_text(&self, page_index: usize) -> Result<String>;

    /// Tables detected on a page, empty when there are none.
    fn find_tables(&self, page_index: usize) -> Result<Vec<Table>>;

    /// Images on a page, in page order.
    fn get_images(&self, page_index: usize) -> Result<Vec<RawImage>>;
}

/// Opens a document path into a [`PageSource`].
pub trait DocumentOpener {
    /// Open and parse `path`. Any failure is an open error for that path.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>>;
}

/// How a failing per-page call is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Abort the document on the first page error (default)
    #[default]
    Strict,
    /// Log the page error and treat the result as empty
    Lenient,
}

impl std::fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorMode::Strict => write!(f, "strict"),
            ErrorMode::Lenient => write!(f, "lenient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mode_default_is_strict() {
        assert_eq!(ErrorMode::default(), ErrorMode::Strict);
    }

    #[test]
    fn test_error_mode_serde() {
        let mode: ErrorMode = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(mode, ErrorMode::Lenient);
        assert_eq!(serde_json::to_string(&ErrorMode::Strict).unwrap(), "\"strict\"");
        assert!(serde_json::from_str::<ErrorMode>("\"loose\"").is_err());
    }
}
