//! Error types for pdfsift.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and normalizing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Two mutually exclusive normalization options were both enabled.
    #[error("Conflicting normalization options: `{first}` and `{second}` cannot both be enabled")]
    Configuration {
        /// First option of the exclusive pair
        first: &'static str,
        /// Second option of the exclusive pair
        second: &'static str,
    },

    /// The input document could not be opened or parsed.
    #[error("Failed to open document '{}': {reason}", path.display())]
    DocumentOpen {
        /// Path of the offending document
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Writing an output artifact (JSON record or image) failed.
    #[error("Failed to write '{}': {reason}", path.display())]
    Serialization {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The output file already exists and overwriting is disabled.
    #[error("Output already exists: '{}'", .0.display())]
    OutputExists(PathBuf),

    /// An option name, bit mask or configuration file could not be understood.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error extracting images from PDF.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),
}

/// Document-level failure classes reported by a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Contradictory normalization options
    Configuration,
    /// Unreadable or corrupt input
    DocumentOpen,
    /// Output could not be written
    Serialization,
    /// Anything else
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::DocumentOpen => write!(f, "document-open"),
            ErrorKind::Serialization => write!(f, "serialization"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

impl Error {
    /// Classify this error into one of the document-level failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::DocumentOpen { .. }
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::TextExtract(_)
            | Error::ImageExtract(_)
            | Error::PageOutOfRange(..) => ErrorKind::DocumentOpen,
            Error::Serialization { .. } | Error::OutputExists(_) => ErrorKind::Serialization,
            Error::Io(_) | Error::InvalidOption(_) => ErrorKind::Other,
        }
    }

    /// Wrap any error as an open failure for `path`.
    pub(crate) fn open_failure(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::DocumentOpen {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Attach the document path to an error raised while reading it.
    ///
    /// Configuration and write failures pass through unchanged; everything
    /// else becomes an open failure for `path`.
    pub(crate) fn for_document(self, path: &std::path::Path) -> Self {
        match self {
            Error::DocumentOpen { .. } => self,
            _ if matches!(
                self.kind(),
                ErrorKind::Configuration | ErrorKind::Serialization
            ) =>
            {
                self
            }
            _ => Error::open_failure(path, self),
        }
    }

    /// Wrap any error as a write failure for `path`.
    pub(crate) fn write_failure(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Serialization {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration {
            first: "lowercase",
            second: "uppercase",
        };
        assert_eq!(
            err.to_string(),
            "Conflicting normalization options: `lowercase` and `uppercase` cannot both be enabled"
        );

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Error::UnknownFormat.kind(), ErrorKind::DocumentOpen);
        assert_eq!(
            Error::open_failure("a.pdf", "bad xref").kind(),
            ErrorKind::DocumentOpen
        );
        assert_eq!(
            Error::write_failure("out/a.json", "disk full").kind(),
            ErrorKind::Serialization
        );
        assert_eq!(
            Error::OutputExists(PathBuf::from("out/a.json")).kind(),
            ErrorKind::Serialization
        );
    }

    #[test]
    fn test_for_document_wraps_read_errors_only() {
        let path = std::path::Path::new("in/a.pdf");

        let err = Error::TextExtract("Page 2: bad stream".into()).for_document(path);
        assert!(matches!(err, Error::DocumentOpen { ref path, .. } if path.ends_with("a.pdf")));

        let err = Error::write_failure("out/0/images/image_1_1.png", "disk full").for_document(path);
        assert!(matches!(err, Error::Serialization { .. }));

        let err = Error::Configuration {
            first: "lowercase",
            second: "uppercase",
        }
        .for_document(path);
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_document_open_display_includes_path() {
        let err = Error::open_failure("input/broken.pdf", "trailer not found");
        let msg = err.to_string();
        assert!(msg.contains("input/broken.pdf"));
        assert!(msg.contains("trailer not found"));
    }
}
