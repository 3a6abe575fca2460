//! # pdfsift
//!
//! Batch extraction of text, tables and images from PDF documents into
//! per-document JSON records, with a configurable text normalizer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsift::{run_batch, BatchOptions};
//!
//! fn main() -> pdfsift::Result<()> {
//!     let report = run_batch("input", "output", &BatchOptions::default())?;
//!     println!("{} of {} documents extracted", report.succeeded(), report.total());
//!     Ok(())
//! }
//! ```
//!
//! Each input `input/<name>.pdf` becomes `output/<i>/<name>.json` plus the
//! page images under `output/<i>/images/`, where `<i>` is the position of
//! the file in name order.
//!
//! ## Normalization
//!
//! Text segments pass through [`Normalizer`]: NFKC first, then the enabled
//! transforms in a fixed order. Options that contradict each other are
//! rejected when the [`NormalizationConfig`] is built.
//!
//! ```
//! use pdfsift::{NormalizationOptions, Normalizer};
//!
//! let config = NormalizationOptions::new()
//!     .lowercase()
//!     .strip_leading_symbols()
//!     .build()?;
//! assert_eq!(Normalizer::new(config).clean("■ ＰＤＦ入門"), "pdf入門");
//! # Ok::<(), pdfsift::Error>(())
//! ```

pub mod aggregate;
pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod normalize;
pub mod output;
pub mod source;

// Re-export commonly used types
pub use aggregate::{segment, DocumentAggregator};
pub use batch::{
    extract_document, BatchObserver, BatchOptions, BatchReport, BatchRunner, DocumentFailure,
    DocumentOutcome, NoopObserver,
};
pub use error::{Error, ErrorKind, Result};
pub use model::{ExtractedDocument, ImageArtifact, ImageDescriptor, Table};
pub use normalize::{clean, NormalizationConfig, NormalizationOption, NormalizationOptions, Normalizer};
pub use source::{DocumentOpener, ErrorMode, LopdfOpener, LopdfSource, PageSource, RawImage};

use std::path::{Path, PathBuf};

/// Process every PDF of `input_dir` into `output_dir` with lopdf.
///
/// # Example
///
/// ```no_run
/// use pdfsift::{run_batch, BatchOptions, NormalizationOptions};
///
/// let options = BatchOptions::new()
///     .with_normalization(NormalizationOptions::new().lowercase())
///     .lenient();
/// let report = run_batch("scans", "out", &options).unwrap();
/// for failure in report.failures() {
///     eprintln!("{}: failed", failure.input.display());
/// }
/// ```
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
) -> Result<BatchReport> {
    BatchRunner::new(options.clone()).run(
        input_dir.as_ref(),
        output_dir.as_ref(),
        &mut NoopObserver,
    )
}

/// Extract a single PDF into `out_dir`, returning the path of its record.
///
/// `out_dir` and its `images/` subdirectory are created when missing.
///
/// # Example
///
/// ```no_run
/// use pdfsift::{extract_file, BatchOptions};
///
/// let record = extract_file("report.pdf", "out/report", &BatchOptions::default()).unwrap();
/// println!("{}", record.display());
/// ```
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    out_dir: Q,
    options: &BatchOptions,
) -> Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    let image_dir = out_dir.join(batch::IMAGE_DIR);
    std::fs::create_dir_all(&image_dir).map_err(|e| Error::write_failure(image_dir, e))?;
    extract_document(&LopdfOpener::new(), path.as_ref(), out_dir, options)
}
