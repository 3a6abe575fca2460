//! Directory-level batch processing.
//!
//! Every accepted input gets its own numbered output directory
//! (`<out>/<i>/` with an `images/` subdirectory) and is processed in
//! isolation: a failing document is logged, recorded in the
//! [`BatchReport`], and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::DocumentAggregator;
use crate::error::{Error, ErrorKind, Result};
use crate::normalize::NormalizationOptions;
use crate::output::write_json_atomic;
use crate::source::{DocumentOpener, ErrorMode, LopdfOpener};

/// Name of the per-document image directory.
pub const IMAGE_DIR: &str = "images";

/// Default input file extension.
pub const DEFAULT_EXTENSION: &str = "pdf";

/// Options for a batch run.
///
/// Deserializable from a JSON configuration file; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchOptions {
    /// Normalization applied to every text segment
    pub normalization: NormalizationOptions,

    /// Extension of the files to process, without the dot (case-insensitive)
    pub extension: String,

    /// Handling of per-page extraction errors
    pub error_mode: ErrorMode,

    /// Replace existing JSON records
    pub overwrite: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            normalization: NormalizationOptions::legacy_preset(),
            extension: DEFAULT_EXTENSION.to_string(),
            error_mode: ErrorMode::Strict,
            overwrite: true,
        }
    }
}

impl BatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidOption(format!("{}: {}", path.display(), e)))
    }

    /// Set the normalization options.
    pub fn with_normalization(mut self, normalization: NormalizationOptions) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the input extension. A leading dot is ignored.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip failing page extractions).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set whether existing records are replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.trim_start_matches('.')))
    }
}

/// Name of the JSON record for an input: its base name with `.json`.
pub fn record_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}.json", stem)
}

/// Extract one document into `out_dir` and return the path of its record.
///
/// `out_dir` and its `images/` subdirectory must already exist. The
/// normalization options are validated before the input is opened.
pub fn extract_document(
    opener: &dyn DocumentOpener,
    input: &Path,
    out_dir: &Path,
    options: &BatchOptions,
) -> Result<PathBuf> {
    let config = options.normalization.build()?;

    let record_path = out_dir.join(record_file_name(input));
    if !options.overwrite && record_path.exists() {
        return Err(Error::OutputExists(record_path));
    }

    let source = opener.open(input).map_err(|e| e.for_document(input))?;
    log::debug!("{}: {} pages", input.display(), source.page_count());

    let document = DocumentAggregator::new(config)
        .with_error_mode(options.error_mode)
        .aggregate(source.as_ref(), &out_dir.join(IMAGE_DIR))
        .map_err(|e| e.for_document(input))?;

    write_json_atomic(&document, &record_path, options.overwrite)?;
    log::debug!(
        "{}: {} segments, {} tables, {} images",
        input.display(),
        document.segment_count(),
        document.table_count(),
        document.images.len()
    );

    Ok(record_path)
}

/// Why a document failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Failure class
    pub kind: ErrorKind,
    /// Rendered error message
    pub message: String,
}

impl From<&Error> for DocumentFailure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of processing one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// Position in the batch, also the output directory name
    pub index: usize,
    /// Input file
    pub input: PathBuf,
    /// Record path on success, failure otherwise
    pub result: std::result::Result<PathBuf, DocumentFailure>,
}

impl DocumentOutcome {
    /// Check if the document succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a whole batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// All outcomes.
    pub fn outcomes(&self) -> &[DocumentOutcome] {
        &self.outcomes
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of documents that produced a record.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Outcomes of failed documents.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    fn push(&mut self, outcome: DocumentOutcome) {
        self.outcomes.push(outcome);
    }
}

/// Receives progress events from a [`BatchRunner`].
///
/// All methods default to doing nothing.
pub trait BatchObserver {
    /// Called once the inputs are known.
    fn on_batch_start(&mut self, _total: usize) {}

    /// Called before a document is processed.
    fn on_document_start(&mut self, _index: usize, _input: &Path) {}

    /// Called after a document succeeded or failed.
    fn on_document_finish(&mut self, _outcome: &DocumentOutcome) {}

    /// Called after the last document.
    fn on_batch_finish(&mut self, _report: &BatchReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Processes every matching file of a directory.
pub struct BatchRunner {
    options: BatchOptions,
    opener: Box<dyn DocumentOpener>,
}

impl BatchRunner {
    /// Create a runner backed by [`LopdfOpener`].
    pub fn new(options: BatchOptions) -> Self {
        Self::with_opener(options, LopdfOpener::new())
    }

    /// Create a runner with a custom document opener.
    pub fn with_opener(options: BatchOptions, opener: impl DocumentOpener + 'static) -> Self {
        Self {
            options,
            opener: Box::new(opener),
        }
    }

    /// The options this runner uses.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// List the files of `input_dir` that will be processed, sorted by name.
    ///
    /// The scan is not recursive. Directories and files with another
    /// extension are skipped.
    pub fn collect_inputs(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();

        for entry in fs::read_dir(input_dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    log::debug!("skipping unreadable entry in {}: {}", input_dir.display(), e);
                    continue;
                }
            };
            if path.is_file() && self.options.accepts(&path) {
                inputs.push(path);
            }
        }

        inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(inputs)
    }

    /// Process every input of `input_dir` into `output_dir`.
    ///
    /// Only an unreadable input directory or an output root that cannot be
    /// created fail the whole batch; document failures end up in the report.
    pub fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchReport> {
        let inputs = self.collect_inputs(input_dir)?;
        fs::create_dir_all(output_dir)?;

        log::info!(
            "Processing {} documents from {} into {}",
            inputs.len(),
            input_dir.display(),
            output_dir.display()
        );
        observer.on_batch_start(inputs.len());

        let mut report = BatchReport::default();
        for (index, input) in inputs.into_iter().enumerate() {
            observer.on_document_start(index, &input);
            log::info!("[{}] extracting {}", index, input.display());

            let out_dir = output_dir.join(index.to_string());
            let result = prepare_output_dir(&out_dir)
                .and_then(|()| extract_document(self.opener.as_ref(), &input, &out_dir, &self.options));

            let result = match result {
                Ok(record) => {
                    log::info!("[{}] {} -> {}", index, input.display(), record.display());
                    Ok(record)
                }
                Err(e) => {
                    log::error!("[{}] {}: {}", index, input.display(), e);
                    Err(DocumentFailure::from(&e))
                }
            };

            let outcome = DocumentOutcome {
                index,
                input,
                result,
            };
            observer.on_document_finish(&outcome);
            report.push(outcome);
        }

        log::info!(
            "Finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        observer.on_batch_finish(&report);
        Ok(report)
    }
}

fn prepare_output_dir(out_dir: &Path) -> Result<()> {
    let image_dir = out_dir.join(IMAGE_DIR);
    fs::create_dir_all(&image_dir).map_err(|e| Error::write_failure(image_dir, e))
}
