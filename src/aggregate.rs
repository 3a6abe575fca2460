//! Per-document aggregation.
//!
//! Walks every page of a [`PageSource`], turns raw page text into normalized
//! segments, collects detected tables and writes images to disk as they are
//! found. The result is one [`ExtractedDocument`] ready to serialize.

use std::path::Path;

use crate::error::Result;
use crate::model::{page_key, ExtractedDocument, ImageArtifact};
use crate::normalize::{NormalizationConfig, Normalizer};
use crate::source::{ErrorMode, PageSource};

/// Sentence terminator pages are split on.
const SEGMENT_TERMINATOR: char = '。';

/// Split raw page text into segments.
///
/// Line breaks are deleted outright (lines are joined without a space), the
/// text is split on `。`, and fragments of one character or less are dropped.
///
/// ```
/// use pdfsift::aggregate::segment;
///
/// assert_eq!(segment("Hello\nWorld。Test。A。"), vec!["HelloWorld", "Test"]);
/// ```
pub fn segment(raw: &str) -> Vec<String> {
    let joined: String = raw.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    joined
        .split(SEGMENT_TERMINATOR)
        .filter(|s| s.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Builds an [`ExtractedDocument`] from a page source.
#[derive(Debug, Clone)]
pub struct DocumentAggregator {
    normalizer: Normalizer,
    error_mode: ErrorMode,
}

impl DocumentAggregator {
    /// Create an aggregator in strict mode.
    pub fn new(config: NormalizationConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config),
            error_mode: ErrorMode::Strict,
        }
    }

    /// Set how per-page extraction errors are handled.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// The normalizer applied to every segment.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Process every page in order.
    ///
    /// Images are written into `image_dir` immediately; the directory must
    /// exist. In strict mode the first page error is returned as is; in
    /// lenient mode it is logged and the failing call counts as empty.
    pub fn aggregate(&self, source: &dyn PageSource, image_dir: &Path) -> Result<ExtractedDocument> {
        let mut document = ExtractedDocument::new();

        for page_index in 0..source.page_count() {
            let key = page_key(page_index);
            let page_number = page_index as u32 + 1;

            let raw = self.page_result(page_number, "text", source.get_text(page_index))?;
            let segments: Vec<String> = segment(&raw)
                .iter()
                .map(|s| self.normalizer.clean(s))
                .collect();
            let segment_count = segments.len();
            document.add_segments(key.clone(), segments);

            let tables = self.page_result(page_number, "tables", source.find_tables(page_index))?;
            document.add_tables(key, tables);

            let images = self.page_result(page_number, "images", source.get_images(page_index))?;
            for (image_index, image) in images.into_iter().enumerate() {
                let artifact = ImageArtifact::new(page_number, image_index as u32 + 1, image.data);
                artifact.write_to(image_dir)?;
                log::debug!("page {}: image {} saved as {}", page_number, image.id, artifact.filename);
                document.add_image(artifact.descriptor());
            }

            log::debug!(
                "page {}: {} segments, {} images so far",
                page_number,
                segment_count,
                document.images.len()
            );
        }

        Ok(document)
    }

    fn page_result<T: Default>(&self, page_number: u32, what: &str, result: Result<T>) -> Result<T> {
        match (result, self.error_mode) {
            (Ok(value), _) => Ok(value),
            (Err(e), ErrorMode::Strict) => Err(e),
            (Err(e), ErrorMode::Lenient) => {
                log::warn!("page {}: {} extraction failed, skipping: {}", page_number, what, e);
                Ok(T::default())
            }
        }
    }
}
