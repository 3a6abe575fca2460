//! [`PageSource`] backed by lopdf.

use std::collections::HashSet;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::detect::sniff_header_from_path;
use crate::error::{Error, Result};
use crate::model::Table;

use super::layout::{extract_page_spans, extract_page_text};
use super::tables::TableDetector;
use super::{DocumentOpener, PageSource, RawImage};

/// Guard against `/Parent` cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 32;

/// Opens PDF files with lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfOpener {
    detector: TableDetector,
}

impl LopdfOpener {
    /// Create an opener with the default table detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an opener with a custom table detector.
    pub fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }
}

impl DocumentOpener for LopdfOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let source = LopdfSource::open(path)?.with_detector(self.detector.clone());
        Ok(Box::new(source))
    }
}

/// An opened PDF document.
pub struct LopdfSource {
    doc: Document,
    /// Page object ids in page order
    pages: Vec<ObjectId>,
    detector: TableDetector,
}

impl LopdfSource {
    /// Open a PDF file.
    ///
    /// The header is checked before lopdf sees the file; every failure,
    /// including encryption, is reported as an open error for `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let header = sniff_header_from_path(path).map_err(|e| Error::open_failure(path, e))?;
        log::debug!("{}: {}", path.display(), header);

        let doc = Document::load(path).map_err(|e| Error::open_failure(path, Error::from(e)))?;
        if doc.is_encrypted() {
            return Err(Error::open_failure(path, Error::Encrypted));
        }

        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            detector: TableDetector::default(),
        }
    }

    /// Replace the table detector.
    pub fn with_detector(mut self, detector: TableDetector) -> Self {
        self.detector = detector;
        self
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(
                page_index as u32 + 1,
                self.pages.len() as u32,
            ))
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// The page's resource dictionary, inherited from ancestors when absent.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve_dict(resources);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Image bytes of an XObject stream, `None` for non-image XObjects.
    fn image_data(stream: &Stream) -> Option<Vec<u8>> {
        let dict = &stream.dict;
        match dict.get(b"Subtype").and_then(|s| s.as_name_str()) {
            Ok("Image") => {}
            _ => return None,
        }

        let data = match filter_names(dict).as_slice() {
            ["DCTDecode"] | ["JPXDecode"] => stream.content.clone(),
            _ => stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
        };
        Some(data)
    }

    /// Walk a resource dictionary's XObjects in order, descending into forms.
    ///
    /// Each stream is visited once per page, so an image shared by several
    /// forms is reported at its first occurrence and form cycles terminate.
    fn collect_images(
        &self,
        page_index: usize,
        resources: &Dictionary,
        prefix: &str,
        depth: usize,
        seen: &mut HashSet<ObjectId>,
        images: &mut Vec<RawImage>,
    ) -> Result<()> {
        let xobjects = match resources
            .get(b"XObject")
            .ok()
            .and_then(|x| self.resolve_dict(x))
        {
            Some(xobjects) => xobjects,
            None => return Ok(()),
        };

        for (name, obj) in xobjects.iter() {
            let name = format!("{}{}", prefix, String::from_utf8_lossy(name));
            let stream = match obj {
                Object::Reference(r) => {
                    if !seen.insert(*r) {
                        continue;
                    }
                    match self.doc.get_object(*r) {
                        Ok(Object::Stream(s)) => s,
                        Ok(_) => continue,
                        Err(e) => {
                            return Err(Error::ImageExtract(format!(
                                "Page {}: XObject {}: {}",
                                page_index + 1,
                                name,
                                e
                            )))
                        }
                    }
                }
                Object::Stream(s) => s,
                _ => continue,
            };

            if let Some(data) = Self::image_data(stream) {
                images.push(RawImage::new(name, data));
            } else if is_form(&stream.dict) && depth < MAX_TREE_DEPTH {
                if let Some(form_resources) = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| self.resolve_dict(r))
                {
                    let prefix = format!("{}/", name);
                    self.collect_images(page_index, form_resources, &prefix, depth + 1, seen, images)?;
                }
            }
        }

        Ok(())
    }
}

/// Names of the stream filters, in application order.
fn filter_names(dict: &Dictionary) -> Vec<&str> {
    match dict.get(b"Filter") {
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| f.as_name_str().ok())
            .collect(),
        Ok(filter) => filter.as_name_str().ok().into_iter().collect(),
        Err(_) => Vec::new(),
    }
}

fn is_form(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(|s| s.as_name_str()), Ok("Form"))
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn get_text(&self, page_index: usize) -> Result<String> {
        let page_id = self.page_id(page_index)?;
        extract_page_text(&self.doc, page_id)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_index + 1, e)))
    }

    fn find_tables(&self, page_index: usize) -> Result<Vec<Table>> {
        let page_id = self.page_id(page_index)?;
        let spans = extract_page_spans(&self.doc, page_id)?;
        Ok(self.detector.detect(&spans))
    }

    fn get_images(&self, page_index: usize) -> Result<Vec<RawImage>> {
        let page_id = self.page_id(page_index)?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(page_id) {
            let mut seen = HashSet::new();
            self.collect_images(page_index, resources, "", 0, &mut seen, &mut images)?;
        }
        Ok(images)
    }
}
