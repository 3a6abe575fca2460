//! Shared fixtures: in-process PDF generation and an in-memory page source.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use pdfsift::{DocumentOpener, Error, PageSource, RawImage, Result, Table};

/// Bytes that start like a JFIF file; never decoded by the extractor.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

/// A string drawn with one of the fixture fonts.
#[derive(Debug, Clone)]
struct TextRun {
    x: f32,
    y: f32,
    text: String,
    /// Drawn with the `UniJIS-UCS2-H` Type0 font instead of Helvetica
    cjk: bool,
}

/// Content of one generated page.
#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    texts: Vec<TextRun>,
    images: Vec<Vec<u8>>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a string at `(x, y)` in its own text object.
    pub fn text(mut self, x: f32, y: f32, text: &str) -> Self {
        self.texts.push(TextRun {
            x,
            y,
            text: text.to_string(),
            cjk: false,
        });
        self
    }

    /// Place a string encoded as UTF-16BE for a Japanese CID font.
    pub fn cjk_text(mut self, x: f32, y: f32, text: &str) -> Self {
        self.texts.push(TextRun {
            x,
            y,
            text: text.to_string(),
            cjk: true,
        });
        self
    }

    /// Add a DCT-encoded image XObject with the given bytes.
    pub fn image(mut self, data: &[u8]) -> Self {
        self.images.push(data.to_vec());
        self
    }
}

/// Build a document with a Helvetica font (`F1`), a Japanese Type0 font
/// (`F2`, `UniJIS-UCS2-H`) and the given pages.
pub fn build_pdf(pages: &[PageSpec]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => "HeiseiMin-W3",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 2,
        },
    });
    let cjk_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "HeiseiMin-W3",
        "Encoding" => "UniJIS-UCS2-H",
        "DescendantFonts" => vec![cid_font_id.into()],
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for run in &page.texts {
            let (font, string) = if run.cjk {
                let utf16: Vec<u8> = run.text.encode_utf16().flat_map(u16::to_be_bytes).collect();
                ("F2", Object::String(utf16, StringFormat::Hexadecimal))
            } else {
                ("F1", Object::string_literal(run.text.as_str()))
            };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), 12.into()]));
            operations.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
            operations.push(Operation::new("Tj", vec![string]));
            operations.push(Operation::new("ET", vec![]));
        }

        let mut xobjects = Dictionary::new();
        for (i, data) in page.images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                data.clone(),
            ));
            xobjects.set(name.as_str(), image_id);

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![100.into(), 0.into(), 0.into(), 100.into(), 72.into(), (100 + 120 * i as i64).into()],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id, "F2" => cjk_font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Generate a PDF file at `path`.
pub fn write_pdf(path: &Path, pages: &[PageSpec]) {
    let mut doc = build_pdf(pages);
    doc.save(path).expect("save fixture pdf");
}

/// One page of a [`MockSource`].
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub text: String,
    pub tables: Vec<Table>,
    pub images: Vec<Vec<u8>>,
    pub fail_tables: bool,
}

impl MockPage {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, rows: &[&[Option<&str>]]) -> Self {
        self.tables.push(Table::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        ));
        self
    }

    pub fn with_image(mut self, data: &[u8]) -> Self {
        self.images.push(data.to_vec());
        self
    }

    pub fn failing_tables(mut self) -> Self {
        self.fail_tables = true;
        self
    }
}

/// In-memory [`PageSource`].
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pub pages: Vec<MockPage>,
}

impl MockSource {
    pub fn new(pages: Vec<MockPage>) -> Self {
        Self { pages }
    }

    fn page(&self, index: usize) -> Result<&MockPage> {
        self.pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index as u32 + 1, self.pages.len() as u32))
    }
}

impl PageSource for MockSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn get_text(&self, page_index: usize) -> Result<String> {
        Ok(self.page(page_index)?.text.clone())
    }

    fn find_tables(&self, page_index: usize) -> Result<Vec<Table>> {
        let page = self.page(page_index)?;
        if page.fail_tables {
            return Err(Error::PdfParse(format!(
                "page {}: broken content stream",
                page_index + 1
            )));
        }
        Ok(page.tables.clone())
    }

    fn get_images(&self, page_index: usize) -> Result<Vec<RawImage>> {
        Ok(self
            .page(page_index)?
            .images
            .iter()
            .enumerate()
            .map(|(i, data)| RawImage::new(format!("Im{}", i + 1), data.clone()))
            .collect())
    }
}

/// Opener serving [`MockSource`]s by file name; unknown names fail to open.
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    sources: HashMap<String, MockSource>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, source: MockSource) -> Self {
        self.sources.insert(file_name.to_string(), source);
        self
    }
}

impl DocumentOpener for MockOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.sources.get(&name) {
            Some(source) => Ok(Box::new(source.clone())),
            None => Err(Error::PdfParse(format!("cannot parse {}", name))),
        }
    }
}
