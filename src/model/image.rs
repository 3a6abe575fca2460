//! Image artifacts written alongside the JSON record.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::ImageDescriptor;

/// File name for an image, both numbers 1-based (`image_3_2.png`).
///
/// The `.png` extension is kept for every image regardless of the actual
/// encoding of the bytes.
pub fn image_filename(page_number: u32, image_number: u32) -> String {
    format!("image_{}_{}.png", page_number, image_number)
}

/// Raw image bytes together with their destination name.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    /// Destination file name
    pub filename: String,

    /// 1-based page number
    pub page_number: u32,

    /// Bytes exactly as extracted, never re-encoded
    pub data: Vec<u8>,
}

impl ImageArtifact {
    /// Create an artifact for image `image_number` of page `page_number`.
    pub fn new(page_number: u32, image_number: u32, data: Vec<u8>) -> Self {
        Self {
            filename: image_filename(page_number, image_number),
            page_number,
            data,
        }
    }

    /// Write the bytes into `dir` and return the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        fs::write(&path, &self.data).map_err(|e| Error::write_failure(&path, e))?;
        log::debug!(
            "Wrote {} ({} bytes, {})",
            path.display(),
            self.data.len(),
            detect_mime_type(&self.data).unwrap_or("unknown format")
        );
        Ok(path)
    }

    /// Descriptor stored in the document record.
    pub fn descriptor(&self) -> ImageDescriptor {
        ImageDescriptor {
            filename: self.filename.clone(),
            page_number: self.page_number,
        }
    }
}

/// Detect MIME type from data magic bytes.
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG 2000 codestream or JP2 container
    if data.starts_with(&[0xFF, 0x4F, 0xFF, 0x51])
        || data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20])
    {
        return Some("image/jp2");
    }

    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("image/tiff");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename(3, 2), "image_3_2.png");
        assert_eq!(image_filename(1, 1), "image_1_1.png");
    }

    #[test]
    fn test_write_to_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ImageArtifact::new(2, 1, vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]);

        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("image_2_1.png"));
        assert_eq!(fs::read(&path).unwrap(), artifact.data);
        assert_eq!(
            artifact.descriptor(),
            ImageDescriptor {
                filename: "image_2_1.png".into(),
                page_number: 2,
            }
        );
    }

    #[test]
    fn test_write_to_missing_dir_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ImageArtifact::new(1, 1, vec![1, 2, 3]);
        let err = artifact.write_to(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Serialization);
    }

    #[test]
    fn test_detect_mime_type() {
        assert_eq!(
            detect_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]),
            Some("image/jpeg")
        );
        assert_eq!(
            detect_mime_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("image/png")
        );
        assert_eq!(detect_mime_type(&[0u8; 16]), None);
        assert_eq!(detect_mime_type(&[0xFF]), None);
    }
}
