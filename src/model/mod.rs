//! Output model for extracted documents.
//!
//! An [`ExtractedDocument`] is the per-document record serialized to JSON.
//! Images never live inside the record: each one is an [`ImageArtifact`]
//! written to disk on discovery, and only its [`ImageDescriptor`] is kept.

mod document;
mod image;
mod table;

pub use document::{page_key, ExtractedDocument, ImageDescriptor};
pub use image::{detect_mime_type, image_filename, ImageArtifact};
pub use table::Table;
