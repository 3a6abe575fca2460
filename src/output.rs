//! JSON output.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Write `value` as pretty JSON to `path`, all or nothing.
///
/// The format is two-space indentation with non-ASCII written literally.
///
/// The JSON goes to a temporary file in the target directory which is then
/// renamed over `path`, so a failure never leaves a partial file behind.
/// With `overwrite` off an existing `path` is an [`Error::OutputExists`].
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path, overwrite: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::write_failure(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| Error::write_failure(path, e))?;
        writer.flush().map_err(|e| Error::write_failure(path, e))?;
    }

    if overwrite {
        tmp.persist(path)
            .map_err(|e| Error::write_failure(path, e.error))?;
    } else {
        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                Error::OutputExists(path.to_path_buf())
            } else {
                Error::write_failure(path, e.error)
            }
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractedDocument, Table};
    use std::fs;

    fn sample() -> ExtractedDocument {
        let mut doc = ExtractedDocument::new();
        doc.add_segments("page_1", vec!["日本語のテキスト".into()]);
        doc.add_tables("page_1", vec![Table::from_rows(vec![vec![Some("a".into()), None]])]);
        doc
    }

    #[test]
    fn test_pretty_output_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_atomic(&sample(), &path, true).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let expected = r#"{
  "text": {
    "page_1": [
      "日本語のテキスト"
    ]
  },
  "tables": {
    "page_1": [
      [
        [
          "a",
          null
        ]
      ]
    ]
  },
  "images": []
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_write_json_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json_atomic(&sample(), &path, true).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::to_value(sample()).unwrap());

        // only the target file is left behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_overwrite_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, "old").unwrap();

        let err = write_json_atomic(&sample(), &path, false).unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        write_json_atomic(&sample(), &path, true).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");

        let err = write_json_atomic(&sample(), &path, true).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(!path.exists());
    }
}
