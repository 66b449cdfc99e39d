//! All-or-nothing output file replacement.

use std::{io::Write, path::Path};

use tempfile::NamedTempFile;

use crate::error::ArgSheetError;

/// Writes `contents` to `path` through a temporary file in the same
/// directory, renamed over `path` only once fully written. On failure the
/// previous file at `path`, if any, is left untouched and the temporary file
/// is removed.
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> Result<(), ArgSheetError> {
    let output_write = |source| ArgSheetError::OutputWrite {
        source,
        path: path.to_path_buf(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(output_write)?;
    file.write_all(contents).map_err(output_write)?;
    file.as_file().sync_all().map_err(output_write)?;
    file.persist(path).map_err(|e| output_write(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        std::fs::write(&path, "old").unwrap();

        replace_file(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_parent_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("out.tsv");

        let err = replace_file(&path, b"new").unwrap_err();
        assert!(matches!(err, ArgSheetError::OutputWrite { .. }));
        assert!(!path.exists());
    }
}
