use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Replace `path` with `contents` via a sibling temp file and a rename.
///
/// Readers see either the old or the new content, never a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "1.0.0\n").unwrap();

        write_atomic(&path, "1.1.0\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1.1.0\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temp file should have been renamed away");
    }
}
