use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{BuildstampError, Result};

/// Advisory lock held for the duration of one mutating operation.
///
/// The lock is a file created with create-new semantics; it is removed when
/// the guard is dropped. A crash leaves the file behind and later runs fail
/// with [`BuildstampError::Locked`] until it is deleted.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(BuildstampError::Locked {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let lock = StoreLock {
            path: path.to_path_buf(),
        };
        lock.write_owner(&mut file)?;
        tracing::debug!(path = %path.display(), "acquired store lock");
        Ok(lock)
    }

    /// Record the owning pid; on failure the guard is dropped and the file removed
    fn write_owner(&self, file: &mut impl Write) -> Result<()> {
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;
        Ok(())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove store lock");
        } else {
            tracing::debug!(path = %self.path.display(), "released store lock");
        }
    }
}
