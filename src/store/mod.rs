//! File-backed version counter store.
//!
//! The `VERSION` and `.build_num` files are the only source of truth. Every
//! mutating operation runs load / transform / save under [`StoreLock`] and then
//! appends one line to the audit log.

pub mod atomic;
pub mod lock;

pub use lock::StoreLock;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::FilesConfig;
use crate::domain::{Action, AuditEntry, BuildNumber, Version, VersionBump};
use crate::error::{BuildstampError, Result};

use atomic::write_atomic;

/// Lock file name, created in the project root.
pub const LOCK_FILE_NAME: &str = ".buildstamp.lock";

/// Both counters as read from disk at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub version: Version,
    pub build_number: BuildNumber,
}

/// Result of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub action: Action,
    pub previous: Snapshot,
    pub current: Snapshot,
    pub entry: AuditEntry,
}

/// Narrow interface over the counter files of one project root
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    version_path: PathBuf,
    build_number_path: PathBuf,
    audit_log_path: PathBuf,
    lock_path: PathBuf,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>, files: &FilesConfig) -> Self {
        let root = root.into();
        VersionStore {
            version_path: root.join(&files.version),
            build_number_path: root.join(&files.build_number),
            audit_log_path: root.join(&files.audit_log),
            lock_path: root.join(LOCK_FILE_NAME),
            root,
        }
    }

    /// Store using the default file names
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(root, &FilesConfig::default())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_path(&self) -> &Path {
        &self.version_path
    }

    pub fn build_number_path(&self) -> &Path {
        &self.build_number_path
    }

    pub fn audit_log_path(&self) -> &Path {
        &self.audit_log_path
    }

    pub fn load_version(&self) -> Result<Version> {
        let text = read_counter(&self.version_path)?;
        Version::parse(&text).map_err(|e| e.in_file(&self.version_path))
    }

    pub fn load_build_number(&self) -> Result<BuildNumber> {
        let text = read_counter(&self.build_number_path)?;
        BuildNumber::parse(&text).map_err(|e| e.in_file(&self.build_number_path))
    }

    /// Read both counters without locking or auditing
    pub fn current(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            version: self.load_version()?,
            build_number: self.load_build_number()?,
        })
    }

    pub fn bump_version(&self, bump: VersionBump, tag: Option<&str>) -> Result<Outcome> {
        self.apply(Action::Version(bump), tag)
    }

    pub fn increment_build_number(&self, tag: Option<&str>) -> Result<Outcome> {
        self.apply(Action::BuildNumber, tag)
    }

    /// Apply one action: load both counters, transform, save, audit.
    ///
    /// Both files are validated before anything is written, so a missing or
    /// malformed counter leaves the files and the audit log untouched.
    pub fn apply(&self, action: Action, tag: Option<&str>) -> Result<Outcome> {
        let _lock = StoreLock::acquire(&self.lock_path)?;

        let previous = self.current()?;
        let current = match action {
            Action::Version(bump) => {
                let version = previous.version.bump(&bump).ok_or_else(|| {
                    BuildstampError::malformed(
                        &self.version_path,
                        format!("{} would overflow {}", bump.label(), previous.version),
                    )
                })?;
                write_atomic(&self.version_path, &format!("{}\n", version))?;
                Snapshot {
                    version,
                    ..previous
                }
            }
            Action::BuildNumber => {
                let build_number = previous.build_number.increment().ok_or_else(|| {
                    BuildstampError::malformed(
                        &self.build_number_path,
                        format!("build number {} would overflow", previous.build_number),
                    )
                })?;
                write_atomic(&self.build_number_path, &format!("{}\n", build_number))?;
                Snapshot {
                    build_number,
                    ..previous
                }
            }
        };

        let entry = AuditEntry::now(action, current.version, current.build_number, tag);
        self.append_audit(&entry)?;

        tracing::info!(
            action = %action,
            version = %current.version,
            build_number = %current.build_number,
            "counter updated"
        );

        Ok(Outcome {
            action,
            previous,
            current,
            entry,
        })
    }

    /// Create both counter files; never overwrites an existing one
    pub fn init(&self, version: Version) -> Result<Snapshot> {
        let _lock = StoreLock::acquire(&self.lock_path)?;

        for path in [&self.version_path, &self.build_number_path] {
            if path.exists() {
                return Err(BuildstampError::AlreadyInitialized { path: path.clone() });
            }
        }

        let snapshot = Snapshot {
            version,
            build_number: BuildNumber::default(),
        };
        write_atomic(&self.version_path, &format!("{}\n", snapshot.version))?;
        write_atomic(&self.build_number_path, &format!("{}\n", snapshot.build_number))?;

        tracing::info!(root = %self.root.display(), version = %version, "initialized counters");
        Ok(snapshot)
    }

    /// The last `limit` audit entries, oldest first
    pub fn history(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let text = match fs::read_to_string(&self.audit_log_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries: Vec<AuditEntry> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match line.parse::<AuditEntry>() {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    tracing::warn!(
                        path = %self.audit_log_path.display(),
                        line = n + 1,
                        %reason,
                        "skipping unreadable audit line"
                    );
                    None
                }
            })
            .collect();

        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(entries)
    }

    fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)?;
        writeln!(file, "{}", entry.to_line())?;
        tracing::debug!(path = %self.audit_log_path.display(), "appended audit entry");
        Ok(())
    }
}

fn read_counter(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => {
            tracing::debug!(path = %path.display(), "read counter file");
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(BuildstampError::missing(path)),
        Err(e) => Err(e.into()),
    }
}
