use std::fmt;
use std::str::FromStr;

use crate::error::{BuildstampError, Result};

/// Semantic version representation as stored in the `VERSION` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// A transform applied to the version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    /// Resets the patch component without incrementing anything
    ZeroPatch,
}

impl VersionBump {
    /// Label written to the audit log
    pub fn label(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
            VersionBump::ZeroPatch => "zero-patch",
        }
    }
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse version file content (e.g., "1.2.3\n" -> Version(1,2,3))
    ///
    /// Surrounding whitespace is ignored. Each component must be a plain run of
    /// ASCII digits, so signs, prefixes and empty fields are rejected.
    pub fn parse(text: &str) -> Result<Self> {
        text.parse().map_err(BuildstampError::version)
    }

    /// Apply a bump, returning `None` if a component would overflow
    pub fn bump(&self, bump_type: &VersionBump) -> Option<Self> {
        let bumped = match bump_type {
            VersionBump::Major => Version {
                major: self.major.checked_add(1)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1)?,
            },
            VersionBump::ZeroPatch => Version {
                major: self.major,
                minor: self.minor,
                patch: 0,
            },
        };
        Some(bumped)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("expected MAJOR.MINOR.PATCH, got '{}'", trimmed));
        }

        let major = parse_component("major", parts[0])?;
        let minor = parse_component("minor", parts[1])?;
        let patch = parse_component("patch", parts[2])?;

        Ok(Version::new(major, minor, patch))
    }
}

fn parse_component(name: &str, field: &str) -> std::result::Result<u32, String> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {} component '{}'", name, field));
    }
    field
        .parse::<u32>()
        .map_err(|e| format!("invalid {} component '{}': {}", name, field, e))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
