//! Audit log records.
//!
//! One entry per line, tab-separated:
//! `timestamp<TAB>action<TAB>version<TAB>build_number<TAB>tag`

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

use super::{Action, BuildNumber, Version};

/// A single write-once line of the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub action: Action,
    pub version: Version,
    pub build_number: BuildNumber,
    pub tag: Option<String>,
}

impl AuditEntry {
    /// Build an entry stamped with the current local time
    pub fn now(
        action: Action,
        version: Version,
        build_number: BuildNumber,
        tag: Option<&str>,
    ) -> Self {
        AuditEntry {
            timestamp: Local::now().fixed_offset(),
            action,
            version,
            build_number,
            tag: tag.map(sanitize_tag).filter(|t| !t.is_empty()),
        }
    }

    /// Render as a log line, without the trailing newline
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

/// Tabs and line breaks would split the record, so they become spaces.
fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            self.action,
            self.version,
            self.build_number,
            self.tag.as_deref().unwrap_or("")
        )
    }
}

impl FromStr for AuditEntry {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let fields: Vec<&str> = line.splitn(5, '\t').collect();
        if fields.len() < 4 {
            return Err(format!("expected at least 4 fields, got {}", fields.len()));
        }

        let timestamp = DateTime::parse_from_rfc3339(fields[0])
            .map_err(|e| format!("bad timestamp '{}': {}", fields[0], e))?;
        let action = fields[1].parse::<Action>()?;
        let version = fields[2].parse::<Version>()?;
        let build_number = fields[3].parse::<BuildNumber>()?;
        let tag = fields
            .get(4)
            .map(|t| t.to_string())
            .filter(|t| !t.is_empty());

        Ok(AuditEntry {
            timestamp,
            action,
            version,
            build_number,
            tag,
        })
    }
}
