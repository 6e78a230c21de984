use std::fmt;
use std::str::FromStr;

use super::version::VersionBump;

/// One mutating operation against the counter files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Version(VersionBump),
    BuildNumber,
}

impl Action {
    /// Label recorded in the audit log
    pub fn label(&self) -> &'static str {
        match self {
            Action::Version(bump) => bump.label(),
            Action::BuildNumber => "build",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Action::Version(VersionBump::Major)),
            "minor" => Ok(Action::Version(VersionBump::Minor)),
            "patch" => Ok(Action::Version(VersionBump::Patch)),
            "zero-patch" => Ok(Action::Version(VersionBump::ZeroPatch)),
            "build" => Ok(Action::BuildNumber),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}
