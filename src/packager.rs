//! Packaging tool invocation.
//!
//! The packager is an opaque external program run once per build. It receives
//! the build context through `BUILDSTAMP_*` environment variables.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::domain::{BuildNumber, Version};
use crate::error::{BuildstampError, Result};

/// Everything a packager needs to know about the current build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// Directory the packager runs in
    pub working_dir: PathBuf,
    pub version: Version,
    pub build_number: BuildNumber,
    /// Rendered manifest, if rendering ran
    pub manifest: Option<PathBuf>,
}

impl PackageRequest {
    /// Convert the request to environment variables for the packager process
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("BUILDSTAMP_VERSION".to_string(), self.version.to_string());
        env.insert(
            "BUILDSTAMP_BUILD_NUMBER".to_string(),
            self.build_number.to_string(),
        );

        if let Some(ref manifest) = self.manifest {
            env.insert(
                "BUILDSTAMP_MANIFEST".to_string(),
                manifest.display().to_string(),
            );
        }

        env
    }
}

/// Produces a distributable artifact from a rendered manifest
pub trait Packager {
    fn package(&self, request: &PackageRequest) -> Result<()>;
}

/// Runs a configured external command
#[derive(Debug, Clone)]
pub struct CommandPackager {
    program: String,
    args: Vec<String>,
}

impl CommandPackager {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandPackager {
            program: program.into(),
            args,
        }
    }
}

impl Packager for CommandPackager {
    /// Run the command in the request's working directory.
    ///
    /// A spawn failure or a non-zero exit code is an error carrying the
    /// captured output.
    fn package(&self, request: &PackageRequest) -> Result<()> {
        tracing::info!(program = %self.program, args = ?self.args, "running packager");

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&request.working_dir)
            .envs(request.to_env_vars())
            .output()
            .map_err(|e| {
                BuildstampError::packager(format!("failed to execute {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(BuildstampError::packager(format!(
                "{} failed with exit code {}\nStdout: {}\nStderr: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        tracing::debug!(stdout = %String::from_utf8_lossy(&output.stdout), "packager finished");
        Ok(())
    }
}

/// Mock packager for testing without spawning processes
#[derive(Debug, Default)]
pub struct MockPackager {
    requests: RefCell<Vec<PackageRequest>>,
    fail_with: Option<String>,
}

impl MockPackager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A packager whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        MockPackager {
            requests: RefCell::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<PackageRequest> {
        self.requests.borrow().clone()
    }
}

impl Packager for MockPackager {
    fn package(&self, request: &PackageRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        match &self.fail_with {
            Some(message) => Err(BuildstampError::packager(message.clone())),
            None => Ok(()),
        }
    }
}
