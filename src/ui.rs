//! Formatting functions for user-facing output.
//!
//! Results go to stdout, errors and warnings to stderr. Diagnostic logging is
//! separate and goes through `tracing`.

use std::path::Path;

use console::style;

use crate::cli::orchestration::{BuildResult, TagResult};
use crate::domain::{Action, AuditEntry};
use crate::store::{Outcome, Snapshot};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a warning in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print the current counters and the project root (the `echo` command).
pub fn display_snapshot(root: &Path, snapshot: &Snapshot) {
    println!("{} {}", style("version:").bold(), snapshot.version);
    println!("{} {}", style("build:  ").bold(), snapshot.build_number);
    println!("{} {}", style("root:   ").bold(), root.display());
}

/// One-line summary of a counter change, e.g. `minor: 1.4.9 -> 1.5.0 (build 3)`.
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome.action {
        Action::BuildNumber => format!(
            "{}: {} -> {} (version {})",
            outcome.action,
            outcome.previous.build_number,
            outcome.current.build_number,
            outcome.current.version
        ),
        Action::Version(_) => format!(
            "{}: {} -> {} (build {})",
            outcome.action,
            outcome.previous.version,
            outcome.current.version,
            outcome.current.build_number
        ),
    }
}

pub fn display_outcome(outcome: &Outcome) {
    display_success(&format_outcome(outcome));
}

pub fn display_build(result: &BuildResult) {
    display_outcome(&result.outcome);
    if let Some(ref manifest) = result.manifest {
        display_success(&format!("Rendered {}", manifest.display()));
    }
    if result.packaged {
        display_success("Package built");
    }
}

pub fn display_tag(result: &TagResult) {
    display_success(&format!("Created tag: {}", result.tag));
    if result.pushed {
        display_success(&format!("Pushed tag: {} to {}", result.tag, result.remote));
    } else {
        display_manual_push_instruction(&result.tag, &result.remote);
    }
}

/// Display manual push instruction for a tag.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    );
}

/// Print audit entries, oldest first.
pub fn display_history(entries: &[AuditEntry]) {
    if entries.is_empty() {
        display_status("Audit log is empty");
        return;
    }
    for entry in entries {
        println!(
            "{}  {:<10} {:<12} build {:<6} {}",
            style(entry.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
            entry.action.label(),
            entry.version.to_string(),
            entry.build_number.to_string(),
            entry.tag.as_deref().unwrap_or("")
        );
    }
}
