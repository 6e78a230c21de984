// tests/cli_test.rs
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn buildstamp(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildstamp"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute buildstamp")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = buildstamp(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["echo", "build", "gittag", "major", "minor", "patch", "zero-patch"] {
        assert!(text.contains(command), "help should mention {}", command);
    }
}

#[test]
fn test_init_then_echo() {
    let dir = TempDir::new().unwrap();
    assert!(buildstamp(dir.path(), &["init"]).status.success());
    assert_eq!(read(dir.path(), "VERSION"), "0.1.0\n");
    assert_eq!(read(dir.path(), ".build_num"), "0\n");

    let output = buildstamp(dir.path(), &["echo"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("0.1.0"));
    assert!(text.contains("root"));
    assert!(!dir.path().join(".version_log").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "4.0.0\n").unwrap();
    let output = buildstamp(dir.path(), &["init", "--version", "1.0.0"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(read(dir.path(), "VERSION"), "4.0.0\n");
}

#[test]
fn test_version_commands_with_tag() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "1.4.9\n").unwrap();
    fs::write(dir.path().join(".build_num"), "0\n").unwrap();

    assert!(buildstamp(dir.path(), &["minor", "--tag", "sprint 12"]).status.success());
    assert!(buildstamp(dir.path(), &["build-num"]).status.success());
    assert!(buildstamp(dir.path(), &["build-num"]).status.success());

    assert_eq!(read(dir.path(), "VERSION").trim(), "1.5.0");
    assert_eq!(read(dir.path(), ".build_num").trim(), "2");

    let log = read(dir.path(), ".version_log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("\tminor\t1.5.0\t0\tsprint 12"));
    assert!(lines[1].contains("\tbuild\t1.5.0\t1\t"));
    assert!(lines[2].contains("\tbuild\t1.5.0\t2\t"));

    let history = buildstamp(dir.path(), &["log", "-n", "2"]);
    assert!(history.status.success());
    assert_eq!(stdout(&history).lines().count(), 2);
}

#[test]
fn test_malformed_version_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "1.2\n").unwrap();
    fs::write(dir.path().join(".build_num"), "0\n").unwrap();

    let output = buildstamp(dir.path(), &["patch"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed"));
    assert_eq!(read(dir.path(), "VERSION"), "1.2\n");
    assert!(!dir.path().join(".version_log").exists());
}

#[test]
fn test_missing_files_exit_with_failure() {
    let dir = TempDir::new().unwrap();
    let output = buildstamp(dir.path(), &["echo"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_build_renders_and_packages() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "2.3.4\n").unwrap();
    fs::write(dir.path().join(".build_num"), "9\n").unwrap();
    fs::write(
        dir.path().join("pyproject.toml.template"),
        "[project]\nname = \"{{name}}\"\nversion = \"{{version}}\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("buildstamp.toml"),
        r#"
[render]
template = "pyproject.toml.template"
output = "pyproject.toml"

[render.tokens]
name = "aloegraph"

[packager]
program = "sh"
args = ["-c", "cp \"$BUILDSTAMP_MANIFEST\" dist.txt"]
"#,
    )
    .unwrap();

    let output = buildstamp(dir.path(), &["build"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(read(dir.path(), ".build_num").trim(), "10");
    let expected = "[project]\nname = \"aloegraph\"\nversion = \"2.3.4\"\n";
    assert_eq!(read(dir.path(), "pyproject.toml"), expected);
    assert_eq!(read(dir.path(), "dist.txt"), expected);
}

#[cfg(unix)]
#[test]
fn test_failing_packager_keeps_incremented_build_number() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "1.0.0\n").unwrap();
    fs::write(dir.path().join(".build_num"), "0\n").unwrap();
    fs::write(
        dir.path().join("buildstamp.toml"),
        "[packager]\nprogram = \"sh\"\nargs = [\"-c\", \"exit 7\"]\n",
    )
    .unwrap();

    let output = buildstamp(dir.path(), &["build"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exit code 7"));
    assert_eq!(read(dir.path(), ".build_num").trim(), "1");
}

#[test]
fn test_build_without_steps_warns_once() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "1.0.0\n").unwrap();
    fs::write(dir.path().join(".build_num"), "4\n").unwrap();

    let output = buildstamp(dir.path(), &["build"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("No template or packager configured").count(), 1);
    assert!(!stderr.contains("skipping"), "stderr: {}", stderr);
    assert_eq!(read(dir.path(), ".build_num").trim(), "5");
}

#[test]
fn test_log_tolerates_foreign_lines() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("VERSION"), "1.0.0\n").unwrap();
    fs::write(dir.path().join(".build_num"), "0\n").unwrap();
    fs::write(
        dir.path().join(".version_log"),
        "2024-01-01 12:00 build 1.0.0 0 legacy\n",
    )
    .unwrap();

    assert!(buildstamp(dir.path(), &["build-num", "-t", "nightly"]).status.success());

    let output = buildstamp(dir.path(), &["log"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("nightly"));
}

#[test]
fn test_render_command_keeps_token_order() {
    let dir = TempDir::new().unwrap();
    let output = buildstamp(
        dir.path(),
        &[
            "render",
            "--tokens",
            r#"{"b": "x", "a": "{{b}}"}"#,
            "--template",
            "{{a}}",
        ],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "{{b}}");
}

#[test]
fn test_render_command_prints_to_stdout() {
    let dir = TempDir::new().unwrap();
    let output = buildstamp(
        dir.path(),
        &[
            "render",
            "--tokens",
            r#"{"version": "9.9.9"}"#,
            "--template",
            "release {{version}}",
        ],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "release 9.9.9");
}
