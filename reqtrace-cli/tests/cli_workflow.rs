use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn reqtrace(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reqtrace"))
        .args(args)
        .arg("--db")
        .arg(dir.join("requirements.db"))
        .arg("--config")
        .arg(dir.join("reqtrace.yaml"))
        .env_remove("REQTRACE_DB")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run reqtrace")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_add_trace_and_analyze() {
    let dir = TempDir::new().unwrap();

    for text in ["Login must support 2FA", "Store sessions", "Audit logins"] {
        let out = reqtrace(dir.path(), &["add", "--text", text, "--priority", "High"]);
        assert!(out.status.success(), "{:?}", out);
    }

    let out = reqtrace(dir.path(), &["trace", "1", "2,3"]);
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("2 link(s)"));

    // Same batch again is a conflict and leaves the links unchanged
    let out = reqtrace(dir.path(), &["trace", "1", "2,3"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));

    let out = reqtrace(dir.path(), &["links", "--source", "1"]);
    assert_eq!(stdout(&out).lines().count(), 2);

    let out = reqtrace(dir.path(), &["status", "1", "completed"]);
    assert!(out.status.success());

    let out = reqtrace(dir.path(), &["analyze"]);
    let text = stdout(&out);
    assert!(text.contains("Pending Requirements: 2"));
    assert!(text.contains("Completed Requirements: 1"));
    assert!(text.contains("In Progress Requirements: 0"));
}

#[test]
fn test_add_without_priority_is_rejected() {
    let dir = TempDir::new().unwrap();

    let out = reqtrace(dir.path(), &["add", "--text", "No priority given"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("priority is required"));
    assert!(!dir.path().join("requirements.db").exists());

    let out = reqtrace(dir.path(), &["list"]);
    assert!(stdout(&out).contains("No requirements found."));
}

#[test]
fn test_invalid_arguments_leave_no_database_behind() {
    let dir = TempDir::new().unwrap();

    for args in [
        &["add", "--text", "   ", "--priority", "High"][..],
        &["add", "--text", "Audit", "--priority", "Urgent"][..],
        &["trace", "1", "2,abc"][..],
        &["status", "0", "Completed"][..],
        &["status", "1", "Done"][..],
        &["export", "--format", "xml"][..],
    ] {
        let out = reqtrace(dir.path(), args);
        assert!(!out.status.success(), "{:?} should fail", args);
    }

    assert!(!dir.path().join("requirements.db").exists());
    assert!(!dir.path().join("requirements.db.lock").exists());
}

#[test]
fn test_list_shows_a_row_per_requirement() {
    let dir = TempDir::new().unwrap();
    reqtrace(dir.path(), &["add", "--text", "Login must support 2FA", "--priority", "High"]);
    reqtrace(dir.path(), &["add", "--text", "Audit logins", "--priority", "Low"]);
    reqtrace(dir.path(), &["status", "2", "in progress"]);

    let out = reqtrace(dir.path(), &["list"]);
    assert!(out.status.success(), "{:?}", out);

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID"));
    assert!(lines[1].starts_with('1') && lines[1].contains("Login must support 2FA"));
    assert!(lines[1].contains("High") && lines[1].ends_with("Pending"));
    assert!(lines[2].starts_with('2') && lines[2].contains("Audit logins"));
    assert!(lines[2].ends_with("In Progress"));
}

#[test]
fn test_export_writes_report_to_file() {
    let dir = TempDir::new().unwrap();
    reqtrace(dir.path(), &["add", "--text", "Login must support 2FA", "--priority", "High"]);
    reqtrace(dir.path(), &["add", "--text", "Audit logins", "--priority", "Medium"]);
    reqtrace(dir.path(), &["trace", "1", "2"]);

    let report_path = dir.path().join("report.md");
    let out = reqtrace(
        dir.path(),
        &["export", "--format", "markdown", "--output", report_path.to_str().unwrap()],
    );
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("Exported markdown report to"));

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.starts_with("# Requirements Traceability Report"));
    assert!(report.contains("**Total:** 2 | **Pending:** 2"));
    assert!(report.contains("| 1 | Login must support 2FA | High | Pending |"));
    assert!(report.lines().any(|l| l.starts_with("| 1 |") && l.ends_with("| 2 |")));

    let json_path = dir.path().join("export.json");
    let out = reqtrace(dir.path(), &["export", "-o", json_path.to_str().unwrap()]);
    assert!(out.status.success(), "{:?}", out);

    let json = std::fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"requirements\""));
    assert!(json.contains("\"traced_to\": 2"));
}

#[test]
fn test_trace_rejects_malformed_ids() {
    let dir = TempDir::new().unwrap();
    reqtrace(dir.path(), &["add", "--text", "A", "--priority", "Low"]);

    let out = reqtrace(dir.path(), &["trace", "1", "2,abc"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid requirement id"));

    let out = reqtrace(dir.path(), &["links"]);
    assert!(stdout(&out).contains("No trace links found."));
}

#[test]
fn test_status_of_unknown_requirement_is_not_an_error() {
    let dir = TempDir::new().unwrap();

    let out = reqtrace(dir.path(), &["status", "99", "In Progress"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("nothing was changed"));
}
