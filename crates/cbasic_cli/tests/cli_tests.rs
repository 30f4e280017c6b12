//! End-to-end tests for the `cbasic` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cbasic_cli_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn cbasic(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cbasic"))
        .args(args)
        .arg("--color=never")
        .current_dir(dir)
        .env_remove("CBASIC_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_tokens_listing() {
    let dir = scratch_dir("tokens");
    write(&dir, "a.bas", "print \"hi\"\n");
    let output = cbasic(&dir, &["tokens", "a.bas"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "1:1 Print PRINT");
    assert_eq!(lines[1], "1:7 String hi");
    assert!(lines.last().unwrap().contains("Eof"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_parse_json() {
    let dir = scratch_dir("json");
    write(&dir, "a.bas", "#PRAGMA NOWARN DIALECT\nX = 1\n");
    let output = cbasic(&dir, &["parse", "a.bas", "--format", "json", "--stats"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["dialect"], "permissive");
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["stats"]["top_level"], 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_check_reports_syntax_errors() {
    let dir = scratch_dir("errors");
    write(&dir, "good.bas", "PRINT 1\n");
    write(&dir, "bad.bas", "PRINT 2 +\n");
    let output = cbasic(&dir, &["check", "good.bas", "bad.bas"]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    // Input order, regardless of which file finished first.
    assert!(lines[0].starts_with("good.bas: ok"), "{}", text);
    assert!(lines[1].starts_with("bad.bas: 1 error(s)"), "{}", text);
    assert!(stderr(&output).contains("BAS1103"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_classic_flag_rejects_shorthand() {
    let dir = scratch_dir("classic");
    write(&dir, "a.bas", "IF X THEN PRINT X\n");
    assert_eq!(cbasic(&dir, &["check", "a.bas"]).status.code(), Some(0));
    let output = cbasic(&dir, &["--dialect", "classic", "check", "a.bas"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("only allowed in the permissive dialect"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_project_file_dialect() {
    let dir = scratch_dir("project");
    write(&dir, "cbasic.json", r#"{ "dialect": "classic", "files": ["main.bas"] }"#);
    write(&dir, "main.bas", "DO\nLOOP\n");
    let output = cbasic(&dir, &["check"]);
    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_agk_flag_warns() {
    let dir = scratch_dir("agk");
    write(&dir, "a.bas", "DO\nLOOP\n");
    let output = cbasic(&dir, &["--agk", "check", "a.bas"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("--agk is deprecated"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_exit_codes_for_bad_input() {
    let dir = scratch_dir("exits");
    write(&dir, "empty.bas", "  \n");
    assert_eq!(cbasic(&dir, &["parse", "missing.bas"]).status.code(), Some(66));
    assert_eq!(cbasic(&dir, &["parse", "empty.bas"]).status.code(), Some(65));
    assert_eq!(cbasic(&dir, &["check"]).status.code(), Some(64));
    assert_eq!(cbasic(&dir, &["frobnicate"]).status.code(), Some(64));
    let _ = std::fs::remove_dir_all(&dir);
}
