use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

const TREE_YAML: &str = r#"name: todo
version: 2.0.1
options:
  - name: help
    shortName: h
    type: boolean
  - name: version
    type: boolean
subcommands:
  - name: add
    aliases: [a]
    description: Add a task
    options:
      - name: priority
        shortName: p
        type: string
        choices: [low, high]
        default: low
      - name: label
        type: array
    arguments:
      - name: title
        type: string
        required: true
  - name: list
    description: List tasks
"#;

fn write_tree(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write tree");
    path
}

fn cmd_dispatch(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_cmd-dispatch"))
        .args(args)
        .output()
        .expect("failed to run cmd-dispatch")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be UTF-8")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_tree() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&["check", path_str(&tree)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("is valid: 3 command(s)"));
}

#[test]
fn check_reports_every_declaration_error() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(
        &dir,
        "broken.json",
        r#"{
            "name": "app",
            "options": [
                {"name": "force", "shortName": "f", "type": "boolean"},
                {"name": "file", "shortName": "f", "type": "string"}
            ],
            "subcommands": [{"name": "run"}, {"name": "run"}]
        }"#,
    );

    let output = cmd_dispatch(&["check", path_str(&tree)]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("3 declaration error(s)"), "stderr: {err}");
    assert!(err.contains("duplicate subcommand 'run' in 'app'"));
    assert!(err.lines().last().unwrap().starts_with("error: "));
}

#[test]
fn check_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "tree.toml", "name = 'app'");

    let output = cmd_dispatch(&["check", path_str(&tree)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported declaration format"));
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_context_json() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&[
        "parse",
        "--tree",
        path_str(&tree),
        "--",
        "todo",
        "add",
        "--label=work,home",
        "-p",
        "high",
        "Write report",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["command"], "todo add");
    assert_eq!(json["options"]["priority"], "high");
    assert_eq!(json["options"]["label"], serde_json::json!(["work", "home"]));
    assert_eq!(json["arguments"][0], "Write report");
    assert_eq!(json["telemetry"]["options"], "label,priority");
}

#[test]
fn parse_supports_yaml_and_host_runtime() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yml", TREE_YAML);

    let output = cmd_dispatch(&[
        "parse",
        "--tree",
        path_str(&tree),
        "--host-runtime",
        "--format",
        "yaml",
        "--",
        "node",
        "todo.js",
        "a",
        "Buy milk",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["command"].as_str(), Some("todo a"));
    assert_eq!(yaml["options"]["priority"].as_str(), Some("low"));
}

#[test]
fn parse_reports_invalid_choice() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&[
        "parse",
        "--tree",
        path_str(&tree),
        "--",
        "todo",
        "add",
        "--priority",
        "urgent",
        "x",
    ]);
    assert!(!output.status.success());
    assert_eq!(
        stderr(&output).trim(),
        "error: invalid value 'urgent' for 'priority' of 'todo add' (choices: low, high)"
    );
}

#[test]
fn verbose_routes_debug_logging_to_stderr() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let quiet = cmd_dispatch(&["parse", "--tree", path_str(&tree), "--", "todo", "list"]);
    assert!(quiet.status.success());
    assert!(stderr(&quiet).is_empty());

    let verbose = cmd_dispatch(&[
        "--verbose",
        "parse",
        "--tree",
        path_str(&tree),
        "--",
        "todo",
        "list",
    ]);
    assert!(verbose.status.success());
    assert!(stderr(&verbose).contains("[debug] matched command 'todo list'"));
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_renders_plain_and_markdown() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let plain = cmd_dispatch(&["help", "--tree", path_str(&tree), "add"]);
    assert!(plain.status.success(), "stderr: {}", stderr(&plain));
    let text = stdout(&plain);
    assert!(text.starts_with("Usage: todo add [OPTIONS] <title>\n"));
    assert!(text.contains("[choices: low, high] [default: low]"));

    let markdown = cmd_dispatch(&["help", "--tree", path_str(&tree), "--markdown"]);
    assert!(markdown.status.success());
    let text = stdout(&markdown);
    assert!(text.starts_with("# todo\n"));
    assert!(text.contains("| `add, a` | Add a task |"));
}

#[test]
fn help_rejects_unknown_path() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&["help", "--tree", path_str(&tree), "remove"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no command at path 'remove'"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_echo_prints_context() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&[
        "run",
        "--tree",
        path_str(&tree),
        "--echo",
        "--",
        "todo",
        "add",
        "Ship it",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["command"], "todo add");
    assert_eq!(json["arguments"][0], "Ship it");
}

#[test]
fn run_without_handlers_renders_help() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&["run", "--tree", path_str(&tree), "--", "todo", "list"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Usage: todo list"));
}

#[test]
fn run_prints_version() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&[
        "run",
        "--tree",
        path_str(&tree),
        "--echo",
        "--",
        "todo",
        "--version",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "2.0.1");
}

#[test]
fn run_suggests_close_command() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir, "todo.yaml", TREE_YAML);

    let output = cmd_dispatch(&["run", "--tree", path_str(&tree), "--", "todo", "lsit"]);
    assert!(!output.status.success());
    assert_eq!(
        stderr(&output).trim(),
        "error: unknown command 'lsit' for 'todo' (did you mean 'list'?)"
    );
}
