// CLI integration tests for the stable stdout/stderr contracts.
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_poolcast");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    serde_json::from_str(text.trim()).expect("valid json")
}

#[test]
fn inspect_reports_shape_and_storage_extents() {
    let output = cmd()
        .args(["inspect", "[[1,2,3],[4,5,6]]"])
        .output()
        .expect("inspect");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["kind"], "Integer");
    assert_eq!(json["rank"], 2);
    assert_eq!(json["shape"], serde_json::json!([2, 3]));
    assert_eq!(json["extents"], serde_json::json!([3, 2]));
}

#[test]
fn inspect_classifies_complex_leaves() {
    let output = cmd()
        .args(["inspect", r#"[{"re":1.0,"im":2.0}]"#])
        .output()
        .expect("inspect");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["kind"], "Complex");
    assert_eq!(json["rank"], 1);
}

#[test]
fn roundtrip_reproduces_the_input() {
    let output = cmd()
        .args(["roundtrip", "[[1.5,2.5],[3.5,4.5]]"])
        .output()
        .expect("roundtrip");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["kind"], "Real");
    assert_eq!(json["extents"], serde_json::json!([2, 2]));
    assert_eq!(json["data"], serde_json::json!([[1.5, 2.5], [3.5, 4.5]]));
}

#[test]
fn roundtrip_with_kind_hint_promotes_integers() {
    let output = cmd()
        .args(["roundtrip", "[1,2]", "--as", "complex"])
        .output()
        .expect("roundtrip");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["kind"], "Complex");
    assert_eq!(
        json["data"],
        serde_json::json!([{ "re": 1.0, "im": 0.0 }, { "re": 2.0, "im": 0.0 }])
    );
}

#[test]
fn ragged_input_fails_with_its_exit_code() {
    let output = cmd()
        .args(["roundtrip", "[[1,2],[3]]"])
        .output()
        .expect("roundtrip");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(6));
    let json = parse_json(&output.stderr);
    assert_eq!(json["error"]["kind"], "RaggedInput");
    assert_eq!(json["error"]["at"], serde_json::json!([1]));
}

#[test]
fn null_leaf_fails_as_unsupported_kind() {
    let output = cmd()
        .args(["inspect", "[null]"])
        .output()
        .expect("inspect");
    assert_eq!(output.status.code(), Some(5));
    let json = parse_json(&output.stderr);
    assert_eq!(json["error"]["kind"], "UnsupportedKind");
}

#[test]
fn invalid_json_is_a_usage_error() {
    let output = cmd()
        .args(["inspect", "[1, 2"])
        .output()
        .expect("inspect");
    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stderr);
    assert_eq!(json["error"]["kind"], "Usage");
}

#[test]
fn file_input_matches_inline_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("value.json");
    std::fs::write(&path, "[true, false]").expect("write");

    let from_file = cmd()
        .args(["inspect", "--file", path.to_str().expect("utf8 path")])
        .output()
        .expect("inspect");
    assert!(from_file.status.success());
    let inline = cmd()
        .args(["inspect", "[true, false]"])
        .output()
        .expect("inspect");
    assert_eq!(parse_json(&from_file.stdout), parse_json(&inline.stdout));
}

#[test]
fn version_emits_name_and_version() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["name"], "poolcast");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
