// Runs the conformance binary against the checked-in manifest.
use std::path::PathBuf;
use std::process::Command;

#[test]
fn basic_manifest_passes() {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("conformance")
        .join("basic.json");
    let output = Command::new(env!("CARGO_BIN_EXE_poolcast-conformance"))
        .arg(&manifest)
        .output()
        .expect("run conformance");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ok: "), "stdout: {stdout}");
}

#[test]
fn missing_manifest_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_poolcast-conformance"))
        .arg("does-not-exist.json")
        .output()
        .expect("run conformance");
    assert!(!output.status.success());
}
