use std::path::Path;

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn protosync(cwd: &Path) -> Command {
    let mut command = Command::cargo_bin("protosync").unwrap();
    command.current_dir(cwd);
    command
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_print_schema() {
    let cwd = tempfile::tempdir().unwrap();

    let output = protosync(cwd.path()).arg("--print-schema").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("bitbucketServers:"));
}

#[test]
fn test_missing_destination() {
    let cwd = tempfile::tempdir().unwrap();

    let output = protosync(cwd.path()).args(["--no-defaults", "foo.proto"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Destination not provided"), "{}", stderr(&output));
}

#[test]
fn test_missing_sources() {
    let cwd = tempfile::tempdir().unwrap();
    let dest = cwd.path().join("out");

    std::fs::create_dir(&dest).unwrap();

    let output = protosync(cwd.path()).args(["--no-defaults", "-d", "out"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Sources not provided"), "{}", stderr(&output));
}

#[rstest]
#[case(&["--log-level", "loud", "foo.proto"], "Invalid log level")]
#[case(&["--set", "NOVALUE", "foo.proto"], "expected KEY=VALUE")]
#[case(&["--dest", "does/not/exist", "foo.proto"], "is not an existing directory")]
#[case(&["--unknown-flag"], "--unknown-flag")]
fn test_usage_errors(#[case] args: &[&str], #[case] message: &str) {
    let cwd = tempfile::tempdir().unwrap();

    let output = protosync(cwd.path()).args(args).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(message), "{}", stderr(&output));
}

#[test]
fn test_undefined_variable() {
    let cwd = tempfile::tempdir().unwrap();

    std::fs::write(cwd.path().join("protosync.yml"), "dest: ${OUT}\n").unwrap();

    let output = protosync(cwd.path()).arg("foo.proto").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Variable $OUT is not defined"), "{}", stderr(&output));
}

#[test]
fn test_sync_from_includes() {
    let cwd = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(cwd.path().join("vendor/acme")).unwrap();
    std::fs::write(cwd.path().join("vendor/acme/money.proto"), "package acme;\n").unwrap();
    std::fs::write(cwd.path().join("vendor/acme/order.proto"), "package acme;\nimport \"acme/money.proto\";\n").unwrap();

    std::fs::write(cwd.path().join("protosync.yml"), "dest: ${OUT}/protos\ncacheFolder: cache\n").unwrap();

    let output = protosync(cwd.path())
        .args(["--set", "OUT=build", "-I", "vendor", "acme/order.proto"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    // The entry point is copied; its import is served by the include root
    assert_eq!(std::fs::read_to_string(cwd.path().join("build/protos/acme/order.proto")).unwrap(), "package acme;\nimport \"acme/money.proto\";\n");
    assert!(!cwd.path().join("build/protos/acme/money.proto").exists());
}

#[test]
fn test_unresolved_import() {
    let cwd = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(cwd.path().join("out")).unwrap();
    std::fs::create_dir_all(cwd.path().join("api")).unwrap();
    std::fs::write(cwd.path().join("api/service.proto"), "import \"nowhere/to/be/found.proto\";\n").unwrap();

    let output = protosync(cwd.path())
        .args(["--no-defaults", "-d", "out", "api"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Could not resolve \"nowhere/to/be/found.proto\""), "{}", stderr(&output));
}
