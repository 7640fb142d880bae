use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const MESSY: &str = "const a = 1;   \n\n\nexport default a;";
const TIDY: &str = "const a = 1;\n\nexport default a;\n";

fn setup_project() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.js"), MESSY).unwrap();
    fs::write(root.join("b.mjs"), MESSY).unwrap();
    fs::write(root.join("clean.cjs"), TIDY).unwrap();
    fs::create_dir_all(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules/c.js"), MESSY).unwrap();
    fs::write(root.join(".neatignore"), "# skip\nb.mjs\n").unwrap();
    dir
}

fn neatify() -> Command {
    let mut cmd = Command::cargo_bin("neatify").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_lists_files_and_fails() {
    let dir = setup_project();

    neatify()
        .arg("--check")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("a.js"))
        .stdout(predicate::str::contains("b.mjs").not())
        .stdout(predicate::str::contains("node_modules").not())
        .stdout(predicate::str::contains("Total: 1 file need formatting"));

    assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), MESSY);
}

#[test]
fn list_different_prints_bare_paths() {
    let dir = setup_project();
    let expected = format!("{}\n", dir.path().join("a.js").display());

    neatify()
        .arg("--list-different")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::eq(expected));
}

#[test]
fn no_ignore_reads_past_neatignore() {
    let dir = setup_project();

    neatify()
        .args(["-l", "--no-ignore"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("a.js"))
        .stdout(predicate::str::contains("b.mjs"))
        .stdout(predicate::str::contains("node_modules").not());
}

#[test]
fn write_formats_then_check_passes() {
    let dir = setup_project();

    neatify().arg("--write").arg(dir.path()).assert().success();
    assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), TIDY);
    assert_eq!(fs::read_to_string(dir.path().join("b.mjs")).unwrap(), MESSY);
    assert_eq!(
        fs::read_to_string(dir.path().join("node_modules/c.js")).unwrap(),
        MESSY
    );

    neatify().arg("--check").arg(dir.path()).assert().success();
}

#[test]
fn write_reports_errors_and_keeps_going() {
    let dir = setup_project();
    fs::write(dir.path().join("broken.js"), [0xffu8, 0xfe]).unwrap();

    neatify()
        .args(["--write", "-j", "1"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.js"))
        .stdout(predicate::str::contains("Files formatted: 1"));
    assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), TIDY);
}

#[test]
fn missing_path_is_an_error() {
    let dir = tempdir().unwrap();

    neatify()
        .arg("--check")
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn no_action_warns() {
    let dir = setup_project();

    neatify()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No action specified"));
}

#[test]
fn explicit_file_bypasses_ignore_rules() {
    let dir = setup_project();

    neatify()
        .arg("-l")
        .arg(dir.path().join("b.mjs"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("b.mjs"));
}

// GNU tr answers the --version probe.
#[cfg(target_os = "linux")]
#[test]
fn external_formatter_is_used() {
    let dir = setup_project();

    neatify()
        .args(["--write", "--formatter", "tr", "--formatter-arg", "a-z", "--formatter-arg", "A-Z"])
        .arg(dir.path().join("clean.cjs"))
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(dir.path().join("clean.cjs")).unwrap(),
        TIDY.to_uppercase()
    );
}

#[test]
fn missing_formatter_fails_probe() {
    neatify()
        .args(["--check-formatter", "--formatter", "neatify-no-such-formatter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Formatter check failed"));
}

#[test]
fn completion_subcommand() {
    neatify()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("neatify"));
}
