use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

const LIB: &str = "\
from typing import Callable

from capture import Capture


def test(insp: Capture[Callable[[int], int]]) -> None:
    pass
";

const MAIN: &str = "\
from lib import test

test(lambda x: 3 * x)
test(lambda x: x * 10)
";

fn capgen_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_capgen"))
}

fn setup_project(dir: &Path, main: &str) {
    fs::write(dir.join("lib.py"), LIB).unwrap();
    fs::write(dir.join("main.py"), main).unwrap();
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(capgen_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    )
}

fn generated(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("generated"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn generate_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);

    let output = run(dir.path(), &["generate"]);
    assert!(output.status.success(), "{}", describe(&output));

    assert_eq!(
        generated(dir.path()),
        vec![
            "Intercepted_test_main_py_3_1.g.py",
            "Intercepted_test_main_py_4_1.g.py",
            "capture_interception.g.py",
            "lib_test_Overload.g.py",
        ]
    );

    let interceptor =
        fs::read_to_string(dir.path().join("generated/Intercepted_test_main_py_3_1.g.py")).unwrap();
    assert!(interceptor.contains("@intercepts_location(\"main.py\", line=3, column=1)"));
}

#[test]
fn generate_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);

    assert!(run(dir.path(), &["generate"]).status.success());
    let path = dir.path().join("generated/Intercepted_test_main_py_4_1.g.py");
    let first = fs::read_to_string(&path).unwrap();

    let output = run(dir.path(), &["generate"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
    assert_eq!(generated(dir.path()).len(), 4);
}

#[test]
fn generate_clean_removes_stale_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);
    assert!(run(dir.path(), &["generate"]).status.success());

    fs::write(dir.path().join("main.py"), "from lib import test\n\ntest(lambda x: x)\n").unwrap();
    let output = run(dir.path(), &["generate", "--clean"]);
    assert!(output.status.success(), "{}", describe(&output));

    assert_eq!(
        generated(dir.path()),
        vec![
            "Intercepted_test_main_py_3_1.g.py",
            "capture_interception.g.py",
            "lib_test_Overload.g.py",
        ]
    );
}

#[test]
fn generate_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);

    let output = run(dir.path(), &["generate", "--dry-run"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(!dir.path().join("generated").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Intercepted_test_main_py_3_1.g.py"), "{stdout}");
}

#[test]
fn generate_respects_out_and_root() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    fs::create_dir_all(&project).unwrap();
    setup_project(&project, MAIN);

    let output = run(dir.path(), &["generate", "--root", "project", "--out", "build"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(project.join("build/lib_test_Overload.g.py").exists());
}

#[test]
fn check_clean_project_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);

    let output = run(dir.path(), &["check"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(!dir.path().join("generated").exists());
}

const OUTER: &str = "\
from lib import test

factor = 3
test(lambda x: factor * x)
";

#[test]
fn check_reports_outer_capture_as_warning() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), OUTER);

    let output = run(dir.path(), &["check"]);
    assert!(output.status.success(), "{}", describe(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("C200"), "{stdout}");
    assert!(stdout.contains("'factor'"), "{stdout}");
}

#[test]
fn check_select_and_ignore() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), OUTER);

    let output = run(dir.path(), &["check", "--select", "C200"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));

    let output = run(dir.path(), &["check", "--ignore", "C200"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("C200"));
}

#[test]
fn deny_policy_from_config_fails_check_and_skips_interceptor() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), OUTER);
    fs::write(dir.path().join("capgen.toml"), "outer_captures = \"deny\"\n").unwrap();

    let output = run(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));

    let output = run(dir.path(), &["generate"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert_eq!(generated(dir.path()), vec!["lib_test_Overload.g.py"]);
}

#[test]
fn check_json_output() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), OUTER);
    fs::write(dir.path().join("broken.py"), "def (:\n").unwrap();

    let output = run(dir.path(), &["check", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));

    let diagnostics: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = diagnostics
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["C001", "C200"]);

    let outer = &diagnostics[1];
    assert_eq!(outer["path"], "main.py");
    assert_eq!(outer["line"], 4);
    assert_eq!(outer["column"], 6);
    assert_eq!(outer["severity"], "warning");
}

#[test]
fn pyproject_settings_are_used() {
    let dir = tempfile::tempdir().unwrap();
    setup_project(dir.path(), MAIN);
    fs::write(
        dir.path().join("pyproject.toml"),
        "[tool.capgen]\noutput_dir = \"_gen\"\nsupport_module = \"locations\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &["generate"]);
    assert!(output.status.success(), "{}", describe(&output));
    assert!(dir.path().join("_gen/locations.g.py").exists());

    let interceptor =
        fs::read_to_string(dir.path().join("_gen/Intercepted_test_main_py_3_1.g.py")).unwrap();
    assert!(interceptor.contains("from locations import intercepts_location\n"));
}
