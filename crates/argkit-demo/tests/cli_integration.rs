use std::process::{Command, Output};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn demo() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_argkit-demo"));
    command.env("NO_COLOR", "1").env_remove("FORCE_COLOR");
    command
}

fn run(args: &[&str]) -> Output {
    demo()
        .args(args)
        .output()
        .unwrap_or_else(|err| panic!("failed to run argkit-demo {args:?}: {err}"))
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn run_ok(args: &[&str]) -> String {
    let out = run(args);
    assert!(
        out.status.success(),
        "argkit-demo {args:?} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    stdout(&out)
}

#[test]
fn help_works() {
    let stdout = run_ok(&["--help"]);
    assert!(
        stdout.starts_with(&format!(
            "pkg v{VERSION}\n\nA toy package manager\n\nUSAGE:\n  pkg [flags...]\n  pkg <command>\n\nCOMMANDS:\n"
        )),
        "unexpected help output:\n{stdout}"
    );
    assert!(stdout.contains("Install packages"), "{stdout}");
    assert!(stdout.contains("  -h, --help "), "{stdout}");
    assert!(
        stdout.ends_with(
            "EXAMPLES:\n  # Install a package globally\n  pkg install -g left-pad\n  \n  # Pass flags through to a script\n  pkg run test -- --watch\n\n"
        ),
        "{stdout}"
    );
}

#[test]
fn no_arguments_show_help() {
    let stdout = run_ok(&[]);
    assert!(stdout.starts_with(&format!("pkg v{VERSION}\n")), "{stdout}");
    assert!(stdout.contains("COMMANDS:"), "{stdout}");
}

#[test]
fn version_works() {
    assert_eq!(run_ok(&["--version"]), format!("{VERSION}\n"));
    assert_eq!(run_ok(&["inspect", "--version"]), "0.1.0\n");
}

#[test]
fn unknown_command_fails() {
    let out = run(&["frobnicate"]);
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains(r#"unknown command "frobnicate""#),
        "{}",
        stderr(&out)
    );
}

#[test]
fn aliases_dispatch_to_install() {
    assert_eq!(run_ok(&["i", "left-pad", "-g"]), "Installing left-pad globally\n");
    assert_eq!(
        run_ok(&["add", "a", "b", "-D"]),
        "Installing a, b as dev dependencies\n"
    );
    assert_eq!(run_ok(&["install"]), "Nothing to install\n");
}

#[test]
fn separator_passes_flags_to_script() {
    assert_eq!(run_ok(&["run", "test", "--", "--watch", "src"]), "> test --watch src\n");
    assert_eq!(run_ok(&["run-script", "lint"]), "> lint\n");
}

#[test]
fn missing_parameter_exits_with_help() {
    let out = run(&["greet"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "Error: Missing required parameter \"first name\"\n");
    let stdout = stdout(&out);
    assert!(
        stdout.starts_with(&format!("pkg greet v{VERSION}\n\nGreet a maintainer\n")),
        "{stdout}"
    );
}

#[test]
fn greet_uses_flag_default() {
    assert_eq!(run_ok(&["greet", "Ada"]), "Good morning, Ada!\n");
    assert_eq!(
        run_ok(&["greet", "Ada", "Lovelace", "-t", "evening"]),
        "Good evening, Ada Lovelace!\n"
    );
}

#[test]
fn async_command_completes() {
    assert_eq!(
        run_ok(&["snap", "a.png", "b.png", "--delay", "1"]),
        "Snapped a.png\nSnapped b.png\n"
    );
}

#[test]
fn inspect_reports_parse_result() {
    let stdout = run_ok(&["debug", "x", "--format", "compact", "--extra=1", "--", "y"]);
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid json");
    assert_eq!(report["command"], "inspect");
    assert_eq!(report["flags"], serde_json::json!({ "format": "compact" }));
    assert_eq!(report["args"]["args"], serde_json::json!(["x", "y"]));
    assert_eq!(report["args"]["--"], serde_json::json!(["y"]));
    assert_eq!(report["unknownFlags"], serde_json::json!({ "extra": ["1"] }));
}

#[test]
fn custom_flag_type_rejects_input() {
    let out = run(&["inspect", "--format", "xml"]);
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains(r#"unsupported format "xml""#),
        "{}",
        stderr(&out)
    );
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_parsed_lossily() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let out = demo()
        .arg("inspect")
        .arg(OsStr::from_bytes(b"caf\xE9.txt"))
        .args(["--format", "compact"])
        .output()
        .expect("failed to run argkit-demo inspect");
    assert!(
        out.status.success(),
        "argkit-demo inspect failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let stdout = stdout(&out);
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid json");
    assert_eq!(report["args"]["args"], serde_json::json!(["caf\u{FFFD}.txt"]));
}
