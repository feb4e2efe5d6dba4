use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use circa::{
    Error,
    config::WorldConfig,
    script::{
        parse_script, run_test_files,
        runner::{TestOutcome, print_test_report},
    },
};

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(name: &str) -> Self {
        let dir = env::temp_dir().join(format!("circa-scripts-{}-{}", name, process::id()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::write(&path, text).unwrap();
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn failure(outcome: &TestOutcome) -> &str {
    match outcome {
        TestOutcome::Fail(msg) => msg,
        TestOutcome::Pass => panic!("expected a failure"),
    }
}

#[test]
fn a_batch_reports_each_file_in_order() {
    let dir = ScratchDir::new("batch");
    let paths = vec![
        dir.write(
            "sum.json",
            r#"{ "statements": [{ "let": "s", "value": { "call": "add", "args": [2, 3] } }],
                 "expect": { "s": 5 } }"#,
        ),
        dir.write(
            "text.json",
            r#"{ "statements": [{ "let": "t", "value": { "call": "to-string", "args": [5] } }],
                 "expect": { "t": "5" } }"#,
        ),
        dir.write(
            "wrong.json",
            r#"{ "statements": [{ "let": "s", "value": { "call": "add", "args": [2, 3] } }],
                 "expect": { "s": 6 } }"#,
        ),
    ];

    let reports = run_test_files(&paths, &WorldConfig::default());
    let names: Vec<&Path> = reports.iter().map(|r| r.path.as_path()).collect();
    assert_eq!(names, paths.iter().map(PathBuf::as_path).collect::<Vec<_>>());
    assert!(reports[0].passed());
    assert!(reports[1].passed());
    assert_eq!(failure(&reports[2].outcome), "`s`: expected 6, found 5");
    assert!(!print_test_report(&reports));
}

#[test]
fn factorial_script_passes() {
    let dir = ScratchDir::new("factorial");
    let path = dir.write(
        "factorial.json",
        r#"{ "statements": [
            { "def": "f", "inputs": [["n", "int"]], "output": "int", "body": [
                { "if": [{ "condition": { "call": "less_than", "args": [{ "ref": "n" }, 2] },
                           "body": [{ "return": 1 }] }],
                  "else": [{ "return": { "call": "mult", "args": [
                      { "ref": "n" },
                      { "call": "f", "args": [{ "call": "sub", "args": [{ "ref": "n" }, 1] }] }
                  ] } }] }
            ] },
            { "let": "r", "value": { "call": "f", "args": [5] } }
        ], "expect": { "r": 120 } }"#,
    );
    let reports = run_test_files(&[path], &WorldConfig::default());
    assert!(reports[0].passed());
    assert!(print_test_report(&reports));
}

#[test]
fn runaway_recursion_is_a_stack_overflow() {
    let dir = ScratchDir::new("overflow");
    let path = dir.write(
        "forever.json",
        r#"{ "statements": [
            { "def": "down", "inputs": [["n", "int"]], "output": "int", "body": [
                { "return": { "call": "down", "args": [{ "ref": "n" }] } }
            ] },
            { "expr": { "call": "down", "args": [1] } }
        ], "expect_error": "E1011" }"#,
    );
    let config = WorldConfig {
        max_frames: 64,
        ..WorldConfig::default()
    };
    let reports = run_test_files(&[path], &config);
    assert!(reports[0].passed(), "{}", failure(&reports[0].outcome));
}

#[test]
fn missing_and_malformed_files_fail() {
    let dir = ScratchDir::new("broken");
    let malformed = dir.write("malformed.json", r#"{ "statements": [{ "lett": "x" }] }"#);
    let missing = dir.0.join("missing.json");

    let reports = run_test_files(&[malformed, missing], &WorldConfig::default());
    assert!(failure(&reports[0].outcome).starts_with("script error: invalid script"));
    assert!(failure(&reports[1].outcome).starts_with("storage error: "));
}

#[test]
fn parse_errors_are_script_errors() {
    let err = parse_script("{ not json").unwrap_err();
    assert!(matches!(err, Error::Script(ref msg) if msg.starts_with("invalid script")));

    let err = parse_script(r#"{ "statements": [{ "let": "x", "value": { "reff": "y" } }] }"#).unwrap_err();
    assert!(matches!(err, Error::Script(_)));
}
