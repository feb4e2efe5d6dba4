use circa::{
    config::WorldConfig,
    diagnostics::{Diagnostic, check_static_errors, render_diagnostics},
    graph::BranchId,
    script::{ScriptOutcome, load_script, parse_script, run_script},
    world::World,
};

const SQUARE: &str = r#"{ "def": "square", "inputs": [["n", "int"]], "output": "int", "body": [
    { "expr": { "call": "mult", "args": [{ "ref": "n" }, { "ref": "n" }] } }
] }"#;

fn load(world: &mut World, statements: &[&str]) -> BranchId {
    let text = format!(r#"{{ "statements": [{}] }}"#, statements.join(", "));
    let branch = world.create_branch(None);
    let script = parse_script(&text).unwrap();
    load_script(world, branch, &script, None).unwrap();
    branch
}

fn check(statements: &[&str]) -> Vec<Diagnostic> {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, statements);
    check_static_errors(&world, branch)
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
}

#[test]
fn clean_program_has_no_diagnostics() {
    let diagnostics = check(&[SQUARE, r#"{ "let": "s", "value": { "call": "square", "args": [3] } }"#]);
    assert!(diagnostics.is_empty(), "{}", render_diagnostics(&diagnostics, false));
}

#[test]
fn unknown_name_inside_a_subroutine() {
    let diagnostics = check(&[r#"{ "def": "g", "body": [{ "expr": { "ref": "missing" } }] }"#]);
    insta::assert_snapshot!(render_diagnostics(&diagnostics, false).trim_end(), @r"
-- Static error: unknown identifier [E2001]

Name `missing` is not defined.
  --> g/_unknown_identifier

Hint:
  Define `missing` before it is used, or check the spelling.
");
}

#[test]
fn wrong_number_of_inputs() {
    let diagnostics = check(&[SQUARE, r#"{ "expr": { "call": "square", "args": [1, 2] } }"#]);
    assert_eq!(codes(&diagnostics), vec!["E2003"]);
    assert_eq!(diagnostics[0].message.as_deref(), Some("`square` expects 1 inputs, got 2."));
    assert_eq!(diagnostics[0].hints, vec!["square(int n) -> int".to_string()]);
}

#[test]
fn input_type_mismatch() {
    let diagnostics = check(&[SQUARE, r#"{ "expr": { "call": "square", "args": ["x"] } }"#]);
    assert_eq!(codes(&diagnostics), vec!["E2004"]);
    assert_eq!(
        diagnostics[0].message.as_deref(),
        Some("Input 0 of `square` expects int, got string.")
    );
}

#[test]
fn no_overload_accepts_the_inputs() {
    let diagnostics = check(&[r#"{ "let": "bad", "value": { "call": "add", "args": ["a", 1] } }"#]);
    assert_eq!(codes(&diagnostics), vec!["E2005"]);
    assert_eq!(
        diagnostics[0].message.as_deref(),
        Some("No overload of `add` accepts (string, int).")
    );
    assert_eq!(diagnostics[0].location.as_deref(), Some("bad"));
}

#[test]
fn removed_input_is_reported_as_disconnected() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        &[SQUARE, r#"{ "let": "n", "value": 4 }"#, r#"{ "let": "s", "value": { "call": "square", "args": [{ "ref": "n" }] } }"#],
    );
    let n = world.get_named(branch, "n").unwrap();
    world.remove_term(n).unwrap();

    let diagnostics = check_static_errors(&world, branch);
    assert_eq!(codes(&diagnostics), vec!["E2007"]);
    assert_eq!(diagnostics[0].message.as_deref(), Some("Input 0 of `square` is not connected."));
}

#[test]
fn run_script_refuses_a_program_with_static_errors() {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, &[r#"{ "expr": { "ref": "missing" } }"#]);
    match run_script(&mut world, branch).unwrap() {
        ScriptOutcome::Rejected(errors) => assert_eq!(codes(&errors), vec!["E2001"]),
        ScriptOutcome::Evaluated(_) => panic!("static errors should stop evaluation"),
    }
}

#[test]
fn unchecked_run_fails_at_the_unknown_name() {
    let config = WorldConfig {
        check_before_run: false,
        ..WorldConfig::default()
    };
    let mut world = World::with_config(config).unwrap();
    let branch = load(&mut world, &[r#"{ "expr": { "ref": "missing" } }"#]);
    let ScriptOutcome::Evaluated(stack) = run_script(&mut world, branch).unwrap() else {
        panic!("the check was disabled");
    };
    let failure = stack.failure().unwrap();
    assert_eq!(failure.code.code, "E1013");
    assert_eq!(failure.message, "Name `missing` is not defined.");
}
