use crate::{
    graph::IDENTIFIER,
    runtime::{
        function::{Function, FunctionKind, InputSpec},
        types::builtin,
        value::TaggedValue,
    },
    world::World,
};

use super::{
    Diagnostic, check_static_errors, render_diagnostics,
    runtime_errors::{BUILTIN_ERROR, DIVISION_BY_ZERO_RUNTIME, classify},
    static_errors::WRONG_NUMBER_OF_INPUTS,
};
use crate::error::Error;

#[test]
fn render_without_color_has_header_message_location_and_hint() {
    let diag = Diagnostic::make_error(&DIVISION_BY_ZERO_RUNTIME, &[]).with_location("f/_div");
    assert_eq!(
        diag.render_with(false),
        "-- Runtime error: division by zero [E1008]\n\
         \n\
         Cannot divide by zero.\n  \
         --> f/_div\n\
         \n\
         Hint:\n  \
         Check divisor is non-zero before division.\n"
    );
}

#[test]
fn color_wraps_only_the_header() {
    let rendered = Diagnostic::warning("unused state").render_with(true);
    assert!(rendered.starts_with("\u{1b}[33m-- Warning: unused state [E0000]\n\u{1b}[0m"));
}

#[test]
fn hint_takes_values_after_the_message() {
    let diag = Diagnostic::make_error(&WRONG_NUMBER_OF_INPUTS, &["add_i", "2", "1", "add_i(int, int) -> int"]);
    assert_eq!(diag.message.as_deref(), Some("`add_i` expects 2 inputs, got 1."));
    assert_eq!(diag.hints, vec!["add_i(int, int) -> int".to_string()]);
}

#[test]
fn render_diagnostics_separates_entries() {
    let a = Diagnostic::error("first").with_code("E1");
    let b = Diagnostic::error("second").with_code("E2");
    let rendered = render_diagnostics(&[a, b], false);
    assert!(rendered.contains("-- Error: first [E1]"));
    assert!(rendered.contains("-- Error: second [E2]"));
}

#[test]
fn classify_falls_back_to_builtin_error() {
    assert_eq!(classify(&Error::runtime("something odd")).code, BUILTIN_ERROR.code);
    assert_eq!(classify(&Error::runtime("division by zero")).code, "E1008");
    assert_eq!(classify(&Error::Key("x".into())).code, "E1013");
}

#[test]
fn static_check_reports_unknown_names_and_bad_inputs() {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);

    let unknown = world.kernel().unknown_identifier;
    let ghost = world.create_term(branch, unknown, &[]).unwrap();
    world
        .term_mut(ghost)
        .set_property(IDENTIFIER, TaggedValue::string("ghost"));

    let text = world.create_string(branch, "a").unwrap();
    let not = world.get_named(branch, "not").unwrap();
    world.apply(branch, not, &[text]).unwrap();

    let one = world.create_int(branch, 1).unwrap();
    let add_i = world.get_named(branch, "add_i").unwrap();
    world.apply(branch, add_i, &[one]).unwrap();

    let codes: Vec<String> = check_static_errors(&world, branch)
        .into_iter()
        .filter_map(|d| d.code)
        .collect();
    assert_eq!(codes, vec!["E2001", "E2004", "E2003"]);
}

#[test]
fn static_check_reports_missing_inputs_and_impossible_overloads() {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    let takes_int = world
        .declare_function(
            branch,
            Function::new("takes_int", FunctionKind::Placeholder)
                .with_inputs(vec![InputSpec::named("n", builtin::INT)]),
        )
        .unwrap();
    let source = world.create_int(branch, 3).unwrap();
    let call = world.apply(branch, takes_int, &[source]).unwrap();
    world.remove_term(source).unwrap();

    let text = world.create_string(branch, "a").unwrap();
    let add = world.get_named(branch, "add").unwrap();
    world.apply(branch, add, &[text, text]).unwrap();

    let diagnostics = check_static_errors(&world, branch);
    let codes: Vec<&str> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(codes, vec!["E2007", "E2005"]);
    assert_eq!(diagnostics[0].term, Some(call));
    assert_eq!(diagnostics[0].location.as_deref(), Some("_takes_int"));
}

#[test]
fn clean_branch_has_no_static_errors() {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    let a = world.create_int(branch, 1).unwrap();
    let b = world.create_float(branch, 2.0).unwrap();
    let add = world.get_named(branch, "add").unwrap();
    world.apply(branch, add, &[a, b]).unwrap();
    assert!(check_static_errors(&world, branch).is_empty());
}
