use circa::{
    graph::{BranchId, TermId},
    runtime::{
        types::builtin,
        value::TaggedValue,
        vm::{Stack, StackStatus, run_branch},
    },
    script::{load_expression, load_script, parse_expression, parse_script},
    world::World,
};

fn eval(text: &str) -> (World, TermId) {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    let expr = parse_expression(text).unwrap();
    let term = load_expression(&mut world, branch, &expr).unwrap();
    let stack = run_branch(&mut world, branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
    (world, term)
}

fn load(world: &mut World, text: &str) -> BranchId {
    let branch = world.create_branch(None);
    let script = parse_script(text).unwrap();
    load_script(world, branch, &script, None).unwrap();
    branch
}

#[test]
fn add_of_two_ints_is_an_int() {
    let (world, term) = eval(r#"{ "call": "add", "args": [2, 3] }"#);
    let value = &world.term(term).value;
    assert_eq!(value.type_id(), builtin::INT);
    assert_eq!(value, &TaggedValue::int(5));
}

#[test]
fn add_is_folded_at_construction() {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    let expr = parse_expression(r#"{ "call": "add", "args": [2, 3] }"#).unwrap();
    let term = load_expression(&mut world, branch, &expr).unwrap();
    assert!(!world.term(term).needs_update);
    assert_eq!(world.term(term).value, TaggedValue::int(5));
}

#[test]
fn to_string_of_a_sum() {
    let (world, term) = eval(r#"{ "call": "to-string", "args": [{ "call": "add", "args": [2, 3] }] }"#);
    let value = &world.term(term).value;
    assert_eq!(value.type_id(), builtin::STRING);
    assert_eq!(value.as_str().unwrap(), "5");
}

#[test]
fn recursive_factorial() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "def": "f", "inputs": [["n", "int"]], "output": "int", "body": [
                { "if": [{ "condition": { "call": "less_than", "args": [{ "ref": "n" }, 2] },
                           "body": [{ "return": 1 }] }],
                  "else": [{ "return": { "call": "mult", "args": [
                      { "ref": "n" },
                      { "call": "f", "args": [{ "call": "sub", "args": [{ "ref": "n" }, 1] }] }
                  ] } }] }
            ] },
            { "let": "result", "value": { "call": "f", "args": [4] } }
        ] }"#,
    );

    let stack = run_branch(&mut world, branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
    let result = world.get_named(branch, "result").unwrap();
    assert_eq!(world.term(result).value, TaggedValue::int(24));
    assert_eq!(stack.depth(), 0);
}

#[test]
fn stepping_reaches_the_same_result() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "def": "inc", "inputs": [["n", "int"]], "output": "int", "body": [
                { "expr": { "call": "add", "args": [{ "ref": "n" }, 1] } }
            ] },
            { "let": "x", "value": { "call": "inc", "args": [{ "call": "inc", "args": [1] }] } }
        ] }"#,
    );

    let mut stack = Stack::new();
    stack.push_branch(&world, branch).unwrap();
    let mut steps = 0;
    while matches!(stack.status(), StackStatus::Running | StackStatus::ClosingFrame) {
        stack.run_next_instruction(&mut world).unwrap();
        steps += 1;
        assert!(steps < 100, "stepping did not finish");
    }
    assert_eq!(stack.status(), StackStatus::Idle);
    let x = world.get_named(branch, "x").unwrap();
    assert_eq!(world.term(x).value, TaggedValue::int(3));
}

#[test]
fn print_output_and_runtime_error_stay_inspectable() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "before", "value": { "call": "to-string", "args": [{ "call": "list", "args": [1, 2] }] } },
            { "let": "bad", "value": { "call": "get_index", "args": [{ "list": [1] }, 5] } },
            { "let": "after", "value": { "call": "once" } }
        ] }"#,
    );

    let stack = run_branch(&mut world, branch).unwrap();
    let failure = stack.failure().expect("index out of range");
    assert_eq!(stack.status(), StackStatus::Errored);
    let bad = world.get_named(branch, "bad").unwrap();
    assert_eq!(failure.term, Some(bad));
    let before = world.get_named(branch, "before").unwrap();
    assert_eq!(world.term(before).value, TaggedValue::string("[1, 2]"));
    let after = world.get_named(branch, "after").unwrap();
    assert!(world.term(after).state.is_null());
}
