use circa::{
    graph::{BranchId, TermId},
    runtime::{value::TaggedValue, vm::run_branch},
    script::{load_script, parse_script},
    world::World,
};

fn load(world: &mut World, text: &str) -> BranchId {
    let branch = world.create_branch(None);
    let script = parse_script(text).unwrap();
    load_script(world, branch, &script, None).unwrap();
    branch
}

fn run(world: &mut World, branch: BranchId) {
    let stack = run_branch(world, branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
}

fn value(world: &World, term: TermId) -> TaggedValue {
    world.term(term).value.clone()
}

fn bools(values: &[bool]) -> TaggedValue {
    TaggedValue::list(values.iter().copied().map(TaggedValue::bool).collect())
}

#[test]
fn once_fires_on_the_first_run_only() {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, r#"{ "statements": [{ "let": "first", "value": { "call": "once" } }] }"#);
    let first = world.get_named(branch, "first").unwrap();

    run(&mut world, branch);
    assert_eq!(value(&world, first), TaggedValue::bool(true));
    run(&mut world, branch);
    assert_eq!(value(&world, first), TaggedValue::bool(false));
    run(&mut world, branch);
    assert_eq!(value(&world, first), TaggedValue::bool(false));
}

#[test]
fn each_call_site_of_a_subroutine_has_its_own_state() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "def": "tick", "body": [{ "expr": { "call": "once" } }] },
            { "let": "a", "value": { "call": "tick" } }
        ] }"#,
    );
    let a = world.get_named(branch, "a").unwrap();
    run(&mut world, branch);
    assert_eq!(value(&world, a), TaggedValue::bool(true));

    let tick = world.get_named(branch, "tick").unwrap();
    let b = world.apply(branch, tick, &[]).unwrap();
    run(&mut world, branch);
    assert_eq!(value(&world, a), TaggedValue::bool(false));
    assert_eq!(value(&world, b), TaggedValue::bool(true));
    assert!(!world.term(b).state.is_null());
}

#[test]
fn every_loop_iteration_keeps_separate_state() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "for": "x", "in": { "list": [1, 2, 3] }, "body": [
                { "expr": { "call": "once" } }
            ] }
        ] }"#,
    );
    let looped = world.branch(branch).last().unwrap();

    run(&mut world, branch);
    assert_eq!(value(&world, looped), bools(&[true, true, true]));
    assert_eq!(world.term(looped).state.as_list().unwrap().len(), 3);

    run(&mut world, branch);
    assert_eq!(value(&world, looped), bools(&[false, false, false]));
}

#[test]
fn if_block_cases_keep_separate_state() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "flag", "value": true },
            { "if": [{ "condition": { "ref": "flag" }, "body": [{ "expr": { "call": "once" } }] }],
              "else": [{ "expr": { "call": "once" } }] }
        ] }"#,
    );
    let flag = world.get_named(branch, "flag").unwrap();
    let block = world.branch(branch).last().unwrap();

    run(&mut world, branch);
    assert_eq!(value(&world, block), TaggedValue::bool(true));
    run(&mut world, branch);
    assert_eq!(value(&world, block), TaggedValue::bool(false));

    world.term_mut(flag).value = TaggedValue::bool(false);
    run(&mut world, branch);
    assert_eq!(value(&world, block), TaggedValue::bool(true));

    world.term_mut(flag).value = TaggedValue::bool(true);
    run(&mut world, branch);
    assert_eq!(value(&world, block), TaggedValue::bool(false));
}

#[test]
fn state_seeded_once_then_accumulates() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "state": "total", "type": "number", "initial": 1.5 },
            { "assign": "total", "value": { "call": "mult", "args": [{ "ref": "total" }, 2.0] } }
        ] }"#,
    );
    let total = world.get_named(branch, "total").unwrap();
    run(&mut world, branch);
    assert_eq!(world.term(total).state, TaggedValue::float(3.0));
    run(&mut world, branch);
    assert_eq!(world.term(total).state, TaggedValue::float(6.0));
    run(&mut world, branch);
    assert_eq!(world.term(total).value, TaggedValue::float(12.0));
}
