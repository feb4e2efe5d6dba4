use circa::{
    graph::BranchId,
    runtime::{migration::migrate_stateful_values, types::builtin, value::TaggedValue, vm::run_branch},
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

fn named_state(world: &World, branch: BranchId, name: &str) -> TaggedValue {
    let term = world.get_named(branch, name).unwrap();
    world.term(term).state.clone()
}

#[test]
fn int_state_survives_a_recompile() {
    let mut world = World::new().unwrap();
    let old = load(&mut world, r#"{ "statements": [{ "state": "i", "type": "int", "initial": 5 }] }"#);
    run(&mut world, old);
    assert_eq!(named_state(&world, old, "i"), TaggedValue::int(5));

    let new = load(&mut world, r#"{ "statements": [{ "state": "i", "type": "int", "initial": 0 }] }"#);
    let trash = migrate_stateful_values(&mut world, old, new).unwrap();
    assert!(trash.as_list().unwrap().is_empty());

    run(&mut world, new);
    let i = world.get_named(new, "i").unwrap();
    assert_eq!(world.term(i).value, TaggedValue::int(5));
}

#[test]
fn widened_state_is_cast() {
    let mut world = World::new().unwrap();
    let old = load(&mut world, r#"{ "statements": [{ "state": "i", "type": "int", "initial": 5 }] }"#);
    run(&mut world, old);

    let new = load(&mut world, r#"{ "statements": [{ "state": "i", "type": "number" }] }"#);
    migrate_stateful_values(&mut world, old, new).unwrap();
    let state = named_state(&world, new, "i");
    assert_eq!(state.type_id(), builtin::NUMBER);
    assert_eq!(state.to_float().unwrap(), 5.0);
}

#[test]
fn state_without_a_counterpart_is_trashed() {
    let mut world = World::new().unwrap();
    let old = load(
        &mut world,
        r#"{ "statements": [
            { "state": "kept", "type": "int", "initial": 1 },
            { "state": "dropped", "type": "string", "initial": "bye" }
        ] }"#,
    );
    run(&mut world, old);

    let new = load(&mut world, r#"{ "statements": [{ "state": "kept", "type": "int" }] }"#);
    let trash = migrate_stateful_values(&mut world, old, new).unwrap();
    assert_eq!(trash.as_list().unwrap(), &[TaggedValue::string("bye")]);
    assert_eq!(named_state(&world, new, "kept"), TaggedValue::int(1));
}

#[test]
fn subroutine_call_state_follows_the_call_site() {
    let tick = r#"{ "statements": [
        { "def": "tick", "body": [{ "expr": { "call": "once" } }] },
        { "let": "a", "value": { "call": "tick" } }
    ] }"#;
    let mut world = World::new().unwrap();
    let old = load(&mut world, tick);
    run(&mut world, old);

    let new = load(&mut world, tick);
    migrate_stateful_values(&mut world, old, new).unwrap();
    run(&mut world, new);
    let a = world.get_named(new, "a").unwrap();
    assert_eq!(world.term(a).value, TaggedValue::bool(false));
}

#[test]
fn loop_state_migrates_per_iteration() {
    let looped = r#"{ "statements": [
        { "for": "x", "in": { "list": [1, 2] }, "body": [{ "expr": { "call": "once" } }] }
    ] }"#;
    let mut world = World::new().unwrap();
    let old = load(&mut world, looped);
    run(&mut world, old);

    let new = load(&mut world, looped);
    migrate_stateful_values(&mut world, old, new).unwrap();
    run(&mut world, new);
    let term = world.branch(new).last().unwrap();
    assert_eq!(
        world.term(term).value,
        TaggedValue::list(vec![TaggedValue::bool(false), TaggedValue::bool(false)])
    );
}

#[test]
fn renamed_subroutine_body_term_loses_its_state() {
    let mut world = World::new().unwrap();
    let old = load(
        &mut world,
        r#"{ "statements": [
            { "def": "keep", "body": [{ "state": "n", "type": "int", "initial": 7 }] },
            { "let": "k", "value": { "call": "keep" } }
        ] }"#,
    );
    run(&mut world, old);

    let new = load(
        &mut world,
        r#"{ "statements": [
            { "def": "keep", "body": [{ "state": "m", "type": "int", "initial": 0 }] },
            { "let": "k", "value": { "call": "keep" } }
        ] }"#,
    );
    let trash = migrate_stateful_values(&mut world, old, new).unwrap();
    assert_eq!(trash.as_list().unwrap(), &[TaggedValue::int(7)]);
    run(&mut world, new);
    let k = world.get_named(new, "k").unwrap();
    assert_eq!(world.term(k).value, TaggedValue::int(0));
}
