use circa::{
    feedback::{TRAINING_BRANCH_NAME, is_trainable, train},
    graph::BranchId,
    runtime::vm::run_branch,
    script::{load_script, parse_script},
    world::World,
};

fn load(world: &mut World, text: &str) -> BranchId {
    let branch = world.create_branch(None);
    let script = parse_script(text).unwrap();
    load_script(world, branch, &script, None).unwrap();
    branch
}

fn float(world: &World, branch: BranchId, name: &str) -> f64 {
    let term = world.get_named(branch, name).unwrap();
    world.term(term).value.to_float().unwrap()
}

#[test]
fn feedback_flows_back_through_a_chain() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "a", "value": 1.0 },
            { "trainable": "a" },
            { "let": "s", "value": { "call": "add", "args": [{ "ref": "a" }, 2.0] } },
            { "let": "p", "value": { "call": "mult", "args": [{ "ref": "s" }, 2.0] } },
            { "feedback": "p", "desired": 10.0 }
        ] }"#,
    );

    let stack = train(&mut world, branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
    assert_eq!(float(&world, branch, "a"), 3.0);

    run_branch(&mut world, branch).unwrap();
    assert_eq!(float(&world, branch, "p"), 10.0);
    let s = world.get_named(branch, "s").unwrap();
    assert!(is_trainable(&world, s));
}

#[test]
fn untrainable_constants_hold_still() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "a", "value": 1.0 },
            { "let": "b", "value": 2.0 },
            { "trainable": "b" },
            { "let": "s", "value": { "call": "add", "args": [{ "ref": "a" }, { "ref": "b" }] } },
            { "feedback": "s", "desired": 4.0 },
            { "feedback": "s", "desired": 6.0 }
        ] }"#,
    );

    train(&mut world, branch).unwrap();
    assert_eq!(float(&world, branch, "a"), 1.0);
    assert_eq!(float(&world, branch, "b"), 4.0);
}

#[test]
fn training_is_repeatable() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "w", "value": 0.5 },
            { "trainable": "w" },
            { "let": "y", "value": { "call": "mult", "args": [{ "ref": "w" }, 4.0] } },
            { "feedback": "y", "desired": 8.0 }
        ] }"#,
    );

    for _ in 0..3 {
        train(&mut world, branch).unwrap();
    }
    assert_eq!(float(&world, branch, "w"), 2.0);
    assert!(world.find_named(branch, TRAINING_BRANCH_NAME).is_some());
}

#[test]
fn failed_run_skips_training() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "a", "value": 1.0 },
            { "trainable": "a" },
            { "let": "s", "value": { "call": "add", "args": [{ "ref": "a" }, 2.0] } },
            { "expr": { "call": "get_index", "args": [{ "list": [] }, 0] } },
            { "feedback": "s", "desired": 5.0 }
        ] }"#,
    );

    let stack = train(&mut world, branch).unwrap();
    assert!(stack.failure().is_some());
    assert!(world.find_named(branch, TRAINING_BRANCH_NAME).is_none());
    assert_eq!(float(&world, branch, "a"), 1.0);
}
