use circa::{
    graph::{BranchId, TermId, printer::print_branch},
    runtime::{overload::specialized_function, types::builtin, value::TaggedValue, vm::run_branch},
    script::{load_script, parse_script},
    world::World,
};

fn load(world: &mut World, text: &str) -> BranchId {
    let branch = world.create_branch(None);
    let script = parse_script(text).unwrap();
    load_script(world, branch, &script, None).unwrap();
    branch
}

fn kernel_function(world: &World, name: &str) -> TermId {
    world.get_named(world.kernel_branch(), name).unwrap()
}

const MIXED: &str = r#"{ "statements": [
    { "let": "i", "value": { "call": "add", "args": [5, 3] } },
    { "let": "f", "value": { "call": "add", "args": [5, 3.0] } }
] }"#;

#[test]
fn int_arguments_pick_the_int_overload() {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, MIXED);
    let i = world.get_named(branch, "i").unwrap();

    assert_eq!(specialized_function(&world, i), Some(kernel_function(&world, "add_i")));
    assert_eq!(world.term(i).type_id, builtin::INT);
    run_branch(&mut world, branch).unwrap();
    assert_eq!(world.term(i).value, TaggedValue::int(8));
}

#[test]
fn a_float_argument_picks_the_number_overload() {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, MIXED);
    let f = world.get_named(branch, "f").unwrap();

    assert_eq!(specialized_function(&world, f), Some(kernel_function(&world, "add_f")));
    assert_eq!(world.term(f).type_id, builtin::NUMBER);
    run_branch(&mut world, branch).unwrap();
    assert_eq!(world.term(f).value.type_id(), builtin::NUMBER);
    assert_eq!(world.term(f).value.to_float().unwrap(), 8.0);
}

#[test]
fn untyped_inputs_are_resolved_per_evaluation() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "def": "bump", "inputs": [["x", "any"]], "body": [
                { "expr": { "call": "add", "args": [{ "ref": "x" }, 1] } }
            ] },
            { "let": "whole", "value": { "call": "bump", "args": [2] } },
            { "let": "half", "value": { "call": "bump", "args": [2.5] } }
        ] }"#,
    );
    let bump = world.get_named(branch, "bump").unwrap();
    let body = world.subroutine_body(bump).unwrap();
    let inner = world.branch(body).last().unwrap();
    assert_eq!(specialized_function(&world, inner), None);

    let stack = run_branch(&mut world, branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
    let whole = world.get_named(branch, "whole").unwrap();
    let half = world.get_named(branch, "half").unwrap();
    assert_eq!(world.term(whole).value, TaggedValue::int(3));
    assert_eq!(world.term(half).value.to_float().unwrap(), 3.5);
}

#[test]
fn rewiring_an_input_respecializes() {
    let mut world = World::new().unwrap();
    let branch = load(&mut world, MIXED);
    let i = world.get_named(branch, "i").unwrap();
    let half = world.create_float(branch, 0.5).unwrap();

    world.set_input(i, 1, Some(half)).unwrap();
    assert_eq!(specialized_function(&world, i), Some(kernel_function(&world, "add_f")));
    run_branch(&mut world, branch).unwrap();
    assert_eq!(world.term(i).value.to_float().unwrap(), 5.5);
}

#[test]
fn resolution_is_deterministic_across_worlds() {
    let render = || {
        let mut world = World::new().unwrap();
        let branch = load(&mut world, MIXED);
        run_branch(&mut world, branch).unwrap();
        print_branch(&world, branch)
    };
    assert_eq!(render(), render());
}
