use circa::{
    diagnostics::check_static_errors,
    graph::{BranchId, TermId, invariants::check_invariants},
    runtime::{types::builtin, value::TaggedValue, vm::run_branch},
    world::World,
};

fn setup() -> (World, BranchId) {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    (world, branch)
}

fn call(world: &mut World, branch: BranchId, name: &str, inputs: &[TermId]) -> TermId {
    let function = world.get_named(branch, name).unwrap();
    world.apply(branch, function, inputs).unwrap()
}

#[test]
fn inputs_and_users_agree_after_construction() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    let b = world.create_int(branch, 2).unwrap();
    let sum = call(&mut world, branch, "add_i", &[a, b]);
    let twice = call(&mut world, branch, "add_i", &[sum, sum]);

    assert_eq!(world.term(a).users, vec![sum]);
    assert_eq!(world.term(sum).users, vec![twice]);
    assert!(check_invariants(&world, branch).is_empty());
}

#[test]
fn removing_a_user_clears_back_references() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    let b = world.create_int(branch, 2).unwrap();
    let sum = call(&mut world, branch, "add", &[a, b]);

    world.remove_term(sum).unwrap();
    assert!(world.term(a).users.is_empty());
    assert!(world.term(b).users.is_empty());
    assert!(!world.contains_term(sum));
    assert!(check_invariants(&world, branch).is_empty());
}

#[test]
fn removing_an_input_empties_the_slot_and_reindexes() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    let b = world.create_int(branch, 2).unwrap();
    let sum = call(&mut world, branch, "add", &[a, b]);

    world.remove_term(a).unwrap();
    let t = world.term(sum);
    assert_eq!(t.inputs, vec![None, Some(b)]);
    assert!(t.needs_update);
    assert_eq!(world.term(b).index, 0);
    assert_eq!(t.index, 1);
    assert!(check_invariants(&world, branch).is_empty());
}

#[test]
fn set_input_moves_the_user_entry() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    let b = world.create_int(branch, 2).unwrap();
    let c = world.create_float(branch, 0.5).unwrap();
    let sum = call(&mut world, branch, "add", &[a, b]);

    world.set_input(sum, 1, Some(c)).unwrap();
    assert!(world.term(b).users.is_empty());
    assert!(world.term(c).users.contains(&sum));
    assert!(check_invariants(&world, branch).is_empty());

    world.set_input(sum, 0, None).unwrap();
    assert!(world.term(a).users.is_empty());
    assert!(check_invariants(&world, branch).is_empty());
}

#[test]
fn set_input_out_of_range_is_internal() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    let once = call(&mut world, branch, "once", &[]);
    let err = world.set_input(once, 0, Some(a)).unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn nested_branches_are_checked_and_freed() {
    let (mut world, branch) = setup();
    let f = world
        .create_subroutine(branch, "f", &[("x", builtin::INT)], builtin::INT)
        .unwrap();
    let body = world.subroutine_body(f).unwrap();
    let x = world.get_named(body, "x").unwrap();
    call(&mut world, body, "add", &[x, x]);
    assert!(check_invariants(&world, branch).is_empty());

    let branches = world.live_branches();
    world.remove_term(f).unwrap();
    assert!(world.try_branch(body).is_none());
    assert!(world.live_branches() < branches);
    assert!(world.find_named(branch, "f").is_none());
    assert!(check_invariants(&world, branch).is_empty());
}

#[test]
fn clear_branch_leaves_it_empty() {
    let (mut world, branch) = setup();
    let a = world.create_int(branch, 1).unwrap();
    world.bind_name(branch, a, "a");
    call(&mut world, branch, "add", &[a, a]);

    world.clear_branch(branch).unwrap();
    assert!(world.branch(branch).is_empty());
    assert!(world.branch(branch).names.is_empty());
}

#[test]
fn lookup_walks_out_to_the_kernel() {
    let (mut world, branch) = setup();
    let outer = world.create_int(branch, 7).unwrap();
    world.bind_name(branch, outer, "seven");
    let f = world.create_subroutine(branch, "f", &[], builtin::INT).unwrap();
    let body = world.subroutine_body(f).unwrap();

    assert_eq!(world.find_named(body, "seven"), Some(outer));
    assert_eq!(world.find_named(body, "f"), Some(f));
    let add = world.find_named(body, "add").unwrap();
    assert_eq!(world.term(add).owner, world.kernel_branch());
    assert!(world.find_named(body, "no_such_name").is_none());
}

fn constant_subroutine(world: &mut World, branch: BranchId, name: &str, result: i64) -> TermId {
    let f = world.create_subroutine(branch, name, &[], builtin::INT).unwrap();
    let body = world.subroutine_body(f).unwrap();
    world.create_int(body, result).unwrap();
    f
}

#[test]
fn calls_to_a_deleted_function_never_reach_its_successor() {
    let (mut world, branch) = setup();
    let f = constant_subroutine(&mut world, branch, "f", 1);
    let call = world.apply(branch, f, &[]).unwrap();
    let stack = run_branch(&mut world, branch).unwrap();
    assert!(stack.failure().is_none());
    assert_eq!(world.term(call).value, TaggedValue::int(1));

    world.remove_term(f).unwrap();
    let g = constant_subroutine(&mut world, branch, "g", 2);
    assert_eq!(g.index(), f.index());
    assert_ne!(g, f);
    assert!(!world.contains_term(f));
    assert!(world.function_of(call).unwrap_err().is_internal());

    let diagnostics = check_static_errors(&world, branch);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some("E2006"));

    assert!(run_branch(&mut world, branch).unwrap_err().is_internal());
    assert_eq!(world.term(call).value, TaggedValue::int(1));
}

#[test]
fn removing_a_declaration_frees_its_function_record() {
    let (mut world, branch) = setup();
    let before = world.live_functions();
    let f = constant_subroutine(&mut world, branch, "f", 1);
    assert_eq!(world.live_functions(), before + 1);

    world.remove_term(f).unwrap();
    assert_eq!(world.live_functions(), before);
    for round in 0..20 {
        let g = constant_subroutine(&mut world, branch, "g", round);
        world.remove_term(g).unwrap();
    }
    assert_eq!(world.live_functions(), before);
    assert!(check_invariants(&world, branch).is_empty());
}
