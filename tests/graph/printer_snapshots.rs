use circa::{
    graph::{BranchId, printer::print_branch},
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

fn printed(world: &World, branch: BranchId) -> String {
    print_branch(world, branch).trim_end().to_string()
}

#[test]
fn folded_overload_shows_its_specialization() {
    let mut world = World::new().unwrap();
    let branch = world.create_branch(None);
    let a = world.create_int(branch, 2).unwrap();
    world.bind_name(branch, a, "a");
    let three = world.create_int(branch, 3).unwrap();
    let add = world.get_named(branch, "add").unwrap();
    world.apply(branch, add, &[a, three]).unwrap();

    insta::assert_snapshot!(printed(&world, branch), @r"
a = 2 : int
_value = 3 : int
_add = add(a, 3) via add_i : int = 5
");
}

#[test]
fn subroutine_body_is_indented() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "def": "double", "inputs": [["x", "int"]], "output": "int", "body": [
                { "expr": { "call": "mult", "args": [{ "ref": "x" }, 2] } }
            ] },
            { "let": "d", "value": { "call": "double", "args": [4] } }
        ] }"#,
    );
    run_branch(&mut world, branch).unwrap();

    insta::assert_snapshot!(printed(&world, branch), @r"
double = def double(int x) -> int
  x = input() : int = 0
  _value = 2 : int
  _mult = mult(x, 2) via mult_i : int = 0
_value = 4 : int
d = double(4) : int = 8
");
}

#[test]
fn if_block_cases_nest_twice() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "let": "flag", "value": true },
            { "if": [{ "condition": { "ref": "flag" }, "body": [{ "return": 1 }] }],
              "else": [{ "return": 2 }] }
        ] }"#,
    );

    insta::assert_snapshot!(printed(&world, branch), @r"
flag = true : bool
_if = if() : any
  _case = case(flag) : void
    _value = 1 : int
    _return = return 1 : any
  _case_1 = case() : void
    _value = 2 : int
    _return = return 2 : any
");
}

#[test]
fn special_forms_use_their_own_format() {
    let mut world = World::new().unwrap();
    let branch = load(
        &mut world,
        r#"{ "statements": [
            { "state": "n", "type": "int" },
            { "assign": "n", "value": { "ref": "zed" } }
        ] }"#,
    );

    insta::assert_snapshot!(printed(&world, branch), @r"
n = state() : int = 0
_unknown_identifier = ?zed : any
_assign = n := _unknown_identifier : any
");
}
