use std::{env, fs, process};

use circa::{
    reload::{CodeUnit, hash_bytes},
    runtime::{value::TaggedValue, vm::run_branch},
    storage::{FakeFileSystem, FileSystemStorage, Storage},
    world::World,
};

fn counter(step: i64) -> String {
    format!(
        r#"{{ "statements": [
            {{ "state": "count", "type": "int", "initial": 0 }},
            {{ "assign": "count", "value": {{ "call": "add", "args": [{{ "ref": "count" }}, {}] }} }}
        ] }}"#,
        step
    )
}

fn run(world: &mut World, unit: &CodeUnit) {
    let stack = run_branch(world, unit.branch).unwrap();
    assert!(stack.failure().is_none(), "{:?}", stack.failure());
}

fn state(world: &World, unit: &CodeUnit, name: &str) -> TaggedValue {
    let term = world.get_named(unit.branch, name).unwrap();
    world.term(term).state.clone()
}

#[test]
fn a_sequence_of_edits_keeps_the_counter() {
    let fs = FakeFileSystem::new();
    fs.set("app.json", &counter(1));
    let mut world = World::new().unwrap();
    let mut unit = CodeUnit::load(&mut world, &fs, "app.json").unwrap();
    let branches = world.live_branches();

    run(&mut world, &unit);
    run(&mut world, &unit);
    assert_eq!(state(&world, &unit, "count"), TaggedValue::int(2));

    for (step, expected) in [(10, 12), (100, 112)] {
        fs.set("app.json", &counter(step));
        assert!(unit.reload_if_changed(&mut world, &fs).unwrap());
        run(&mut world, &unit);
        assert_eq!(state(&world, &unit, "count"), TaggedValue::int(expected));
        assert_eq!(world.live_branches(), branches);
    }
    assert_eq!(unit.fingerprint, hash_bytes(counter(100).as_bytes()));
}

#[test]
fn touching_a_file_only_updates_the_timestamp() {
    let fs = FakeFileSystem::new();
    fs.set("app.json", &counter(1));
    let mut world = World::new().unwrap();
    let mut unit = CodeUnit::load(&mut world, &fs, "app.json").unwrap();
    let branch = unit.branch;

    fs.set_modified_time("app.json", 99);
    assert!(!unit.reload_if_changed(&mut world, &fs).unwrap());
    assert_eq!(unit.modified, 99);
    assert_eq!(unit.branch, branch);
}

#[test]
fn subroutine_state_survives_a_reload() {
    let fs = FakeFileSystem::new();
    let source = |extra: &str| {
        format!(
            r#"{{ "statements": [
                {{ "def": "tick", "body": [{{ "expr": {{ "call": "once" }} }}] }},
                {{ "let": "t", "value": {{ "call": "tick" }} }}{}
            ] }}"#,
            extra
        )
    };
    fs.set("tick.json", &source(""));
    let mut world = World::new().unwrap();
    let mut unit = CodeUnit::load(&mut world, &fs, "tick.json").unwrap();
    run(&mut world, &unit);

    fs.set("tick.json", &source(r#", { "let": "extra", "value": 1 }"#));
    assert!(unit.reload_if_changed(&mut world, &fs).unwrap());
    run(&mut world, &unit);
    let t = world.get_named(unit.branch, "t").unwrap();
    assert_eq!(world.term(t).value, TaggedValue::bool(false));
}

#[test]
fn trash_reflects_only_the_latest_reload() {
    let fs = FakeFileSystem::new();
    fs.set("app.json", &counter(1));
    let mut world = World::new().unwrap();
    let mut unit = CodeUnit::load(&mut world, &fs, "app.json").unwrap();
    run(&mut world, &unit);

    fs.set("app.json", r#"{ "statements": [] }"#);
    unit.reload_if_changed(&mut world, &fs).unwrap();
    assert_eq!(unit.trash.as_list().unwrap(), &[TaggedValue::int(1)]);

    fs.set("app.json", &counter(1));
    unit.reload_if_changed(&mut world, &fs).unwrap();
    assert!(unit.trash.as_list().unwrap().is_empty());
    assert_eq!(state(&world, &unit, "count"), TaggedValue::null());
}

#[test]
fn forced_reload_from_disk() {
    let path = env::temp_dir().join(format!("circa-reload-{}.json", process::id()));
    let storage = FileSystemStorage::new();
    storage.write_text_file(&path, &counter(1)).unwrap();

    let mut world = World::new().unwrap();
    let mut unit = CodeUnit::load(&mut world, &storage, path.clone()).unwrap();
    run(&mut world, &unit);

    storage.write_text_file(&path, &counter(5)).unwrap();
    unit.reload(&mut world, &storage).unwrap();
    run(&mut world, &unit);
    assert_eq!(state(&world, &unit, "count"), TaggedValue::int(6));
    assert!(storage.file_exists(&path));

    fs::remove_file(&path).unwrap();
    assert!(unit.reload(&mut world, &storage).is_err());
}
