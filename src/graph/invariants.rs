use crate::{
    graph::{BranchId, TermId},
    world::World,
};

/// Checks structural consistency of `branch` and everything nested in it.
/// Returns one message per violation; an empty list means the graph is sound.
pub fn check_invariants(world: &World, branch: BranchId) -> Vec<String> {
    let mut problems = Vec::new();
    check_branch(world, branch, &mut problems);
    problems
}

fn check_branch(world: &World, branch: BranchId, problems: &mut Vec<String>) {
    let Some(b) = world.try_branch(branch) else {
        problems.push(format!("{} does not exist", branch));
        return;
    };
    for (position, term) in b.terms.iter().copied().enumerate() {
        let Some(t) = world.try_term(term) else {
            problems.push(format!("{} lists deleted term {}", branch, term));
            continue;
        };
        if t.owner != branch {
            problems.push(format!("{} owner is {}, expected {}", term, t.owner, branch));
        }
        if t.index != position {
            problems.push(format!("{} index is {}, expected {}", term, t.index, position));
        }
        check_edges(world, term, problems);
        if let Some(nested) = t.nested {
            match world.try_branch(nested) {
                Some(n) if n.owning_term == Some(term) => check_branch(world, nested, problems),
                Some(_) => problems.push(format!("{} nested {} has another owner", term, nested)),
                None => problems.push(format!("{} nested {} was deleted", term, nested)),
            }
        }
    }
    for (name, bound) in &b.names {
        match world.try_term(*bound) {
            Some(t) if t.owner == branch => {}
            Some(_) => problems.push(format!("name '{}' in {} bound outside the branch", name, branch)),
            None => problems.push(format!("name '{}' in {} is dangling", name, branch)),
        }
    }
}

fn check_edges(world: &World, term: TermId, problems: &mut Vec<String>) {
    let t = world.term(term);
    for input in t.inputs.iter().flatten() {
        match world.try_term(*input) {
            Some(i) if i.users.contains(&term) => {}
            Some(_) => problems.push(format!("{} missing from users of input {}", term, input)),
            None => problems.push(format!("{} has deleted input {}", term, input)),
        }
    }
    for user in &t.users {
        match world.try_term(*user) {
            Some(u) if u.inputs.contains(&Some(term)) => {}
            Some(_) => problems.push(format!("user {} of {} does not use it", user, term)),
            None => problems.push(format!("{} has deleted user {}", term, user)),
        }
    }
}
