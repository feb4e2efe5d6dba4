//! Carrying hidden state from a branch to its recompiled replacement.
//!
//! Terms are paired by unique name. A leaf state value moves across when the
//! new term's state type can accept it. Subroutine calls, if-blocks and
//! for-loops hold nested state lists, which are migrated against the old and
//! new bodies recursively. Anything that cannot move ends up in the returned
//! trash list instead of being dropped silently.

use tracing::debug;

use crate::{
    error::Result,
    graph::{BranchId, TermId},
    runtime::{
        frame::{pack_state, unpack_state},
        function::FunctionKind,
        types::{TypeId, builtin},
        value::TaggedValue,
    },
    world::World,
};

/// How a term keeps its hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StateShape {
    None,
    Leaf(TypeId),
    Subroutine(BranchId),
    IfBlock(Vec<BranchId>),
    ForLoop(BranchId),
}

fn state_shape(world: &World, term: TermId) -> StateShape {
    let Ok(fid) = world.function_of(term) else {
        return StateShape::None;
    };
    let function = world.function(fid);
    if let Some(ty) = function.hidden_state_type {
        let ty = if ty == builtin::ANY { world.term(term).type_id } else { ty };
        return StateShape::Leaf(ty);
    }
    match &function.kind {
        FunctionKind::Subroutine { body } => StateShape::Subroutine(*body),
        FunctionKind::IfBlock => {
            let cases = world
                .nested(term)
                .map(|cases| {
                    world
                        .branch(cases)
                        .terms
                        .iter()
                        .filter_map(|case| world.nested(*case))
                        .collect()
                })
                .unwrap_or_default();
            StateShape::IfBlock(cases)
        }
        FunctionKind::ForLoop => match world.nested(term) {
            Some(body) => StateShape::ForLoop(body),
            None => StateShape::None,
        },
        _ => StateShape::None,
    }
}

/// Moves the state of every stateful term in `old` onto its counterpart in
/// `new`. Returns the values that found no home.
pub fn migrate_stateful_values(world: &mut World, old: BranchId, new: BranchId) -> Result<TaggedValue> {
    let mut trash = Vec::new();
    let old_terms = world.branch(old).terms.clone();
    let mut moved = 0usize;
    for old_term in old_terms {
        let state = world.term(old_term).state.clone();
        if state.is_null() {
            continue;
        }
        let unique = world.unique_name(old_term);
        match world.find_by_unique_name(new, &unique) {
            Some(new_term) => {
                let migrated = migrate_slot(world, old_term, state, new_term, &mut trash)?;
                if !migrated.is_null() {
                    moved += 1;
                }
                world.term_mut(new_term).state = migrated;
            }
            None => trash.push(state),
        }
    }
    debug!(old = %old, new = %new, moved, trashed = trash.len(), "migrated state");
    Ok(TaggedValue::list(trash))
}

fn migrate_slot(
    world: &World,
    old_term: TermId,
    state: TaggedValue,
    new_term: TermId,
    trash: &mut Vec<TaggedValue>,
) -> Result<TaggedValue> {
    if state.is_null() {
        return Ok(state);
    }
    match (state_shape(world, old_term), state_shape(world, new_term)) {
        (StateShape::Leaf(_), StateShape::Leaf(ty)) => {
            if world.types.cast_possible(&state, ty) {
                world.types.cast(&state, ty)
            } else {
                trash.push(state);
                Ok(TaggedValue::null())
            }
        }
        (StateShape::Subroutine(old_body), StateShape::Subroutine(new_body)) => {
            migrate_list(world, old_body, state, new_body, trash)
        }
        (StateShape::ForLoop(old_body), StateShape::ForLoop(new_body)) => {
            let iterations = unpack_state(state, 0)
                .into_iter()
                .map(|iteration| migrate_list(world, old_body, iteration, new_body, trash))
                .collect::<Result<Vec<_>>>()?;
            Ok(pack_state(iterations))
        }
        (StateShape::IfBlock(old_cases), StateShape::IfBlock(new_cases)) => {
            let mut cases = unpack_state(state, old_cases.len()).into_iter();
            let mut migrated = Vec::with_capacity(new_cases.len());
            for (old_case, new_case) in old_cases.iter().zip(&new_cases) {
                let case_state = cases.next().unwrap_or_default();
                migrated.push(migrate_list(world, *old_case, case_state, *new_case, trash)?);
            }
            migrated.resize(new_cases.len(), TaggedValue::null());
            trash.extend(cases.filter(|s| !s.is_null()));
            Ok(pack_state(migrated))
        }
        _ => {
            trash.push(state);
            Ok(TaggedValue::null())
        }
    }
}

/// Migrates a nested state list indexed by the terms of `old_body` into one
/// indexed by the terms of `new_body`.
fn migrate_list(
    world: &World,
    old_body: BranchId,
    state: TaggedValue,
    new_body: BranchId,
    trash: &mut Vec<TaggedValue>,
) -> Result<TaggedValue> {
    let old_terms = world.branch(old_body).terms.clone();
    let old_states = unpack_state(state, old_terms.len());
    let mut new_states = vec![TaggedValue::null(); world.branch(new_body).len()];
    for (old_term, slot) in old_terms.into_iter().zip(old_states) {
        if slot.is_null() {
            continue;
        }
        let unique = world.unique_name(old_term);
        match world.find_by_unique_name(new_body, &unique) {
            Some(new_term) => {
                let index = world.term(new_term).index;
                new_states[index] = migrate_slot(world, old_term, slot, new_term, trash)?;
            }
            None => trash.push(slot),
        }
    }
    Ok(pack_state(new_states))
}
