//! Training by feedback.
//!
//! A program asks for a term to take a value with `feedback(term, desired)`.
//! [`refresh_training_branch`] walks the branch backwards from those signals
//! and, for each trainable term with a feedback function, adds calls that
//! compute what its inputs should be, down to the trainable constants, where
//! an `assign` writes the new value. Multiple signals for one term are
//! averaged. Running the training branch applies the adjustment.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    graph::{BranchId, DERIVED_TRAINABLE, TRAINABLE, TermId},
    runtime::{
        function::FunctionKind,
        overload,
        value::TaggedValue,
        vm::{Stack, run_branch},
    },
    world::World,
};

pub mod functions;

pub use functions::FEEDBACK_BUILTINS;

/// Name of the nested branch holding a branch's training code.
pub const TRAINING_BRANCH_NAME: &str = "#training";

pub fn is_trainable(world: &World, term: TermId) -> bool {
    let t = world.term(term);
    t.bool_property(TRAINABLE) || t.bool_property(DERIVED_TRAINABLE)
}

pub fn set_trainable(world: &mut World, term: TermId, value: bool) {
    world
        .term_mut(term)
        .set_property(TRAINABLE, TaggedValue::bool(value));
}

/// Marks every term of `branch` that has a trainable input as derived
/// trainable. Terms are visited in order, so trainability flows downstream.
pub fn update_derived_trainable(world: &mut World, branch: BranchId) {
    let terms = world.branch(branch).terms.clone();
    for term in terms {
        let derived = world
            .term(term)
            .inputs
            .iter()
            .flatten()
            .any(|input| is_trainable(world, *input));
        world
            .term_mut(term)
            .set_property(DERIVED_TRAINABLE, TaggedValue::bool(derived));
    }
}

/// The branch's `#training` branch, created empty on first use.
pub fn training_branch(world: &mut World, branch: BranchId) -> Result<BranchId> {
    if let Some(term) = world.branch(branch).get_local(TRAINING_BRANCH_NAME) {
        return world
            .nested(term)
            .ok_or_else(|| Error::internal(format!("{} has no nested branch", TRAINING_BRANCH_NAME)));
    }
    world.create_named_branch(branch, TRAINING_BRANCH_NAME)
}

/// Rebuilds the training branch of `branch` from its feedback signals.
pub fn refresh_training_branch(world: &mut World, branch: BranchId) -> Result<BranchId> {
    update_derived_trainable(world, branch);
    let training = training_branch(world, branch)?;
    world.clear_branch(training)?;

    let kernel = world.kernel().clone();
    let mut pending: BTreeMap<TermId, Vec<TermId>> = BTreeMap::new();
    let terms = world.branch(branch).terms.clone();

    for term in terms.into_iter().rev() {
        let t = world.term(term);
        if t.function == Some(kernel.feedback) {
            if let (Some(target), Some(desired)) = (t.input(0), t.input(1)) {
                pending.entry(target).or_default().push(desired);
            }
            continue;
        }
        if !is_trainable(world, term) {
            continue;
        }
        let Some(signals) = pending.remove(&term) else {
            continue;
        };

        let Some(feedback_fn) = feedback_function(world, term)? else {
            warn!(
                function = world.function_name(term),
                term = %world.unique_name(term),
                "function has no feedback function, skipping"
            );
            continue;
        };

        let inputs: Vec<Option<TermId>> = world.term(term).inputs.clone();
        let trainable_inputs = inputs
            .iter()
            .flatten()
            .filter(|i| is_trainable(world, **i))
            .count();
        if trainable_inputs == 0 && !inputs.is_empty() {
            continue;
        }

        let desired = match signals.as_slice() {
            [single] => *single,
            many => world.apply(training, kernel.average, many)?,
        };
        let feedback = world.create_term(training, feedback_fn, &[Some(term), Some(desired)])?;

        match inputs.as_slice() {
            [] => {}
            [Some(input)] => pending.entry(*input).or_default().push(feedback),
            [None] => {}
            _ => {
                for (index, input) in inputs.iter().enumerate() {
                    let Some(input) = input else {
                        continue;
                    };
                    if !is_trainable(world, *input) {
                        continue;
                    }
                    let position = world.create_int(training, index as i64)?;
                    let share = world.create_term(
                        training,
                        kernel.get_index,
                        &[Some(feedback), Some(position)],
                    )?;
                    pending.entry(*input).or_default().push(share);
                }
            }
        }
    }

    debug!(
        branch = %branch,
        terms = world.branch(training).len(),
        "refreshed training branch"
    );
    Ok(training)
}

/// The feedback function for the function a term calls. Overloaded calls use
/// the feedback of their statically chosen candidate.
fn feedback_function(world: &World, term: TermId) -> Result<Option<TermId>> {
    let mut fid = world.function_of(term)?;
    if matches!(world.function(fid).kind, FunctionKind::Overloaded { .. }) {
        match overload::specialized_function(world, term) {
            Some(chosen) => fid = world.function_declared_by(chosen)?,
            None => return Ok(None),
        }
    }
    Ok(world
        .function(fid)
        .feedback
        .filter(|feedback| world.function_declared_by(*feedback).is_ok()))
}

/// Runs `branch`, rebuilds its training branch and runs that. Returns the
/// stack of the last run so failures can be inspected.
pub fn train(world: &mut World, branch: BranchId) -> Result<Stack> {
    let stack = run_branch(world, branch)?;
    if stack.failure().is_some() {
        return Ok(stack);
    }
    let training = refresh_training_branch(world, branch)?;
    run_branch(world, training)
}
