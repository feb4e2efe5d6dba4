//! Overloaded function resolution.
//!
//! Candidates are tried in declaration order and the first that fits wins.
//! At construction time a candidate is chosen only when every input type is
//! known to fit; the choice is recorded as a single call term in the
//! overloaded term's nested branch. Otherwise the choice is made per
//! evaluation from the runtime values.

use tracing::trace;

use crate::{
    error::Result,
    graph::TermId,
    runtime::{
        function::FunctionKind,
        types::StaticTypeQuery,
        value::TaggedValue,
    },
    world::World,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialization {
    /// This candidate always fits the input types.
    Static(TermId),
    /// An earlier candidate might fit at run time; decide then.
    Inconclusive,
    /// No candidate can ever fit.
    NoMatch,
}

/// Whether a call to `candidate` with `inputs` always, never, or maybe fits.
pub fn static_fit(world: &World, candidate: TermId, inputs: &[Option<TermId>]) -> StaticTypeQuery {
    let Ok(fid) = world.function_declared_by(candidate) else {
        return StaticTypeQuery::Fail;
    };
    let function = world.function(fid);
    if !function.accepts_arity(inputs.len()) {
        return StaticTypeQuery::Fail;
    }
    let mut result = StaticTypeQuery::Succeed;
    for (index, input) in inputs.iter().enumerate() {
        let Some(input) = input else {
            result = StaticTypeQuery::Unable;
            continue;
        };
        let Some(declared) = function.input_type(index) else {
            return StaticTypeQuery::Fail;
        };
        match world.types.statically_fits(world.term(*input).type_id, declared) {
            StaticTypeQuery::Fail => return StaticTypeQuery::Fail,
            StaticTypeQuery::Unable => result = StaticTypeQuery::Unable,
            StaticTypeQuery::Succeed => {}
        }
    }
    result
}

pub fn statically_specialize(
    world: &World,
    overloads: &[TermId],
    inputs: &[Option<TermId>],
) -> Specialization {
    for candidate in overloads {
        match static_fit(world, *candidate, inputs) {
            StaticTypeQuery::Succeed => return Specialization::Static(*candidate),
            StaticTypeQuery::Unable => return Specialization::Inconclusive,
            StaticTypeQuery::Fail => continue,
        }
    }
    Specialization::NoMatch
}

/// Re-derives the static choice for an overloaded call after its inputs change.
pub(crate) fn update_static_specialization(world: &mut World, term: TermId) -> Result<()> {
    let fid = world.function_of(term)?;
    let (overloads, output_type) = match &world.function(fid).kind {
        FunctionKind::Overloaded { overloads } => (overloads.clone(), world.function(fid).output_type),
        _ => return Ok(()),
    };

    if let Some(old) = world.term(term).nested {
        world.clear_branch(old)?;
        world.branches.remove(old.0);
        world.term_mut(term).nested = None;
    }

    let inputs = world.term(term).inputs.clone();
    let chosen_type = match statically_specialize(world, &overloads, &inputs) {
        Specialization::Static(candidate) => {
            let nested = world.create_branch(Some(term));
            world.term_mut(term).nested = Some(nested);
            let call = world.create_term(nested, candidate, &inputs)?;
            trace!(
                term = %term,
                overload = %world.function_name_declared_by(candidate),
                "statically specialized"
            );
            world.term(call).type_id
        }
        Specialization::Inconclusive | Specialization::NoMatch => output_type,
    };

    if world.term(term).type_id != chosen_type {
        let value = world.types.make(chosen_type)?;
        let t = world.term_mut(term);
        t.type_id = chosen_type;
        t.value = value;
    }
    Ok(())
}

/// The candidate recorded by static specialization, if any.
pub fn specialized_function(world: &World, term: TermId) -> Option<TermId> {
    let fid = world.function_of(term).ok()?;
    if !matches!(world.function(fid).kind, FunctionKind::Overloaded { .. }) {
        return None;
    }
    let nested = world.term(term).nested?;
    let call = world.branch(nested).get(0)?;
    world.term(call).function
}

/// First candidate whose declared inputs accept `values`.
pub fn find_dynamic_overload(
    world: &World,
    overloads: &[TermId],
    values: &[TaggedValue],
) -> Option<TermId> {
    for candidate in overloads {
        let Ok(fid) = world.function_declared_by(*candidate) else {
            continue;
        };
        let function = world.function(fid);
        if !function.accepts_arity(values.len()) {
            continue;
        }
        let fits = values.iter().enumerate().all(|(index, value)| {
            function
                .input_type(index)
                .is_some_and(|declared| world.types.cast_possible(value, declared))
        });
        if fits {
            return Some(*candidate);
        }
    }
    None
}
