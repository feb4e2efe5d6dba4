//! Feedback functions: given a term and the value it should have produced,
//! compute the values its inputs should have had.

use std::f64::consts::TAU;

use crate::{
    error::Result,
    graph::TermId,
    runtime::{builtin_function::BuiltinFunction, call::Call, value::TaggedValue},
    world::World,
};

use super::is_trainable;

/// Below this, a product cannot be solved for the other factor.
const MIN_DIVISOR: f64 = 0.0001;

pub static FEEDBACK_BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "feedback",
        func: builtin_feedback,
    },
    BuiltinFunction {
        name: "add_feedback",
        func: builtin_add_feedback,
    },
    BuiltinFunction {
        name: "mult_feedback",
        func: builtin_mult_feedback,
    },
    BuiltinFunction {
        name: "sin_feedback",
        func: builtin_sin_feedback,
    },
    BuiltinFunction {
        name: "cos_feedback",
        func: builtin_cos_feedback,
    },
];

/// `feedback(target, desired)` only marks a signal for the training pass.
fn builtin_feedback(_: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::null())
}

/// Current values of the target's inputs and the share of the delta each
/// one takes. Untrainable inputs take none.
fn target_inputs(world: &World, target: TermId) -> Result<Vec<(f64, f64)>> {
    let inputs: Vec<Option<TermId>> = world.term(target).inputs.clone();
    let trainable = inputs
        .iter()
        .filter(|i| i.is_some_and(|i| is_trainable(world, i)))
        .count();
    inputs
        .iter()
        .map(|input| match input {
            Some(input) => {
                let value = world.term(*input).value.to_float()?;
                let weight = if trainable > 0 && is_trainable(world, *input) {
                    1.0 / trainable as f64
                } else {
                    0.0
                };
                Ok((value, weight))
            }
            None => Ok((0.0, 0.0)),
        })
        .collect()
}

fn builtin_add_feedback(call: &mut Call<'_>) -> Result<TaggedValue> {
    let target = call.input_term(0)?;
    let delta = call.float_input(1)? - call.float_input(0)?;
    let outputs = target_inputs(call.world(), target)?
        .into_iter()
        .map(|(value, weight)| TaggedValue::float(value + delta * weight))
        .collect();
    Ok(TaggedValue::list(outputs))
}

/// For `x = a * b`, tells `a` it should be nearer `a + delta / b`.
fn builtin_mult_feedback(call: &mut Call<'_>) -> Result<TaggedValue> {
    let target = call.input_term(0)?;
    let delta = call.float_input(1)? - call.float_input(0)?;
    let inputs = target_inputs(call.world(), target)?;
    let outputs = inputs
        .iter()
        .enumerate()
        .map(|(index, (value, weight))| {
            let other = if index == 0 { 1 } else { 0 };
            let divisor = inputs.get(other).map(|(v, _)| *v).unwrap_or(1.0);
            if divisor.abs() < MIN_DIVISOR {
                return TaggedValue::float(*value);
            }
            TaggedValue::float(value + delta * weight / divisor)
        })
        .collect();
    Ok(TaggedValue::list(outputs))
}

fn builtin_sin_feedback(call: &mut Call<'_>) -> Result<TaggedValue> {
    let desired = call.float_input(1)?.clamp(-1.0, 1.0);
    Ok(TaggedValue::float(desired.asin() / TAU))
}

fn builtin_cos_feedback(call: &mut Call<'_>) -> Result<TaggedValue> {
    let desired = call.float_input(1)?.clamp(-1.0, 1.0);
    Ok(TaggedValue::float(desired.acos() / TAU))
}
