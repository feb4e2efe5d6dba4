//! Trigonometry with angles in turns: `sin(0.25) == 1.0`.

use std::f64::consts::TAU;

use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

pub(super) fn builtin_sin(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::float((call.float_input(0)? * TAU).sin()))
}

pub(super) fn builtin_cos(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::float((call.float_input(0)? * TAU).cos()))
}
