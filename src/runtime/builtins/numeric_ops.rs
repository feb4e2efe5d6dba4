use crate::{
    error::{Error, Result},
    runtime::{call::Call, value::TaggedValue},
};

use super::helpers::float_inputs;

fn int_op(call: &Call<'_>, op: fn(i64, i64) -> Option<i64>) -> Result<TaggedValue> {
    let a = call.int_input(0)?;
    let b = call.int_input(1)?;
    op(a, b)
        .map(TaggedValue::int)
        .ok_or_else(|| call.raise(format!("integer overflow in {}({}, {})", call.name(), a, b)))
}

pub(super) fn builtin_add_i(call: &mut Call<'_>) -> Result<TaggedValue> {
    int_op(call, i64::checked_add)
}

pub(super) fn builtin_add_f(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::float(call.float_input(0)? + call.float_input(1)?))
}

pub(super) fn builtin_sub_i(call: &mut Call<'_>) -> Result<TaggedValue> {
    int_op(call, i64::checked_sub)
}

pub(super) fn builtin_sub_f(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::float(call.float_input(0)? - call.float_input(1)?))
}

pub(super) fn builtin_mult_i(call: &mut Call<'_>) -> Result<TaggedValue> {
    int_op(call, i64::checked_mul)
}

pub(super) fn builtin_mult_f(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::float(call.float_input(0)? * call.float_input(1)?))
}

pub(super) fn builtin_div(call: &mut Call<'_>) -> Result<TaggedValue> {
    let divisor = call.float_input(1)?;
    if divisor == 0.0 {
        return Err(Error::runtime("division by zero"));
    }
    Ok(TaggedValue::float(call.float_input(0)? / divisor))
}

pub(super) fn builtin_less_than(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(call.float_input(0)? < call.float_input(1)?))
}

pub(super) fn builtin_greater_than(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(call.float_input(0)? > call.float_input(1)?))
}

/// Mean of the inputs. Feedback signals for one term are combined with it.
pub(super) fn builtin_average(call: &mut Call<'_>) -> Result<TaggedValue> {
    let values = float_inputs(call)?;
    if values.is_empty() {
        return Ok(TaggedValue::float(0.0));
    }
    Ok(TaggedValue::float(values.iter().sum::<f64>() / values.len() as f64))
}
