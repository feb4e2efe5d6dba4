use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

fn inputs_equal(call: &Call<'_>) -> Result<bool> {
    let a = call.input(0)?;
    let b = call.input(1)?;
    // 5 == 5.0
    if let (Ok(x), Ok(y)) = (a.to_float(), b.to_float()) {
        return Ok(x == y);
    }
    Ok(call.types().equals(a, b))
}

pub(super) fn builtin_equals(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(inputs_equal(call)?))
}

pub(super) fn builtin_not_equals(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(!inputs_equal(call)?))
}

pub(super) fn builtin_and(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(call.bool_input(0)? && call.bool_input(1)?))
}

pub(super) fn builtin_or(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(call.bool_input(0)? || call.bool_input(1)?))
}

pub(super) fn builtin_not(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::bool(!call.bool_input(0)?))
}
