use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

/// True the first time a given call runs, false on every later run.
pub(super) fn builtin_once(call: &mut Call<'_>) -> Result<TaggedValue> {
    let state = call.state()?;
    if state.is_null() {
        *state = TaggedValue::bool(true);
        return Ok(TaggedValue::bool(true));
    }
    Ok(TaggedValue::bool(false))
}

/// A `state` declaration. Its value survives between runs; the optional
/// input only seeds it.
pub(super) fn builtin_state(call: &mut Call<'_>) -> Result<TaggedValue> {
    if call.state()?.is_null() {
        let ty = call.output_type();
        let initial = match call.inputs().first() {
            Some(seed) if !seed.is_null() => call.types().cast(seed, ty)?,
            _ => call.types().make(ty)?,
        };
        *call.state()? = initial;
    }
    Ok(call.state()?.clone())
}
