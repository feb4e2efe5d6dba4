use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

use super::helpers::display_text;

pub(super) fn builtin_to_string(call: &mut Call<'_>) -> Result<TaggedValue> {
    let value = call.input(0)?;
    Ok(TaggedValue::string(call.types().to_string(value)))
}

pub(super) fn builtin_concat(call: &mut Call<'_>) -> Result<TaggedValue> {
    let mut out = String::new();
    for value in call.inputs() {
        out.push_str(&display_text(call, value));
    }
    Ok(TaggedValue::string(out))
}
