use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

use super::helpers::display_text;

pub(super) fn builtin_print(call: &mut Call<'_>) -> Result<TaggedValue> {
    let line: Vec<String> = call
        .inputs()
        .iter()
        .map(|value| display_text(call, value))
        .collect();
    println!("{}", line.join(" "));
    Ok(TaggedValue::null())
}
