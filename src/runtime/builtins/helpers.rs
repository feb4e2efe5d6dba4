use crate::{
    error::{Error, Result},
    runtime::{call::Call, value::TaggedValue},
};

/// Every input as a float; ints widen.
pub(super) fn float_inputs(call: &Call<'_>) -> Result<Vec<f64>> {
    call.inputs().iter().map(TaggedValue::to_float).collect()
}

pub(super) fn type_error(call: &Call<'_>, label: &str, expected: &str, got: &TaggedValue) -> Error {
    Error::Runtime(format!(
        "{} expected {} to be {}, got {}{}",
        call.name(),
        label,
        expected,
        call.types().name(got.type_id()),
        format_hint(&call.function().signature(call.world()))
    ))
}

pub(super) fn format_hint(signature: &str) -> String {
    format!("\n\nHint:\n  {}", signature)
}

/// Text for a value as `print` and `concat` show it: strings raw, everything
/// else through the type's `to_string`.
pub(super) fn display_text(call: &Call<'_>, value: &TaggedValue) -> String {
    match value.as_str() {
        Ok(s) => s.to_string(),
        Err(_) => call.types().to_string(value),
    }
}
