use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

pub(super) fn builtin_type_of(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::type_ref(call.input(0)?.type_id()))
}

pub(super) fn builtin_type_name(call: &mut Call<'_>) -> Result<TaggedValue> {
    let ty = call.input(0)?.type_id();
    Ok(TaggedValue::string(call.types().name(ty)))
}
