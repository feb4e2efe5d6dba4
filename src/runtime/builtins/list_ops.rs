use crate::{
    error::Result,
    runtime::{call::Call, value::TaggedValue},
};

use super::helpers::type_error;

pub(super) fn builtin_list(call: &mut Call<'_>) -> Result<TaggedValue> {
    Ok(TaggedValue::list(call.inputs().to_vec()))
}

pub(super) fn builtin_get_index(call: &mut Call<'_>) -> Result<TaggedValue> {
    let list = call.input(0)?;
    let Ok(items) = list.as_list() else {
        return Err(type_error(call, "first argument", "List", list));
    };
    let index = call.int_input(1)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| {
            call.raise(format!(
                "index {} out of range for list of length {}",
                index,
                items.len()
            ))
        })
}

pub(super) fn builtin_length(call: &mut Call<'_>) -> Result<TaggedValue> {
    let value = call.input(0)?;
    if let Ok(s) = value.as_str() {
        return Ok(TaggedValue::int(s.chars().count() as i64));
    }
    match value.as_list() {
        Ok(items) => Ok(TaggedValue::int(items.len() as i64)),
        Err(_) => Err(type_error(call, "argument", "List or string", value)),
    }
}

/// A new list with the item appended. The input list is shared, not changed.
pub(super) fn builtin_append(call: &mut Call<'_>) -> Result<TaggedValue> {
    let mut list = call.input(0)?.clone();
    let item = call.input(1)?.clone();
    if list.is_null() {
        return Ok(TaggedValue::list(vec![item]));
    }
    list.list_mut()?.push(item);
    Ok(list)
}

pub(super) fn builtin_copy(call: &mut Call<'_>) -> Result<TaggedValue> {
    call.types().copied(call.input(0)?)
}
