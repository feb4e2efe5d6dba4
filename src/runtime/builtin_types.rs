use std::{collections::BTreeMap, rc::Rc};

use crate::runtime::{
    types::{StaticTypeQuery, Type, TypeHooks, TypeId, TypeParameter, TypeRegistry, builtin},
    value::{Payload, TaggedValue, format_float},
};

/// Registers the builtin types in the order their ids in [`builtin`] expect.
pub(crate) fn register_builtin_types(registry: &mut TypeRegistry) {
    let table: [(&str, TypeHooks); 13] = [
        ("null", null_hooks()),
        ("any", null_hooks()),
        ("void", null_hooks()),
        ("int", int_hooks()),
        ("number", number_hooks()),
        ("bool", bool_hooks()),
        ("string", string_hooks()),
        ("List", list_hooks()),
        ("Map", map_hooks()),
        ("ref", ref_hooks()),
        ("Branch", id_hooks()),
        ("Type", type_hooks()),
        ("Function", id_hooks()),
    ];
    for (name, hooks) in table {
        registry.register(name, hooks, TypeParameter::None);
    }
    registry.alias("float", builtin::NUMBER);
}

fn init_null(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::Null;
}

fn release_payload(payload: &mut Payload) {
    *payload = Payload::Null;
}

fn copy_payload(payload: &Payload) -> Payload {
    payload.clone()
}

fn exact(_: &TypeRegistry, ty: &Type, input: TypeId) -> StaticTypeQuery {
    if input == ty.id {
        StaticTypeQuery::Succeed
    } else {
        StaticTypeQuery::Fail
    }
}

fn null_to_string(_: &TypeRegistry, _: &TaggedValue) -> String {
    "null".to_string()
}

fn null_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(init_null),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(null_to_string),
        ..TypeHooks::default()
    }
}

fn int_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::Int(0);
}

fn int_to_string(_: &TypeRegistry, value: &TaggedValue) -> String {
    match value.payload {
        Payload::Int(i) => i.to_string(),
        _ => "null".to_string(),
    }
}

fn int_cast(_: &TypeRegistry, value: &TaggedValue, _: &Type) -> Option<Payload> {
    match value.payload {
        Payload::Int(i) => Some(Payload::Int(i)),
        _ => None,
    }
}

fn int_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(int_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        equals: Some(numeric_equals),
        to_string: Some(int_to_string),
        cast: Some(int_cast),
        static_type_query: Some(exact),
    }
}

fn number_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::Float(0.0);
}

fn number_to_string(_: &TypeRegistry, value: &TaggedValue) -> String {
    match value.payload {
        Payload::Float(f) => format_float(f),
        Payload::Int(i) => format_float(i as f64),
        _ => "null".to_string(),
    }
}

fn number_cast(_: &TypeRegistry, value: &TaggedValue, _: &Type) -> Option<Payload> {
    match value.payload {
        Payload::Int(i) => Some(Payload::Float(i as f64)),
        Payload::Float(f) => Some(Payload::Float(f)),
        _ => None,
    }
}

fn number_static_query(_: &TypeRegistry, _: &Type, input: TypeId) -> StaticTypeQuery {
    if input == builtin::INT || input == builtin::NUMBER {
        StaticTypeQuery::Succeed
    } else {
        StaticTypeQuery::Fail
    }
}

fn number_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(number_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        equals: Some(numeric_equals),
        to_string: Some(number_to_string),
        cast: Some(number_cast),
        static_type_query: Some(number_static_query),
    }
}

fn numeric_equals(_: &TypeRegistry, a: &TaggedValue, b: &TaggedValue) -> bool {
    match (&a.payload, &b.payload) {
        (Payload::Int(x), Payload::Int(y)) => x == y,
        _ => match (a.to_float(), b.to_float()) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        },
    }
}

fn bool_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::Bool(false);
}

fn bool_to_string(_: &TypeRegistry, value: &TaggedValue) -> String {
    match value.payload {
        Payload::Bool(b) => b.to_string(),
        _ => "null".to_string(),
    }
}

fn bool_cast(_: &TypeRegistry, value: &TaggedValue, _: &Type) -> Option<Payload> {
    match value.payload {
        Payload::Bool(b) => Some(Payload::Bool(b)),
        _ => None,
    }
}

fn bool_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(bool_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(bool_to_string),
        cast: Some(bool_cast),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

fn string_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::String(String::new());
}

fn string_to_string(_: &TypeRegistry, value: &TaggedValue) -> String {
    match &value.payload {
        Payload::String(s) => s.clone(),
        _ => "null".to_string(),
    }
}

fn string_cast(_: &TypeRegistry, value: &TaggedValue, _: &Type) -> Option<Payload> {
    match &value.payload {
        Payload::String(s) => Some(Payload::String(s.clone())),
        _ => None,
    }
}

fn string_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(string_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(string_to_string),
        cast: Some(string_cast),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

fn list_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::List(Rc::new(Vec::new()));
}

fn list_cast(_: &TypeRegistry, value: &TaggedValue, _: &Type) -> Option<Payload> {
    match &value.payload {
        Payload::List(items) => Some(Payload::List(Rc::clone(items))),
        _ => None,
    }
}

fn list_static_query(registry: &TypeRegistry, _: &Type, input: TypeId) -> StaticTypeQuery {
    match registry.get(input).parameter {
        TypeParameter::Fields(_) => StaticTypeQuery::Succeed,
        _ if input == builtin::LIST => StaticTypeQuery::Succeed,
        _ => StaticTypeQuery::Fail,
    }
}

fn list_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(list_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        equals: Some(list_equals),
        to_string: Some(list_to_string),
        cast: Some(list_cast),
        static_type_query: Some(list_static_query),
    }
}

fn list_equals(registry: &TypeRegistry, a: &TaggedValue, b: &TaggedValue) -> bool {
    match (&a.payload, &b.payload) {
        (Payload::List(x), Payload::List(y)) => {
            Rc::ptr_eq(x, y)
                || (x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|(l, r)| registry.equals(l, r)))
        }
        _ => false,
    }
}

fn list_to_string(registry: &TypeRegistry, value: &TaggedValue) -> String {
    match &value.payload {
        Payload::List(items) => {
            let items: Vec<String> = items.iter().map(|v| registry.to_string(v)).collect();
            format!("[{}]", items.join(", "))
        }
        _ => "null".to_string(),
    }
}

fn map_initialize(_: &TypeRegistry, _: &Type, payload: &mut Payload) {
    *payload = Payload::Map(Rc::new(BTreeMap::new()));
}

fn map_to_string(registry: &TypeRegistry, value: &TaggedValue) -> String {
    match &value.payload {
        Payload::Map(entries) => {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", k, registry.to_string(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        _ => "null".to_string(),
    }
}

fn map_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(map_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(map_to_string),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

fn ref_to_string(_: &TypeRegistry, value: &TaggedValue) -> String {
    match value.payload {
        Payload::Term(t) => t.to_string(),
        _ => "null".to_string(),
    }
}

fn ref_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(init_null),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(ref_to_string),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

fn type_to_string(registry: &TypeRegistry, value: &TaggedValue) -> String {
    match value.payload {
        Payload::Type(t) => registry.name(t).to_string(),
        _ => "null".to_string(),
    }
}

fn type_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(init_null),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(type_to_string),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

/// Id-carrying types without a printable form.
fn id_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(init_null),
        release: Some(release_payload),
        copy: Some(copy_payload),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

pub(crate) fn compound_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(compound_initialize),
        release: Some(release_payload),
        copy: Some(copy_payload),
        equals: Some(list_equals),
        to_string: Some(compound_to_string),
        cast: Some(compound_cast),
        static_type_query: Some(compound_static_query),
    }
}

fn compound_static_query(_: &TypeRegistry, ty: &Type, input: TypeId) -> StaticTypeQuery {
    if input == ty.id {
        StaticTypeQuery::Succeed
    } else if input == builtin::LIST {
        StaticTypeQuery::Unable
    } else {
        StaticTypeQuery::Fail
    }
}

fn fields(ty: &Type) -> &[(String, TypeId)] {
    match &ty.parameter {
        TypeParameter::Fields(fields) => fields,
        _ => &[],
    }
}

fn compound_initialize(registry: &TypeRegistry, ty: &Type, payload: &mut Payload) {
    let items = fields(ty)
        .iter()
        .map(|(_, field_type)| {
            registry
                .make(*field_type)
                .unwrap_or_else(|_| TaggedValue::null())
        })
        .collect();
    *payload = Payload::List(Rc::new(items));
}

fn compound_to_string(registry: &TypeRegistry, value: &TaggedValue) -> String {
    let ty = registry.get(value.type_id);
    match &value.payload {
        Payload::List(items) => {
            let parts: Vec<String> = fields(ty)
                .iter()
                .zip(items.iter())
                .map(|((name, _), v)| format!("{}: {}", name, registry.to_string(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        _ => "null".to_string(),
    }
}

fn compound_cast(registry: &TypeRegistry, value: &TaggedValue, ty: &Type) -> Option<Payload> {
    let Payload::List(items) = &value.payload else {
        return None;
    };
    let fields = fields(ty);
    if items.len() != fields.len() {
        return None;
    }
    let cast: Option<Vec<TaggedValue>> = items
        .iter()
        .zip(fields.iter())
        .map(|(item, (_, field_type))| registry.cast(item, *field_type).ok())
        .collect();
    cast.map(|items| Payload::List(Rc::new(items)))
}

pub(crate) fn handle_hooks() -> TypeHooks {
    TypeHooks {
        initialize: Some(init_null),
        release: Some(release_payload),
        copy: Some(copy_payload),
        to_string: Some(handle_to_string),
        static_type_query: Some(exact),
        ..TypeHooks::default()
    }
}

fn handle_to_string(registry: &TypeRegistry, value: &TaggedValue) -> String {
    match &value.payload {
        Payload::Handle(h) => format!("<{} {}>", registry.name(value.type_id), h.resource()),
        _ => format!("<{} released>", registry.name(value.type_id)),
    }
}
