use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{
    error::{Error, Result},
    graph::{BranchId, TermId},
    runtime::{
        function::FunctionId,
        handle::HandleBox,
        types::{TypeId, builtin},
    },
};

/// Storage half of a [`TaggedValue`].
///
/// Scalars are stored inline. Strings have value semantics. Lists, maps and
/// handles are shared through `Rc`: copying one bumps the count, and mutation
/// goes through [`TaggedValue::list_mut`], which clones the contents first when
/// they are shared.
///
/// Reference payloads (`Term`, `Branch`, `Type`, `Function`) are plain ids into
/// the owning [`crate::World`] and never keep anything alive.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Raw machine word for types whose hooks give it meaning.
    Opaque(u64),
    String(String),
    List(Rc<Vec<TaggedValue>>),
    Map(Rc<BTreeMap<String, TaggedValue>>),
    Handle(Rc<HandleBox>),
    Term(TermId),
    Branch(BranchId),
    Type(TypeId),
    Function(FunctionId),
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a == b,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Opaque(a), Payload::Opaque(b)) => a == b,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::List(a), Payload::List(b)) => Rc::ptr_eq(a, b) || a == b,
            (Payload::Map(a), Payload::Map(b)) => Rc::ptr_eq(a, b) || a == b,
            (Payload::Handle(a), Payload::Handle(b)) => Rc::ptr_eq(a, b),
            (Payload::Term(a), Payload::Term(b)) => a == b,
            (Payload::Branch(a), Payload::Branch(b)) => a == b,
            (Payload::Type(a), Payload::Type(b)) => a == b,
            (Payload::Function(a), Payload::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Payload {
    /// True when the payload owns allocated storage that must be released
    /// before the value can change type.
    pub fn is_heap(&self) -> bool {
        matches!(
            self,
            Payload::String(_) | Payload::List(_) | Payload::Map(_) | Payload::Handle(_)
        )
    }

    /// Short label used in error messages when no type registry is at hand.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Int(_) => "int",
            Payload::Float(_) => "number",
            Payload::Bool(_) => "bool",
            Payload::Opaque(_) => "opaque",
            Payload::String(_) => "string",
            Payload::List(_) => "List",
            Payload::Map(_) => "Map",
            Payload::Handle(_) => "handle",
            Payload::Term(_) => "ref",
            Payload::Branch(_) => "Branch",
            Payload::Type(_) => "Type",
            Payload::Function(_) => "Function",
        }
    }
}

/// A runtime value: a payload together with the type that interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    pub(crate) type_id: TypeId,
    pub(crate) payload: Payload,
}

impl Default for TaggedValue {
    fn default() -> Self {
        Self::null()
    }
}

impl TaggedValue {
    pub fn null() -> Self {
        Self {
            type_id: builtin::NULL,
            payload: Payload::Null,
        }
    }

    pub fn int(v: i64) -> Self {
        Self::with_payload(builtin::INT, Payload::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Self::with_payload(builtin::NUMBER, Payload::Float(v))
    }

    pub fn bool(v: bool) -> Self {
        Self::with_payload(builtin::BOOL, Payload::Bool(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Self::with_payload(builtin::STRING, Payload::String(v.into()))
    }

    pub fn list(items: Vec<TaggedValue>) -> Self {
        Self::with_payload(builtin::LIST, Payload::List(Rc::new(items)))
    }

    pub fn map(entries: BTreeMap<String, TaggedValue>) -> Self {
        Self::with_payload(builtin::MAP, Payload::Map(Rc::new(entries)))
    }

    pub fn term_ref(term: TermId) -> Self {
        Self::with_payload(builtin::REF, Payload::Term(term))
    }

    pub fn branch_ref(branch: BranchId) -> Self {
        Self::with_payload(builtin::BRANCH, Payload::Branch(branch))
    }

    pub fn type_ref(ty: TypeId) -> Self {
        Self::with_payload(builtin::TYPE, Payload::Type(ty))
    }

    pub fn function_ref(function: FunctionId) -> Self {
        Self::with_payload(builtin::FUNCTION, Payload::Function(function))
    }

    pub fn with_payload(type_id: TypeId, payload: Payload) -> Self {
        Self { type_id, payload }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.payload, Payload::List(_))
    }

    /// Moves the value out, leaving null behind.
    pub fn take(&mut self) -> TaggedValue {
        std::mem::take(self)
    }

    /// Number of live shares of a list, map or handle payload.
    pub fn shared_count(&self) -> Option<usize> {
        match &self.payload {
            Payload::List(items) => Some(Rc::strong_count(items)),
            Payload::Map(entries) => Some(Rc::strong_count(entries)),
            Payload::Handle(handle) => Some(Rc::strong_count(handle)),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::type_mismatch(expected, self.payload.kind_name())
    }

    pub fn as_int(&self) -> Result<i64> {
        match self.payload {
            Payload::Int(v) => Ok(v),
            _ => Err(self.mismatch("int")),
        }
    }

    /// Reads an int or a float as `f64`.
    pub fn to_float(&self) -> Result<f64> {
        match self.payload {
            Payload::Int(v) => Ok(v as f64),
            Payload::Float(v) => Ok(v),
            _ => Err(self.mismatch("number")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self.payload {
            Payload::Bool(v) => Ok(v),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match &self.payload {
            Payload::String(s) => Ok(s.as_str()),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_list(&self) -> Result<&[TaggedValue]> {
        match &self.payload {
            Payload::List(items) => Ok(items.as_slice()),
            _ => Err(self.mismatch("List")),
        }
    }

    /// Mutable access to list contents, cloning them first if shared.
    pub fn list_mut(&mut self) -> Result<&mut Vec<TaggedValue>> {
        let found = self.payload.kind_name();
        match &mut self.payload {
            Payload::List(items) => Ok(Rc::make_mut(items)),
            _ => Err(Error::type_mismatch("List", found)),
        }
    }

    pub fn as_map(&self) -> Result<&BTreeMap<String, TaggedValue>> {
        match &self.payload {
            Payload::Map(entries) => Ok(entries.as_ref()),
            _ => Err(self.mismatch("Map")),
        }
    }

    pub fn as_term(&self) -> Result<TermId> {
        match self.payload {
            Payload::Term(t) => Ok(t),
            _ => Err(self.mismatch("ref")),
        }
    }

    pub fn as_branch(&self) -> Result<BranchId> {
        match self.payload {
            Payload::Branch(b) => Ok(b),
            _ => Err(self.mismatch("Branch")),
        }
    }

    pub fn as_type(&self) -> Result<TypeId> {
        match self.payload {
            Payload::Type(t) => Ok(t),
            _ => Err(self.mismatch("Type")),
        }
    }

    pub fn as_function(&self) -> Result<FunctionId> {
        match self.payload {
            Payload::Function(f) => Ok(f),
            _ => Err(self.mismatch("Function")),
        }
    }

    pub fn as_handle(&self) -> Result<&HandleBox> {
        match &self.payload {
            Payload::Handle(h) => Ok(h.as_ref()),
            _ => Err(self.mismatch("handle")),
        }
    }

    /// Converts plain data to JSON. Reference payloads become `"#id"` strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match &self.payload {
            Payload::Null => Json::Null,
            Payload::Int(v) => Json::from(*v),
            Payload::Float(v) => Json::from(*v),
            Payload::Bool(v) => Json::from(*v),
            Payload::Opaque(v) => Json::from(*v),
            Payload::String(s) => Json::from(s.as_str()),
            Payload::List(items) => Json::Array(items.iter().map(TaggedValue::to_json).collect()),
            Payload::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Payload::Handle(h) => Json::from(h.resource()),
            Payload::Term(t) => Json::from(t.to_string()),
            Payload::Branch(b) => Json::from(b.to_string()),
            Payload::Type(t) => Json::from(format!("type#{}", t.index())),
            Payload::Function(f) => Json::from(format!("function#{}", f.index())),
        }
    }

    /// Builds a value from plain JSON data. Integral numbers become ints.
    pub fn from_json(json: &serde_json::Value) -> TaggedValue {
        use serde_json::Value as Json;
        match json {
            Json::Null => TaggedValue::null(),
            Json::Bool(b) => TaggedValue::bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => TaggedValue::int(i),
                None => TaggedValue::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => TaggedValue::string(s.clone()),
            Json::Array(items) => TaggedValue::list(items.iter().map(TaggedValue::from_json).collect()),
            Json::Object(entries) => TaggedValue::map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), TaggedValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Formats a float the way the runtime prints numbers: whole values keep a
/// trailing `.0`.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Registry-free rendering, used for logs and debugging. User-visible text goes
/// through [`crate::runtime::types::TypeRegistry::to_string`].
impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Null => write!(f, "null"),
            Payload::Int(v) => write!(f, "{}", v),
            Payload::Float(v) => write!(f, "{}", format_float(*v)),
            Payload::Bool(v) => write!(f, "{}", v),
            Payload::Opaque(v) => write!(f, "<opaque {:#x}>", v),
            Payload::String(s) => write!(f, "\"{}\"", s),
            Payload::List(items) => {
                let items: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Payload::Map(entries) => {
                let items: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Payload::Handle(h) => write!(f, "<handle {}>", h.resource()),
            Payload::Term(t) => write!(f, "{}", t),
            Payload::Branch(b) => write!(f, "{}", b),
            Payload::Type(t) => write!(f, "<type {}>", t.index()),
            Payload::Function(func) => write!(f, "<function {}>", func.index()),
        }
    }
}
