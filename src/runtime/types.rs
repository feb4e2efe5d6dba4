//! Type records and the registry that dispatches value behaviour through them.
//!
//! Every [`TaggedValue`] names its type by [`TypeId`]. Initialization, release,
//! copy, comparison, printing and casting all go through the hooks stored on
//! that type, so new types can be added at run time without touching the
//! payload enum.

use std::{collections::HashMap, rc::Rc};

use crate::{
    error::{Error, Result},
    graph::TermId,
    runtime::{
        builtin_types,
        handle::{HandleBox, HandleReleaseFn},
        value::{Payload, TaggedValue},
    },
};

/// Index of a type in the [`TypeRegistry`]. Types are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Fixed ids of the types every registry starts with.
pub mod builtin {
    use super::TypeId;

    pub const NULL: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const NUMBER: TypeId = TypeId(4);
    pub const BOOL: TypeId = TypeId(5);
    pub const STRING: TypeId = TypeId(6);
    pub const LIST: TypeId = TypeId(7);
    pub const MAP: TypeId = TypeId(8);
    pub const REF: TypeId = TypeId(9);
    pub const BRANCH: TypeId = TypeId(10);
    pub const TYPE: TypeId = TypeId(11);
    pub const FUNCTION: TypeId = TypeId(12);
}

/// Answer of a compile-time "does a value of type X always fit type Y" query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticTypeQuery {
    Succeed,
    Fail,
    Unable,
}

pub type InitializeFn = fn(&TypeRegistry, &Type, &mut Payload);
pub type ReleaseFn = fn(&mut Payload);
pub type CopyFn = fn(&Payload) -> Payload;
pub type EqualsFn = fn(&TypeRegistry, &TaggedValue, &TaggedValue) -> bool;
pub type ToStringFn = fn(&TypeRegistry, &TaggedValue) -> String;
/// Runs on the target type; returns the converted payload or `None`.
pub type CastFn = fn(&TypeRegistry, &TaggedValue, &Type) -> Option<Payload>;
/// Runs on the declared type with the type of the incoming value.
pub type StaticTypeQueryFn = fn(&TypeRegistry, &Type, TypeId) -> StaticTypeQuery;

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeHooks {
    pub initialize: Option<InitializeFn>,
    pub release: Option<ReleaseFn>,
    pub copy: Option<CopyFn>,
    pub equals: Option<EqualsFn>,
    pub to_string: Option<ToStringFn>,
    pub cast: Option<CastFn>,
    pub static_type_query: Option<StaticTypeQueryFn>,
}

/// Extra data a type carries for its hooks.
#[derive(Debug, Clone)]
pub enum TypeParameter {
    None,
    /// Named fields of a compound type, stored as a list payload.
    Fields(Vec<(String, TypeId)>),
    /// Release callback shared by every value of a handle type.
    HandleRelease(HandleReleaseFn),
}

#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub name: String,
    pub hooks: TypeHooks,
    pub parameter: TypeParameter,
    pub declaring_term: Option<TermId>,
}

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<Type>,
    names: HashMap<String, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            names: HashMap::new(),
        };
        builtin_types::register_builtin_types(&mut registry);
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        hooks: TypeHooks,
        parameter: TypeParameter,
    ) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        let name = name.into();
        self.names.insert(name.clone(), id);
        self.types.push(Type {
            id,
            name,
            hooks,
            parameter,
            declaring_term: None,
        });
        id
    }

    pub fn alias(&mut self, name: impl Into<String>, id: TypeId) {
        self.names.insert(name.into(), id);
    }

    /// Panics on an id that did not come from this registry.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn try_get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: TypeId) -> &str {
        self.try_get(id).map(|t| t.name.as_str()).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn set_declaring_term(&mut self, id: TypeId, term: TermId) {
        if let Some(ty) = self.types.get_mut(id.0 as usize) {
            ty.declaring_term = Some(term);
        }
    }

    pub fn create_compound_type(
        &mut self,
        name: impl Into<String>,
        fields: Vec<(String, TypeId)>,
    ) -> TypeId {
        self.register(
            name,
            builtin_types::compound_hooks(),
            TypeParameter::Fields(fields),
        )
    }

    pub fn create_handle_type(
        &mut self,
        name: impl Into<String>,
        release: HandleReleaseFn,
    ) -> TypeId {
        self.register(
            name,
            builtin_types::handle_hooks(),
            TypeParameter::HandleRelease(release),
        )
    }

    /// Changes a value's type and initializes a fresh payload for it.
    ///
    /// Refuses to run while the value still owns heap storage: call
    /// [`Self::release`] first, or use [`Self::reset_type`].
    pub fn change_type(&self, value: &mut TaggedValue, ty: TypeId) -> Result<()> {
        if value.payload.is_heap() {
            return Err(Error::internal(format!(
                "change_type to {} on a value still holding a {} payload",
                self.name(ty),
                self.name(value.type_id)
            )));
        }
        let target = self
            .try_get(ty)
            .ok_or_else(|| Error::internal(format!("unknown type id {}", ty.0)))?;
        let initialize = target.hooks.initialize.ok_or_else(|| {
            Error::internal(format!("type {} has no initialize hook", target.name))
        })?;
        value.type_id = ty;
        value.payload = Payload::Null;
        initialize(self, target, &mut value.payload);
        Ok(())
    }

    /// Release then change type.
    pub fn reset_type(&self, value: &mut TaggedValue, ty: TypeId) -> Result<()> {
        self.release(value)?;
        self.change_type(value, ty)
    }

    /// Runs the type's release hook and leaves the payload null. Idempotent.
    pub fn release(&self, value: &mut TaggedValue) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let ty = self.get(value.type_id);
        let release = ty
            .hooks
            .release
            .ok_or_else(|| Error::internal(format!("type {} has no release hook", ty.name)))?;
        release(&mut value.payload);
        value.payload = Payload::Null;
        Ok(())
    }

    /// Makes `dest` a copy of `source`, switching its type first if needed.
    pub fn copy(&self, source: &TaggedValue, dest: &mut TaggedValue) -> Result<()> {
        if dest.type_id != source.type_id {
            self.reset_type(dest, source.type_id)?;
        }
        let ty = self.get(source.type_id);
        let copy = ty
            .hooks
            .copy
            .ok_or_else(|| Error::internal(format!("type {} has no copy hook", ty.name)))?;
        dest.payload = copy(&source.payload);
        Ok(())
    }

    pub fn copied(&self, source: &TaggedValue) -> Result<TaggedValue> {
        let mut dest = TaggedValue::null();
        self.copy(source, &mut dest)?;
        Ok(dest)
    }

    /// A freshly initialized value of `ty`.
    pub fn make(&self, ty: TypeId) -> Result<TaggedValue> {
        let mut value = TaggedValue::null();
        self.change_type(&mut value, ty)?;
        Ok(value)
    }

    pub fn make_handle(&self, ty: TypeId, resource: u64) -> Result<TaggedValue> {
        match self.get(ty).parameter {
            TypeParameter::HandleRelease(release) => Ok(TaggedValue::with_payload(
                ty,
                Payload::Handle(Rc::new(HandleBox::new(resource, release))),
            )),
            _ => Err(Error::internal(format!(
                "{} is not a handle type",
                self.name(ty)
            ))),
        }
    }

    pub fn to_string(&self, value: &TaggedValue) -> String {
        let ty = self.get(value.type_id);
        match ty.hooks.to_string {
            Some(hook) => hook(self, value),
            None => format!("<{}>", ty.name),
        }
    }

    pub fn equals(&self, a: &TaggedValue, b: &TaggedValue) -> bool {
        match self.get(a.type_id).hooks.equals {
            Some(hook) => hook(self, a, b),
            None => a.type_id == b.type_id && a.payload == b.payload,
        }
    }

    /// Converts `source` to `target`. Same type and `any` are identity copies.
    pub fn cast(&self, source: &TaggedValue, target: TypeId) -> Result<TaggedValue> {
        if source.type_id == target || target == builtin::ANY {
            return self.copied(source);
        }
        let ty = self.get(target);
        match ty.hooks.cast.and_then(|cast| cast(self, source, ty)) {
            Some(payload) => Ok(TaggedValue::with_payload(target, payload)),
            None => Err(Error::type_mismatch(
                ty.name.clone(),
                self.name(source.type_id),
            )),
        }
    }

    pub fn cast_possible(&self, source: &TaggedValue, target: TypeId) -> bool {
        if source.type_id == target || target == builtin::ANY {
            return true;
        }
        let ty = self.get(target);
        ty.hooks
            .cast
            .is_some_and(|cast| cast(self, source, ty).is_some())
    }

    /// Whether a value statically typed `input` will always fit `declared`.
    pub fn statically_fits(&self, input: TypeId, declared: TypeId) -> StaticTypeQuery {
        if declared == builtin::ANY || input == declared {
            return StaticTypeQuery::Succeed;
        }
        if input == builtin::ANY {
            return StaticTypeQuery::Unable;
        }
        let ty = self.get(declared);
        match ty.hooks.static_type_query {
            Some(query) => query(self, ty, input),
            None => StaticTypeQuery::Unable,
        }
    }

    /// The shared type of `types`, or `any` when they disagree.
    pub fn common_type(&self, types: &[TypeId]) -> TypeId {
        match types.split_first() {
            Some((first, rest)) if rest.iter().all(|t| t == first) => *first,
            _ => builtin::ANY,
        }
    }
}
