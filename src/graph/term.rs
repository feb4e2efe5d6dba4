use std::collections::BTreeMap;

use crate::{
    graph::{BranchId, TermId},
    runtime::{types::TypeId, value::TaggedValue},
};

/// Property marking a term whose value may be changed by training.
pub const TRAINABLE: &str = "trainable";
/// Property set on terms whose inputs lead back to a trainable term.
pub const DERIVED_TRAINABLE: &str = "derived-trainable";
/// Name recorded on `unknown_identifier` terms.
pub const IDENTIFIER: &str = "identifier";

/// One node of the program graph.
///
/// `users` mirrors `inputs`: whenever `b` lists `a` as an input, `a` lists `b`
/// as a user. `owner` and `index` locate the term inside its branch.
#[derive(Debug, Clone)]
pub struct Term {
    pub id: TermId,
    pub function: Option<TermId>,
    pub inputs: Vec<Option<TermId>>,
    pub type_id: TypeId,
    pub value: TaggedValue,
    /// Hidden state for stateful calls evaluated at root level. Nested calls
    /// keep their state in the enclosing call's state list instead.
    pub state: TaggedValue,
    pub users: Vec<TermId>,
    pub name: Option<String>,
    pub needs_update: bool,
    pub owner: BranchId,
    pub index: usize,
    pub nested: Option<BranchId>,
    pub properties: BTreeMap<String, TaggedValue>,
}

impl Term {
    pub fn new(id: TermId, owner: BranchId, index: usize, type_id: TypeId) -> Self {
        Self {
            id,
            function: None,
            inputs: Vec::new(),
            type_id,
            value: TaggedValue::null(),
            state: TaggedValue::null(),
            users: Vec::new(),
            name: None,
            needs_update: true,
            owner,
            index,
            nested: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn input(&self, index: usize) -> Option<TermId> {
        self.inputs.get(index).copied().flatten()
    }

    pub fn property(&self, key: &str) -> Option<&TaggedValue> {
        self.properties.get(key)
    }

    pub fn bool_property(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(|v| v.as_bool().ok())
            .unwrap_or(false)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: TaggedValue) {
        self.properties.insert(key.into(), value);
    }

    pub(crate) fn add_user(&mut self, user: TermId) {
        if !self.users.contains(&user) {
            self.users.push(user);
        }
    }

    pub(crate) fn remove_user(&mut self, user: TermId) {
        self.users.retain(|u| *u != user);
    }
}
