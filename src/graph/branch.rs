use std::collections::HashMap;

use crate::graph::{BranchId, TermId};

/// An ordered, name-scoped sequence of terms.
#[derive(Debug, Clone)]
pub struct Branch {
    pub id: BranchId,
    pub terms: Vec<TermId>,
    pub names: HashMap<String, TermId>,
    pub owning_term: Option<TermId>,
    /// Where the branch's contents came from, e.g. a script path.
    pub source: Option<String>,
}

impl Branch {
    pub fn new(id: BranchId, owning_term: Option<TermId>) -> Self {
        Self {
            id,
            terms: Vec::new(),
            names: HashMap::new(),
            owning_term,
            source: None,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TermId> {
        self.terms.get(index).copied()
    }

    pub fn last(&self) -> Option<TermId> {
        self.terms.last().copied()
    }

    pub fn get_local(&self, name: &str) -> Option<TermId> {
        self.names.get(name).copied()
    }
}
