use crate::{
    error::{Error, Result},
    graph::{BranchId, TermId},
    world::World,
};

impl World {
    /// Lexical name lookup: the branch itself, then each enclosing branch
    /// through owning terms, then the kernel.
    pub fn find_named(&self, branch: BranchId, name: &str) -> Option<TermId> {
        let mut current = Some(branch);
        while let Some(id) = current {
            let b = self.try_branch(id)?;
            if let Some(found) = b.get_local(name) {
                return Some(found);
            }
            current = b
                .owning_term
                .and_then(|owner| self.try_term(owner))
                .map(|owner| owner.owner);
        }
        if branch != self.kernel.branch {
            return self.branch(self.kernel.branch).get_local(name);
        }
        None
    }

    pub fn get_named(&self, branch: BranchId, name: &str) -> Result<TermId> {
        self.find_named(branch, name)
            .ok_or_else(|| Error::Key(name.to_string()))
    }

    /// A name that identifies the term within its branch across recompiles:
    /// the bound name, or `_function` with an ordinal among earlier unnamed
    /// calls to the same function.
    pub fn unique_name(&self, term: TermId) -> String {
        let t = self.term(term);
        if let Some(name) = &t.name {
            return name.clone();
        }
        let function = self.function_name(term);
        let earlier = self.branch(t.owner).terms[..t.index.min(self.branch(t.owner).len())]
            .iter()
            .filter(|other| {
                let o = self.term(**other);
                o.name.is_none() && self.function_name(**other) == function
            })
            .count();
        if earlier == 0 {
            format!("_{}", function)
        } else {
            format!("_{}_{}", function, earlier)
        }
    }

    pub fn find_by_unique_name(&self, branch: BranchId, unique: &str) -> Option<TermId> {
        let b = self.try_branch(branch)?;
        if let Some(named) = b.get_local(unique) {
            if self.term(named).owner == branch && self.term(named).name.as_deref() == Some(unique) {
                return Some(named);
            }
        }
        b.terms
            .iter()
            .copied()
            .find(|t| self.unique_name(*t) == unique)
    }
}
