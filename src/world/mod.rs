//! The interpreter context.
//!
//! A `World` owns every term, branch, type and function record. Nothing in the
//! crate is global: two worlds never share state, which is what lets the test
//! runner evaluate scripts on separate threads.

use tracing::{debug, info};

use crate::{
    config::WorldConfig,
    error::{Error, Result},
    graph::{Arena, Branch, BranchId, Term, TermId},
    runtime::{
        function::{Function, FunctionId},
        leak_detector,
        types::TypeRegistry,
    },
};

pub mod kernel;

pub use kernel::Kernel;

pub struct World {
    pub(crate) terms: Arena<Term>,
    pub(crate) branches: Arena<Branch>,
    pub types: TypeRegistry,
    pub(crate) functions: Arena<Function>,
    pub(crate) kernel: Kernel,
    pub config: WorldConfig,
}

impl World {
    /// Builds a world with the default configuration and a bootstrapped kernel.
    pub fn new() -> Result<Self> {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Result<Self> {
        let mut world = Self {
            terms: Arena::new(),
            branches: Arena::new(),
            types: TypeRegistry::new(),
            functions: Arena::new(),
            kernel: Kernel::default(),
            config,
        };
        kernel::bootstrap(&mut world)?;
        info!(
            terms = world.terms.live_count(),
            functions = world.functions.live_count(),
            types = world.types.len(),
            "kernel bootstrapped"
        );
        Ok(world)
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn kernel_branch(&self) -> BranchId {
        self.kernel.branch
    }

    /// Panics if `id` does not name a live term.
    pub fn term(&self, id: TermId) -> &Term {
        match self.terms.get(id.0) {
            Some(term) => term,
            None => panic!("World::term: stale term id {}", id),
        }
    }

    /// Panics if `id` does not name a live term.
    pub fn term_mut(&mut self, id: TermId) -> &mut Term {
        match self.terms.get_mut(id.0) {
            Some(term) => term,
            None => panic!("World::term_mut: stale term id {}", id),
        }
    }

    pub fn try_term(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.0)
    }

    pub fn contains_term(&self, id: TermId) -> bool {
        self.terms.contains(id.0)
    }

    /// Panics if `id` does not name a live branch.
    pub fn branch(&self, id: BranchId) -> &Branch {
        match self.branches.get(id.0) {
            Some(branch) => branch,
            None => panic!("World::branch: stale branch id {}", id),
        }
    }

    pub fn branch_mut(&mut self, id: BranchId) -> &mut Branch {
        match self.branches.get_mut(id.0) {
            Some(branch) => branch,
            None => panic!("World::branch_mut: stale branch id {}", id),
        }
    }

    pub fn try_branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.0)
    }

    /// Allocates an empty branch. `owner` is the term that holds it as its
    /// nested branch, or `None` for a top-level branch.
    pub fn create_branch(&mut self, owner: Option<TermId>) -> BranchId {
        let id = BranchId(self.branches.next_slot());
        let allocated = self.branches.alloc(Branch::new(id, owner));
        debug_assert_eq!(allocated, id.0);
        id
    }

    /// Clears and frees a branch. The branch must not be anyone's nested branch.
    pub fn delete_branch(&mut self, branch: BranchId) -> Result<()> {
        if let Some(owner) = self.branch(branch).owning_term {
            if self.contains_term(owner) && self.term(owner).nested == Some(branch) {
                return Err(Error::internal(format!(
                    "{} is still nested under term {}",
                    branch, owner
                )));
            }
        }
        self.clear_branch(branch)?;
        self.branches.remove(branch.0);
        Ok(())
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        FunctionId(self.functions.alloc(function))
    }

    /// Panics if the record was freed along with its declaring term.
    pub fn function(&self, id: FunctionId) -> &Function {
        match self.functions.get(id.0) {
            Some(function) => function,
            None => panic!("World::function: stale function id {}", id.index()),
        }
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        match self.functions.get_mut(id.0) {
            Some(function) => function,
            None => panic!("World::function_mut: stale function id {}", id.index()),
        }
    }

    pub fn try_function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.0)
    }

    /// Frees the record `decl` declares, if `decl` is its declaring term.
    pub(crate) fn release_function_declared_by(&mut self, decl: TermId, id: FunctionId) {
        let owned = self
            .try_function(id)
            .is_some_and(|function| function.declaring_term == Some(decl));
        if owned {
            let removed = self.functions.remove(id.0);
            debug!(term = %decl, function = ?removed.map(|f| f.name), "freed function record");
        }
    }

    /// The function record a declaring term stands for.
    pub fn function_declared_by(&self, decl: TermId) -> Result<FunctionId> {
        let term = self
            .try_term(decl)
            .ok_or_else(|| Error::internal(format!("function term {} was deleted", decl)))?;
        let id = term
            .value
            .as_function()
            .map_err(|_| Error::internal(format!("term {} does not declare a function", decl)))?;
        if self.try_function(id).is_none() {
            return Err(Error::internal(format!(
                "function declared by {} was deleted",
                decl
            )));
        }
        Ok(id)
    }

    /// The function a call term invokes.
    pub fn function_of(&self, term: TermId) -> Result<FunctionId> {
        let decl = self
            .term(term)
            .function
            .ok_or_else(|| Error::internal(format!("term {} has no function", term)))?;
        self.function_declared_by(decl)
    }

    pub fn is_function_term(&self, term: TermId) -> bool {
        self.try_term(term)
            .is_some_and(|_| self.function_declared_by(term).is_ok())
    }

    pub fn function_name(&self, term: TermId) -> &str {
        match self.function_of(term) {
            Ok(id) => &self.function(id).name,
            Err(_) => "<none>",
        }
    }

    pub fn function_name_declared_by(&self, decl: TermId) -> &str {
        match self.function_declared_by(decl) {
            Ok(id) => &self.function(id).name,
            Err(_) => "<none>",
        }
    }

    pub fn nested(&self, term: TermId) -> Option<BranchId> {
        self.term(term).nested
    }

    pub fn live_terms(&self) -> usize {
        self.terms.live_count()
    }

    pub fn live_branches(&self) -> usize {
        self.branches.live_count()
    }

    pub fn live_functions(&self) -> usize {
        self.functions.live_count()
    }

    /// Releases every user branch and the kernel. Values holding handles run
    /// their release callbacks here.
    pub fn shutdown(mut self) -> Result<()> {
        let roots: Vec<BranchId> = self
            .branches
            .iter()
            .filter(|(_, b)| b.owning_term.is_none() && b.id != self.kernel.branch)
            .map(|(_, b)| b.id)
            .collect();
        for branch in roots {
            self.delete_branch(branch)?;
        }
        let kernel = self.kernel.branch;
        self.delete_branch(kernel)?;
        let stats = leak_detector::snapshot();
        debug!(
            live_terms = self.terms.live_count(),
            open_handles = stats.open_handles(),
            "world shut down"
        );
        Ok(())
    }
}
