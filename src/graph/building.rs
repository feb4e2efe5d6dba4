//! Graph construction.
//!
//! Everything that adds, rewires or removes terms goes through these methods so
//! that `users` lists, branch indices and name bindings stay in step.

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    graph::{BranchId, Term, TermId},
    runtime::{
        NativeFn,
        function::{Function, FunctionKind, InputSpec},
        leak_detector, overload,
        types::{TypeId, builtin},
        value::TaggedValue,
        vm,
    },
    world::World,
};

impl World {
    /// Appends a call to `function` with `inputs` at the end of `branch`.
    ///
    /// Pure calls whose inputs are all up to date are evaluated right away.
    pub fn create_term(
        &mut self,
        branch: BranchId,
        function: TermId,
        inputs: &[Option<TermId>],
    ) -> Result<TermId> {
        let fid = self.function_declared_by(function)?;
        if let Some(stale) = inputs.iter().flatten().find(|i| !self.contains_term(**i)) {
            return Err(Error::internal(format!("input {} does not exist", stale)));
        }
        let type_id = self.resolve_call_type(function, inputs)?;

        let index = self.branch(branch).len();
        let id = TermId(self.terms.next_slot());
        let mut term = Term::new(id, branch, index, type_id);
        term.function = Some(function);
        term.inputs = inputs.to_vec();
        term.value = self.types.make(type_id)?;
        self.terms.alloc(term);
        leak_detector::record_term_created();
        self.branch_mut(branch).terms.push(id);
        for input in inputs.iter().flatten() {
            self.term_mut(*input).add_user(id);
        }
        trace!(term = %id, function = %self.function(fid).name, "created term");

        overload::update_static_specialization(self, id)?;
        self.update_needs_update(id)?;
        self.fold_if_constant(id)?;
        Ok(id)
    }

    /// Like [`Self::create_term`], but returns an existing equivalent term when
    /// one exists: same branch, same pure stateless function, same inputs.
    pub fn apply_function(
        &mut self,
        branch: BranchId,
        function: TermId,
        inputs: &[Option<TermId>],
    ) -> Result<TermId> {
        if self.config.reuse_equivalent_terms {
            if let Some(existing) = self.find_equivalent(branch, function, inputs)? {
                return Ok(existing);
            }
        }
        self.create_term(branch, function, inputs)
    }

    /// Convenience form of [`Self::apply_function`] for fully connected inputs.
    pub fn apply(&mut self, branch: BranchId, function: TermId, inputs: &[TermId]) -> Result<TermId> {
        let inputs: Vec<Option<TermId>> = inputs.iter().copied().map(Some).collect();
        self.apply_function(branch, function, &inputs)
    }

    pub fn find_equivalent(
        &self,
        branch: BranchId,
        function: TermId,
        inputs: &[Option<TermId>],
    ) -> Result<Option<TermId>> {
        let fid = self.function_declared_by(function)?;
        let record = self.function(fid);
        if !record.pure || record.is_stateful() {
            return Ok(None);
        }
        let Some(Some(first)) = inputs.first() else {
            return Ok(None);
        };
        let found = self.term(*first).users.iter().copied().find(|user| {
            let candidate = self.term(*user);
            candidate.owner == branch
                && candidate.function == Some(function)
                && candidate.inputs.as_slice() == inputs
        });
        Ok(found)
    }

    fn resolve_call_type(&self, function: TermId, inputs: &[Option<TermId>]) -> Result<TypeId> {
        let fid = self.function_declared_by(function)?;
        let record = self.function(fid);
        Ok(match record.specialize_type {
            Some(hook) => hook(self, inputs),
            None => record.output_type,
        })
    }

    pub(crate) fn update_needs_update(&mut self, term: TermId) -> Result<()> {
        let fid = self.function_of(term)?;
        let record = self.function(fid);
        let needs_update = match record.kind {
            FunctionKind::Value => false,
            FunctionKind::Input => true,
            _ if record.pure && !record.is_stateful() => {
                self.term(term).inputs.iter().any(|input| match input {
                    Some(input) => self.term(*input).needs_update,
                    None => true,
                })
            }
            _ => true,
        };
        self.term_mut(term).needs_update = needs_update;
        Ok(())
    }

    fn fold_if_constant(&mut self, term: TermId) -> Result<()> {
        if !self.config.constant_folding || self.term(term).needs_update {
            return Ok(());
        }
        let fid = self.function_of(term)?;
        if !matches!(
            self.function(fid).kind,
            FunctionKind::Native(_) | FunctionKind::Overloaded { .. }
        ) {
            return Ok(());
        }
        if let Err(err) = vm::fold_term(self, term) {
            if err.is_internal() {
                return Err(err);
            }
            debug!(term = %term, error = %err, "constant fold failed, deferring to run time");
            self.term_mut(term).needs_update = true;
        }
        Ok(())
    }

    /// Binds `name` to `term` in `branch`. A term keeps its first name when it
    /// receives an alias.
    pub fn bind_name(&mut self, branch: BranchId, term: TermId, name: impl Into<String>) {
        let name = name.into();
        let t = self.term_mut(term);
        if t.name.is_none() {
            t.name = Some(name.clone());
        }
        self.branch_mut(branch).names.insert(name, term);
    }

    /// Rewires one input slot, keeping both users lists consistent.
    pub fn set_input(&mut self, term: TermId, index: usize, input: Option<TermId>) -> Result<()> {
        let count = self.term(term).inputs.len();
        if index >= count {
            return Err(Error::internal(format!(
                "input index {} out of range for {} ({} inputs)",
                index, term, count
            )));
        }
        if let Some(new) = input {
            if !self.contains_term(new) {
                return Err(Error::internal(format!("input {} does not exist", new)));
            }
        }
        let old = self.term(term).inputs[index];
        self.term_mut(term).inputs[index] = input;
        if let Some(old) = old {
            let still_used = self.term(term).inputs.contains(&Some(old));
            if !still_used && self.contains_term(old) {
                self.term_mut(old).remove_user(term);
            }
        }
        if let Some(new) = input {
            self.term_mut(new).add_user(term);
        }
        overload::update_static_specialization(self, term)?;
        self.update_needs_update(term)
    }

    /// Deletes a term.
    ///
    /// The term leaves its inputs' users lists, its own users lose the input
    /// slot, names bound to it are dropped and its nested branch is cleared.
    /// Inputs and the function are never deleted along with it. A declaring
    /// term frees its function record, so calls to it stop resolving.
    pub fn remove_term(&mut self, term: TermId) -> Result<()> {
        let Some(t) = self.try_term(term) else {
            return Err(Error::internal(format!("remove_term: {} does not exist", term)));
        };
        let inputs: Vec<TermId> = t.inputs.iter().flatten().copied().collect();
        let users = t.users.clone();
        let owner = t.owner;
        let index = t.index;
        let nested = t.nested;

        for input in inputs {
            if input != term && self.contains_term(input) {
                self.term_mut(input).remove_user(term);
            }
        }
        for user in users {
            if user == term || !self.contains_term(user) {
                continue;
            }
            let u = self.term_mut(user);
            for slot in u.inputs.iter_mut() {
                if *slot == Some(term) {
                    *slot = None;
                }
            }
            u.needs_update = true;
        }
        if let Some(nested) = nested {
            self.clear_branch(nested)?;
            self.branches.remove(nested.0);
        }

        let branch = self.branch_mut(owner);
        if branch.terms.get(index) == Some(&term) {
            branch.terms.remove(index);
        } else {
            branch.terms.retain(|t| *t != term);
        }
        branch.names.retain(|_, bound| *bound != term);
        let following: Vec<TermId> = branch.terms[index.min(branch.terms.len())..].to_vec();
        for (offset, later) in following.into_iter().enumerate() {
            self.term_mut(later).index = index + offset;
        }

        if let Some(mut removed) = self.terms.remove(term.0) {
            if let Ok(fid) = removed.value.as_function() {
                self.release_function_declared_by(term, fid);
            }
            self.types.release(&mut removed.value)?;
            self.types.release(&mut removed.state)?;
        }
        leak_detector::record_term_deleted();
        Ok(())
    }

    /// Removes every term of a branch, last first, and drops its names.
    pub fn clear_branch(&mut self, branch: BranchId) -> Result<()> {
        while let Some(last) = self.branch(branch).last() {
            self.remove_term(last)?;
        }
        self.branch_mut(branch).names.clear();
        Ok(())
    }

    /// Declares a function record behind a new term bound to its name.
    pub fn declare_function(&mut self, branch: BranchId, function: Function) -> Result<TermId> {
        let name = function.name.clone();
        let decl = self.create_term(branch, self.kernel.function_decl, &[])?;
        let fid = self.add_function(Function {
            declaring_term: Some(decl),
            ..function
        });
        let t = self.term_mut(decl);
        t.type_id = builtin::FUNCTION;
        t.value = TaggedValue::function_ref(fid);
        t.needs_update = false;
        self.bind_name(branch, decl, name);
        Ok(decl)
    }

    /// Declares a function evaluated by `func`. Unlike a patched placeholder
    /// the implementation is bound at declaration.
    pub fn declare_native(&mut self, branch: BranchId, function: Function, func: NativeFn) -> Result<TermId> {
        self.declare_function(
            branch,
            Function {
                kind: FunctionKind::Native(func),
                ..function
            },
        )
    }

    /// Adds a constant of `ty` holding that type's default value.
    pub fn create_value(&mut self, branch: BranchId, ty: TypeId) -> Result<TermId> {
        let term = self.create_term(branch, self.kernel.value, &[])?;
        let value = self.types.make(ty)?;
        let t = self.term_mut(term);
        t.type_id = ty;
        t.value = value;
        Ok(term)
    }

    /// Adds a constant holding `value`; the term takes the value's type.
    pub fn create_constant(&mut self, branch: BranchId, value: TaggedValue) -> Result<TermId> {
        let term = self.create_term(branch, self.kernel.value, &[])?;
        let t = self.term_mut(term);
        t.type_id = value.type_id();
        t.value = value;
        Ok(term)
    }

    pub fn create_int(&mut self, branch: BranchId, v: i64) -> Result<TermId> {
        self.create_constant(branch, TaggedValue::int(v))
    }

    pub fn create_float(&mut self, branch: BranchId, v: f64) -> Result<TermId> {
        self.create_constant(branch, TaggedValue::float(v))
    }

    pub fn create_bool(&mut self, branch: BranchId, v: bool) -> Result<TermId> {
        self.create_constant(branch, TaggedValue::bool(v))
    }

    pub fn create_string(&mut self, branch: BranchId, v: &str) -> Result<TermId> {
        self.create_constant(branch, TaggedValue::string(v))
    }

    /// Declares a subroutine. Its body branch starts with one input placeholder
    /// per parameter; append the body with the usual construction calls.
    pub fn create_subroutine(
        &mut self,
        branch: BranchId,
        name: &str,
        params: &[(&str, TypeId)],
        output: TypeId,
    ) -> Result<TermId> {
        let decl = self.create_term(branch, self.kernel.function_decl, &[])?;
        let body = self.create_branch(Some(decl));
        self.term_mut(decl).nested = Some(body);
        let inputs = params
            .iter()
            .map(|(param, ty)| InputSpec::named(*param, *ty))
            .collect();
        let fid = self.add_function(Function {
            declaring_term: Some(decl),
            ..Function::new(name, FunctionKind::Subroutine { body })
                .with_inputs(inputs)
                .with_output(output)
        });
        let t = self.term_mut(decl);
        t.type_id = builtin::FUNCTION;
        t.value = TaggedValue::function_ref(fid);
        t.needs_update = false;
        self.bind_name(branch, decl, name);

        for (param, ty) in params {
            let placeholder = self.create_term(body, self.kernel.input, &[])?;
            let value = self.types.make(*ty)?;
            let t = self.term_mut(placeholder);
            t.type_id = *ty;
            t.value = value;
            self.bind_name(body, placeholder, *param);
        }
        Ok(decl)
    }

    pub fn subroutine_body(&self, decl: TermId) -> Result<BranchId> {
        let fid = self.function_declared_by(decl)?;
        match self.function(fid).kind {
            FunctionKind::Subroutine { body } => Ok(body),
            _ => Err(Error::internal(format!("{} is not a subroutine", decl))),
        }
    }

    /// Groups `overloads` under one name. The first candidate that fits wins.
    pub fn create_overloaded_function(
        &mut self,
        branch: BranchId,
        name: &str,
        overloads: &[TermId],
    ) -> Result<TermId> {
        let mut outputs = Vec::with_capacity(overloads.len());
        let mut arities = Vec::with_capacity(overloads.len());
        let mut pure = true;
        for overload in overloads {
            let record = self.function(self.function_declared_by(*overload)?);
            outputs.push(record.output_type);
            arities.push(record.inputs.len());
            pure &= record.pure && !record.is_stateful();
        }
        let output = self.types.common_type(&outputs);
        let mut function = Function::new(
            name,
            FunctionKind::Overloaded {
                overloads: overloads.to_vec(),
            },
        )
        .with_output(output);
        match arities.split_first() {
            Some((first, rest)) if rest.iter().all(|a| a == first) => {
                function.inputs = vec![InputSpec::new(builtin::ANY); *first];
            }
            _ => {
                function.inputs = vec![InputSpec::new(builtin::ANY)];
                function.variable_args = true;
            }
        }
        function.pure = pure;
        self.declare_function(branch, function)
    }

    /// `state` declaration with an optional initial value.
    pub fn create_state(
        &mut self,
        branch: BranchId,
        name: &str,
        ty: TypeId,
        initial: Option<TermId>,
    ) -> Result<TermId> {
        let inputs: Vec<Option<TermId>> = initial.into_iter().map(Some).collect();
        let term = self.create_term(branch, self.kernel.state, &inputs)?;
        let value = self.types.make(ty)?;
        let t = self.term_mut(term);
        t.type_id = ty;
        t.value = value;
        self.bind_name(branch, term, name);
        Ok(term)
    }

    /// Adds an empty if-block. Cases are appended with [`Self::add_case`].
    pub fn create_if_block(&mut self, branch: BranchId) -> Result<TermId> {
        let term = self.create_term(branch, self.kernel.if_block, &[])?;
        let cases = self.create_branch(Some(term));
        self.term_mut(term).nested = Some(cases);
        Ok(term)
    }

    /// Appends a case to an if-block and returns the case body. A `None`
    /// condition makes the else case.
    pub fn add_case(&mut self, if_block: TermId, condition: Option<TermId>) -> Result<BranchId> {
        let cases = self
            .nested(if_block)
            .ok_or_else(|| Error::internal(format!("{} is not an if-block", if_block)))?;
        let inputs: Vec<Option<TermId>> = condition.into_iter().map(Some).collect();
        let case = self.create_term(cases, self.kernel.case, &inputs)?;
        let body = self.create_branch(Some(case));
        self.term_mut(case).nested = Some(body);
        Ok(body)
    }

    /// Adds a for-loop over `list`. The body starts with the iterator
    /// placeholder bound to `iterator`.
    pub fn create_for_loop(
        &mut self,
        branch: BranchId,
        list: TermId,
        iterator: &str,
    ) -> Result<(TermId, BranchId)> {
        let term = self.create_term(branch, self.kernel.for_loop, &[Some(list)])?;
        let body = self.create_branch(Some(term));
        self.term_mut(term).nested = Some(body);
        let placeholder = self.create_term(body, self.kernel.input, &[])?;
        self.bind_name(body, placeholder, iterator);
        Ok((term, body))
    }

    /// A named term holding an empty nested branch that evaluation skips.
    pub fn create_named_branch(&mut self, branch: BranchId, name: &str) -> Result<BranchId> {
        let term = self.create_term(branch, self.kernel.branch_decl, &[])?;
        let nested = self.create_branch(Some(term));
        self.term_mut(term).nested = Some(nested);
        self.bind_name(branch, term, name);
        Ok(nested)
    }
}
