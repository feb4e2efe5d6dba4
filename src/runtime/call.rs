use crate::{
    error::{Error, Result},
    graph::TermId,
    runtime::{
        function::{Function, FunctionId},
        types::{TypeId, TypeRegistry},
        value::TaggedValue,
    },
    world::World,
};

/// What a native function sees while it runs: the input values already read
/// from the frame stack, the calling term, and the call's hidden state slot.
pub struct Call<'a> {
    world: &'a World,
    caller: TermId,
    function: FunctionId,
    inputs: &'a [TaggedValue],
    state: &'a mut TaggedValue,
}

impl<'a> Call<'a> {
    pub fn new(
        world: &'a World,
        caller: TermId,
        function: FunctionId,
        inputs: &'a [TaggedValue],
        state: &'a mut TaggedValue,
    ) -> Self {
        Self {
            world,
            caller,
            function,
            inputs,
            state,
        }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.world.types
    }

    pub fn caller(&self) -> TermId {
        self.caller
    }

    pub fn function(&self) -> &Function {
        self.world.function(self.function)
    }

    pub fn name(&self) -> &str {
        &self.function().name
    }

    /// Declared type of the calling term.
    pub fn output_type(&self) -> TypeId {
        self.world.term(self.caller).type_id
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn inputs(&self) -> &[TaggedValue] {
        self.inputs
    }

    pub fn input(&self, index: usize) -> Result<&TaggedValue> {
        self.inputs.get(index).ok_or_else(|| {
            Error::internal(format!(
                "{} read input {} of {}",
                self.name(),
                index,
                self.inputs.len()
            ))
        })
    }

    pub fn int_input(&self, index: usize) -> Result<i64> {
        self.input(index)?.as_int()
    }

    pub fn float_input(&self, index: usize) -> Result<f64> {
        self.input(index)?.to_float()
    }

    pub fn bool_input(&self, index: usize) -> Result<bool> {
        self.input(index)?.as_bool()
    }

    pub fn string_input(&self, index: usize) -> Result<&str> {
        self.input(index)?.as_str()
    }

    pub fn list_input(&self, index: usize) -> Result<&[TaggedValue]> {
        self.input(index)?.as_list()
    }

    /// The term wired to input `index` of the caller.
    pub fn input_term(&self, index: usize) -> Result<TermId> {
        self.world
            .term(self.caller)
            .input(index)
            .ok_or_else(|| Error::internal(format!("{} input {} is not connected", self.caller, index)))
    }

    /// The hidden state slot. Null the first time a call runs.
    pub fn state(&mut self) -> Result<&mut TaggedValue> {
        if !self.function().is_stateful() {
            return Err(Error::internal(format!(
                "{} is not stateful but asked for state",
                self.name()
            )));
        }
        Ok(&mut *self.state)
    }

    pub fn raise(&self, message: impl Into<String>) -> Error {
        Error::Runtime(message.into())
    }
}
