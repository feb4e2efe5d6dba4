use tracing::trace;

use crate::{
    error::{Error, Result},
    graph::{IDENTIFIER, TermId},
    runtime::{
        NativeFn,
        call::Call,
        function::{FunctionId, FunctionKind},
        overload,
        types::builtin,
        value::TaggedValue,
    },
    world::World,
};

use super::Stack;

impl Stack {
    /// Evaluates one term against the current frames. Terms that open a
    /// nested branch push a frame and finish when that frame closes.
    pub fn evaluate(&mut self, world: &mut World, term: TermId) -> Result<()> {
        let fid = world.function_of(term)?;
        trace!(term = %term, function = %world.function(fid).name, "evaluate");
        self.evaluate_with(world, term, fid)
    }

    pub(crate) fn evaluate_with(
        &mut self,
        world: &mut World,
        term: TermId,
        fid: FunctionId,
    ) -> Result<()> {
        let kind = world.function(fid).kind.clone();
        match kind {
            FunctionKind::Value
            | FunctionKind::Input
            | FunctionKind::Case
            | FunctionKind::Branch => Ok(()),
            FunctionKind::Native(func) => self.call_native(world, term, fid, func),
            FunctionKind::Placeholder => Err(Error::runtime(format!(
                "function '{}' is not implemented",
                world.function(fid).name
            ))),
            FunctionKind::UnknownIdentifier => {
                let name = world
                    .term(term)
                    .property(IDENTIFIER)
                    .and_then(|v| v.as_str().ok().map(str::to_string))
                    .unwrap_or_else(|| world.unique_name(term));
                Err(Error::Key(name))
            }
            FunctionKind::Overloaded { overloads } => {
                let chosen = match overload::specialized_function(world, term) {
                    Some(chosen) => chosen,
                    None => {
                        let values = self.read_inputs(world, term);
                        overload::find_dynamic_overload(world, &overloads, &values)
                            .ok_or_else(|| overload_not_found(world, fid, &values))?
                    }
                };
                let chosen = world.function_declared_by(chosen)?;
                self.evaluate_with(world, term, chosen)
            }
            FunctionKind::Subroutine { body } => self.call_subroutine(world, term, fid, body),
            FunctionKind::IfBlock => self.enter_if_block(world, term),
            FunctionKind::ForLoop => self.enter_for_loop(world, term),
            FunctionKind::Return => self.do_return(world, term),
            FunctionKind::Assign => self.do_assign(world, term),
        }
    }

    fn call_native(
        &mut self,
        world: &mut World,
        term: TermId,
        fid: FunctionId,
        func: NativeFn,
    ) -> Result<()> {
        let inputs = self.read_inputs(world, term);
        check_arity(world, fid, inputs.len())?;
        let stateful = world.function(fid).is_stateful();
        let mut state = if stateful {
            self.take_state(world, term)
        } else {
            TaggedValue::null()
        };
        let result = {
            let mut call = Call::new(world, term, fid, &inputs, &mut state);
            func(&mut call)
        };
        if stateful {
            self.put_state(world, term, state);
        }
        let output = coerce_output(world, term, result?)?;
        self.write_value(world, term, output);
        Ok(())
    }

    fn do_assign(&mut self, world: &mut World, term: TermId) -> Result<()> {
        let target = world
            .term(term)
            .input(0)
            .ok_or_else(|| Error::runtime("assign has no target"))?;
        let value = match world.term(term).input(1) {
            Some(source) => self.read_value(world, source),
            None => TaggedValue::null(),
        };
        let value = coerce_output(world, target, value)?;
        let target_is_state = world
            .function_of(target)
            .is_ok_and(|f| world.function(f).is_stateful());
        if target_is_state {
            self.put_state(world, target, value.clone());
        }
        self.write_value(world, target, value.clone());
        self.write_value(world, term, value);
        Ok(())
    }
}

pub(super) fn check_arity(world: &World, fid: FunctionId, count: usize) -> Result<()> {
    let function = world.function(fid);
    if function.accepts_arity(count) {
        return Ok(());
    }
    Err(Error::runtime(format!(
        "wrong number of arguments to {}: expected {}{}, got {}",
        function.name,
        function.inputs.len(),
        if function.variable_args { "+" } else { "" },
        count
    )))
}

/// Casts a result to the term's declared type; `any` and `void` accept all.
pub(super) fn coerce_output(world: &World, term: TermId, value: TaggedValue) -> Result<TaggedValue> {
    let declared = world.term(term).type_id;
    if declared == builtin::ANY || declared == builtin::VOID || value.type_id() == declared {
        return Ok(value);
    }
    world.types.cast(&value, declared)
}

fn overload_not_found(world: &World, fid: FunctionId, values: &[TaggedValue]) -> Error {
    let types: Vec<&str> = values
        .iter()
        .map(|v| world.types.name(v.type_id()))
        .collect();
    Error::runtime(format!(
        "overload not found: {}({})",
        world.function(fid).name,
        types.join(", ")
    ))
}
