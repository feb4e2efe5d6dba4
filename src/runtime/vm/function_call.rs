use tracing::debug;

use crate::{
    error::{Error, Result},
    graph::{BranchId, TermId},
    runtime::{
        frame::{Frame, FrameKind, pack_state, unpack_state},
        function::FunctionId,
        value::TaggedValue,
    },
    world::World,
};

use super::{
    Stack,
    dispatch::{check_arity, coerce_output},
};

impl Stack {
    /// Pushes a frame for a subroutine body with the arguments cast into its
    /// input registers. The caller's hidden state travels with the frame.
    pub(super) fn call_subroutine(
        &mut self,
        world: &mut World,
        term: TermId,
        fid: FunctionId,
        body: BranchId,
    ) -> Result<()> {
        let inputs = self.read_inputs(world, term);
        check_arity(world, fid, inputs.len())?;
        if self.frames.len() >= world.config.max_frames {
            return Err(Error::runtime(format!(
                "stack overflow: more than {} frames calling {}",
                world.config.max_frames,
                world.function(fid).name
            )));
        }

        let len = world.branch(body).len();
        let mut registers = vec![None; len];
        for (index, value) in inputs.iter().enumerate() {
            let Some(declared) = world.function(fid).input_type(index) else {
                continue;
            };
            if index < len {
                registers[index] = Some(world.types.cast(value, declared)?);
            }
        }

        let state = unpack_state(self.take_state(world, term), len);
        let frame = Frame::nested(
            body,
            FrameKind::Subroutine {
                caller: term,
                function: fid,
            },
            Some(registers),
            state,
        );
        self.push_frame(world, frame)
    }

    pub(super) fn enter_if_block(&mut self, world: &mut World, term: TermId) -> Result<()> {
        let cases = world
            .nested(term)
            .ok_or_else(|| Error::internal(format!("if-block {} has no cases", term)))?;
        let case_terms = world.branch(cases).terms.clone();
        let mut cases_state = unpack_state(self.take_state(world, term), case_terms.len());

        let mut chosen = None;
        for (index, case) in case_terms.iter().copied().enumerate() {
            let taken = match world.term(case).input(0) {
                None => true,
                Some(condition) => self.read_value(world, condition).as_bool()?,
            };
            if taken {
                chosen = Some((index, case));
                break;
            }
        }

        let Some((case_index, case)) = chosen else {
            self.put_state(world, term, pack_state(cases_state));
            self.write_value(world, term, TaggedValue::null());
            return Ok(());
        };
        let body = world
            .nested(case)
            .ok_or_else(|| Error::internal(format!("case {} has no body", case)))?;
        let len = world.branch(body).len();
        let state = unpack_state(cases_state[case_index].take(), len);
        let registers = self.registers_like_parent(world, term, len);
        let frame = Frame::nested(
            body,
            FrameKind::Case {
                caller: term,
                case_index,
                cases_state,
            },
            registers,
            state,
        );
        self.push_frame(world, frame)
    }

    pub(super) fn enter_for_loop(&mut self, world: &mut World, term: TermId) -> Result<()> {
        let source = world
            .term(term)
            .input(0)
            .ok_or_else(|| Error::runtime("for loop has no list to iterate"))?;
        let items = self.read_value(world, source);
        let count = items.as_list()?.len();
        if count == 0 {
            self.write_value(world, term, TaggedValue::list(Vec::new()));
            return Ok(());
        }
        let states = unpack_state(self.take_state(world, term), count);
        self.push_iteration(world, term, 0, items, Vec::with_capacity(count), states)
    }

    fn push_iteration(
        &mut self,
        world: &mut World,
        term: TermId,
        index: usize,
        items: TaggedValue,
        collected: Vec<TaggedValue>,
        mut states: Vec<TaggedValue>,
    ) -> Result<()> {
        let body = world
            .nested(term)
            .ok_or_else(|| Error::internal(format!("for loop {} has no body", term)))?;
        let len = world.branch(body).len();
        let iterator = world.branch(body).get(0);
        let item = items.as_list()?.get(index).cloned().unwrap_or_default();
        let state = unpack_state(states[index].take(), len);
        let registers = self.registers_like_parent(world, term, len);
        let frame = Frame::nested(
            body,
            FrameKind::Iteration {
                caller: term,
                index,
                items,
                collected,
                states,
            },
            registers,
            state,
        );
        self.push_frame(world, frame)?;
        if let Some(iterator) = iterator {
            self.write_value(world, iterator, item);
        }
        Ok(())
    }

    /// Stores the return value on the nearest subroutine frame and stops every
    /// frame above it. At root level the value becomes the stack's result.
    pub(super) fn do_return(&mut self, world: &mut World, term: TermId) -> Result<()> {
        let value = match world.term(term).input(0) {
            Some(input) => self.read_value(world, input),
            None => TaggedValue::null(),
        };
        self.write_value(world, term, value.clone());
        let target = self
            .frames
            .iter()
            .rposition(|frame| matches!(frame.kind, FrameKind::Subroutine { .. }));
        match target {
            Some(k) => {
                self.frames[k].output = Some(value);
                for frame in &mut self.frames[k..] {
                    frame.finish();
                }
            }
            None => {
                self.result = Some(value);
                for frame in &mut self.frames {
                    frame.finish();
                }
            }
        }
        Ok(())
    }

    /// Pops the finished top frame and delivers its result to the term that
    /// opened it.
    pub(super) fn close_top_frame(&mut self, world: &mut World) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Error::internal("close_top_frame on an empty stack"))?;
        debug!(branch = %frame.branch, kind = frame.kind.label(), depth = self.frames.len(), "close frame");
        let last = frame_result(world, &frame);
        let state = pack_state(frame.state.unwrap_or_default());

        match frame.kind {
            FrameKind::Root => Ok(()),
            FrameKind::Subroutine { caller, .. } => {
                let output = frame.output.unwrap_or(last);
                self.put_state(world, caller, state);
                let output = coerce_output(world, caller, output)?;
                self.write_value(world, caller, output);
                Ok(())
            }
            FrameKind::Case {
                caller,
                case_index,
                mut cases_state,
            } => {
                if let Some(slot) = cases_state.get_mut(case_index) {
                    *slot = state;
                }
                self.put_state(world, caller, pack_state(cases_state));
                self.write_value(world, caller, last);
                Ok(())
            }
            FrameKind::Iteration {
                caller,
                index,
                items,
                mut collected,
                mut states,
            } => {
                collected.push(last);
                states[index] = state;
                let count = items.as_list()?.len();
                if !frame.unwinding && index + 1 < count {
                    return self.push_iteration(world, caller, index + 1, items, collected, states);
                }
                self.put_state(world, caller, pack_state(states));
                self.write_value(world, caller, TaggedValue::list(collected));
                Ok(())
            }
        }
    }

    /// Nested frames keep registers only when the frame evaluating `term`
    /// has them.
    fn registers_like_parent(
        &self,
        world: &World,
        term: TermId,
        len: usize,
    ) -> Option<Vec<Option<TaggedValue>>> {
        let parent = self.frame_for(world, term)?;
        self.frames[parent].registers.as_ref()?;
        Some(vec![None; len])
    }
}

/// Value of the last term evaluated in `frame`, read from its registers.
fn frame_result(world: &World, frame: &Frame) -> TaggedValue {
    let Some(last) = world.try_branch(frame.branch).and_then(|b| b.last()) else {
        return TaggedValue::null();
    };
    let index = world.term(last).index;
    if let Some(Some(value)) = frame.registers.as_ref().and_then(|r| r.get(index)) {
        return value.clone();
    }
    world.term(last).value.clone()
}
