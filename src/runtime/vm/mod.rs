//! The frame-stack evaluator.
//!
//! A [`Stack`] walks branches one term at a time. Calls into subroutines,
//! if-blocks and for-loops push frames instead of recursing on the Rust stack,
//! so evaluation can be stepped, paused after an error, and inspected.
//!
//! Runtime, type and name errors raised by a program are recorded as a
//! [`RuntimeFailure`] and stop the stack where it stands. Only internal errors
//! come back as `Err`.

use tracing::debug;

use crate::{
    error::{Error, Result},
    graph::{BranchId, TermId},
    runtime::{
        frame::{Frame, FrameKind},
        leak_detector,
        value::TaggedValue,
    },
    world::World,
};

mod dispatch;
mod function_call;
mod trace;

pub use trace::{RuntimeFailure, TraceEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    /// No frames left.
    Idle,
    /// The top frame has terms left to evaluate.
    Running,
    /// The top frame is finished and will be closed by the next step.
    ClosingFrame,
    /// A runtime error stopped evaluation.
    Errored,
}

#[derive(Debug, Default)]
pub struct Stack {
    frames: Vec<Frame>,
    failure: Option<RuntimeFailure>,
    result: Option<TaggedValue>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StackStatus {
        if self.failure.is_some() {
            return StackStatus::Errored;
        }
        match self.frames.last() {
            None => StackStatus::Idle,
            Some(frame) if frame.cursor == usize::MAX => StackStatus::ClosingFrame,
            Some(_) => StackStatus::Running,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn failure(&self) -> Option<&RuntimeFailure> {
        self.failure.as_ref()
    }

    /// Value of a `return` executed at root level, if any.
    pub fn result(&self) -> Option<&TaggedValue> {
        self.result.as_ref()
    }

    /// Drops all frames and any recorded failure.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.failure = None;
        self.result = None;
    }

    /// Pushes a root frame for `branch`. Terms write straight into their
    /// `value` and stateful terms use their own `state` slot.
    pub fn push_branch(&mut self, world: &World, branch: BranchId) -> Result<()> {
        if world.try_branch(branch).is_none() {
            return Err(Error::internal(format!("cannot evaluate deleted {}", branch)));
        }
        self.push_frame(world, Frame::root(branch))
    }

    fn push_frame(&mut self, world: &World, frame: Frame) -> Result<()> {
        if self.frames.len() >= world.config.max_frames {
            return Err(Error::runtime(format!(
                "stack overflow: more than {} frames",
                world.config.max_frames
            )));
        }
        debug!(branch = %frame.branch, kind = frame.kind.label(), depth = self.frames.len() + 1, "push frame");
        leak_detector::record_frame_pushed();
        self.frames.push(frame);
        Ok(())
    }

    /// Evaluates `branch` from its first term to its last.
    pub fn evaluate_branch(&mut self, world: &mut World, branch: BranchId) -> Result<()> {
        self.reset();
        self.push_branch(world, branch)?;
        self.run(world)
    }

    /// Steps until the stack is idle or a runtime error is recorded.
    pub fn run(&mut self, world: &mut World) -> Result<()> {
        while matches!(self.status(), StackStatus::Running | StackStatus::ClosingFrame) {
            self.run_next_instruction(world)?;
        }
        Ok(())
    }

    /// One step: close the top frame if it is finished, otherwise evaluate its
    /// next term.
    pub fn run_next_instruction(&mut self, world: &mut World) -> Result<()> {
        if self.failure.is_some() {
            return Ok(());
        }
        let Some(top) = self.frames.last_mut() else {
            return Ok(());
        };
        let terms = &world.branch(top.branch).terms;
        if top.cursor >= terms.len() {
            top.cursor = usize::MAX;
            return self.guard(world, None, |stack, world| stack.close_top_frame(world));
        }
        let term = terms[top.cursor];
        top.cursor += 1;
        self.guard(world, Some(term), |stack, world| stack.evaluate(world, term))
    }

    /// Records non-internal errors as the stack's failure.
    fn guard(
        &mut self,
        world: &mut World,
        term: Option<TermId>,
        step: impl FnOnce(&mut Self, &mut World) -> Result<()>,
    ) -> Result<()> {
        match step(self, world) {
            Ok(()) => Ok(()),
            Err(err) if err.is_internal() => Err(err),
            Err(err) => {
                let term = term.or_else(|| self.frames.last().and_then(|f| f.kind.caller()));
                self.failure = Some(RuntimeFailure::new(world, &self.frames, term, err));
                Ok(())
            }
        }
    }

    fn frame_for(&self, world: &World, term: TermId) -> Option<usize> {
        let owner = world.term(term).owner;
        self.frames.iter().rposition(|frame| frame.branch == owner)
    }

    /// Current value of `term` as seen from the innermost frame evaluating
    /// its branch.
    pub fn read_value(&self, world: &World, term: TermId) -> TaggedValue {
        let index = world.term(term).index;
        if let Some(frame) = self.frame_for(world, term).map(|i| &self.frames[i]) {
            if let Some(Some(value)) = frame.registers.as_ref().and_then(|r| r.get(index)) {
                return value.clone();
            }
        }
        world.term(term).value.clone()
    }

    pub(crate) fn write_value(&mut self, world: &mut World, term: TermId, value: TaggedValue) {
        let index = world.term(term).index;
        if let Some(i) = self.frame_for(world, term) {
            if let Some(registers) = self.frames[i].registers.as_mut() {
                if registers.len() <= index {
                    registers.resize(index + 1, None);
                }
                registers[index] = Some(value);
                return;
            }
        }
        world.term_mut(term).value = value;
    }

    pub(crate) fn read_inputs(&self, world: &World, term: TermId) -> Vec<TaggedValue> {
        world
            .term(term)
            .inputs
            .iter()
            .map(|input| match input {
                Some(input) => self.read_value(world, *input),
                None => TaggedValue::null(),
            })
            .collect()
    }

    /// Moves a term's hidden state out of its slot, leaving null behind.
    pub(crate) fn take_state(&mut self, world: &mut World, term: TermId) -> TaggedValue {
        let index = world.term(term).index;
        if let Some(i) = self.frame_for(world, term) {
            if let Some(state) = self.frames[i].state.as_mut() {
                return state.get_mut(index).map(TaggedValue::take).unwrap_or_default();
            }
        }
        world.term_mut(term).state.take()
    }

    pub(crate) fn put_state(&mut self, world: &mut World, term: TermId, value: TaggedValue) {
        let index = world.term(term).index;
        if let Some(i) = self.frame_for(world, term) {
            if let Some(state) = self.frames[i].state.as_mut() {
                if state.len() <= index {
                    state.resize(index + 1, TaggedValue::null());
                }
                state[index] = value;
                return;
            }
        }
        world.term_mut(term).state = value;
    }
}

/// Evaluates a single term in place, outside any frame. Used for constant
/// folding at construction time.
pub(crate) fn fold_term(world: &mut World, term: TermId) -> Result<()> {
    let mut stack = Stack::new();
    stack.evaluate(world, term)?;
    stack.run(world)?;
    match stack.failure {
        Some(failure) => Err(failure.error),
        None => Ok(()),
    }
}

/// Evaluates `branch` on a fresh stack and hands the stack back for
/// inspection.
pub fn run_branch(world: &mut World, branch: BranchId) -> Result<Stack> {
    let mut stack = Stack::new();
    stack.evaluate_branch(world, branch)?;
    Ok(stack)
}
