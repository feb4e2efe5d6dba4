use crate::{
    graph::{BranchId, TermId},
    runtime::{function::FunctionId, value::TaggedValue},
};

/// Why a frame was pushed, and what closing it has to do.
#[derive(Debug, Clone)]
pub enum FrameKind {
    /// A whole branch evaluated from the outside.
    Root,
    /// A subroutine call: the result goes to `caller`.
    Subroutine { caller: TermId, function: FunctionId },
    /// The chosen case of an if-block. `cases_state` holds the state lists of
    /// every case while this one runs.
    Case {
        caller: TermId,
        case_index: usize,
        cases_state: Vec<TaggedValue>,
    },
    /// One iteration of a for-loop.
    Iteration {
        caller: TermId,
        index: usize,
        items: TaggedValue,
        collected: Vec<TaggedValue>,
        states: Vec<TaggedValue>,
    },
}

impl FrameKind {
    pub fn caller(&self) -> Option<TermId> {
        match self {
            FrameKind::Root => None,
            FrameKind::Subroutine { caller, .. }
            | FrameKind::Case { caller, .. }
            | FrameKind::Iteration { caller, .. } => Some(*caller),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FrameKind::Root => "root",
            FrameKind::Subroutine { .. } => "call",
            FrameKind::Case { .. } => "case",
            FrameKind::Iteration { .. } => "iteration",
        }
    }
}

/// One level of evaluation.
///
/// `registers` holds per-activation outputs, indexed like the branch's terms,
/// so the same branch can be active in several frames at once. Frames without
/// registers write straight into `Term::value`. `state` is the activation's
/// hidden-state list, indexed the same way; without it stateful terms use
/// their own `Term::state` slot.
#[derive(Debug, Clone)]
pub struct Frame {
    pub branch: BranchId,
    pub cursor: usize,
    pub kind: FrameKind,
    pub registers: Option<Vec<Option<TaggedValue>>>,
    pub state: Option<Vec<TaggedValue>>,
    pub output: Option<TaggedValue>,
    pub unwinding: bool,
}

impl Frame {
    pub fn root(branch: BranchId) -> Self {
        Self {
            branch,
            cursor: 0,
            kind: FrameKind::Root,
            registers: None,
            state: None,
            output: None,
            unwinding: false,
        }
    }

    pub fn nested(
        branch: BranchId,
        kind: FrameKind,
        registers: Option<Vec<Option<TaggedValue>>>,
        state: Vec<TaggedValue>,
    ) -> Self {
        Self {
            branch,
            cursor: 0,
            kind,
            registers,
            state: Some(state),
            output: None,
            unwinding: false,
        }
    }

    /// The term most recently started in this frame.
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Stops the frame: the next step closes it.
    pub fn finish(&mut self) {
        self.cursor = usize::MAX;
        self.unwinding = true;
    }
}

/// A state list with nothing in it is stored as null.
pub fn pack_state(states: Vec<TaggedValue>) -> TaggedValue {
    if states.iter().all(TaggedValue::is_null) {
        TaggedValue::null()
    } else {
        TaggedValue::list(states)
    }
}

/// The state list for a branch of `len` terms, padded with nulls.
pub fn unpack_state(value: TaggedValue, len: usize) -> Vec<TaggedValue> {
    let mut states = match value.as_list() {
        Ok(items) => items.to_vec(),
        Err(_) => Vec::new(),
    };
    if states.len() < len {
        states.resize(len, TaggedValue::null());
    }
    states
}
