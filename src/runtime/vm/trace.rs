use std::fmt;

use crate::{
    diagnostics::{
        Diagnostic, ErrorCode,
        runtime_errors::{classify, describe},
        term_location,
    },
    error::Error,
    graph::TermId,
    runtime::frame::{Frame, FrameKind},
    world::World,
};

/// One line of a stack trace, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub name: String,
    pub location: Option<String>,
}

/// A program error together with where the stack stood when it happened.
#[derive(Debug, Clone)]
pub struct RuntimeFailure {
    pub error: Error,
    pub message: String,
    pub code: &'static ErrorCode,
    pub term: Option<TermId>,
    pub location: Option<String>,
    pub trace: Vec<TraceEntry>,
}

impl RuntimeFailure {
    pub fn new(world: &World, frames: &[Frame], term: Option<TermId>, error: Error) -> Self {
        let trace = frames
            .iter()
            .rev()
            .map(|frame| TraceEntry {
                name: frame_name(world, frame),
                location: frame_location(world, frame),
            })
            .collect();
        Self {
            message: describe(&error),
            code: classify(&error),
            location: term
                .filter(|t| world.contains_term(*t))
                .map(|t| term_location(world, t)),
            error,
            term,
            trace,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::make_error_dynamic(self.code, self.message.clone());
        if let Some(term) = self.term {
            diag = diag.with_term(term);
        }
        if let Some(location) = &self.location {
            diag = diag.with_location(location.clone());
        }
        if let Some(hint) = self.code.hint {
            diag = diag.with_hint(hint);
        }
        diag
    }

    /// Diagnostic text followed by the stack trace.
    pub fn render(&self, use_color: bool) -> String {
        let mut rendered = self.to_diagnostic().render_with(use_color);
        if !self.trace.is_empty() {
            rendered.push_str("\nStack trace:");
            for entry in &self.trace {
                rendered.push_str("\n  at ");
                rendered.push_str(&entry.name);
                if let Some(location) = &entry.location {
                    rendered.push_str(" (");
                    rendered.push_str(location);
                    rendered.push(')');
                }
            }
            rendered.push('\n');
        }
        rendered
    }
}

impl fmt::Display for RuntimeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code, self.message)
    }
}

fn frame_name(world: &World, frame: &Frame) -> String {
    match &frame.kind {
        FrameKind::Root => "<root>".to_string(),
        FrameKind::Subroutine { function, .. } => world.function(*function).name.clone(),
        FrameKind::Case { case_index, .. } => format!("if case {}", case_index),
        FrameKind::Iteration { index, .. } => format!("for iteration {}", index),
    }
}

fn frame_location(world: &World, frame: &Frame) -> Option<String> {
    let branch = world.try_branch(frame.branch)?;
    let index = frame.current_index()?;
    let term = branch.get(index)?;
    Some(term_location(world, term))
}
