//! Diagnostics.
//!
//! Structured error reports with stable codes, used both for static checks on
//! a freshly built branch and for failures recorded by the evaluator.

pub mod diagnostic;
pub mod error_code;
pub mod format;
pub mod runtime_errors;
pub mod static_errors;

pub use diagnostic::{Diagnostic, Severity, render_diagnostics};
pub use error_code::{ErrorCode, ErrorType};
pub use format::format_message;
pub use static_errors::check_static_errors;

use crate::{graph::TermId, world::World};

/// `outer/inner/term` path of unique names from the top-level branch down to
/// `term`.
pub fn term_location(world: &World, term: TermId) -> String {
    let mut parts = vec![world.unique_name(term)];
    let mut branch = world.term(term).owner;
    while let Some(owner) = world.try_branch(branch).and_then(|b| b.owning_term) {
        let Some(t) = world.try_term(owner) else {
            break;
        };
        parts.push(world.unique_name(owner));
        branch = t.owner;
    }
    parts.reverse();
    parts.join("/")
}

#[cfg(test)]
mod diagnostic_test;
