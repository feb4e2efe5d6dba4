//! Binding native implementations to declared functions.
//!
//! A branch can declare functions by signature alone (`FunctionKind::Placeholder`).
//! A patch table then supplies the implementations by name. The kernel is
//! built this way, and hosts can patch their own branches the same way.

use tracing::{debug, warn};

use crate::{
    error::Result,
    graph::BranchId,
    runtime::{builtin_function::BuiltinFunction, function::FunctionKind},
    world::World,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub patched: Vec<&'static str>,
    pub unmatched: Vec<&'static str>,
}

/// Replaces the evaluation of each function in `branch` whose name matches a
/// patch entry. Already patched functions are replaced again.
pub fn apply_native_patch(
    world: &mut World,
    branch: BranchId,
    patch: &[BuiltinFunction],
) -> Result<PatchReport> {
    let mut report = PatchReport::default();
    for entry in patch {
        let target = world
            .branch(branch)
            .get_local(entry.name)
            .and_then(|decl| world.function_declared_by(decl).ok());
        let Some(fid) = target else {
            report.unmatched.push(entry.name);
            continue;
        };
        let function = world.function_mut(fid);
        match function.kind {
            FunctionKind::Placeholder | FunctionKind::Native(_) => {
                function.kind = FunctionKind::Native(entry.func);
                report.patched.push(entry.name);
            }
            _ => report.unmatched.push(entry.name),
        }
    }
    if !report.unmatched.is_empty() {
        warn!(unmatched = ?report.unmatched, "native patch entries without a placeholder");
    }
    debug!(patched = report.patched.len(), "applied native patch");
    Ok(report)
}
