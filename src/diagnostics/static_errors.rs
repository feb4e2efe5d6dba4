//! Problems detectable from the graph alone, before anything runs.

use crate::{
    graph::{BranchId, BranchIterator, IDENTIFIER, TermId},
    runtime::{
        function::FunctionKind,
        overload::{self, Specialization},
        types::StaticTypeQuery,
    },
    world::World,
};

use super::{Diagnostic, ErrorCode, ErrorType, term_location};

pub const UNKNOWN_IDENTIFIER: ErrorCode = ErrorCode {
    code: "E2001",
    title: "UNKNOWN IDENTIFIER",
    error_type: ErrorType::Static,
    message: "Name `{}` is not defined.",
    hint: Some("Define `{}` before it is used, or check the spelling."),
};

pub const WRONG_NUMBER_OF_INPUTS: ErrorCode = ErrorCode {
    code: "E2003",
    title: "WRONG NUMBER OF INPUTS",
    error_type: ErrorType::Static,
    message: "`{}` expects {} inputs, got {}.",
    hint: Some("{}"),
};

pub const INPUT_TYPE_MISMATCH: ErrorCode = ErrorCode {
    code: "E2004",
    title: "INPUT TYPE MISMATCH",
    error_type: ErrorType::Static,
    message: "Input {} of `{}` expects {}, got {}.",
    hint: Some("{}"),
};

pub const NO_MATCHING_OVERLOAD: ErrorCode = ErrorCode {
    code: "E2005",
    title: "NO MATCHING OVERLOAD",
    error_type: ErrorType::Static,
    message: "No overload of `{}` accepts ({}).",
    hint: None,
};

pub const NOT_A_FUNCTION: ErrorCode = ErrorCode {
    code: "E2006",
    title: "NOT A FUNCTION",
    error_type: ErrorType::Static,
    message: "Term `{}` calls something that is not a function.",
    hint: None,
};

pub const MISSING_INPUT: ErrorCode = ErrorCode {
    code: "E2007",
    title: "MISSING INPUT",
    error_type: ErrorType::Static,
    message: "Input {} of `{}` is not connected.",
    hint: Some("The term it referred to may have been deleted."),
};

/// Walks `branch` and everything nested in it, reporting every static
/// problem found. Specialization branches of overloaded calls are skipped.
pub fn check_static_errors(world: &World, branch: BranchId) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut iter = BranchIterator::new(world, branch);
    while let Some(term) = iter.next() {
        let overloaded = check_term(world, term, &mut diagnostics);
        if overloaded {
            iter.skip_next_branch();
        }
    }
    diagnostics
}

/// Returns true when the term is an overloaded call.
fn check_term(world: &World, term: TermId, out: &mut Vec<Diagnostic>) -> bool {
    let t = world.term(term);
    let Some(decl) = t.function else {
        return false;
    };
    let fid = match world.function_declared_by(decl) {
        Ok(fid) => fid,
        Err(_) => {
            out.push(located(
                world,
                term,
                Diagnostic::make_error(&NOT_A_FUNCTION, &[&world.unique_name(term)]),
            ));
            return false;
        }
    };
    let function = world.function(fid);

    match &function.kind {
        FunctionKind::UnknownIdentifier => {
            let name = t
                .property(IDENTIFIER)
                .and_then(|v| v.as_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| world.unique_name(term));
            out.push(located(
                world,
                term,
                Diagnostic::make_error(&UNKNOWN_IDENTIFIER, &[&name, &name]),
            ));
            false
        }
        FunctionKind::Overloaded { overloads } => {
            check_arity(world, term, out);
            if overload::statically_specialize(world, overloads, &t.inputs) == Specialization::NoMatch {
                let types: Vec<&str> = t
                    .inputs
                    .iter()
                    .map(|i| match i {
                        Some(i) => world.types.name(world.term(*i).type_id),
                        None => "null",
                    })
                    .collect();
                out.push(located(
                    world,
                    term,
                    Diagnostic::make_error(&NO_MATCHING_OVERLOAD, &[&function.name, &types.join(", ")]),
                ));
            }
            true
        }
        FunctionKind::Native(_) | FunctionKind::Placeholder | FunctionKind::Subroutine { .. } => {
            if check_arity(world, term, out) {
                check_inputs(world, term, out);
            }
            false
        }
        _ => false,
    }
}

fn check_arity(world: &World, term: TermId, out: &mut Vec<Diagnostic>) -> bool {
    let t = world.term(term);
    let Ok(fid) = world.function_of(term) else {
        return false;
    };
    let function = world.function(fid);
    if function.accepts_arity(t.inputs.len()) {
        return true;
    }
    let expected = if function.variable_args {
        format!("at least {}", function.inputs.len().saturating_sub(1))
    } else {
        function.inputs.len().to_string()
    };
    out.push(located(
        world,
        term,
        Diagnostic::make_error(
            &WRONG_NUMBER_OF_INPUTS,
            &[
                &function.name,
                &expected,
                &t.inputs.len().to_string(),
                &function.signature(world),
            ],
        ),
    ));
    false
}

fn check_inputs(world: &World, term: TermId, out: &mut Vec<Diagnostic>) {
    let t = world.term(term);
    let Ok(fid) = world.function_of(term) else {
        return;
    };
    let function = world.function(fid);
    for (index, input) in t.inputs.iter().enumerate() {
        let position = index.to_string();
        let Some(input) = input else {
            out.push(located(
                world,
                term,
                Diagnostic::make_error(&MISSING_INPUT, &[&position, &function.name]),
            ));
            continue;
        };
        let Some(declared) = function.input_type(index) else {
            continue;
        };
        let actual = world.term(*input).type_id;
        if world.types.statically_fits(actual, declared) == StaticTypeQuery::Fail {
            out.push(located(
                world,
                term,
                Diagnostic::make_error(
                    &INPUT_TYPE_MISMATCH,
                    &[
                        &position,
                        &function.name,
                        world.types.name(declared),
                        world.types.name(actual),
                        &function.signature(world),
                    ],
                ),
            ));
        }
    }
}

fn located(world: &World, term: TermId, diag: Diagnostic) -> Diagnostic {
    diag.with_term(term).with_location(term_location(world, term))
}
