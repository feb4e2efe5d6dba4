//! Lowers a parsed [`Script`] into a branch.
//!
//! Names resolve lexically at load time with [`World::find_named`]. A name
//! that resolves to nothing becomes an `unknown_identifier` term carrying the
//! name, so the static check can report it and evaluation fails on it.

use tracing::debug;

use crate::{
    error::{Error, Result},
    feedback,
    graph::{BranchId, IDENTIFIER, TermId},
    runtime::{types::TypeId, value::TaggedValue},
    world::World,
};

use super::{Case, Expression, Script, Statement};

/// Appends the statements of `script` to `branch`. `source` labels the
/// branch, usually with the script's path.
pub fn load_script(
    world: &mut World,
    branch: BranchId,
    script: &Script,
    source: Option<&str>,
) -> Result<()> {
    if let Some(source) = source {
        world.branch_mut(branch).source = Some(source.to_string());
    }
    lower_block(world, branch, &script.statements)?;
    debug!(branch = %branch, terms = world.branch(branch).len(), "loaded script");
    Ok(())
}

/// Appends one expression to `branch` and returns the term holding its value.
pub fn load_expression(world: &mut World, branch: BranchId, expr: &Expression) -> Result<TermId> {
    lower_expression(world, branch, expr)
}

fn lower_block(world: &mut World, branch: BranchId, statements: &[Statement]) -> Result<()> {
    for statement in statements {
        lower_statement(world, branch, statement)?;
    }
    Ok(())
}

fn lower_statement(world: &mut World, branch: BranchId, statement: &Statement) -> Result<()> {
    match statement {
        Statement::Expression { expr } => {
            lower_expression(world, branch, expr)?;
        }
        Statement::Let { name, value } => {
            let term = match value {
                // A plain reference gets its own term so the new name does
                // not rename the original.
                Expression::Ref { .. } => {
                    let source = lower_expression(world, branch, value)?;
                    let copy = world.kernel().copy;
                    world.create_term(branch, copy, &[Some(source)])?
                }
                _ => lower_expression(world, branch, value)?,
            };
            world.bind_name(branch, term, name.as_str());
        }
        Statement::State {
            state,
            type_name,
            initial,
        } => {
            let initial = initial
                .as_ref()
                .map(|expr| lower_expression(world, branch, expr))
                .transpose()?;
            let ty = resolve_type(world, branch, type_name)?;
            world.create_state(branch, state, ty, initial)?;
        }
        Statement::Def {
            def,
            inputs,
            output,
            body,
        } => {
            let params = inputs
                .iter()
                .map(|(name, ty)| Ok((name.as_str(), resolve_type(world, branch, ty)?)))
                .collect::<Result<Vec<_>>>()?;
            let output = resolve_type(world, branch, output)?;
            let decl = world.create_subroutine(branch, def, &params, output)?;
            let body_branch = world.subroutine_body(decl)?;
            lower_block(world, body_branch, body)?;
        }
        Statement::Return { value } => {
            let value = lower_expression(world, branch, value)?;
            let return_ = world.kernel().return_;
            world.create_term(branch, return_, &[Some(value)])?;
        }
        Statement::If { cases, otherwise } => lower_if(world, branch, cases, otherwise.as_deref())?,
        Statement::For {
            iterator,
            list,
            body,
        } => {
            let list = lower_expression(world, branch, list)?;
            let (_, body_branch) = world.create_for_loop(branch, list, iterator)?;
            lower_block(world, body_branch, body)?;
        }
        Statement::Assign { assign, value } => {
            let target = resolve(world, branch, assign)?;
            let value = lower_expression(world, branch, value)?;
            let assign = world.kernel().assign;
            world.create_term(branch, assign, &[Some(target), Some(value)])?;
        }
        Statement::Feedback { feedback, desired } => {
            let target = resolve(world, branch, feedback)?;
            let desired = lower_expression(world, branch, desired)?;
            let function = world.kernel().feedback;
            world.create_term(branch, function, &[Some(target), Some(desired)])?;
        }
        Statement::Trainable { trainable } => {
            let term = resolve(world, branch, trainable)?;
            feedback::set_trainable(world, term, true);
        }
    }
    Ok(())
}

/// Conditions are built ahead of the if-block so they are evaluated before it.
fn lower_if(
    world: &mut World,
    branch: BranchId,
    cases: &[Case],
    otherwise: Option<&[Statement]>,
) -> Result<()> {
    let conditions = cases
        .iter()
        .map(|case| lower_expression(world, branch, &case.condition))
        .collect::<Result<Vec<_>>>()?;
    let if_block = world.create_if_block(branch)?;
    for (case, condition) in cases.iter().zip(conditions) {
        let body = world.add_case(if_block, Some(condition))?;
        lower_block(world, body, &case.body)?;
    }
    if let Some(statements) = otherwise {
        let body = world.add_case(if_block, None)?;
        lower_block(world, body, statements)?;
    }
    Ok(())
}

fn lower_expression(world: &mut World, branch: BranchId, expr: &Expression) -> Result<TermId> {
    match expr {
        Expression::Literal(json) => {
            if json.is_object() {
                return Err(Error::Script(format!("unexpected object literal: {}", json)));
            }
            world.create_constant(branch, TaggedValue::from_json(json))
        }
        Expression::Ref { name } => resolve(world, branch, name),
        Expression::List { list } => {
            let items = list
                .iter()
                .map(|item| lower_expression(world, branch, item))
                .collect::<Result<Vec<_>>>()?;
            let function = world.kernel().list;
            world.apply(branch, function, &items)
        }
        Expression::Call { call, args } => {
            let args = args
                .iter()
                .map(|arg| lower_expression(world, branch, arg))
                .collect::<Result<Vec<_>>>()?;
            let Some(function) = world.find_named(branch, call) else {
                return unknown_identifier(world, branch, call);
            };
            if !world.is_function_term(function) {
                return Err(Error::Script(format!("`{}` is not a function", call)));
            }
            world.apply(branch, function, &args)
        }
    }
}

fn resolve(world: &mut World, branch: BranchId, name: &str) -> Result<TermId> {
    match world.find_named(branch, name) {
        Some(term) => Ok(term),
        None => unknown_identifier(world, branch, name),
    }
}

fn unknown_identifier(world: &mut World, branch: BranchId, name: &str) -> Result<TermId> {
    let function = world.kernel().unknown_identifier;
    let term = world.create_term(branch, function, &[])?;
    world
        .term_mut(term)
        .set_property(IDENTIFIER, TaggedValue::string(name));
    Ok(term)
}

fn resolve_type(world: &World, branch: BranchId, name: &str) -> Result<TypeId> {
    if let Some(term) = world.find_named(branch, name) {
        if let Ok(ty) = world.term(term).value.as_type() {
            return Ok(ty);
        }
    }
    world
        .types
        .find(name)
        .ok_or_else(|| Error::Script(format!("unknown type `{}`", name)))
}
