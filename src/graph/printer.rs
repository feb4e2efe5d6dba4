use crate::{
    graph::{BranchId, IDENTIFIER, TermId},
    runtime::{function::FunctionKind, overload, types::builtin, value::Payload},
    world::World,
};

/// Renders a branch one term per line, nested branches indented:
///
/// ```text
/// a = 2 : int
/// _add = add(a, 3) via add_i : int = 5
/// ```
pub fn print_branch(world: &World, branch: BranchId) -> String {
    let mut out = String::new();
    print_into(world, branch, 0, &mut out);
    out
}

fn print_into(world: &World, branch: BranchId, depth: usize, out: &mut String) {
    for term in world.branch(branch).terms.iter().copied() {
        out.push_str(&"  ".repeat(depth));
        print_term(world, term, out);
        out.push('\n');
        let t = world.term(term);
        let skip_nested = matches!(
            world.function_of(term).map(|f| &world.function(f).kind),
            Ok(FunctionKind::Overloaded { .. })
        );
        if let Some(nested) = t.nested {
            if !skip_nested {
                print_into(world, nested, depth + 1, out);
            }
        }
    }
}

/// One term without its nested branch.
pub fn print_term(world: &World, term: TermId, out: &mut String) {
    let t = world.term(term);
    out.push_str(&world.unique_name(term));
    out.push_str(" = ");

    if let Payload::Function(fid) = t.value.payload() {
        out.push_str("def ");
        match world.try_function(*fid) {
            Some(function) => out.push_str(&function.signature(world)),
            None => out.push_str("<deleted>"),
        }
        return;
    }

    let Ok(fid) = world.function_of(term) else {
        out.push_str("<no function>");
        return;
    };
    let function = world.function(fid);
    match (&function.kind, function.format_source) {
        (_, Some(format)) => format(world, term, out),
        (FunctionKind::Value, None) => {
            out.push_str(&literal(world, term));
            out.push_str(" : ");
            out.push_str(world.types.name(t.type_id));
            return;
        }
        _ => {
            out.push_str(&function.name);
            out.push('(');
            let args: Vec<String> = t.inputs.iter().map(|i| argument(world, *i)).collect();
            out.push_str(&args.join(", "));
            out.push(')');
        }
    }
    if let Some(chosen) = overload::specialized_function(world, term) {
        out.push_str(" via ");
        out.push_str(world.function_name_declared_by(chosen));
    }
    out.push_str(" : ");
    out.push_str(world.types.name(t.type_id));
    if !t.value.is_null() && t.type_id != builtin::VOID {
        out.push_str(" = ");
        out.push_str(&literal(world, term));
    }
}

/// `return x`
pub(crate) fn format_return(world: &World, term: TermId, out: &mut String) {
    out.push_str("return");
    for input in &world.term(term).inputs {
        out.push(' ');
        out.push_str(&argument(world, *input));
    }
}

/// `target := value`
pub(crate) fn format_assign(world: &World, term: TermId, out: &mut String) {
    let t = world.term(term);
    out.push_str(&argument(world, t.input(0)));
    out.push_str(" := ");
    out.push_str(&argument(world, t.input(1)));
}

/// `?name`
pub(crate) fn format_unknown_identifier(world: &World, term: TermId, out: &mut String) {
    out.push('?');
    match world.term(term).property(IDENTIFIER).and_then(|v| v.as_str().ok()) {
        Some(name) => out.push_str(name),
        None => out.push_str("<unnamed>"),
    }
}

fn argument(world: &World, input: Option<TermId>) -> String {
    let Some(input) = input else {
        return "null".to_string();
    };
    let t = world.term(input);
    let is_constant = matches!(
        world.function_of(input).map(|f| &world.function(f).kind),
        Ok(FunctionKind::Value)
    );
    if t.name.is_none() && is_constant {
        literal(world, input)
    } else {
        world.unique_name(input)
    }
}

fn literal(world: &World, term: TermId) -> String {
    let value = &world.term(term).value;
    match value.payload() {
        Payload::String(s) => format!("{:?}", s),
        _ => world.types.to_string(value),
    }
}
