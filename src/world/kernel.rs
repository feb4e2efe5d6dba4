//! The kernel branch: the functions and type names every program can see.
//!
//! Library functions are declared by signature first and then bound to their
//! native implementations with [`apply_native_patch`], the same way a host
//! application patches its own declarations.

use crate::{
    error::{Error, Result},
    feedback::FEEDBACK_BUILTINS,
    graph::{BranchId, Term, TermId, printer},
    runtime::{
        builtins::BUILTINS,
        function::{Function, FunctionKind, InputSpec},
        leak_detector,
        native_patch::apply_native_patch,
        types::{TypeId, builtin},
        value::TaggedValue,
    },
    world::World,
};

/// Terms of the kernel that construction and evaluation refer to directly.
#[derive(Debug, Clone, Default)]
pub struct Kernel {
    pub branch: BranchId,
    pub function_decl: TermId,
    pub value: TermId,
    pub input: TermId,
    pub state: TermId,
    pub if_block: TermId,
    pub case: TermId,
    pub for_loop: TermId,
    pub return_: TermId,
    pub assign: TermId,
    pub branch_decl: TermId,
    pub unknown_identifier: TermId,
    pub feedback: TermId,
    pub get_index: TermId,
    pub average: TermId,
    pub copy: TermId,
    pub list: TermId,
}

pub(crate) fn bootstrap(world: &mut World) -> Result<()> {
    let branch = world.create_branch(None);
    world.kernel.branch = branch;
    world.kernel.function_decl = create_function_decl(world, branch);

    declare_special_forms(world, branch)?;
    declare_type_names(world, branch)?;

    for function in library() {
        world.declare_function(branch, function)?;
    }
    for patch in [BUILTINS, FEEDBACK_BUILTINS] {
        let report = apply_native_patch(world, branch, patch)?;
        if !report.unmatched.is_empty() {
            return Err(Error::internal(format!(
                "kernel natives without a declaration: {:?}",
                report.unmatched
            )));
        }
    }

    for (name, candidates) in [
        ("add", ["add_i", "add_f"]),
        ("sub", ["sub_i", "sub_f"]),
        ("mult", ["mult_i", "mult_f"]),
    ] {
        let overloads = candidates
            .iter()
            .map(|candidate| local(world, branch, candidate))
            .collect::<Result<Vec<_>>>()?;
        world.create_overloaded_function(branch, name, &overloads)?;
    }

    link_feedback(world, branch, "value", "assign")?;
    link_feedback(world, branch, "add_f", "add_feedback")?;
    link_feedback(world, branch, "mult_f", "mult_feedback")?;
    link_feedback(world, branch, "sin", "sin_feedback")?;
    link_feedback(world, branch, "cos", "cos_feedback")?;

    let to_string = local(world, branch, "to_string")?;
    world.bind_name(branch, to_string, "to-string");

    world.kernel.feedback = local(world, branch, "feedback")?;
    world.kernel.get_index = local(world, branch, "get_index")?;
    world.kernel.average = local(world, branch, "average")?;
    world.kernel.copy = local(world, branch, "copy")?;
    world.kernel.list = local(world, branch, "list")?;
    Ok(())
}

/// The term that declares `function`. It is its own function, so it is
/// built by hand.
fn create_function_decl(world: &mut World, branch: BranchId) -> TermId {
    let id = TermId(world.terms.next_slot());
    let fid = world.add_function(Function {
        declaring_term: Some(id),
        ..Function::new("function", FunctionKind::Value).with_output(builtin::FUNCTION)
    });
    let mut term = Term::new(id, branch, 0, builtin::FUNCTION);
    term.function = Some(id);
    term.value = TaggedValue::function_ref(fid);
    term.needs_update = false;
    world.terms.alloc(term);
    leak_detector::record_term_created();
    world.branch_mut(branch).terms.push(id);
    world.bind_name(branch, id, "function");
    id
}

fn declare_special_forms(world: &mut World, branch: BranchId) -> Result<()> {
    use builtin::{ANY, BOOL, LIST, VOID};

    world.kernel.value = world.declare_function(
        branch,
        Function::new("value", FunctionKind::Value).pure(),
    )?;
    world.kernel.input = world.declare_function(branch, Function::new("input", FunctionKind::Input))?;
    world.kernel.state = world.declare_function(
        branch,
        Function::new("state", FunctionKind::Placeholder)
            .with_inputs(vec![InputSpec::named("initial", ANY)])
            .variadic()
            .with_state(ANY),
    )?;
    world.kernel.if_block = world.declare_function(branch, Function::new("if", FunctionKind::IfBlock))?;
    world.kernel.case = world.declare_function(
        branch,
        Function::new("case", FunctionKind::Case)
            .with_inputs(vec![InputSpec::named("condition", BOOL)])
            .variadic()
            .with_output(VOID),
    )?;
    world.kernel.for_loop = world.declare_function(
        branch,
        Function::new("for", FunctionKind::ForLoop)
            .with_inputs(vec![InputSpec::named("list", LIST)])
            .with_output(LIST),
    )?;
    world.kernel.return_ = world.declare_function(
        branch,
        Function::new("return", FunctionKind::Return)
            .with_inputs(vec![InputSpec::named("value", ANY)])
            .variadic()
            .with_format_source(printer::format_return),
    )?;
    world.kernel.assign = world.declare_function(
        branch,
        Function::new("assign", FunctionKind::Assign)
            .with_inputs(vec![InputSpec::named("target", ANY), InputSpec::named("value", ANY)])
            .with_format_source(printer::format_assign),
    )?;
    world.kernel.branch_decl = world.declare_function(
        branch,
        Function::new("branch", FunctionKind::Branch).with_output(VOID),
    )?;
    world.kernel.unknown_identifier = world.declare_function(
        branch,
        Function::new("unknown_identifier", FunctionKind::UnknownIdentifier)
            .with_format_source(printer::format_unknown_identifier),
    )?;
    Ok(())
}

/// A constant term per type, bound to the type's name.
fn declare_type_names(world: &mut World, branch: BranchId) -> Result<()> {
    let names = [
        ("any", builtin::ANY),
        ("void", builtin::VOID),
        ("int", builtin::INT),
        ("number", builtin::NUMBER),
        ("bool", builtin::BOOL),
        ("string", builtin::STRING),
        ("List", builtin::LIST),
        ("Map", builtin::MAP),
        ("ref", builtin::REF),
        ("Branch", builtin::BRANCH),
        ("Type", builtin::TYPE),
        ("Function", builtin::FUNCTION),
    ];
    for (name, ty) in names {
        let term = world.create_constant(branch, TaggedValue::type_ref(ty))?;
        world.bind_name(branch, term, name);
        world.types.set_declaring_term(ty, term);
    }
    let number = local(world, branch, "number")?;
    world.bind_name(branch, number, "float");
    Ok(())
}

fn native(name: &str, inputs: &[TypeId], output: TypeId) -> Function {
    Function::new(name, FunctionKind::Placeholder)
        .with_inputs(inputs.iter().map(|ty| InputSpec::new(*ty)).collect())
        .with_output(output)
}

/// Signatures of the native library.
fn library() -> Vec<Function> {
    use builtin::{ANY, BOOL, INT, LIST, NUMBER, STRING, TYPE, VOID};

    vec![
        native("add_i", &[INT, INT], INT).pure(),
        native("add_f", &[NUMBER, NUMBER], NUMBER).pure(),
        native("sub_i", &[INT, INT], INT).pure(),
        native("sub_f", &[NUMBER, NUMBER], NUMBER).pure(),
        native("mult_i", &[INT, INT], INT).pure(),
        native("mult_f", &[NUMBER, NUMBER], NUMBER).pure(),
        native("div", &[NUMBER, NUMBER], NUMBER).pure(),
        native("less_than", &[NUMBER, NUMBER], BOOL).pure(),
        native("greater_than", &[NUMBER, NUMBER], BOOL).pure(),
        native("average", &[NUMBER], NUMBER).variadic().pure(),
        native("equals", &[ANY, ANY], BOOL).pure(),
        native("not_equals", &[ANY, ANY], BOOL).pure(),
        native("and", &[BOOL, BOOL], BOOL).pure(),
        native("or", &[BOOL, BOOL], BOOL).pure(),
        native("not", &[BOOL], BOOL).pure(),
        native("to_string", &[ANY], STRING).pure(),
        native("concat", &[ANY], STRING).variadic().pure(),
        native("list", &[ANY], LIST).variadic().pure(),
        native("get_index", &[LIST, INT], ANY).pure(),
        native("length", &[ANY], INT).pure(),
        native("append", &[LIST, ANY], LIST).pure(),
        native("copy", &[ANY], ANY)
            .pure()
            .with_specialize_type(same_as_first_input),
        native("type_of", &[ANY], TYPE).pure(),
        native("type_name", &[ANY], STRING).pure(),
        native("print", &[ANY], VOID).variadic(),
        native("once", &[], BOOL).with_state(BOOL),
        native("sin", &[NUMBER], NUMBER).pure(),
        native("cos", &[NUMBER], NUMBER).pure(),
        native("feedback", &[ANY, ANY], VOID),
        native("add_feedback", &[ANY, NUMBER], LIST).pure(),
        native("mult_feedback", &[ANY, NUMBER], LIST).pure(),
        native("sin_feedback", &[ANY, NUMBER], NUMBER).pure(),
        native("cos_feedback", &[ANY, NUMBER], NUMBER).pure(),
    ]
}

fn same_as_first_input(world: &World, inputs: &[Option<TermId>]) -> TypeId {
    match inputs.first().copied().flatten() {
        Some(input) => world.term(input).type_id,
        None => builtin::ANY,
    }
}

fn local(world: &World, branch: BranchId, name: &str) -> Result<TermId> {
    world
        .branch(branch)
        .get_local(name)
        .ok_or_else(|| Error::internal(format!("kernel is missing '{}'", name)))
}

fn link_feedback(world: &mut World, branch: BranchId, function: &str, feedback: &str) -> Result<()> {
    let decl = local(world, branch, function)?;
    let feedback = local(world, branch, feedback)?;
    let fid = world.function_declared_by(decl)?;
    world.function_mut(fid).feedback = Some(feedback);
    Ok(())
}
