use std::fmt;

use crate::{
    graph::{BranchId, Slot, TermId},
    runtime::{NativeFn, types::TypeId},
    world::World,
};

/// Key of a function record owned by the [`World`]. The record lives as long
/// as its declaring term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub(crate) Slot);

impl FunctionId {
    pub fn index(self) -> u32 {
        self.0.index()
    }
}

/// Computes a call term's type from its inputs, overriding the declared output.
pub type SpecializeTypeFn = fn(&World, &[Option<TermId>]) -> TypeId;

/// Writes source text for a call term. Only the branch printer calls this.
pub type FormatSourceFn = fn(&World, TermId, &mut String);

/// How a call to the function is evaluated.
#[derive(Clone)]
pub enum FunctionKind {
    Native(NativeFn),
    /// Declared by signature only; a native patch fills it in later.
    Placeholder,
    /// A constant; the term's own value is the output.
    Value,
    /// Placeholder for a subroutine or loop input.
    Input,
    Subroutine { body: BranchId },
    Overloaded { overloads: Vec<TermId> },
    IfBlock,
    Case,
    ForLoop,
    Return,
    Assign,
    /// A named container for a nested branch; evaluates to nothing.
    Branch,
    UnknownIdentifier,
}

impl FunctionKind {
    pub fn label(&self) -> &'static str {
        match self {
            FunctionKind::Native(_) => "native",
            FunctionKind::Placeholder => "placeholder",
            FunctionKind::Value => "value",
            FunctionKind::Input => "input",
            FunctionKind::Subroutine { .. } => "subroutine",
            FunctionKind::Overloaded { .. } => "overloaded",
            FunctionKind::IfBlock => "if",
            FunctionKind::Case => "case",
            FunctionKind::ForLoop => "for",
            FunctionKind::Return => "return",
            FunctionKind::Assign => "assign",
            FunctionKind::Branch => "branch",
            FunctionKind::UnknownIdentifier => "unknown_identifier",
        }
    }
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Subroutine { body } => write!(f, "Subroutine({})", body),
            FunctionKind::Overloaded { overloads } => write!(f, "Overloaded({:?})", overloads),
            other => write!(f, "{}", other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: Option<String>,
    pub type_id: TypeId,
}

impl InputSpec {
    pub fn new(type_id: TypeId) -> Self {
        Self {
            name: None,
            type_id,
        }
    }

    pub fn named(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            type_id,
        }
    }
}

/// A callable's signature plus the way to evaluate it.
///
/// Each function is declared by a term whose value refers back to this record
/// (`declaring_term`). Call terms point at that declaring term.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<InputSpec>,
    pub variable_args: bool,
    pub output_type: TypeId,
    pub pure: bool,
    pub hidden_state_type: Option<TypeId>,
    pub kind: FunctionKind,
    pub feedback: Option<TermId>,
    pub specialize_type: Option<SpecializeTypeFn>,
    pub format_source: Option<FormatSourceFn>,
    pub declaring_term: Option<TermId>,
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            variable_args: false,
            output_type: crate::runtime::types::builtin::ANY,
            pure: false,
            hidden_state_type: None,
            kind,
            feedback: None,
            specialize_type: None,
            format_source: None,
            declaring_term: None,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<InputSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_output(mut self, output_type: TypeId) -> Self {
        self.output_type = output_type;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variable_args = true;
        self
    }

    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }

    pub fn with_state(mut self, state_type: TypeId) -> Self {
        self.hidden_state_type = Some(state_type);
        self
    }

    pub fn with_specialize_type(mut self, hook: SpecializeTypeFn) -> Self {
        self.specialize_type = Some(hook);
        self
    }

    pub fn with_format_source(mut self, hook: FormatSourceFn) -> Self {
        self.format_source = Some(hook);
        self
    }

    pub fn is_stateful(&self) -> bool {
        self.hidden_state_type.is_some()
    }

    /// Declared type of input `index`, repeating the last one for variadics.
    pub fn input_type(&self, index: usize) -> Option<TypeId> {
        match self.inputs.get(index) {
            Some(spec) => Some(spec.type_id),
            None if self.variable_args => self.inputs.last().map(|spec| spec.type_id),
            None => None,
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.variable_args {
            count + 1 >= self.inputs.len()
        } else {
            count == self.inputs.len()
        }
    }

    /// `name(a, b)` form used in hints.
    pub fn signature(&self, world: &World) -> String {
        let mut params: Vec<String> = self
            .inputs
            .iter()
            .map(|spec| {
                let ty = world.types.name(spec.type_id);
                match &spec.name {
                    Some(name) => format!("{} {}", ty, name),
                    None => ty.to_string(),
                }
            })
            .collect();
        if self.variable_args {
            params.push("...".to_string());
        }
        format!(
            "{}({}) -> {}",
            self.name,
            params.join(", "),
            world.types.name(self.output_type)
        )
    }
}
