use std::fmt;

use crate::runtime::NativeFn;

/// A named native implementation, matched by name against declared
/// placeholder functions when a patch is applied.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
