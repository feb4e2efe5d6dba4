use std::fmt;

use super::arena::Slot;

/// Key of a term inside the world's term arena.
///
/// Ids are cheap to copy and compare. An id outlives its term: once the term
/// is removed the id stops resolving, even after the slot is reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub(crate) Slot);

/// Key of a branch inside the world's branch arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchId(pub(crate) Slot);

impl TermId {
    pub fn index(self) -> u32 {
        self.0.index()
    }
}

impl BranchId {
    pub fn index(self) -> u32 {
        self.0.index()
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch#{}", self.0.index())
    }
}
