use crate::{
    graph::{BranchId, TermId},
    world::World,
};

/// Depth-first walk over a branch and every nested branch below it.
///
/// A term is yielded before the contents of its nested branch. Calling
/// [`BranchIterator::skip_next_branch`] right after a term is yielded keeps
/// the walk from descending into that term's nested branch.
pub struct BranchIterator<'a> {
    world: &'a World,
    stack: Vec<(BranchId, usize)>,
    pending: Option<BranchId>,
}

impl<'a> BranchIterator<'a> {
    pub fn new(world: &'a World, branch: BranchId) -> Self {
        Self {
            world,
            stack: vec![(branch, 0)],
            pending: None,
        }
    }

    pub fn skip_next_branch(&mut self) {
        self.pending = None;
    }

    /// Nesting depth of the term most recently yielded.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }
}

impl Iterator for BranchIterator<'_> {
    type Item = TermId;

    fn next(&mut self) -> Option<TermId> {
        if let Some(nested) = self.pending.take() {
            self.stack.push((nested, 0));
        }
        loop {
            let (branch, index) = self.stack.last_mut()?;
            let terms = &self.world.branch(*branch).terms;
            if *index >= terms.len() {
                self.stack.pop();
                continue;
            }
            let term = terms[*index];
            *index += 1;
            self.pending = self.world.term(term).nested;
            return Some(term);
        }
    }
}
