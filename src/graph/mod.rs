//! Program graph: terms, branches and the operations that build them.
//!
//! Terms and branches live in arenas owned by the [`crate::World`] and refer to
//! one another by id. Construction keeps the `inputs`/`users` back-references
//! consistent; [`invariants::check_invariants`] verifies that in tests.

mod arena;
mod branch;
pub mod building;
mod ids;
pub mod invariants;
pub mod iterator;
pub mod lookup;
pub mod printer;
mod term;

pub use arena::{Arena, Slot};
pub use branch::Branch;
pub use ids::{BranchId, TermId};
pub use iterator::BranchIterator;
pub use term::{DERIVED_TRAINABLE, IDENTIFIER, TRAINABLE, Term};
