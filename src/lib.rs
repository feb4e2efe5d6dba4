//! A term-graph interpreter.
//!
//! Programs are branches of typed terms. Each term calls a function on
//! earlier terms; evaluation walks a branch on an explicit frame stack.
//! Stateful terms keep hidden state between runs, and that state follows the
//! program when a code unit is reloaded.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod feedback;
pub mod graph;
pub mod reload;
pub mod runtime;
pub mod script;
pub mod storage;
pub mod world;

pub use error::{Error, Result};
pub use world::World;
