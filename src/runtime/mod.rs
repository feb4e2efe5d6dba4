//! Values, types, functions and the evaluator.
//!
//! # Value ownership
//! List, map and handle payloads are shared through `Rc`. Values form trees:
//! a list never contains itself, so reference counting is enough to free
//! them. Handle payloads run their type's release callback when the last
//! share is dropped.
use crate::{error::Result, runtime::call::Call, runtime::value::TaggedValue};

pub mod builtin_function;
mod builtin_types;
pub mod builtins;
pub mod call;
pub mod frame;
pub mod function;
pub mod handle;
pub mod leak_detector;
pub mod migration;
pub mod native_patch;
pub mod overload;
pub mod types;
pub mod value;
pub mod vm;

pub type NativeFn = fn(&mut Call<'_>) -> Result<TaggedValue>;
