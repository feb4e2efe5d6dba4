//! Error taxonomy shared by every layer of the runtime.
//!
//! `Internal` marks a broken invariant inside the interpreter itself and is the
//! only kind that escapes [`crate::runtime::vm::Stack::run`]. The other kinds are
//! raised by user programs and are recorded on the stack instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("type error: expected {expected}, found {found}")]
    Type { expected: String, found: String },

    #[error("name not found: {0}")]
    Key(String),

    #[error("{0}")]
    Runtime(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("script error: {0}")]
    Script(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Error::Runtime(message.into())
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::Type {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Script(err.to_string())
    }
}
