use crate::error::Error;

use super::{ErrorCode, ErrorType};

pub const WRONG_NUMBER_OF_ARGUMENTS: ErrorCode = ErrorCode {
    code: "E1000",
    title: "WRONG NUMBER OF ARGUMENTS",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: None,
};

pub const FUNCTION_NOT_IMPLEMENTED: ErrorCode = ErrorCode {
    code: "E1002",
    title: "FUNCTION NOT IMPLEMENTED",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: Some("Native functions are attached with a native patch at startup."),
};

pub const BUILTIN_ERROR: ErrorCode = ErrorCode {
    code: "E1003",
    title: "BUILTIN FUNCTION ERROR",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: None,
};

pub const RUNTIME_TYPE_ERROR: ErrorCode = ErrorCode {
    code: "E1004",
    title: "TYPE ERROR",
    error_type: ErrorType::Runtime,
    message: "Expected {}, got {}.",
    hint: None,
};

pub const DIVISION_BY_ZERO_RUNTIME: ErrorCode = ErrorCode {
    code: "E1008",
    title: "DIVISION BY ZERO",
    error_type: ErrorType::Runtime,
    message: "Cannot divide by zero.",
    hint: Some("Check divisor is non-zero before division."),
};

pub const OVERLOAD_NOT_FOUND: ErrorCode = ErrorCode {
    code: "E1010",
    title: "OVERLOAD NOT FOUND",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: Some("No candidate accepts the argument types at run time."),
};

pub const STACK_OVERFLOW: ErrorCode = ErrorCode {
    code: "E1011",
    title: "STACK OVERFLOW",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: Some("Raise max_frames in the config or check for unbounded recursion."),
};

pub const STORAGE_ERROR: ErrorCode = ErrorCode {
    code: "E1012",
    title: "STORAGE ERROR",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: None,
};

pub const UNKNOWN_IDENTIFIER_RUNTIME: ErrorCode = ErrorCode {
    code: "E1013",
    title: "UNKNOWN IDENTIFIER",
    error_type: ErrorType::Runtime,
    message: "Name `{}` is not defined.",
    hint: None,
};

pub const INTERNAL_ERROR: ErrorCode = ErrorCode {
    code: "E1099",
    title: "INTERNAL ERROR",
    error_type: ErrorType::Runtime,
    message: "{}",
    hint: Some("This is an interpreter bug, not a problem in the program."),
};

/// Picks the error code that describes `err`.
pub fn classify(err: &Error) -> &'static ErrorCode {
    match err {
        Error::Type { .. } => &RUNTIME_TYPE_ERROR,
        Error::Key(_) => &UNKNOWN_IDENTIFIER_RUNTIME,
        Error::Storage(_) | Error::Script(_) => &STORAGE_ERROR,
        Error::Internal(_) => &INTERNAL_ERROR,
        Error::Runtime(message) => {
            if message.contains("wrong number of arguments") {
                &WRONG_NUMBER_OF_ARGUMENTS
            } else if message.contains("division by zero") {
                &DIVISION_BY_ZERO_RUNTIME
            } else if message.contains("not implemented") {
                &FUNCTION_NOT_IMPLEMENTED
            } else if message.starts_with("overload not found") {
                &OVERLOAD_NOT_FOUND
            } else if message.starts_with("stack overflow") {
                &STACK_OVERFLOW
            } else {
                &BUILTIN_ERROR
            }
        }
    }
}

/// The message a diagnostic for `err` should carry.
pub fn describe(err: &Error) -> String {
    match err {
        Error::Type { expected, found } => {
            super::format_message(RUNTIME_TYPE_ERROR.message, &[expected, found])
        }
        Error::Key(name) => super::format_message(UNKNOWN_IDENTIFIER_RUNTIME.message, &[name]),
        Error::Runtime(message) if message.contains("division by zero") => {
            DIVISION_BY_ZERO_RUNTIME.message.to_string()
        }
        Error::Runtime(message)
        | Error::Internal(message)
        | Error::Storage(message)
        | Error::Script(message) => message.clone(),
    }
}
