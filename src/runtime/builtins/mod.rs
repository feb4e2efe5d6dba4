use crate::runtime::builtin_function::BuiltinFunction;

mod comparison_ops;
mod helpers;
mod io_ops;
mod list_ops;
mod numeric_ops;
mod state_ops;
mod string_ops;
mod trig_ops;
mod type_check;

use comparison_ops::{builtin_and, builtin_equals, builtin_not, builtin_not_equals, builtin_or};
use io_ops::builtin_print;
use list_ops::{
    builtin_append, builtin_copy, builtin_get_index, builtin_length, builtin_list,
};
use numeric_ops::{
    builtin_add_f, builtin_add_i, builtin_average, builtin_div, builtin_greater_than,
    builtin_less_than, builtin_mult_f, builtin_mult_i, builtin_sub_f, builtin_sub_i,
};
use state_ops::{builtin_once, builtin_state};
use string_ops::{builtin_concat, builtin_to_string};
use trig_ops::{builtin_cos, builtin_sin};
use type_check::{builtin_type_name, builtin_type_of};

/// Native implementations of the kernel's library functions, matched by name
/// against the kernel's declarations.
pub static BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "add_i",
        func: builtin_add_i,
    },
    BuiltinFunction {
        name: "add_f",
        func: builtin_add_f,
    },
    BuiltinFunction {
        name: "sub_i",
        func: builtin_sub_i,
    },
    BuiltinFunction {
        name: "sub_f",
        func: builtin_sub_f,
    },
    BuiltinFunction {
        name: "mult_i",
        func: builtin_mult_i,
    },
    BuiltinFunction {
        name: "mult_f",
        func: builtin_mult_f,
    },
    BuiltinFunction {
        name: "div",
        func: builtin_div,
    },
    BuiltinFunction {
        name: "less_than",
        func: builtin_less_than,
    },
    BuiltinFunction {
        name: "greater_than",
        func: builtin_greater_than,
    },
    BuiltinFunction {
        name: "average",
        func: builtin_average,
    },
    BuiltinFunction {
        name: "equals",
        func: builtin_equals,
    },
    BuiltinFunction {
        name: "not_equals",
        func: builtin_not_equals,
    },
    BuiltinFunction {
        name: "and",
        func: builtin_and,
    },
    BuiltinFunction {
        name: "or",
        func: builtin_or,
    },
    BuiltinFunction {
        name: "not",
        func: builtin_not,
    },
    BuiltinFunction {
        name: "to_string",
        func: builtin_to_string,
    },
    BuiltinFunction {
        name: "concat",
        func: builtin_concat,
    },
    BuiltinFunction {
        name: "list",
        func: builtin_list,
    },
    BuiltinFunction {
        name: "get_index",
        func: builtin_get_index,
    },
    BuiltinFunction {
        name: "length",
        func: builtin_length,
    },
    BuiltinFunction {
        name: "append",
        func: builtin_append,
    },
    BuiltinFunction {
        name: "copy",
        func: builtin_copy,
    },
    BuiltinFunction {
        name: "type_of",
        func: builtin_type_of,
    },
    BuiltinFunction {
        name: "type_name",
        func: builtin_type_name,
    },
    BuiltinFunction {
        name: "print",
        func: builtin_print,
    },
    BuiltinFunction {
        name: "once",
        func: builtin_once,
    },
    BuiltinFunction {
        name: "state",
        func: builtin_state,
    },
    BuiltinFunction {
        name: "sin",
        func: builtin_sin,
    },
    BuiltinFunction {
        name: "cos",
        func: builtin_cos,
    },
];
