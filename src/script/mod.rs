//! Graph scripts.
//!
//! A script is JSON describing a program statement by statement. There is no
//! text syntax to tokenize: each statement maps onto one or a few graph
//! construction calls, which [`loader::load_script`] performs.
//!
//! ```json
//! {
//!   "statements": [
//!     { "def": "f", "inputs": [["n", "int"]], "output": "int", "body": [
//!       { "return": { "call": "mult", "args": [{ "ref": "n" }, 2] } }
//!     ]},
//!     { "let": "x", "value": { "call": "f", "args": [4] } }
//!   ],
//!   "expect": { "x": 8 }
//! }
//! ```

pub mod loader;
pub mod runner;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

pub use loader::{load_expression, load_script};
pub use runner::{ScriptOutcome, TestReport, run_script, run_test_files};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// Values named terms must hold after one evaluation.
    #[serde(default)]
    pub expect: BTreeMap<String, serde_json::Value>,
    /// Error code the evaluation must fail with, e.g. `"E1008"`.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// One statement. Each variant is recognised by its leading key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Statement {
    Def {
        def: String,
        #[serde(default)]
        inputs: Vec<(String, String)>,
        #[serde(default = "any_type")]
        output: String,
        body: Vec<Statement>,
    },
    State {
        state: String,
        #[serde(rename = "type", default = "any_type")]
        type_name: String,
        #[serde(default)]
        initial: Option<Expression>,
    },
    Let {
        #[serde(rename = "let")]
        name: String,
        value: Expression,
    },
    Return {
        #[serde(rename = "return")]
        value: Expression,
    },
    If {
        #[serde(rename = "if")]
        cases: Vec<Case>,
        #[serde(rename = "else", default)]
        otherwise: Option<Vec<Statement>>,
    },
    For {
        #[serde(rename = "for")]
        iterator: String,
        #[serde(rename = "in")]
        list: Expression,
        body: Vec<Statement>,
    },
    Assign {
        assign: String,
        value: Expression,
    },
    Feedback {
        feedback: String,
        desired: Expression,
    },
    Trainable {
        trainable: String,
    },
    Expression {
        expr: Expression,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Case {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

/// An expression. Objects with a `ref`, `call` or `list` key are graph
/// references; any other JSON value except an object is a literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum Expression {
    Ref { name: String },
    Call { call: String, args: Vec<Expression> },
    List { list: Vec<Expression> },
    Literal(serde_json::Value),
}

impl TryFrom<serde_json::Value> for Expression {
    type Error = String;

    fn try_from(json: serde_json::Value) -> std::result::Result<Self, String> {
        use serde_json::Value as Json;
        let Json::Object(mut entries) = json else {
            return Ok(Expression::Literal(json));
        };
        if let Some(name) = entries.remove("ref") {
            let Json::String(name) = name else {
                return Err("`ref` must name a term".to_string());
            };
            return Ok(Expression::Ref { name });
        }
        if let Some(call) = entries.remove("call") {
            let Json::String(call) = call else {
                return Err("`call` must name a function".to_string());
            };
            let args = match entries.remove("args") {
                Some(args) => serde_json::from_value(args).map_err(|err| err.to_string())?,
                None => Vec::new(),
            };
            return Ok(Expression::Call { call, args });
        }
        if let Some(list) = entries.remove("list") {
            let list = serde_json::from_value(list).map_err(|err| err.to_string())?;
            return Ok(Expression::List { list });
        }
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        Err(format!("unrecognized expression with keys [{}]", keys.join(", ")))
    }
}


fn any_type() -> String {
    "any".to_string()
}

pub fn parse_script(text: &str) -> Result<Script> {
    serde_json::from_str(text).map_err(|err| Error::Script(format!("invalid script: {}", err)))
}

pub fn parse_expression(text: &str) -> Result<Expression> {
    serde_json::from_str(text).map_err(|err| Error::Script(format!("invalid expression: {}", err)))
}
