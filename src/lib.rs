//! Lisplet - a minimal Lisp-family S-expression interpreter
//!
//! This crate reads textual S-expressions, builds a reference-counted
//! expression tree, and evaluates that tree against a chain of lexical
//! scopes. Results serialize back to the same surface syntax:
//!
//! ```scheme
//! (+ 1 2)                                 ; => 3
//! (define make-adder (lambda (x) (lambda (y) (+ x y))))
//! (define add5 (make-adder 5))
//! (add5 3)                                ; => 8
//! (car '(a b c))                          ; => a
//! ```
//!
//! Every operator - `quote` and `lambda` included - is an ordinary
//! procedure value looked up through the environment. The evaluator hands
//! each operator its raw, unevaluated argument list; the operator decides
//! which arguments to evaluate and in what order. There is no separate
//! special-form dispatch.
//!
//! ## Entry points
//!
//! - [`parser::parse`] / [`parser::parse_str`] - text to expression tree
//! - [`evaluator::core_environment`] - the default environment with the
//!   builtin catalog, built once per session
//! - [`evaluator::evaluate`] - tree plus environment to result
//! - [`std::fmt::Display`] on [`ast::Expr`] - result back to text
//!
//! ```
//! use lisplet::evaluator::{core_environment, evaluate};
//! use lisplet::parser::parse_str;
//!
//! let env = core_environment();
//! let expr = parse_str("(* 2 3 4)").unwrap();
//! let result = evaluate(&expr, &env).unwrap();
//! assert_eq!(result.to_string(), "24");
//! ```
//!
//! ## Modules
//!
//! - `number`: the two-level numeric tower (exact integer, inexact float)
//! - `ast`: the expression data model and serializer
//! - `lexer`: character stream to tokens
//! - `parser`: tokens to expression trees
//! - `evaluator`: scope chain and the recursive evaluator
//! - `builtinops`: the fixed catalog of named operators

use std::fmt;

use crate::builtinops::Arity;

/// Maximum nesting depth accepted by the parser. Deeper input fails with a
/// structured parse error instead of overflowing the native stack.
pub const MAX_PARSE_DEPTH: usize = 128;

/// Maximum recursion depth for evaluation. Evaluation is a plain recursive
/// tree walk (no tail calls), so this bounds native stack growth for
/// runaway user programs.
pub const MAX_EVAL_DEPTH: usize = 512;

/// Categorizes the different kinds of parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token (stray `)` or `.`, malformed numeric literal)
    InvalidSyntax,
    /// Input ended before the expression was complete
    Incomplete,
    /// Expression nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// Extra tokens found after a complete expression
    TrailingContent,
}

/// A structured parse failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
        }
    }
}

/// Error type for the interpreter.
///
/// Every failure halts the evaluation of the current top-level expression;
/// there is no recovery or partial result past the point of failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed input text
    Parse(ParseError),
    /// Lookup or `set!` on a name no frame defines
    UnboundSymbol(String),
    /// `define` of a name already bound in the current frame
    AlreadyDefined(String),
    /// Operand or operator of the wrong kind
    Type(String),
    /// Wrong argument count for a builtin or closure invocation
    Arity { expected: Arity, got: usize },
    /// Division by zero on exact integers, integer overflow
    Numeric(String),
    /// Evaluation depth limit exceeded
    Eval(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "parse error: {}", e.message),
            Error::UnboundSymbol(name) => write!(f, "unbound symbol: {name}"),
            Error::AlreadyDefined(name) => {
                write!(f, "name error: {name} is already defined in this scope")
            }
            Error::Type(msg) => write!(f, "type error: {msg}"),
            Error::Arity { expected, got } => {
                write!(f, "arity mismatch: expected {expected} arguments, got {got}")
            }
            Error::Numeric(msg) => write!(f, "numeric error: {msg}"),
            Error::Eval(msg) => write!(f, "evaluation error: {msg}"),
        }
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod lexer;
pub mod number;
pub mod parser;
