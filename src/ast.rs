//! The expression data model: a closed tagged union over everything that
//! flows through the interpreter - the empty list, cons pairs, symbols,
//! numbers, and the two procedure kinds. Pairs are reference-counted and
//! never mutated after construction, so the expression graph is acyclic and
//! plain `Rc` ownership is sufficient.
//!
//! The `Display` impl is the canonical serializer: it prints the same
//! surface syntax the parser reads, including dotted tails for improper
//! lists. Ergonomic helpers (`sym`, `int`, `list`, `cons`) are provided for
//! building trees in tests.

use std::fmt;
use std::rc::Rc;

use crate::Error;
use crate::builtinops::BuiltinOp;
use crate::evaluator::Environment;
use crate::number::Number;

/// Core expression type.
#[derive(Clone)]
pub enum Expr {
    /// The empty list. Doubles as the "no value" result of `define`/`set!`
    /// and as the only false value.
    Nil,
    /// A number literal or arithmetic result; self-evaluating.
    Number(Number),
    /// An identifier, resolved by environment lookup during evaluation.
    Symbol(String),
    /// The cons cell. Immutable once built.
    Pair(Rc<Expr>, Rc<Expr>),
    /// A native operator from the builtin catalog.
    Builtin(&'static BuiltinOp),
    /// A user procedure created by `lambda`.
    Closure(Rc<Closure>),
}

/// A `lambda` value: parameter list, body sequence, and the environment
/// captured at definition time (lexical scoping).
pub struct Closure {
    /// Proper list of parameter symbols.
    pub(crate) params: Rc<Expr>,
    /// The rest of the `lambda` form: a non-empty proper list evaluated as
    /// an implicit `begin` sequence.
    pub(crate) body: Rc<Expr>,
    pub(crate) env: Environment,
}

impl Expr {
    pub(crate) fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }

    /// Anything that is not the empty list counts as true, `0` included.
    pub(crate) fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    /// Length of a proper list. A chain whose tail is neither `Nil` nor a
    /// pair has no length and reports as ill-formed.
    pub(crate) fn list_len(&self) -> Result<usize, Error> {
        let mut len = 0;
        let mut current = self;
        loop {
            match current {
                Expr::Nil => return Ok(len),
                Expr::Pair(_, rest) => {
                    len += 1;
                    current = rest;
                }
                other => {
                    return Err(Error::Type(format!("ill-formed list ending in {other}")));
                }
            }
        }
    }

    /// Collect the elements of a proper list, sharing each element.
    pub(crate) fn list_items(&self) -> Result<Vec<Rc<Expr>>, Error> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Expr::Nil => return Ok(items),
                Expr::Pair(left, rest) => {
                    items.push(Rc::clone(left));
                    current = rest;
                }
                other => {
                    return Err(Error::Type(format!("ill-formed list ending in {other}")));
                }
            }
        }
    }

    pub(crate) fn as_number(&self) -> Result<Number, Error> {
        match self {
            Expr::Number(n) => Ok(*n),
            other => Err(Error::Type(format!("expected a number, got {other}"))),
        }
    }

    pub(crate) fn as_symbol(&self) -> Result<&str, Error> {
        match self {
            Expr::Symbol(name) => Ok(name),
            other => Err(Error::Type(format!("expected a symbol, got {other}"))),
        }
    }
}

/// Build a proper (or, with a non-`Nil` tail, dotted) list from collected
/// elements, consing right to left.
pub(crate) fn list_from(elements: Vec<Rc<Expr>>, tail: Rc<Expr>) -> Rc<Expr> {
    elements
        .into_iter()
        .rev()
        .fold(tail, |rest, element| Rc::new(Expr::Pair(element, rest)))
}

/// Helper for creating symbols in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym(name: &str) -> Expr {
    Expr::Symbol(name.to_owned())
}

/// Helper for creating integer numbers in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn int(value: i64) -> Expr {
    Expr::Number(Number::Int(value))
}

/// Helper for creating a cons pair in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn cons(left: Expr, right: Expr) -> Expr {
    Expr::Pair(Rc::new(left), Rc::new(right))
}

/// Helper for creating a proper list in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn list(elements: impl IntoIterator<Item = Expr>) -> Expr {
    let elements: Vec<Expr> = elements.into_iter().collect();
    elements.into_iter().rev().fold(Expr::Nil, |rest, element| {
        Expr::Pair(Rc::new(element), Rc::new(rest))
    })
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Nil, Expr::Nil) => true,
            (Expr::Number(a), Expr::Number(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::Pair(l1, r1), Expr::Pair(l2, r2)) => l1 == l2 && r1 == r2,
            // Builtins compare by registered name, closures by identity
            (Expr::Builtin(a), Expr::Builtin(b)) => a.name == b.name,
            (Expr::Closure(a), Expr::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "Nil"),
            Expr::Number(n) => write!(f, "Number({n})"),
            Expr::Symbol(s) => write!(f, "Symbol({s})"),
            Expr::Pair(left, right) => write!(f, "Pair({left:?}, {right:?})"),
            Expr::Builtin(op) => write!(f, "Builtin({})", op.name),
            Expr::Closure(c) => write!(f, "Closure(params={}, body={})", c.params, c.body),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "()"),
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Pair(left, right) => {
                write!(f, "(")?;
                write_pair_chain(f, left, right)?;
                write!(f, ")")
            }
            Expr::Builtin(op) => write!(f, "{}", op.name),
            Expr::Closure(c) => {
                write!(f, "(lambda {}", c.params)?;
                // The body is a proper list; print its elements without the
                // implicit begin wrapper.
                let mut current: &Expr = &c.body;
                while let Expr::Pair(left, rest) = current {
                    write!(f, " {left}")?;
                    current = rest;
                }
                write!(f, ")")
            }
        }
    }
}

/// Print the inside of a pair chain: elements separated by single spaces,
/// with ` . tail` when the chain ends in a non-nil, non-pair value.
fn write_pair_chain(f: &mut fmt::Formatter<'_>, left: &Expr, right: &Expr) -> fmt::Result {
    write!(f, "{left}")?;
    let mut current = right;
    loop {
        match current {
            Expr::Nil => return Ok(()),
            Expr::Pair(l, r) => {
                write!(f, " {l}")?;
                current = r;
            }
            tail => return write!(f, " . {tail}"),
        }
    }
}
