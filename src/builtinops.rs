//! The builtin catalog: the fixed table of named operators populating the
//! core environment.
//!
//! Every operator - control forms and plain functions alike - is an
//! ordinary function with the uniform signature
//! `(raw argument list, environment, depth) -> Result<Expr>`. The evaluator
//! validates the declared [`Arity`] against the argument-list shape before
//! dispatch; the operator then evaluates whichever arguments its semantics
//! call for:
//!
//! - `quote` and `lambda` evaluate none of their arguments
//! - `if` evaluates the condition, then exactly one branch
//! - `define`/`set!` evaluate only the value position
//! - everything else evaluates each argument, left to right
//!
//! Comparisons return `1` for true and `()` for false; `define` and `set!`
//! return `()`.

use std::fmt;
use std::rc::Rc;

use crate::Error;
use crate::ast::{Closure, Expr, list_from};
use crate::evaluator::{Environment, eval_args, eval_at_depth, eval_sequence};
use crate::number::Number;

/// The uniform operator signature: unevaluated argument list, the caller's
/// environment, and the current evaluation depth.
pub(crate) type OpFn = fn(&Rc<Expr>, &Environment, usize) -> Result<Rc<Expr>, Error>;

/// Expected argument count for an operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    /// Check an argument count against this arity.
    pub(crate) fn validate(self, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exactly(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Range(min, max) => (min..=max).contains(&got),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::Arity {
                expected: self,
                got,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// A named native operator.
pub struct BuiltinOp {
    /// The identifier this operator is registered under, also its printed
    /// form.
    pub name: &'static str,
    pub(crate) arity: Arity,
    pub(crate) run: OpFn,
}

impl fmt::Debug for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinOp({})", self.name)
    }
}

//
// Operator implementations
//

/// `(quote expr)` - returns the argument expression unevaluated.
fn op_quote(args: &Rc<Expr>, _env: &Environment, _depth: usize) -> Result<Rc<Expr>, Error> {
    let items = args.list_items()?;
    match items.as_slice() {
        [expr] => Ok(Rc::clone(expr)),
        other => Err(arity_error(Arity::Exactly(1), other.len())),
    }
}

/// `(if cond then else)` - the condition always evaluates; exactly one of
/// the branches does. Any non-nil condition value counts as true.
fn op_if(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let items = args.list_items()?;
    match items.as_slice() {
        [condition, then_branch, else_branch] => {
            let chosen = if eval_at_depth(condition, env, depth + 1)?.is_truthy() {
                then_branch
            } else {
                else_branch
            };
            eval_at_depth(chosen, env, depth + 1)
        }
        other => Err(arity_error(Arity::Exactly(3), other.len())),
    }
}

/// `(define name expr)` - binds `name` in the current frame to the
/// evaluated value; an error if this frame already binds it. Yields `()`.
fn op_define(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let items = args.list_items()?;
    match items.as_slice() {
        [name, expr] => {
            let name = name.as_symbol()?;
            let value = eval_at_depth(expr, env, depth + 1)?;
            env.define(name, value)?;
            Ok(Rc::new(Expr::Nil))
        }
        other => Err(arity_error(Arity::Exactly(2), other.len())),
    }
}

/// `(set! name expr)` - overwrites the nearest existing binding; an error
/// if no frame defines the name. Yields `()`.
fn op_set(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let items = args.list_items()?;
    match items.as_slice() {
        [name, expr] => {
            let name = name.as_symbol()?;
            let value = eval_at_depth(expr, env, depth + 1)?;
            env.assign(name, value)?;
            Ok(Rc::new(Expr::Nil))
        }
        other => Err(arity_error(Arity::Exactly(2), other.len())),
    }
}

/// `(lambda (params...) body...)` - builds a closure capturing the current
/// (defining) environment. Nothing is evaluated.
fn op_lambda(args: &Rc<Expr>, env: &Environment, _depth: usize) -> Result<Rc<Expr>, Error> {
    match args.as_ref() {
        Expr::Pair(params, body) => {
            for param in params.list_items()? {
                if !matches!(param.as_ref(), Expr::Symbol(_)) {
                    return Err(Error::Type(format!(
                        "lambda parameters must be symbols, got {param}"
                    )));
                }
            }
            Ok(Rc::new(Expr::Closure(Rc::new(Closure {
                params: Rc::clone(params),
                body: Rc::clone(body),
                env: env.clone(),
            }))))
        }
        other => Err(arity_error(Arity::AtLeast(2), other.list_len()?)),
    }
}

/// `(begin expr...)` - evaluates each in order, returns the last value.
fn op_begin(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    eval_sequence(args, env, depth)
}

/// `(+ args...)` - left fold with identity 0.
fn op_add(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    fold_numeric(args, env, depth, Number::Int(0), Number::add)
}

/// `(* args...)` - left fold with identity 1.
fn op_mul(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    fold_numeric(args, env, depth, Number::Int(1), Number::mul)
}

fn fold_numeric(
    args: &Rc<Expr>,
    env: &Environment,
    depth: usize,
    identity: Number,
    op: fn(Number, Number) -> Result<Number, Error>,
) -> Result<Rc<Expr>, Error> {
    let mut acc = identity;
    for value in eval_args(args, env, depth)? {
        acc = op(acc, value.as_number()?)?;
    }
    Ok(Rc::new(Expr::Number(acc)))
}

/// `(- x)` is negation, `(- x y)` is subtraction; any other arity is an
/// error.
fn op_sub(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    let result = match values.as_slice() {
        [value] => Number::Int(0).sub(value.as_number()?)?,
        [lhs, rhs] => lhs.as_number()?.sub(rhs.as_number()?)?,
        other => return Err(arity_error(Arity::Range(1, 2), other.len())),
    };
    Ok(Rc::new(Expr::Number(result)))
}

/// `(/ x y)` - binary division; see [`Number::div`] for the zero-divisor
/// policy.
fn op_div(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    match values.as_slice() {
        [lhs, rhs] => {
            let quotient = lhs.as_number()?.div(rhs.as_number()?)?;
            Ok(Rc::new(Expr::Number(quotient)))
        }
        other => Err(arity_error(Arity::Exactly(2), other.len())),
    }
}

// Numeric comparisons share one skeleton: evaluate both operands, compare
// with promotion, return 1 for true and () for false.
macro_rules! comparison_op {
    ($name:ident, $op:tt) => {
        fn $name(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
            let values = eval_args(args, env, depth)?;
            match values.as_slice() {
                [lhs, rhs] => {
                    let holds = lhs.as_number()? $op rhs.as_number()?;
                    Ok(Rc::new(if holds {
                        Expr::Number(Number::Int(1))
                    } else {
                        Expr::Nil
                    }))
                }
                other => Err(arity_error(Arity::Exactly(2), other.len())),
            }
        }
    };
}

comparison_op!(op_num_eq, ==);
comparison_op!(op_num_ne, !=);
comparison_op!(op_lt, <);
comparison_op!(op_gt, >);
comparison_op!(op_le, <=);
comparison_op!(op_ge, >=);

/// `(cons a b)` - a new pair from the two evaluated values.
fn op_cons(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    match values.as_slice() {
        [left, right] => Ok(Rc::new(Expr::Pair(Rc::clone(left), Rc::clone(right)))),
        other => Err(arity_error(Arity::Exactly(2), other.len())),
    }
}

/// `(car p)` - the left of the evaluated pair.
fn op_car(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    match values.as_slice() {
        [value] => match value.as_ref() {
            Expr::Pair(left, _) => Ok(Rc::clone(left)),
            other => Err(Error::Type(format!("car of a non-pair: {other}"))),
        },
        other => Err(arity_error(Arity::Exactly(1), other.len())),
    }
}

/// `(cdr p)` - the right of the evaluated pair.
fn op_cdr(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    match values.as_slice() {
        [value] => match value.as_ref() {
            Expr::Pair(_, right) => Ok(Rc::clone(right)),
            other => Err(Error::Type(format!("cdr of a non-pair: {other}"))),
        },
        other => Err(arity_error(Arity::Exactly(1), other.len())),
    }
}

/// `(list args...)` - a proper list of the evaluated arguments, in order.
fn op_list(args: &Rc<Expr>, env: &Environment, depth: usize) -> Result<Rc<Expr>, Error> {
    let values = eval_args(args, env, depth)?;
    Ok(list_from(values, Rc::new(Expr::Nil)))
}

fn arity_error(expected: Arity, got: usize) -> Error {
    Error::Arity { expected, got }
}

/// The complete operator catalog. The core environment binds exactly these
/// names, each to its [`Expr::Builtin`] value.
static BUILTIN_OPS: &[BuiltinOp] = &[
    BuiltinOp { name: "quote", arity: Arity::Exactly(1), run: op_quote },
    BuiltinOp { name: "if", arity: Arity::Exactly(3), run: op_if },
    BuiltinOp { name: "define", arity: Arity::Exactly(2), run: op_define },
    BuiltinOp { name: "set!", arity: Arity::Exactly(2), run: op_set },
    // At least a parameter list and one body expression
    BuiltinOp { name: "lambda", arity: Arity::AtLeast(2), run: op_lambda },
    BuiltinOp { name: "begin", arity: Arity::AtLeast(1), run: op_begin },
    BuiltinOp { name: "+", arity: Arity::AtLeast(0), run: op_add },
    BuiltinOp { name: "*", arity: Arity::AtLeast(0), run: op_mul },
    BuiltinOp { name: "-", arity: Arity::Range(1, 2), run: op_sub },
    BuiltinOp { name: "/", arity: Arity::Exactly(2), run: op_div },
    BuiltinOp { name: "=", arity: Arity::Exactly(2), run: op_num_eq },
    BuiltinOp { name: "==", arity: Arity::Exactly(2), run: op_num_eq },
    BuiltinOp { name: "!=", arity: Arity::Exactly(2), run: op_num_ne },
    BuiltinOp { name: "<", arity: Arity::Exactly(2), run: op_lt },
    BuiltinOp { name: ">", arity: Arity::Exactly(2), run: op_gt },
    BuiltinOp { name: "<=", arity: Arity::Exactly(2), run: op_le },
    BuiltinOp { name: ">=", arity: Arity::Exactly(2), run: op_ge },
    BuiltinOp { name: "cons", arity: Arity::Exactly(2), run: op_cons },
    BuiltinOp { name: "car", arity: Arity::Exactly(1), run: op_car },
    BuiltinOp { name: "cdr", arity: Arity::Exactly(1), run: op_cdr },
    BuiltinOp { name: "list", arity: Arity::AtLeast(0), run: op_list },
];

/// All builtin operations, for the environment factory.
pub(crate) fn catalog() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}
