//! The scope chain and the recursive evaluator.
//!
//! An [`Environment`] is a cheap handle on one frame of a lexical scope
//! chain. Frames are shared: a closure's captured frame and the caller's
//! view of that frame alias the same mutable binding table, which is what
//! makes `set!` visible through closures and lets a closure body refer to
//! the name it is being `define`d under. Execution is strictly
//! single-threaded, so interior mutability needs no locking.
//!
//! [`evaluate`] implements the uniform invocation protocol: the operator
//! position is evaluated first and must yield a procedure; the procedure
//! then receives the raw, unevaluated argument list together with the
//! caller's environment and performs whatever argument evaluation its
//! semantics call for.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::MAX_EVAL_DEPTH;
use crate::ast::{Closure, Expr};
use crate::Error;
use crate::builtinops::{Arity, catalog};

/// One frame of bindings plus its lexical parent.
struct Frame {
    bindings: HashMap<String, Rc<Expr>>,
    outer: Option<Environment>,
}

/// A chain of name-to-value frames implementing lexical scoping.
///
/// Cloning an `Environment` clones the handle, not the frame: both handles
/// see (and mutate) the same bindings. Frames stay alive for as long as any
/// closure or caller references them and are reclaimed by reference
/// counting; the expression graph is acyclic, so no cycle breaking is
/// needed.
#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

impl Environment {
    /// A fresh root frame with no parent and no bindings. Use
    /// [`core_environment`] for the frame pre-populated with the builtin
    /// catalog.
    pub(crate) fn new() -> Self {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                outer: None,
            })),
        }
    }

    /// A new, empty frame whose parent is `self`. Created for each closure
    /// invocation.
    pub fn child(&self) -> Environment {
        Environment {
            frame: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                outer: Some(self.clone()),
            })),
        }
    }

    /// Insert a binding into this frame only. Re-defining a name already
    /// present in this same frame is an error; shadowing an ancestor's
    /// binding is not.
    pub fn define(&self, name: &str, value: Rc<Expr>) -> Result<(), Error> {
        let mut frame = self.frame.borrow_mut();
        if frame.bindings.contains_key(name) {
            return Err(Error::AlreadyDefined(name.to_owned()));
        }
        frame.bindings.insert(name.to_owned(), value);
        Ok(())
    }

    /// Resolve a name, walking from this frame outward. The innermost frame
    /// containing the name wins.
    pub fn lookup(&self, name: &str) -> Result<Rc<Expr>, Error> {
        let frame = self.frame.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Ok(Rc::clone(value));
        }
        match &frame.outer {
            Some(outer) => outer.lookup(name),
            None => Err(Error::UnboundSymbol(name.to_owned())),
        }
    }

    /// Overwrite the nearest existing binding of `name` (`set!`). An error
    /// if no frame in the chain defines it.
    pub fn assign(&self, name: &str, value: Rc<Expr>) -> Result<(), Error> {
        let mut frame = self.frame.borrow_mut();
        if let Some(slot) = frame.bindings.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &frame.outer {
            Some(outer) => outer.assign(name, value),
            None => Err(Error::UnboundSymbol(name.to_owned())),
        }
    }
}

/// Construct the default environment: a single root frame holding exactly
/// the builtin catalog. Built once per session by the driver.
pub fn core_environment() -> Environment {
    let env = Environment::new();
    for op in catalog() {
        env.define(op.name, Rc::new(Expr::Builtin(op)))
            .expect("builtin catalog names are unique");
    }
    env
}

/// Evaluate an expression against an environment.
pub fn evaluate(expr: &Rc<Expr>, env: &Environment) -> Result<Rc<Expr>, Error> {
    eval_at_depth(expr, env, 0)
}

/// The recursive tree walk, guarded by [`MAX_EVAL_DEPTH`] so runaway user
/// recursion fails with a structured error instead of exhausting the
/// native stack.
pub(crate) fn eval_at_depth(
    expr: &Rc<Expr>,
    env: &Environment,
    depth: usize,
) -> Result<Rc<Expr>, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::Eval(format!(
            "evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        )));
    }
    match expr.as_ref() {
        // Nil, numbers, and bare procedure values evaluate to themselves
        Expr::Nil | Expr::Number(_) | Expr::Builtin(_) | Expr::Closure(_) => Ok(Rc::clone(expr)),
        Expr::Symbol(name) => env.lookup(name),
        Expr::Pair(head, rest) => {
            let operator = eval_at_depth(head, env, depth + 1)?;
            apply(&operator, rest, env, depth)
        }
    }
}

/// Invoke an operator on its raw, unevaluated argument list.
fn apply(
    operator: &Rc<Expr>,
    args: &Rc<Expr>,
    env: &Environment,
    depth: usize,
) -> Result<Rc<Expr>, Error> {
    match operator.as_ref() {
        Expr::Builtin(op) => {
            op.arity.validate(args.list_len()?)?;
            (op.run)(args, env, depth + 1)
        }
        Expr::Closure(closure) => apply_closure(closure, args, env, depth),
        other => Err(Error::Type(format!("cannot apply non-procedure: {other}"))),
    }
}

/// Closure invocation: arguments are evaluated exactly once, in the
/// caller's environment, then bound positionally in a fresh child frame of
/// the closure's captured environment.
fn apply_closure(
    closure: &Rc<Closure>,
    args: &Rc<Expr>,
    caller_env: &Environment,
    depth: usize,
) -> Result<Rc<Expr>, Error> {
    let params = closure.params.list_items()?;
    let values = eval_args(args, caller_env, depth)?;
    if params.len() != values.len() {
        return Err(Error::Arity {
            expected: Arity::Exactly(params.len()),
            got: values.len(),
        });
    }
    let scope = closure.env.child();
    for (param, value) in params.iter().zip(values) {
        scope.define(param.as_symbol()?, value)?;
    }
    eval_sequence(&closure.body, &scope, depth)
}

/// Evaluate every element of a proper list, left to right, in `env`.
pub(crate) fn eval_args(
    args: &Rc<Expr>,
    env: &Environment,
    depth: usize,
) -> Result<Vec<Rc<Expr>>, Error> {
    args.list_items()?
        .iter()
        .map(|arg| eval_at_depth(arg, env, depth + 1))
        .collect()
}

/// `begin` semantics: evaluate each expression in order for effect and
/// return the last one's value. Also runs closure bodies.
pub(crate) fn eval_sequence(
    body: &Rc<Expr>,
    env: &Environment,
    depth: usize,
) -> Result<Rc<Expr>, Error> {
    let mut result = Rc::new(Expr::Nil);
    for item in body.list_items()? {
        result = eval_at_depth(&item, env, depth + 1)?;
    }
    Ok(result)
}
