//! The two-level numeric tower: exact 64-bit integers and inexact 64-bit
//! floats. A binary operation yields an integer only when both operands are
//! integers; otherwise both sides are promoted to floats first. The same
//! promotion rule applies to equality and ordering, so `1` and `1.0` compare
//! equal while staying distinct values.

use std::cmp::Ordering;
use std::fmt;

use crate::Error;

/// A number value. Copy-cheap; arithmetic returns fresh values.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Classify and parse a numeric literal. A literal containing `.`, `e`,
    /// or `E` is a float; anything else is an integer. Returns `None` for
    /// text that is not a valid literal of its class.
    pub(crate) fn parse(text: &str) -> Option<Number> {
        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(Number::Float)
        } else {
            text.parse::<i64>().ok().map(Number::Int)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub(crate) fn add(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .ok_or_else(|| Error::Numeric("integer overflow in addition".to_owned())),
            _ => Ok(Number::Float(self.as_f64() + rhs.as_f64())),
        }
    }

    pub(crate) fn sub(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .ok_or_else(|| Error::Numeric("integer overflow in subtraction".to_owned())),
            _ => Ok(Number::Float(self.as_f64() - rhs.as_f64())),
        }
    }

    pub(crate) fn mul(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .ok_or_else(|| Error::Numeric("integer overflow in multiplication".to_owned())),
            _ => Ok(Number::Float(self.as_f64() * rhs.as_f64())),
        }
    }

    /// Division policy: exact division by zero (and `i64::MIN / -1`) is a
    /// numeric error; as soon as either operand is a float, IEEE 754
    /// semantics apply and zero divisors yield infinities or NaN.
    pub(crate) fn div(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => {
                Err(Error::Numeric("division by zero".to_owned()))
            }
            (Number::Int(a), Number::Int(b)) => a
                .checked_div(b)
                .map(Number::Int)
                .ok_or_else(|| Error::Numeric("integer overflow in division".to_owned())),
            _ => Ok(Number::Float(self.as_f64() / rhs.as_f64())),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            // NaN operands compare as None, so every ordering test on NaN
            // comes out false.
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}
