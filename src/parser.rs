//! Recursive-descent construction of expression trees from tokens.
//!
//! Grammar:
//!
//! ```text
//! expr  := atom | '(' list | "'" expr
//! list  := ')' | expr ( list | '.' expr ')' )
//! atom  := numeric-literal | symbol-literal
//! ```
//!
//! An atom whose first character is a decimal digit is a numeric literal;
//! anything else is a symbol (so `-5` is a symbol and negation is spelled
//! `(- 5)`). `'x` expands at parse time to `(quote x)`. A `Dot` tail
//! terminates a list with an arbitrary expression, producing an improper
//! list. Parse errors are fatal: no partial tree is ever returned.

use std::rc::Rc;

use crate::ast::{Expr, list_from};
use crate::lexer::{Token, Tokenizer};
use crate::number::Number;
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Parse the next expression from the token stream.
///
/// Returns `Ok(None)` when the stream is exhausted before any token - the
/// distinguished "no expression" result the driving loop terminates on.
/// This is different from parsing `()`, which yields `Nil` as a value.
pub fn parse(tokens: &mut Tokenizer) -> Result<Option<Rc<Expr>>, Error> {
    match tokens.next() {
        Token::EndOfInput => Ok(None),
        token => parse_expression(token, tokens, 0).map(Some),
    }
}

/// Parse exactly one expression from a string. Empty input and trailing
/// tokens are both errors; used by tests and the interactive driver.
pub fn parse_str(input: &str) -> Result<Rc<Expr>, Error> {
    let mut tokens = Tokenizer::new(input);
    let Some(expr) = parse(&mut tokens)? else {
        return Err(Error::Parse(ParseError::new(
            ParseErrorKind::Incomplete,
            "empty input",
        )));
    };
    match tokens.peek() {
        Token::EndOfInput => Ok(expr),
        token => Err(Error::Parse(ParseError::new(
            ParseErrorKind::TrailingContent,
            format!("unexpected trailing input at {token}"),
        ))),
    }
}

/// Parse one expression whose first token has already been consumed.
fn parse_expression(token: Token, tokens: &mut Tokenizer, depth: usize) -> Result<Rc<Expr>, Error> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(too_deep());
    }
    match token {
        Token::Atom(text) => make_atom(&text),
        Token::OpenParen => parse_list(tokens, depth),
        Token::Quote => {
            let token = tokens.next();
            let quoted = parse_expression(token, tokens, depth + 1)?;
            // 'x is sugar for the two-element list (quote x)
            Ok(list_from(
                vec![Rc::new(Expr::Symbol("quote".to_owned())), quoted],
                Rc::new(Expr::Nil),
            ))
        }
        Token::CloseParen => Err(invalid("')' where an expression was expected")),
        Token::Dot => Err(invalid("'.' where an expression was expected")),
        Token::EndOfInput => Err(incomplete("input ended where an expression was expected")),
    }
}

/// Parse the remainder of a list, the opening paren already consumed. The
/// caller has already counted this nesting level against the depth limit.
fn parse_list(tokens: &mut Tokenizer, depth: usize) -> Result<Rc<Expr>, Error> {
    let mut elements = Vec::new();
    loop {
        match tokens.peek() {
            Token::CloseParen => {
                tokens.next();
                return Ok(list_from(elements, Rc::new(Expr::Nil)));
            }
            // A dotted tail may follow any element, but not open a list
            Token::Dot if !elements.is_empty() => {
                tokens.next();
                let token = tokens.next();
                let tail = parse_expression(token, tokens, depth + 1)?;
                return match tokens.next() {
                    Token::CloseParen => Ok(list_from(elements, tail)),
                    Token::EndOfInput => Err(incomplete("input ended after a dotted tail")),
                    token => Err(invalid(format!(
                        "expected ')' after a dotted tail, found {token}"
                    ))),
                };
            }
            Token::EndOfInput => return Err(incomplete("input ended inside a list")),
            _ => {
                let token = tokens.next();
                elements.push(parse_expression(token, tokens, depth + 1)?);
            }
        }
    }
}

/// Classify an atom: a leading decimal digit commits it to being numeric.
fn make_atom(text: &str) -> Result<Rc<Expr>, Error> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        match Number::parse(text) {
            Some(number) => Ok(Rc::new(Expr::Number(number))),
            None => Err(invalid(format!("malformed numeric literal '{text}'"))),
        }
    } else {
        Ok(Rc::new(Expr::Symbol(text.to_owned())))
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Parse(ParseError::new(ParseErrorKind::InvalidSyntax, message))
}

fn incomplete(message: impl Into<String>) -> Error {
    Error::Parse(ParseError::new(ParseErrorKind::Incomplete, message))
}

fn too_deep() -> Error {
    Error::Parse(ParseError::new(
        ParseErrorKind::TooDeeplyNested,
        format!("expression nested deeper than {MAX_PARSE_DEPTH}"),
    ))
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{Expr, cons, int, list, sym};
    use crate::number::Number;
    use crate::{MAX_PARSE_DEPTH, ParseErrorKind};

    /// Expected outcome of a parse test case.
    #[derive(Debug)]
    enum ParseOutcome {
        Success(Expr),
        ErrorKind(ParseErrorKind),
    }
    use ParseOutcome::{ErrorKind, Success};

    fn success(expr: Expr) -> ParseOutcome {
        Success(expr)
    }

    /// Run parse test cases; successful parses are also round-tripped
    /// through the serializer and reparsed.
    fn run_parse_tests(test_cases: Vec<(&str, ParseOutcome)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("parse test #{} for '{input}'", i + 1);
            match (parse_str(input), expected) {
                (Ok(actual), Success(expected_expr)) => {
                    assert_eq!(*actual, *expected_expr, "{test_id}: tree mismatch");

                    // Round-trip: display -> parse -> display must be stable
                    let displayed = actual.to_string();
                    let reparsed = parse_str(&displayed).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse of '{displayed}' failed: {e:?}")
                    });
                    assert_eq!(
                        reparsed.to_string(),
                        displayed,
                        "{test_id}: round-trip display mismatch"
                    );
                }
                (Err(Error::Parse(actual)), ErrorKind(expected_kind)) => {
                    assert_eq!(actual.kind, *expected_kind, "{test_id}: error kind mismatch");
                }
                (Ok(actual), ErrorKind(kind)) => {
                    panic!("{test_id}: expected {kind:?} error, parsed {actual:?}")
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}")
                }
                (Err(err), ErrorKind(kind)) => {
                    panic!("{test_id}: expected {kind:?} error, got {err:?}")
                }
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // comprehensive coverage is intentionally thorough
    fn test_parser_comprehensive() {
        let test_cases = vec![
            // ===== ATOMS =====
            ("42", success(int(42))),
            ("0", success(int(0))),
            ("9223372036854775807", success(int(i64::MAX))),
            ("3.14", success(Expr::Number(Number::Float(3.14)))),
            ("1e3", success(Expr::Number(Number::Float(1000.0)))),
            ("foo", success(sym("foo"))),
            ("+", success(sym("+"))),
            ("set!", success(sym("set!"))),
            ("<=", success(sym("<="))),
            // A leading digit commits the atom to being a number
            ("3abc", ErrorKind(ParseErrorKind::InvalidSyntax)),
            ("1.2.3", ErrorKind(ParseErrorKind::InvalidSyntax)),
            ("99999999999999999999", ErrorKind(ParseErrorKind::InvalidSyntax)),
            // A leading non-digit makes it a symbol, dashes included
            ("-5", success(sym("-5"))),
            ("x123", success(sym("x123"))),
            // ===== LISTS =====
            ("()", success(Expr::Nil)),
            ("(   )", success(Expr::Nil)),
            ("(42)", success(list([int(42)]))),
            ("(1 2 3)", success(list([int(1), int(2), int(3)]))),
            (
                "(a 1 2.0)",
                success(list([sym("a"), int(1), Expr::Number(Number::Float(2.0))])),
            ),
            ("( 1   2\t\n3 )", success(list([int(1), int(2), int(3)]))),
            (
                "((1 2) (3 4))",
                success(list([list([int(1), int(2)]), list([int(3), int(4)])])),
            ),
            ("(((1)))", success(list([list([list([int(1)])])]))),
            ("(() ())", success(list([Expr::Nil, Expr::Nil]))),
            // ===== DOTTED PAIRS =====
            ("(1 . 2)", success(cons(int(1), int(2)))),
            ("(1 2 . 3)", success(cons(int(1), cons(int(2), int(3))))),
            ("(a . b)", success(cons(sym("a"), sym("b")))),
            // A dotted tail may itself be a list or follow a list element
            ("(1 . (2 3))", success(list([int(1), int(2), int(3)]))),
            (
                "((a) . b)",
                success(cons(list([sym("a")]), sym("b"))),
            ),
            // Dotted-tail syntax errors
            ("(. 2)", ErrorKind(ParseErrorKind::InvalidSyntax)),
            ("(1 . 2 3)", ErrorKind(ParseErrorKind::InvalidSyntax)),
            ("(1 .", ErrorKind(ParseErrorKind::Incomplete)),
            ("(1 . 2", ErrorKind(ParseErrorKind::Incomplete)),
            ("(1 . )", ErrorKind(ParseErrorKind::InvalidSyntax)),
            // ===== QUOTE SHORTHAND =====
            ("'foo", success(list([sym("quote"), sym("foo")]))),
            (
                "'(1 2 3)",
                success(list([sym("quote"), list([int(1), int(2), int(3)])])),
            ),
            ("'()", success(list([sym("quote"), Expr::Nil]))),
            ("'42", success(list([sym("quote"), int(42)]))),
            (
                "''x",
                success(list([
                    sym("quote"),
                    list([sym("quote"), sym("x")]),
                ])),
            ),
            // Longhand parses to the identical tree
            ("(quote foo)", success(list([sym("quote"), sym("foo")]))),
            (
                "(quote (1 2 3))",
                success(list([sym("quote"), list([int(1), int(2), int(3)])])),
            ),
            // Quote inside a list
            (
                "(car '(a b))",
                success(list([
                    sym("car"),
                    list([sym("quote"), list([sym("a"), sym("b")])]),
                ])),
            ),
            ("'", ErrorKind(ParseErrorKind::Incomplete)),
            // ===== GENERAL ERROR CASES =====
            ("", ErrorKind(ParseErrorKind::Incomplete)),
            ("   ", ErrorKind(ParseErrorKind::Incomplete)),
            ("(1 2 3", ErrorKind(ParseErrorKind::Incomplete)),
            ("((1 2)", ErrorKind(ParseErrorKind::Incomplete)),
            (")", ErrorKind(ParseErrorKind::InvalidSyntax)),
            (".", ErrorKind(ParseErrorKind::InvalidSyntax)),
            ("1 2", ErrorKind(ParseErrorKind::TrailingContent)),
            ("(+ 1 2) (+ 3 4)", ErrorKind(ParseErrorKind::TrailingContent)),
            ("(1 2))", ErrorKind(ParseErrorKind::TrailingContent)),
        ];

        run_parse_tests(test_cases);
    }

    #[test]
    fn test_parse_depth_limit() {
        let under = MAX_PARSE_DEPTH - 1;
        let parens_under_limit = format!("{}1{}", "(".repeat(under), ")".repeat(under));
        let parens_at_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let quotes_at_limit = format!("{}a", "'".repeat(MAX_PARSE_DEPTH + 1));

        assert!(parse_str(&parens_under_limit).is_ok());
        run_parse_tests(vec![
            (
                parens_at_limit.as_str(),
                ErrorKind(ParseErrorKind::TooDeeplyNested),
            ),
            (
                quotes_at_limit.as_str(),
                ErrorKind(ParseErrorKind::TooDeeplyNested),
            ),
        ]);
    }

    #[test]
    fn test_streaming_parse_to_end_of_input() {
        // The streaming entry point yields successive expressions, then the
        // distinguished no-expression result.
        let mut tokens = Tokenizer::new("(+ 1 2) foo 42");
        let first = parse(&mut tokens).unwrap().unwrap();
        assert_eq!(*first, list([sym("+"), int(1), int(2)]));
        let second = parse(&mut tokens).unwrap().unwrap();
        assert_eq!(*second, sym("foo"));
        let third = parse(&mut tokens).unwrap().unwrap();
        assert_eq!(*third, int(42));
        assert!(parse(&mut tokens).unwrap().is_none());
        // End of input is not the same as parsing () as a value
        assert_eq!(*parse_str("()").unwrap(), Expr::Nil);
    }
}
