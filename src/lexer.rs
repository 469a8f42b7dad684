//! The tokenizer: turns a character stream into a strictly ordered token
//! sequence. Whitespace is consumed and never emitted. An atom is a maximal
//! run of characters bounded by whitespace, `(`, or `)`; the boundary
//! character is left in place for the next token. `.` and `'` only form
//! their own tokens at a token boundary - inside an atom run (`3.14`) they
//! belong to the atom.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::value,
    sequence::preceded,
};

/// One token of the surface syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A symbol or numeric literal, classified later by the parser
    Atom(String),
    OpenParen,
    CloseParen,
    /// The improper-list marker `.`
    Dot,
    /// The quote shorthand marker `'`
    Quote,
    EndOfInput,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Atom(text) => write!(f, "'{text}'"),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Dot => write!(f, "'.'"),
            Token::Quote => write!(f, "'''"),
            Token::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Recognize a single token at the front of the input, skipping leading
/// whitespace. Fails only when nothing but whitespace remains.
fn lex_token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((
            value(Token::OpenParen, char('(')),
            value(Token::CloseParen, char(')')),
            value(Token::Quote, char('\'')),
            value(Token::Dot, char('.')),
            atom,
        )),
    )
    .parse(input)
}

fn atom(input: &str) -> IResult<&str, Token> {
    let (rest, text) =
        take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')').parse(input)?;
    Ok((rest, Token::Atom(text.to_owned())))
}

/// A token stream with one token of lookahead. `peek` is idempotent
/// relative to `next`: it may be called any number of times without
/// consuming, and `next` returns exactly what the last `peek` saw.
pub struct Tokenizer<'a> {
    rest: &'a str,
    peeked: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            rest: input,
            peeked: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        match &self.peeked {
            Some(token) => token.clone(),
            None => {
                let token = self.scan();
                self.peeked = Some(token.clone());
                token
            }
        }
    }

    /// Consume and return the next token. Once the stream is exhausted this
    /// keeps returning [`Token::EndOfInput`].
    #[expect(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        }
    }

    fn scan(&mut self) -> Token {
        match lex_token(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                token
            }
            // Only whitespace (or nothing) remains
            Err(_) => {
                self.rest = "";
                Token::EndOfInput
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drain a tokenizer, including the terminating EndOfInput.
    fn tokenize(input: &str) -> Vec<Token> {
        let mut tokens = Tokenizer::new(input);
        let mut out = Vec::new();
        loop {
            let token = tokens.next();
            let done = token == Token::EndOfInput;
            out.push(token);
            if done {
                return out;
            }
        }
    }

    fn atom(text: &str) -> Token {
        Token::Atom(text.to_owned())
    }

    #[test]
    fn test_token_sequences() {
        use Token::{CloseParen, Dot, EndOfInput, OpenParen, Quote};

        let test_cases = vec![
            ("", vec![EndOfInput]),
            ("   \t\n  ", vec![EndOfInput]),
            ("42", vec![atom("42"), EndOfInput]),
            ("foo", vec![atom("foo"), EndOfInput]),
            (
                "(+ 1 2)",
                vec![
                    OpenParen,
                    atom("+"),
                    atom("1"),
                    atom("2"),
                    CloseParen,
                    EndOfInput,
                ],
            ),
            ("()", vec![OpenParen, CloseParen, EndOfInput]),
            // No whitespace needed around parens: boundaries are exclusive
            (
                "(a(b)c)",
                vec![
                    OpenParen,
                    atom("a"),
                    OpenParen,
                    atom("b"),
                    CloseParen,
                    atom("c"),
                    CloseParen,
                    EndOfInput,
                ],
            ),
            // A leading dot is a Dot token; an embedded dot is part of the atom
            (
                "(1 . 2)",
                vec![OpenParen, atom("1"), Dot, atom("2"), CloseParen, EndOfInput],
            ),
            ("3.14", vec![atom("3.14"), EndOfInput]),
            (".5", vec![Dot, atom("5"), EndOfInput]),
            // Quote shorthand
            ("'x", vec![Quote, atom("x"), EndOfInput]),
            (
                "'(1 2)",
                vec![Quote, OpenParen, atom("1"), atom("2"), CloseParen, EndOfInput],
            ),
            ("''a", vec![Quote, Quote, atom("a"), EndOfInput]),
            // Symbol characters
            ("set!", vec![atom("set!"), EndOfInput]),
            ("<=", vec![atom("<="), EndOfInput]),
            (
                "  foo \t bar\nbaz ",
                vec![atom("foo"), atom("bar"), atom("baz"), EndOfInput],
            ),
        ];

        for (i, (input, expected)) in test_cases.iter().enumerate() {
            assert_eq!(
                tokenize(input),
                *expected,
                "token test #{} for '{input}'",
                i + 1
            );
        }
    }

    #[test]
    fn test_peek_is_idempotent() {
        let mut tokens = Tokenizer::new("(a)");
        assert_eq!(tokens.peek(), Token::OpenParen);
        assert_eq!(tokens.peek(), Token::OpenParen);
        assert_eq!(tokens.peek(), Token::OpenParen);
        assert_eq!(tokens.next(), Token::OpenParen);
        assert_eq!(tokens.peek(), atom("a"));
        assert_eq!(tokens.next(), atom("a"));
        assert_eq!(tokens.next(), Token::CloseParen);
        // Exhaustion is sticky
        assert_eq!(tokens.peek(), Token::EndOfInput);
        assert_eq!(tokens.next(), Token::EndOfInput);
        assert_eq!(tokens.next(), Token::EndOfInput);
    }
}
