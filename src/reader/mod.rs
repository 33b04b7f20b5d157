//! Reading: turning lines of text into Scheme expressions.
//!
//! [`Tokenizer`] lexes lines into [`Token`]s, [`Buffer`] splices the lines
//! into one stream, and [`read`] assembles expressions by recursive descent.
//! Quote punctuators expand to their two-element list forms here, so later
//! stages only ever see plain data.

mod buffer;
mod token;

pub use buffer::Buffer;
pub use token::{Punct, Token, TokenLines, Tokenizer};

use std::io;
use std::io::ErrorKind;

use thiserror::Error;

use crate::data::Value;

/// Why a read did not produce an expression.
///
/// Lexical and syntax errors are terminal for the current expression: no
/// additional input can repair them. Running out of input is different; an
/// interactive driver answers [`ReadError::EndOfInput`] by prompting for
/// more. Cancellation at the line source gets its own variant so a driver
/// can distinguish "stop reading" from "the input is broken".
#[derive(Debug, Error)]
pub enum ReadError {
    /// No token pattern matches the remaining text on a line.
    #[error("invalid token: {0}")]
    Lexical(String),
    /// Malformed expression structure.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The source is exhausted. Not a malformed-input condition.
    #[error("end of input")]
    EndOfInput,
    /// The read was cancelled at the line source.
    #[error("interrupted")]
    Interrupted,
    /// The line source failed.
    #[error("input error: {0}")]
    Source(#[source] io::Error),
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        if value.kind() == ErrorKind::Interrupted {
            ReadError::Interrupted
        } else {
            ReadError::Source(value)
        }
    }
}

impl From<ReadError> for io::Error {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Source(err) => err,
            ReadError::EndOfInput => io::Error::new(ErrorKind::UnexpectedEof, "end of input"),
            ReadError::Interrupted => io::Error::from(ErrorKind::Interrupted),
            other => io::Error::new(ErrorKind::InvalidInput, other.to_string()),
        }
    }
}

/// The symbol a quotation punctuator abbreviates.
fn quote_symbol(punct: Punct) -> Option<&'static str> {
    match punct {
        Punct::Quote => Some("quote"),
        Punct::Quasiquote => Some("quasiquote"),
        Punct::Unquote => Some("unquote"),
        Punct::UnquoteSplicing => Some("unquote-splicing"),
        _ => None,
    }
}

/// Read the next expression from `src`, consuming exactly its tokens.
///
/// Atoms read as themselves, `(` opens a list, and quotation punctuators
/// wrap the following expression: `'x` reads as `(quote x)`. Returns
/// [`ReadError::EndOfInput`] when the source is exhausted before any token
/// of the expression is seen; an expression cut off partway through is a
/// syntax error instead.
pub fn read<S>(src: &mut Buffer<S>) -> Result<Value, ReadError>
where
    S: Iterator<Item = Result<Vec<Token>, ReadError>>,
{
    let Some(token) = src.pop()? else {
        return Err(ReadError::EndOfInput);
    };
    match token {
        Token::Number(n) => Ok(Value::Number(n)),
        Token::Boolean(b) => Ok(Value::Boolean(b)),
        Token::Character(c) => Ok(Value::Character(c)),
        Token::Symbol(s) => Ok(Value::Symbol(s)),
        Token::String(s) => Ok(Value::String(s)),
        Token::Punctuator(p) => {
            if let Some(symbol) = quote_symbol(p) {
                let quoted = match read(src) {
                    Err(ReadError::EndOfInput) => {
                        return Err(ReadError::Syntax("unexpected end of file".to_owned()))
                    }
                    other => other?,
                };
                return Ok(Value::list([Value::Symbol(symbol.to_owned()), quoted]));
            }
            match p {
                Punct::LParen => read_tail(src, 0),
                p => Err(ReadError::Syntax(format!("unexpected token: {p}"))),
            }
        }
    }
}

/// Read the rest of a list whose `(` has already been consumed, including
/// the closing `)`. `item_count` is how many elements precede the cursor,
/// needed to validate dotted tails.
fn read_tail<S>(src: &mut Buffer<S>, item_count: usize) -> Result<Value, ReadError>
where
    S: Iterator<Item = Result<Vec<Token>, ReadError>>,
{
    let Some(token) = src.current()?.cloned() else {
        return Err(ReadError::Syntax("unexpected end of file".to_owned()));
    };
    match token {
        Token::Punctuator(Punct::RParen) => {
            src.pop()?;
            Ok(Value::Nil)
        }
        Token::Punctuator(Punct::Dot) => {
            if item_count == 0 {
                return Err(ReadError::Syntax(
                    ". must have at least one element before it".to_owned(),
                ));
            }
            src.pop()?;
            let tail = match read(src) {
                Err(ReadError::EndOfInput) => {
                    return Err(ReadError::Syntax("unexpected end of file".to_owned()))
                }
                other => other?,
            };
            match src.pop()? {
                Some(Token::Punctuator(Punct::RParen)) => Ok(tail),
                _ => Err(ReadError::Syntax(
                    "expected one element after .".to_owned(),
                )),
            }
        }
        _ => {
            let first = match read(src) {
                Err(ReadError::EndOfInput) => {
                    return Err(ReadError::Syntax("unexpected end of file".to_owned()))
                }
                other => other?,
            };
            let rest = read_tail(src, item_count + 1)?;
            Ok(Value::cons(first, rest))
        }
    }
}

/// Buffer an in-memory sequence of lines for reading.
pub fn buffer_lines<I>(lines: I) -> Buffer<impl Iterator<Item = Result<Vec<Token>, ReadError>>>
where
    I: IntoIterator<Item = String>,
{
    let lines = lines.into_iter().map(io::Result::Ok);
    Buffer::new(Tokenizer::new().tokenize_lines(lines))
}

/// Read a single expression from a single line of text.
pub fn read_line(line: &str) -> Result<Value, ReadError> {
    let mut buffer = buffer_lines([line.to_owned()]);
    read(&mut buffer)
}
