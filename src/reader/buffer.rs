//! A buffer of tokens spanning lines of input.
//!
//! `Buffer` splices the per-line token vectors produced by its source into a
//! single stream, pulling new lines only on demand: `current` peeks at the
//! cursor, `pop` consumes. The `Display` implementation renders a window of
//! recently read lines with the cursor marked, for error messages.

use std::fmt;
use std::fmt::Write;

use super::{ReadError, Token};

pub struct Buffer<S> {
    source: S,
    lines: Vec<Vec<Token>>,
    index: usize,
    exhausted: bool,
}

impl<S> Buffer<S> {
    fn current_line(&self) -> &[Token] {
        self.lines.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether unconsumed tokens remain on the current line.
    pub fn more_on_line(&self) -> bool {
        self.index < self.current_line().len()
    }
}

impl<S> Buffer<S>
where
    S: Iterator<Item = Result<Vec<Token>, ReadError>>,
{
    pub fn new(source: S) -> Self {
        Buffer {
            source,
            lines: Vec::new(),
            index: 0,
            exhausted: false,
        }
    }

    /// The token at the cursor, pulling lines from the source as needed.
    ///
    /// Lines that tokenize to nothing (blank or comment-only) are skipped.
    /// Returns `Ok(None)` once the source is exhausted; an exhausted source
    /// is never polled again.
    pub fn current(&mut self) -> Result<Option<&Token>, ReadError> {
        while !self.more_on_line() {
            if self.exhausted {
                return Ok(None);
            }
            match self.source.next() {
                Some(Ok(line)) => {
                    self.index = 0;
                    self.lines.push(line);
                }
                Some(Err(err)) => return Err(err),
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        }
        Ok(self.current_line().get(self.index))
    }

    /// Remove and return the token at the cursor.
    ///
    /// Returns `Ok(None)` once the source is exhausted; the cursor does not
    /// move in that case, so repeated calls keep answering `Ok(None)`.
    pub fn pop(&mut self) -> Result<Option<Token>, ReadError> {
        let current = self.current()?.cloned();
        if current.is_some() {
            self.index += 1;
        }
        Ok(current)
    }
}

impl<S> fmt::Display for Buffer<S> {
    /// Recently read contents (up to four lines), with the position of the
    /// cursor marked by `>>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.lines.len();
        let width = count.max(1).to_string().len();

        let join = |tokens: &[Token]| {
            tokens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut rendered = String::new();
        for i in count.saturating_sub(4)..count.saturating_sub(1) {
            writeln!(rendered, "{:>width$}: {}", i + 1, join(&self.lines[i]))?;
        }
        let line = self.current_line();
        let cursor = self.index.min(line.len());
        write!(
            rendered,
            "{:>width$}: {} >> {}",
            count,
            join(&line[..cursor]),
            join(&line[cursor..])
        )?;
        f.write_str(rendered.trim())
    }
}
