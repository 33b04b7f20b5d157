//! Module for extracting Scheme tokens from lines of input.
//!
//! One line becomes one `Vec<Token>`. Token categories are tried in a fixed
//! priority order and the first anchored pattern that matches wins; this
//! ordering is load-bearing (`#(` must not read as a boolean, and `+`, `-`,
//! `...` are identifiers exactly because the number grammar rejects them).
//!
//! The only state carried between lines is an unterminated string: while one
//! is pending, the next line may be used solely to continue it.

use std::fmt;
use std::io;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{Num, Zero};

use crate::data::{ratio_to_f64, Number};
use crate::reader::ReadError;

/// A Scheme token.
///
/// Whitespace and comments are ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(Number),
    Boolean(bool),
    Character(char),
    Symbol(String),
    String(String),
    Punctuator(Punct),
}

/// Structural punctuators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    Dot,
    VectorOpen,
}

impl Punct {
    pub fn as_str(self) -> &'static str {
        match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::Quote => "'",
            Punct::Quasiquote => "`",
            Punct::Unquote => ",",
            Punct::UnquoteSplicing => ",@",
            Punct::Dot => ".",
            Punct::VectorOpen => "#(",
        }
    }

    fn from_text(text: &str) -> Punct {
        match text {
            "(" => Punct::LParen,
            ")" => Punct::RParen,
            "'" => Punct::Quote,
            "`" => Punct::Quasiquote,
            "," => Punct::Unquote,
            ",@" => Punct::UnquoteSplicing,
            "." => Punct::Dot,
            "#(" => Punct::VectorOpen,
            other => unreachable!("punctuator pattern matched {other:?}"),
        }
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Boolean(true) => write!(f, "#t"),
            Token::Boolean(false) => write!(f, "#f"),
            Token::Character(' ') => write!(f, "#\\space"),
            Token::Character('\n') => write!(f, "#\\newline"),
            Token::Character(c) => write!(f, "#\\{c}"),
            Token::Symbol(s) => write!(f, "{s}"),
            Token::String(s) => crate::data::write_escaped_string(f, s),
            Token::Punctuator(p) => write!(f, "{p}"),
        }
    }
}

mod patterns {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn raw_string() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // A string that opens and closes on the same line. The lazy
            // repetition stops at the first quote that is not consumed as
            // part of an escape pair.
            Regex::new(r#"\A"(?:\\\\|\\"|[^\\])*?""#)
                .expect("could not compile regex for raw string")
        })
    }

    pub(super) fn string_start() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // A string that opens but does not close before the newline.
            Regex::new(r#"\A"(?:\\\\|\\"|[^\\])*\n"#)
                .expect("could not compile regex for string start")
        })
    }

    pub(super) fn string_end() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A(?:\\\\|\\"|[^\\])*?""#)
                .expect("could not compile regex for string end")
        })
    }

    pub(super) fn string_escape() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"(?s)\\(.)").expect("could not compile regex for string escape")
        })
    }

    pub(super) fn boolean() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A#[tTfF]").expect("could not compile regex for boolean")
        })
    }

    pub(super) fn character() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A(?:(?i:#\\space)|(?i:#\\newline)|(?s:#\\.))")
                .expect("could not compile regex for character")
        })
    }

    pub(super) fn number() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(&super::number_pattern()).expect("could not compile regex for number")
        })
    }

    pub(super) fn number_prefix() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Applied after lowercasing, so only lowercase markers appear.
            Regex::new(r"\A(?:#[bodx](?:#[ei])?|#[ei](?:#[bodx])?)")
                .expect("could not compile regex for number prefix")
        })
    }

    pub(super) fn identifier() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(
                r"\A(?:[a-zA-Z!\$%&\*/:<=>\?\^_~][a-zA-Z!\$%&\*/:<=>\?\^_~0-9\+\-\.@]*|\+|\-|\.\.\.)",
            )
            .expect("could not compile regex for identifier")
        })
    }

    pub(super) fn punctuator() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A(?:#\(|,@|[()'`,.])").expect("could not compile regex for punctuator")
        })
    }

    pub(super) fn comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r"\A;.*").expect("could not compile regex for comment"))
    }
}

/// Assemble the full numeric-literal pattern: an optional radix/exactness
/// prefix (either order, at most one of each) followed by a complex,
/// rational, decimal, or integer magnitude in the prefixed radix.
fn number_pattern() -> String {
    const EXACTNESS: &str = "(?:#[eEiI])";
    const SIGN: &str = "[+-]?";
    const SUFFIX: &str = "(?:[eEsSfFdDlL][+-]?[0-9]+)?";

    let prefix = |radix: &str| format!("(?:#[{radix}]{EXACTNESS}?|{EXACTNESS}#[{radix}])");
    let prefix_10 = format!("(?:{EXACTNESS}#[dD]|(?:#[dD])?{EXACTNESS}?)");

    let uinteger = |digits: &str| format!("[{digits}]+#*");
    let uint_2 = uinteger("01");
    let uint_8 = uinteger("0-7");
    let uint_10 = uinteger("0-9");
    let uint_16 = uinteger("0-9a-fA-F");

    let decimal_10 = format!(
        r"(?:\.[0-9]+#*{SUFFIX}|[0-9]+\.[0-9]*#*{SUFFIX}|[0-9]+#+\.#*{SUFFIX}|{uint_10}{SUFFIX})"
    );

    let ureal = |uint: &str| format!("(?:{uint}/{uint}|{uint})");
    let ureal_2 = ureal(&uint_2);
    let ureal_8 = ureal(&uint_8);
    let ureal_10 = format!("(?:{uint_10}/{uint_10}|{decimal_10}|{uint_10})");
    let ureal_16 = ureal(&uint_16);

    let complex = |ureal: &str| {
        let real = format!("{SIGN}{ureal}");
        format!("(?:{real}@{real}|{real}[+-]{ureal}?i|[+-]{ureal}?i|{real})")
    };

    format!(
        r"\A(?:{p2}{c2}|{p8}{c8}|{p10}{c10}|{p16}{c16})",
        p2 = prefix("bB"),
        c2 = complex(&ureal_2),
        p8 = prefix("oO"),
        c8 = complex(&ureal_8),
        p10 = prefix_10,
        c10 = complex(&ureal_10),
        p16 = prefix("xX"),
        c16 = complex(&ureal_16),
    )
}

/// Token categories in match-priority order; the first match wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Matcher {
    RawString,
    StringStart,
    Boolean,
    Character,
    Number,
    Identifier,
    Punctuator,
    Comment,
}

const MATCH_ORDER: [Matcher; 8] = [
    Matcher::RawString,
    Matcher::StringStart,
    Matcher::Boolean,
    Matcher::Character,
    Matcher::Number,
    Matcher::Identifier,
    Matcher::Punctuator,
    Matcher::Comment,
];

impl Matcher {
    fn regex(self) -> &'static regex::Regex {
        match self {
            Matcher::RawString => patterns::raw_string(),
            Matcher::StringStart => patterns::string_start(),
            Matcher::Boolean => patterns::boolean(),
            Matcher::Character => patterns::character(),
            Matcher::Number => patterns::number(),
            Matcher::Identifier => patterns::identifier(),
            Matcher::Punctuator => patterns::punctuator(),
            Matcher::Comment => patterns::comment(),
        }
    }
}

/// Cross-line carry-over: either idle, or accumulating the body of a string
/// whose closing quote has not been seen. While a string is pending, no
/// other token may start until it closes.
#[derive(Debug, Default)]
enum Continuation {
    #[default]
    Idle,
    PartialString(String),
}

/// Lexes lines of Scheme source code. One instance per input stream.
#[derive(Debug, Default)]
pub struct Tokenizer {
    continuation: Continuation,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer::default()
    }

    /// Tokenize a single line, excluding comments and whitespace.
    pub fn tokenize_line(&mut self, line: &str) -> Result<Vec<Token>, ReadError> {
        // Some input forms strip the trailing newline; matching assumes it.
        let mut line = line.to_owned();
        if !line.ends_with('\n') {
            line.push('\n');
        }

        let mut tokens = Vec::new();
        let mut position = 0;
        loop {
            let (token, next) = self.next_token(&line, position)?;
            position = next;
            match token {
                Some(token) => tokens.push(token),
                None => break,
            }
        }
        Ok(tokens)
    }

    /// Wrap a line iterator into a lazy per-line token iterator.
    pub fn tokenize_lines<I>(self, lines: I) -> TokenLines<I::IntoIter>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        TokenLines {
            tokenizer: self,
            lines: lines.into_iter(),
        }
    }

    /// Produce the next token at or after `position`, along with the
    /// position following it. `None` means the line is finished (end of
    /// line, a comment, or a string continuation that swallowed the rest).
    fn next_token(
        &mut self,
        line: &str,
        position: usize,
    ) -> Result<(Option<Token>, usize), ReadError> {
        // A pending string must be completed before normal scanning
        // resumes, and it always resumes at the start of a line.
        if let Continuation::PartialString(pending) = &mut self.continuation {
            debug_assert_eq!(position, 0, "pending string must resume at column 0");
            return match patterns::string_end().find(line) {
                Some(end) => {
                    let text = format!("{pending}{}", end.as_str());
                    self.continuation = Continuation::Idle;
                    Ok((Some(process_string(&text)), end.end()))
                }
                None => {
                    pending.push_str(line);
                    Ok((None, line.len()))
                }
            };
        }

        let bytes = line.as_bytes();
        let mut position = position;
        while position < line.len() && matches!(bytes[position], b' ' | b'\t' | b'\n' | b'\r') {
            position += 1;
        }
        if position == line.len() {
            return Ok((None, position));
        }

        let text = &line[position..];
        for matcher in MATCH_ORDER {
            if let Some(found) = matcher.regex().find(text) {
                let matched = found.as_str();
                let end = position + found.end();
                let token = self.classify(matched, matcher)?;
                check_termination(matched, matcher, line[end..].chars().next());
                return Ok((token, end));
            }
        }

        Err(ReadError::Lexical(text.trim_end_matches('\n').to_owned()))
    }

    /// Post-process matched text according to its category. Comments and
    /// string openings produce no token.
    fn classify(&mut self, text: &str, matcher: Matcher) -> Result<Option<Token>, ReadError> {
        Ok(match matcher {
            Matcher::RawString => Some(process_string(text)),
            Matcher::StringStart => {
                self.continuation = Continuation::PartialString(text.to_owned());
                None
            }
            Matcher::Boolean => Some(Token::Boolean(text.eq_ignore_ascii_case("#t"))),
            Matcher::Character => Some(Token::Character(process_character(text))),
            Matcher::Number => Some(Token::Number(process_number(text)?)),
            Matcher::Identifier => Some(Token::Symbol(text.to_lowercase())),
            Matcher::Punctuator => Some(Token::Punctuator(Punct::from_text(text))),
            Matcher::Comment => None,
        })
    }
}

/// Lazily tokenizes lines pulled from an underlying line source, one token
/// list per line. Never reads ahead of demand.
pub struct TokenLines<I> {
    tokenizer: Tokenizer,
    lines: I,
}

impl<I> Iterator for TokenLines<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<Vec<Token>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) => Some(self.tokenizer.tokenize_line(&line)),
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Collapse escape sequences in a quoted string and strip the quotes.
fn process_string(text: &str) -> Token {
    let inner = &text[1..text.len() - 1];
    let unescaped = patterns::string_escape().replace_all(inner, "${1}");
    Token::String(unescaped.into_owned())
}

/// The character a `#\` literal denotes. Multi-letter names are
/// case-insensitive; single-character forms keep their case.
fn process_character(text: &str) -> char {
    let name = &text[2..];
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => match name.to_ascii_lowercase().as_str() {
            "space" => ' ',
            "newline" => '\n',
            other => unreachable!("character pattern matched #\\{other}"),
        },
    }
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '(' | ')' | '"' | ';')
}

/// Warn when a token that requires explicit delimiting is followed by a
/// non-delimiter. Non-fatal; tokenization continues.
fn check_termination(text: &str, matcher: Matcher, next: Option<char>) {
    let delimited = next.map_or(true, is_delimiter);
    let undelimited = match matcher {
        Matcher::Number | Matcher::Identifier => !delimited,
        Matcher::Character => {
            text.chars().count() == 3
                && text.chars().nth(2).is_some_and(char::is_alphabetic)
                && !delimited
        }
        Matcher::Punctuator => text == "." && !delimited,
        _ => false,
    };
    if undelimited {
        tracing::warn!(
            token = %text,
            next = ?next,
            "token should be terminated by a delimiter"
        );
    }
}

/// Convert a numeric literal to its value.
///
/// Handles radix and exactness prefixes, fractions, base-10 decimals with
/// exponent markers, placeholder `#` digits, and rectangular/polar complex
/// forms. Complex literals are always inexact.
pub(crate) fn process_number(text: &str) -> Result<Number, ReadError> {
    let lowered = text.to_lowercase();
    let mut rest = lowered.as_str();

    let mut exact = false;
    let mut inexact = false;
    let mut radix = 10u32;
    if let Some(prefix) = patterns::number_prefix().find(rest) {
        let prefix = prefix.as_str();
        exact = prefix.contains("#e");
        inexact = prefix.contains("#i");
        radix = if prefix.contains("#b") {
            2
        } else if prefix.contains("#o") {
            8
        } else if prefix.contains("#x") {
            16
        } else {
            10
        };
        rest = &lowered[prefix.len()..];
    }

    // Remaining hash marks are placeholder digits with value zero.
    let body = rest.replace('#', "0");

    // Base-10 literals with a decimal point or an exponent marker take the
    // floating-point path. The radix gate keeps hex digits like `e` out.
    if radix == 10 && body.contains(['.', 'e', 's', 'f', 'd', 'l']) {
        let body: String = body
            .chars()
            .map(|c| if matches!(c, 's' | 'f' | 'd' | 'l') { 'e' } else { c })
            .collect();

        if let Some(parts) = body.strip_suffix('i') {
            let (real_text, imag_text) = split_rectangular(parts);
            return Ok(Number::Complex(Complex64::new(
                parse_f64(&real_text)?,
                parse_f64(&imag_text)?,
            )));
        }
        if let Some((magnitude, angle)) = body.split_once('@') {
            return Ok(Number::Complex(Complex64::from_polar(
                parse_f64(magnitude)?,
                parse_f64(angle)?,
            )));
        }
        if exact {
            return Ok(Number::exact(decimal_to_rational(&body)?));
        }
        return Ok(Number::Real(parse_f64(&body)?));
    }

    // Rectangular complex over exact parts, represented inexactly.
    if let Some(parts) = body.strip_suffix('i') {
        let split = parts.rfind(['+', '-']).unwrap_or(0);
        let (real_text, imag_text) = parts.split_at(split);
        let real_text = if real_text.is_empty() { "0" } else { real_text };
        let imag_text = match imag_text {
            "+" | "-" => format!("{imag_text}1"),
            s => s.to_owned(),
        };
        return Ok(Number::Complex(Complex64::new(
            ratio_to_f64(&parse_real(real_text, radix)?),
            ratio_to_f64(&parse_real(&imag_text, radix)?),
        )));
    }
    // Polar notation, also inexact.
    if let Some((magnitude, angle)) = body.split_once('@') {
        return Ok(Number::Complex(Complex64::from_polar(
            ratio_to_f64(&parse_real(magnitude, radix)?),
            ratio_to_f64(&parse_real(angle, radix)?),
        )));
    }

    // Rationals and integers.
    let value = parse_real(&body, radix)?;
    if inexact {
        Ok(Number::Real(ratio_to_f64(&value)))
    } else {
        Ok(Number::exact(value))
    }
}

/// Split the body of a rectangular float literal (`i` already stripped) at
/// the sign of the imaginary part, skipping signs that belong to exponents.
fn split_rectangular(text: &str) -> (String, String) {
    let bytes = text.as_bytes();
    let mut split = 0;
    for i in (0..bytes.len()).rev() {
        if matches!(bytes[i], b'+' | b'-') && (i == 0 || bytes[i - 1] != b'e') {
            split = i;
            break;
        }
    }
    let (real, imag) = text.split_at(split);
    let real = if real.is_empty() { "0" } else { real };
    let imag = match imag {
        // A bare sign means an imaginary part of one.
        "+" | "-" => format!("{imag}1"),
        s => s.to_owned(),
    };
    (real.to_owned(), imag)
}

/// Parse a fraction or integer in the given radix as an exact ratio.
fn parse_real(text: &str, radix: u32) -> Result<BigRational, ReadError> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_radix_int(numer, radix)?;
        let denom = parse_radix_int(denom, radix)?;
        if denom.is_zero() {
            return Err(ReadError::Lexical(format!(
                "zero denominator in rational literal: {text}"
            )));
        }
        Ok(BigRational::new(numer, denom))
    } else {
        Ok(BigRational::from_integer(parse_radix_int(text, radix)?))
    }
}

fn parse_radix_int(text: &str, radix: u32) -> Result<BigInt, ReadError> {
    BigInt::from_str_radix(text, radix)
        .map_err(|_| ReadError::Lexical(format!("malformed numeric literal: {text}")))
}

fn parse_f64(text: &str) -> Result<f64, ReadError> {
    text.parse::<f64>()
        .map_err(|_| ReadError::Lexical(format!("malformed numeric literal: {text}")))
}

/// Exact value of a base-10 decimal with optional exponent, e.g.
/// `1.5` → 3/2 and `12e1` → 120.
fn decimal_to_rational(text: &str) -> Result<BigRational, ReadError> {
    let (mantissa, exponent) = match text.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent.parse::<i32>().map_err(|_| {
                ReadError::Lexical(format!("malformed numeric literal: {text}"))
            })?,
        ),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };

    let digits = format!("{int_part}{frac_part}");
    let numerator = digits
        .parse::<BigInt>()
        .map_err(|_| ReadError::Lexical(format!("malformed numeric literal: {text}")))?;

    let power = exponent - frac_part.len() as i32;
    let ten = BigInt::from(10);
    if power >= 0 {
        Ok(BigRational::from_integer(
            numerator * num_traits::pow(ten, power as usize),
        ))
    } else {
        Ok(BigRational::new(
            numerator,
            num_traits::pow(ten, (-power) as usize),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &str) -> Vec<Token> {
        Tokenizer::new()
            .tokenize_line(line)
            .expect("tokenization failed")
    }

    fn number(literal: &str) -> Number {
        let tokens = tokenize(literal);
        assert_eq!(tokens.len(), 1, "expected one token for {literal:?}");
        match &tokens[0] {
            Token::Number(n) => n.clone(),
            other => panic!("expected number for {literal:?}, got {other:?}"),
        }
    }

    fn complex(literal: &str) -> Complex64 {
        match number(literal) {
            Number::Complex(c) => c,
            other => panic!("expected complex for {literal:?}, got {other:?}"),
        }
    }

    fn sym(s: &str) -> Token {
        Token::Symbol(s.to_owned())
    }

    #[test]
    fn tokenize_atoms() {
        let output = tokenize(r#"hello "hi" World 24601 -6"#);
        let want = [
            sym("hello"),
            Token::String("hi".to_owned()),
            sym("world"),
            Token::Number(Number::from(24601)),
            Token::Number(Number::from(-6)),
        ];

        assert_eq!(output.len(), want.len());
        for ((i, got), want) in output.iter().enumerate().zip(want.iter()) {
            assert_eq!(got, want, "unexpected token in case {}", i);
        }
    }

    #[test]
    fn tokenize_punctuators() {
        let output = tokenize("(+ 1 '(2 . 3)) `(,a ,@b) #(");
        let want = [
            Token::Punctuator(Punct::LParen),
            sym("+"),
            Token::Number(Number::from(1)),
            Token::Punctuator(Punct::Quote),
            Token::Punctuator(Punct::LParen),
            Token::Number(Number::from(2)),
            Token::Punctuator(Punct::Dot),
            Token::Number(Number::from(3)),
            Token::Punctuator(Punct::RParen),
            Token::Punctuator(Punct::RParen),
            Token::Punctuator(Punct::Quasiquote),
            Token::Punctuator(Punct::LParen),
            Token::Punctuator(Punct::Unquote),
            sym("a"),
            Token::Punctuator(Punct::UnquoteSplicing),
            sym("b"),
            Token::Punctuator(Punct::RParen),
            Token::Punctuator(Punct::VectorOpen),
        ];

        assert_eq!(output.len(), want.len());
        for ((i, got), want) in output.iter().enumerate().zip(want.iter()) {
            assert_eq!(got, want, "unexpected token in case {}", i);
        }
    }

    #[test]
    fn booleans_and_characters() {
        assert_eq!(
            tokenize(r"#t #F #\a #\A #\SPACE #\Newline #\( "),
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Character('a'),
                Token::Character('A'),
                Token::Character(' '),
                Token::Character('\n'),
                Token::Character('('),
            ]
        );
    }

    #[test]
    fn identifiers_are_lowercased() {
        assert_eq!(
            tokenize("Foo->Bar + - ... set!"),
            vec![sym("foo->bar"), sym("+"), sym("-"), sym("..."), sym("set!")]
        );
    }

    #[test]
    fn integers_in_all_radixes() {
        assert_eq!(number("42"), Number::from(42));
        assert_eq!(number("-7"), Number::from(-7));
        assert_eq!(number("+13"), Number::from(13));
        assert_eq!(number("#b101"), Number::from(5));
        assert_eq!(number("#o17"), Number::from(15));
        assert_eq!(number("#d42"), Number::from(42));
        assert_eq!(number("#xff"), Number::from(255));
        assert_eq!(number("#Xff"), Number::from(255));
        // Prefixes compose in either order.
        assert_eq!(number("#e#x10"), Number::from(16));
        assert_eq!(number("#x#e10"), Number::from(16));
    }

    #[test]
    fn fractions() {
        assert_eq!(
            number("3/4"),
            Number::Rational(BigRational::new(BigInt::from(3), BigInt::from(4)))
        );
        // Integral fractions collapse.
        assert_eq!(number("4/2"), Number::from(2));
        assert_eq!(
            number("#b1/10"),
            Number::Rational(BigRational::new(BigInt::from(1), BigInt::from(2)))
        );
        assert_eq!(number("#i1/2"), Number::from(0.5));
    }

    #[test]
    fn decimals_and_exponents() {
        assert_eq!(number(".5"), Number::from(0.5));
        assert_eq!(number("3."), Number::from(3.0));
        assert_eq!(number("-1.25"), Number::from(-1.25));
        assert_eq!(number("6.02e23"), Number::from(6.02e23));
        assert_eq!(number("1e-3"), Number::from(1e-3));
        // All exponent markers mean the same thing.
        for literal in ["1e2", "1s2", "1f2", "1d2", "1l2", "1E2", "1S2"] {
            assert_eq!(number(literal), Number::from(100.0), "literal {literal}");
        }
    }

    #[test]
    fn placeholder_digits_read_as_zero() {
        assert_eq!(number("10#"), Number::from(100));
        assert_eq!(number("12##."), Number::from(1200.0));
        assert_eq!(number("1#e1"), Number::from(100.0));
    }

    #[test]
    fn exactness_prefixes() {
        assert_eq!(number("#i5"), Number::from(5.0));
        assert_eq!(
            number("#e1.5"),
            Number::Rational(BigRational::new(BigInt::from(3), BigInt::from(2)))
        );
        assert_eq!(number("#e2.0"), Number::from(2));
        assert_eq!(number("#e12e1"), Number::from(120));
        assert_eq!(number("#e1e-2"), Number::Rational(BigRational::new(BigInt::from(1), BigInt::from(100))));
    }

    #[test]
    fn rectangular_complex() {
        assert_eq!(complex("3+4i"), Complex64::new(3.0, 4.0));
        assert_eq!(complex("-2i"), Complex64::new(0.0, -2.0));
        assert_eq!(complex("1-i"), Complex64::new(1.0, -1.0));
        assert_eq!(complex("1.5+2i"), Complex64::new(1.5, 2.0));
        assert_eq!(complex("1e2+3i"), Complex64::new(100.0, 3.0));
        assert_eq!(complex("#x1e+2i"), Complex64::new(30.0, 2.0));
        assert_eq!(complex("1/2+1/2i"), Complex64::new(0.5, 0.5));
        // Exactness prefixes do not make complex values exact.
        assert_eq!(complex("#e1.5+2i"), Complex64::new(1.5, 2.0));
    }

    #[test]
    fn polar_complex() {
        assert_eq!(complex("2@0"), Complex64::new(2.0, 0.0));
        assert_eq!(complex("2.5@0"), Complex64::new(2.5, 0.0));
        let got = complex("1@3");
        assert!((got.re - 3.0f64.cos()).abs() < 1e-12);
        assert!((got.im - 3.0f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn numeric_value_round_trips() {
        // Value-level round trip: rendering a tokenized number and
        // tokenizing the rendering reproduces an equal value.
        for literal in [
            "42", "-7", "3/4", "-5/16", "#xff", "#b101", "1.5", ".5", "3.",
            "6.02e23", "1s2", "#e1.5", "#i3", "#e#o17", "10#", "3+4i", "-2i",
            "2@0", "1.25e1",
        ] {
            let value = number(literal);
            let rendered = value.to_string();
            assert_eq!(
                number(&rendered),
                value,
                "round trip failed for {literal:?} via {rendered:?}"
            );
        }
    }

    #[test]
    fn numbers_win_over_identifiers() {
        assert_eq!(number("+5"), Number::from(5));
        // ...but bare signs and ellipsis are identifiers.
        assert_eq!(tokenize("+"), vec![sym("+")]);
        assert_eq!(tokenize("..."), vec![sym("...")]);
        // A dot alone is a punctuator.
        assert_eq!(tokenize("."), vec![Token::Punctuator(Punct::Dot)]);
    }

    #[test]
    fn string_escapes_collapse() {
        assert_eq!(
            tokenize(r#""say \"hi\" \\ok""#),
            vec![Token::String(r#"say "hi" \ok"#.to_owned())]
        );
        assert_eq!(tokenize(r#""""#), vec![Token::String(String::new())]);
    }

    #[test]
    fn multi_line_string() {
        let mut tokenizer = Tokenizer::new();
        let first = tokenizer.tokenize_line(r#"(foo "bar"#).unwrap();
        assert_eq!(
            first,
            vec![Token::Punctuator(Punct::LParen), sym("foo")]
        );

        let second = tokenizer.tokenize_line(r#"baz" 42)"#).unwrap();
        assert_eq!(
            second,
            vec![
                Token::String("bar\nbaz".to_owned()),
                Token::Number(Number::from(42)),
                Token::Punctuator(Punct::RParen),
            ]
        );
    }

    #[test]
    fn multi_line_string_swallows_whole_lines() {
        let mut tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.tokenize_line(r#""first"#).unwrap(), vec![]);
        assert_eq!(tokenizer.tokenize_line("middle").unwrap(), vec![]);
        assert_eq!(
            tokenizer.tokenize_line(r#"last" end"#).unwrap(),
            vec![Token::String("first\nmiddle\nlast".to_owned()), sym("end")]
        );
    }

    #[test]
    fn comments_and_blank_lines() {
        assert_eq!(tokenize("; a whole-line comment"), vec![]);
        assert_eq!(tokenize("   \t  "), vec![]);
        assert_eq!(tokenize(""), vec![]);
        assert_eq!(
            tokenize("(+ 1) ; trailing"),
            vec![
                Token::Punctuator(Punct::LParen),
                sym("+"),
                Token::Number(Number::from(1)),
                Token::Punctuator(Punct::RParen),
            ]
        );
    }

    #[test]
    fn vector_open_is_one_token() {
        assert_eq!(
            tokenize("#(1)"),
            vec![
                Token::Punctuator(Punct::VectorOpen),
                Token::Number(Number::from(1)),
                Token::Punctuator(Punct::RParen),
            ]
        );
    }

    #[test]
    fn invalid_token_reports_offending_text() {
        let err = Tokenizer::new().tokenize_line("#z").unwrap_err();
        match err {
            ReadError::Lexical(text) => assert!(text.contains("#z"), "got {text:?}"),
            other => panic!("expected lexical error, got {other:?}"),
        }
    }

    #[test]
    fn zero_denominator_is_a_lexical_error() {
        let err = Tokenizer::new().tokenize_line("1/0").unwrap_err();
        assert!(matches!(err, ReadError::Lexical(_)), "got {err:?}");
    }

    #[test]
    fn undelimited_tokens_warn_but_tokenize() {
        // `12ab` is a number followed by an identifier; the missing
        // delimiter is a warning, not an error.
        assert_eq!(
            tokenize("12ab"),
            vec![Token::Number(Number::from(12)), sym("ab")]
        );
    }

    #[test]
    fn tokenize_lines_is_lazy() {
        let lines = (0..).map(|i| Ok(format!("{i}")));
        let mut tokenized = Tokenizer::new().tokenize_lines(lines);
        // An infinite source must not be consumed eagerly.
        assert_eq!(
            tokenized.next().unwrap().unwrap(),
            vec![Token::Number(Number::from(0))]
        );
        assert_eq!(
            tokenized.next().unwrap().unwrap(),
            vec![Token::Number(Number::from(1))]
        );
    }
}
