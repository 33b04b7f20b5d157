//! Read-print loop for Scheme expressions.
//!
//! Reads expressions from standard input (or a file) and prints each one
//! back in canonical form; `--count` counts non-punctuator tokens instead.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use schemish::reader::{self, Buffer, ReadError, Token, Tokenizer};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Read Scheme expressions and print them back")]
struct Args {
    /// Input file; standard input when omitted.
    file: Option<PathBuf>,

    /// Count non-punctuator tokens instead of reading expressions.
    #[arg(long)]
    count: bool,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut lines = input.lines();

    if args.count {
        return count_tokens(lines);
    }

    let interactive = args.file.is_none();
    loop {
        if interactive {
            print!("read> ");
            io::stdout().flush()?;
        }
        // A fresh buffer per prompt group, so a bad line does not poison
        // everything after it.
        let mut buffer = Buffer::new(Tokenizer::new().tokenize_lines(&mut lines));
        match buffer.current() {
            Ok(Some(_)) => {}
            Ok(None) | Err(ReadError::Interrupted) => break,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        }
        while buffer.more_on_line() {
            match reader::read(&mut buffer) {
                Ok(expression) => println!("{expression}"),
                Err(ReadError::EndOfInput) => break,
                Err(ReadError::Interrupted) => return Ok(()),
                Err(err) => {
                    eprintln!("{err}");
                    tracing::debug!(position = %buffer, "read failed");
                    break;
                }
            }
        }
    }
    Ok(())
}

fn count_tokens<I>(lines: I) -> io::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut count = 0usize;
    for line in Tokenizer::new().tokenize_lines(lines) {
        let line = line?;
        count += line
            .iter()
            .filter(|token| !matches!(token, Token::Punctuator(_)))
            .count();
    }
    println!("counted {count} non-punctuator tokens");
    Ok(())
}
