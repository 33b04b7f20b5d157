//! A reader front end for Scheme: tokenizer, token buffer, and
//! recursive-descent expression reader.
//!
//! The pipeline turns lines of text into expression trees:
//!
//! line source → [`reader::Tokenizer`] → [`reader::Buffer`] →
//! [`reader::read`] → [`data::Value`]
//!
//! Each stage pulls from the previous one on demand, so an interactive
//! driver can prompt line by line. Evaluation is out of scope; the
//! expression tree is plain data for whatever consumes it.

pub mod data;
pub mod reader;
