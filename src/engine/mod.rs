//! The three concrete format engines (ASCII, binary little-endian, binary
//! big-endian) and the variant that erases the choice between them.
//!
//! Grounded on `parser.hpp`/`writer.hpp`'s `Parser<FormatParserPolicy>` /
//! `Writer<FormatWriterPolicy>` templates, and on their `parser_variant.hpp`
//! / `writer_variant.hpp` counterparts for the dispatch enum.

pub mod ascii;
pub mod binary;
pub mod dispatch;

pub use dispatch::{ReaderEngine, WriterEngine};
