use thiserror::Error;

use crate::header::scanner::Token;

/// Errors produced while parsing or writing PLY data.
#[derive(Error, Debug)]
pub enum PlyError {
    #[error("input stream is not readable")]
    InvalidInputStream,

    #[error("unexpected token {found:?} (={text:?}), expected {expected:?}")]
    UnexpectedToken {
        expected: Token,
        found: Token,
        text: String,
    },

    #[error("invalid format specification: {0:?}")]
    InvalidFormat(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("I/O error")]
    IoError(#[from] std::io::Error),

    #[error("invalid UTF-8 in PLY header")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error(
        "list property {property:?} has a negative size prefix ({value}); negative list sizes are invalid"
    )]
    NegativeListSize { property: String, value: i64 },

    #[error(
        "layout declares {declared} properties for element {element:?}, which only has {available}"
    )]
    LayoutExceedsElement {
        element: String,
        declared: usize,
        available: usize,
    },

    #[error(
        "fixed-size array layout for property {property:?} expects {expected} elements, found {found} on disk"
    )]
    ArrayLengthMismatch {
        property: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid numeric literal {text:?} in PLY header")]
    InvalidNumber { text: String },
}

pub type Result<T> = std::result::Result<T, PlyError>;
