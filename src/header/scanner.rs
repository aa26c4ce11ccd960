//! Header tokenizer.
//!
//! Grounded on `header_scanner.hpp`: the header is line-oriented ASCII text,
//! tokenized word by word, with `comment`/`obj_info` lines switching the
//! scanner into a free-text mode for the remainder of the line.

use std::io::{self, Read};

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::schema::DataKind;

/// A single lexical token recognized in a PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Ply,
    Format,
    Comment,
    ObjInfo,
    Element,
    Property,
    List,
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
    DataType(DataKind),
    Identifier,
    Number,
    EndHeader,
    Eof,
}

static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("ply", Token::Ply);
    m.insert("format", Token::Format);
    m.insert("comment", Token::Comment);
    m.insert("obj_info", Token::ObjInfo);
    m.insert("element", Token::Element);
    m.insert("property", Token::Property);
    m.insert("list", Token::List);
    m.insert("ascii", Token::Ascii);
    m.insert("binary_little_endian", Token::BinaryLittleEndian);
    m.insert("binary_big_endian", Token::BinaryBigEndian);
    m.insert("end_header", Token::EndHeader);
    m.insert("char", Token::DataType(DataKind::Int8));
    m.insert("int8", Token::DataType(DataKind::Int8));
    m.insert("uchar", Token::DataType(DataKind::UInt8));
    m.insert("uint8", Token::DataType(DataKind::UInt8));
    m.insert("short", Token::DataType(DataKind::Int16));
    m.insert("int16", Token::DataType(DataKind::Int16));
    m.insert("ushort", Token::DataType(DataKind::UInt16));
    m.insert("uint16", Token::DataType(DataKind::UInt16));
    m.insert("int", Token::DataType(DataKind::Int32));
    m.insert("int32", Token::DataType(DataKind::Int32));
    m.insert("uint", Token::DataType(DataKind::UInt32));
    m.insert("uint32", Token::DataType(DataKind::UInt32));
    m.insert("float", Token::DataType(DataKind::Float32));
    m.insert("float32", Token::DataType(DataKind::Float32));
    m.insert("double", Token::DataType(DataKind::Float64));
    m.insert("float64", Token::DataType(DataKind::Float64));
    m
});

fn looks_like_number(word: &str) -> bool {
    !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'-' || b == b'+')
        && word.bytes().any(|b| b.is_ascii_digit())
}

/// Tokenizes a PLY header out of a byte stream.
///
/// Owns the stream directly (rather than a `BufferedInput` wrapper) because
/// the header is read a byte at a time regardless; the body engines take
/// over with the buffered wrapper once `end_header` has been consumed.
pub struct HeaderScanner<R> {
    reader: R,
    pushback: Option<u8>,
    pending_token: Option<(Token, String)>,
    line: u32,
}

impl<R: Read> HeaderScanner<R> {
    pub fn new(reader: R) -> Self {
        HeaderScanner {
            reader,
            pushback: None,
            pending_token: None,
            line: 0,
        }
    }

    /// Pushes a single already-read token back, so the next call to
    /// [`next_token`](Self::next_token) returns it again. Used by the
    /// parser's one-token lookahead when deciding whether a property list
    /// has ended.
    pub fn push_back_token(&mut self, token: Token, text: String) {
        debug_assert!(self.pending_token.is_none());
        self.pending_token = Some((token, text));
    }

    /// The 0-based count of newlines consumed so far.
    pub fn line(&self) -> u32 {
        self.line
    }

    fn read_raw_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.take() {
            return Ok(Some(b));
        }
        let mut byte = [0u8; 1];
        match self.reader.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn push_back(&mut self, b: u8) {
        debug_assert!(self.pushback.is_none());
        self.pushback = Some(b);
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        loop {
            match self.read_raw_byte()? {
                Some(b'\n') => self.line += 1,
                Some(b) if b <= 0x20 => {}
                Some(b) => {
                    self.push_back(b);
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    /// Reads the next whitespace-delimited word, returning `None` at EOF.
    fn next_word(&mut self) -> io::Result<Option<String>> {
        self.skip_whitespace()?;
        let mut word = Vec::new();
        loop {
            match self.read_raw_byte()? {
                Some(b'\n') => {
                    self.push_back(b'\n');
                    break;
                }
                Some(b) if b <= 0x20 => break,
                Some(b) => word.push(b),
                None => break,
            }
        }
        if word.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&word).into_owned()))
        }
    }

    /// Reads the next token and its literal text.
    pub fn next_token(&mut self) -> io::Result<(Token, String)> {
        if let Some(pending) = self.pending_token.take() {
            return Ok(pending);
        }
        match self.next_word()? {
            None => Ok((Token::Eof, String::new())),
            Some(word) => {
                if let Some(tok) = KEYWORDS.get(word.as_str()) {
                    Ok((*tok, word))
                } else if looks_like_number(&word) {
                    Ok((Token::Number, word))
                } else {
                    Ok((Token::Identifier, word))
                }
            }
        }
    }

    /// Reads the remainder of the current line verbatim (leading
    /// whitespace after the keyword stripped), used for `comment` and
    /// `obj_info` lines whose text must not be tokenized.
    pub fn read_rest_of_line(&mut self) -> io::Result<String> {
        // Consume exactly one run of horizontal whitespace separating the
        // keyword from the text, matching the original's handling of
        // "comment   some text" as text == "some text".
        loop {
            match self.read_raw_byte()? {
                Some(b' ') | Some(b'\t') => continue,
                Some(b'\n') => {
                    self.line += 1;
                    return Ok(String::new());
                }
                Some(b) => {
                    self.push_back(b);
                    break;
                }
                None => return Ok(String::new()),
            }
        }

        let mut text = Vec::new();
        loop {
            match self.read_raw_byte()? {
                Some(b'\n') => {
                    self.line += 1;
                    break;
                }
                Some(b) => text.push(b),
                None => break,
            }
        }
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    /// Consumes and returns the underlying reader, leaving it positioned
    /// immediately after the newline that terminates `end_header`.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tokenizes_keywords_and_identifiers() {
        let mut scanner = HeaderScanner::new(Cursor::new(b"element vertex 8\n".to_vec()));
        assert_eq!(scanner.next_token().unwrap().0, Token::Element);
        assert_eq!(scanner.next_token().unwrap().0, Token::Identifier);
        assert_eq!(scanner.next_token().unwrap().0, Token::Number);
        assert_eq!(scanner.next_token().unwrap().0, Token::Eof);
    }

    #[test]
    fn tokenizes_data_type_keywords() {
        let mut scanner = HeaderScanner::new(Cursor::new(b"property float x\n".to_vec()));
        assert_eq!(scanner.next_token().unwrap().0, Token::Property);
        assert_eq!(
            scanner.next_token().unwrap().0,
            Token::DataType(DataKind::Float32)
        );
    }

    #[test]
    fn reads_comment_text_verbatim() {
        let mut scanner =
            HeaderScanner::new(Cursor::new(b"comment generated by test  \n".to_vec()));
        assert_eq!(scanner.next_token().unwrap().0, Token::Comment);
        assert_eq!(
            scanner.read_rest_of_line().unwrap(),
            "generated by test  "
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let mut scanner = HeaderScanner::new(Cursor::new(b"ply\nformat ascii 1.0\n".to_vec()));
        assert_eq!(scanner.line(), 0);
        scanner.next_token().unwrap();
        scanner.next_token().unwrap();
        assert_eq!(scanner.line(), 1);
    }
}
