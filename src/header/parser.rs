//! Recursive-descent parser that drives a [`HeaderScanner`] to build a
//! [`Schema`].
//!
//! Grounded on `header_parser.hpp`'s `HeaderParser::parse()`/`parseElement()`
//! grammar: `ply`, `format`, an interleaved run of `comment`/`obj_info` and
//! `element` blocks (each element itself followed by its `property` lines,
//! with comments allowed to interleave there too), terminated by
//! `end_header`.

use std::io::Read;

use crate::error::{PlyError, Result};
use crate::schema::{Comment, DataKind, Element, Format, Property, Schema};

use super::scanner::{HeaderScanner, Token};

pub struct HeaderParser<R> {
    scanner: HeaderScanner<R>,
}

impl<R: Read> HeaderParser<R> {
    pub fn new(reader: R) -> Self {
        HeaderParser {
            scanner: HeaderScanner::new(reader),
        }
    }

    /// Parses the header and returns the recovered schema along with the
    /// underlying reader, positioned at the first byte of the element data
    /// that follows `end_header`.
    pub fn parse(mut self) -> Result<(Schema, R)> {
        self.accept(Token::Ply)?;
        self.accept(Token::Format)?;
        let format = self.parse_format()?;
        // Version number, e.g. "1.0" — not a well-formed `Token::Number`
        // because of the embedded '.', so it is read as free text.
        self.expect_any()?;

        let mut comments = Vec::new();
        let mut elements = Vec::new();

        loop {
            let (token, text) = self.scanner.next_token()?;
            match token {
                Token::Comment | Token::ObjInfo => {
                    let line = self.scanner.line();
                    let rest = self.scanner.read_rest_of_line()?;
                    comments.push(Comment { line, text: rest });
                }
                Token::Element => {
                    let element = self.parse_element(&mut comments)?;
                    log::trace!(
                        target: "Parsing PLY header",
                        "element {}: {} rows, {} properties",
                        element.name,
                        element.count,
                        element.properties.len()
                    );
                    elements.push(element);
                }
                Token::EndHeader => break,
                Token::Eof => return Err(PlyError::UnexpectedEof),
                other => {
                    return Err(PlyError::UnexpectedToken {
                        expected: Token::Element,
                        found: other,
                        text,
                    })
                }
            }
        }

        log::debug!(
            target: "Parsing PLY header",
            "format {:?}, {} elements, {} leading comments",
            format,
            elements.len(),
            comments.len()
        );
        let schema = Schema::new(format, comments, elements);
        Ok((schema, self.scanner.into_inner()))
    }

    fn parse_format(&mut self) -> Result<Format> {
        let (token, text) = self.scanner.next_token()?;
        match token {
            Token::Ascii => Ok(Format::Ascii),
            Token::BinaryLittleEndian => Ok(Format::BinaryLittleEndian),
            Token::BinaryBigEndian => Ok(Format::BinaryBigEndian),
            _ => Err(PlyError::InvalidFormat(text)),
        }
    }

    fn parse_element(&mut self, comments: &mut Vec<Comment>) -> Result<Element> {
        let name = self.expect_identifier()?;
        let count = self.expect_number()?;

        let mut properties = Vec::new();
        loop {
            let (token, text) = self.scanner.next_token()?;
            match token {
                Token::Property => properties.push(self.parse_property()?),
                Token::Comment | Token::ObjInfo => {
                    let line = self.scanner.line();
                    let rest = self.scanner.read_rest_of_line()?;
                    comments.push(Comment { line, text: rest });
                }
                Token::Element | Token::EndHeader | Token::Eof => {
                    self.scanner.push_back_token(token, text);
                    break;
                }
                other => {
                    return Err(PlyError::UnexpectedToken {
                        expected: Token::Property,
                        found: other,
                        text,
                    })
                }
            }
        }

        Ok(Element::new(name, count as usize, properties))
    }

    fn parse_property(&mut self) -> Result<Property> {
        let (token, text) = self.scanner.next_token()?;
        match token {
            Token::List => {
                let size_type = self.expect_data_type()?;
                let element_type = self.expect_data_type()?;
                let name = self.expect_identifier()?;
                Ok(Property::list(name, size_type, element_type))
            }
            Token::DataType(kind) => {
                let name = self.expect_identifier()?;
                Ok(Property::scalar(name, kind))
            }
            other => Err(PlyError::UnexpectedToken {
                expected: Token::List,
                found: other,
                text,
            }),
        }
    }

    fn accept(&mut self, expected: Token) -> Result<()> {
        let (token, text) = self.scanner.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(PlyError::UnexpectedToken {
                expected,
                found: token,
                text,
            })
        }
    }

    fn expect_any(&mut self) -> Result<String> {
        let (_token, text) = self.scanner.next_token()?;
        Ok(text)
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let (token, text) = self.scanner.next_token()?;
        match token {
            Token::Identifier => Ok(text),
            other => Err(PlyError::UnexpectedToken {
                expected: Token::Identifier,
                found: other,
                text,
            }),
        }
    }

    fn expect_number(&mut self) -> Result<i64> {
        let (token, text) = self.scanner.next_token()?;
        match token {
            Token::Number => text
                .parse()
                .map_err(|_| PlyError::InvalidNumber { text }),
            other => Err(PlyError::UnexpectedToken {
                expected: Token::Number,
                found: other,
                text,
            }),
        }
    }

    fn expect_data_type(&mut self) -> Result<DataKind> {
        let (token, text) = self.scanner.next_token()?;
        match token {
            Token::DataType(kind) => Ok(kind),
            other => Err(PlyError::UnexpectedToken {
                expected: Token::DataType(DataKind::Int8),
                found: other,
                text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(src: &'static str) -> Schema {
        let parser = HeaderParser::new(Cursor::new(src.as_bytes().to_vec()));
        parser.parse().unwrap().0
    }

    #[test]
    fn parses_minimal_header() {
        let schema = parse(
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n",
        );
        assert_eq!(schema.format, Format::Ascii);
        assert_eq!(schema.elements.len(), 1);
        assert_eq!(schema.elements[0].name, "vertex");
        assert_eq!(schema.elements[0].count, 1);
        assert_eq!(schema.elements[0].properties.len(), 1);
    }

    #[test]
    fn parses_list_property_and_comments() {
        let schema = parse(
            "ply\nformat binary_little_endian 1.0\ncomment made by test\nelement face 2\nproperty list uchar int vertex_indices\nend_header\n",
        );
        assert_eq!(schema.format, Format::BinaryLittleEndian);
        assert_eq!(schema.comments.len(), 1);
        assert_eq!(schema.comments[0].text, "made by test");
        let prop = &schema.elements[0].properties[0];
        assert!(prop.is_list);
        assert_eq!(prop.size_type, DataKind::UInt8);
        assert_eq!(prop.element_type, DataKind::Int32);
    }

    #[test]
    fn parses_comment_interspersed_between_properties() {
        let schema = parse(
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\ncomment mid-element\nproperty float y\nend_header\n",
        );
        assert_eq!(schema.elements[0].properties.len(), 2);
        assert_eq!(schema.comments.len(), 1);
    }
}
