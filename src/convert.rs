//! Top-level format conversion.
//!
//! Grounded on `plywoot.hpp`'s free function `convert(is, os, format)`:
//! reads every element through the schema-agnostic
//! [`ElementDataBlock`](crate::element_block::ElementDataBlock)
//! intermediate and re-emits it in the target format, without the caller
//! needing to know either format up front.

use std::io::{Read, Write};

use crate::error::Result;
use crate::reader::PlyReader;
use crate::schema::Format;
use crate::writer::PlyWriter;

/// Reads a complete PLY stream from `reader` and re-writes it to `writer`
/// in `target_format`, preserving comments and element/property order.
pub fn convert<R: Read, W: Write>(reader: R, writer: W, target_format: Format) -> Result<W> {
    let mut input = PlyReader::new(reader)?;
    let mut output = PlyWriter::with_comments(target_format, input.comments().to_vec());

    while input.current_element().is_some() {
        let block = input.read_element()?;
        output.add(block);
    }

    output.write(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn converts_ascii_to_binary_little_endian_and_back() {
        let ascii = b"ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n1 1 1\n".to_vec();

        let binary = convert(Cursor::new(ascii), Vec::new(), Format::BinaryLittleEndian).unwrap();
        let roundtripped = convert(Cursor::new(binary), Vec::new(), Format::Ascii).unwrap();

        let text = String::from_utf8(roundtripped).unwrap();
        assert_eq!(
            text,
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n1 1 1\n"
        );
    }
}
