//! The ASCII format engine.
//!
//! Grounded on `parser.hpp`'s ASCII `FormatParserPolicy` and on
//! `header_scanner.hpp`'s whitespace-delimited tokenizing style, applied
//! here to the element body rather than the header.

use std::io::{Read, Write};

use crate::buffer::{BufferedInput, BufferedOutput};
use crate::element_block::{ElementDataBlock, RowField};
use crate::error::{PlyError, Result};
use crate::layout::{FieldTag, Layout, TypedRecords};
use crate::numeric::RawScalar;
use crate::schema::{DataKind, Element, Property};

fn read_token<R: Read>(input: &mut BufferedInput<R>) -> std::io::Result<Vec<u8>> {
    input.skip_whitespace()?;
    let mut token = Vec::new();
    loop {
        match input.peek_byte()? {
            Some(b) if b > 0x20 => {
                token.push(b);
                input.consume(1);
            }
            _ => break,
        }
    }
    Ok(token)
}

fn read_scalar<R: Read>(input: &mut BufferedInput<R>, kind: DataKind) -> Result<RawScalar> {
    let token = read_token(input)?;
    if token.is_empty() {
        return Err(PlyError::UnexpectedEof);
    }
    Ok(RawScalar::parse_ascii(kind, &token).0)
}

fn read_list_len<R: Read>(input: &mut BufferedInput<R>, prop: &Property) -> Result<usize> {
    let raw = read_scalar(input, prop.size_type)?;
    let n = raw.as_i64();
    if n < 0 {
        return Err(PlyError::NegativeListSize {
            property: prop.name.to_string(),
            value: n,
        });
    }
    Ok(n as usize)
}

fn write_scalar<W: Write>(output: &mut BufferedOutput<W>, raw: RawScalar, leading_space: bool) -> Result<()> {
    if leading_space {
        output.write_byte(b' ')?;
    }
    output.write_bytes(raw.format_ascii().as_bytes())?;
    Ok(())
}

pub fn read_element_block<R: Read>(input: &mut BufferedInput<R>, element: &Element) -> Result<ElementDataBlock> {
    let mut block = ElementDataBlock::new(element.clone());
    for _ in 0..element.count {
        for (index, prop) in element.properties.iter().enumerate() {
            if prop.is_list {
                let len = read_list_len(input, prop)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(read_scalar(input, prop.element_type)?);
                }
                block.push_list(index, values);
            } else {
                block.push_scalar(read_scalar(input, prop.element_type)?);
            }
        }
    }
    Ok(block)
}

pub fn write_element_block<W: Write>(output: &mut BufferedOutput<W>, block: &ElementDataBlock) -> Result<()> {
    for row in 0..block.row_count() {
        let mut first = true;
        block.read_row(row, |field| {
            match field {
                RowField::Scalar(_, raw) => {
                    write_scalar(output, raw, !first)?;
                    first = false;
                }
                RowField::List(prop, values) => {
                    let len_raw = crate::numeric::from_i64(values.len() as i64, prop.size_type);
                    write_scalar(output, len_raw, !first)?;
                    first = false;
                    for &v in values {
                        write_scalar(output, v, true)?;
                    }
                }
            }
            Ok(())
        })?;
        output.write_byte(b'\n')?;
    }
    Ok(())
}

/// Skips `element`'s records, discarding tokens without interpreting them
/// beyond what's needed to find list lengths.
pub fn skip_element<R: Read>(input: &mut BufferedInput<R>, element: &Element) -> Result<()> {
    for _ in 0..element.count {
        for prop in &element.properties {
            if prop.is_list {
                let len = read_list_len(input, prop)?;
                for _ in 0..len {
                    read_token(input)?;
                }
            } else {
                read_token(input)?;
            }
        }
    }
    Ok(())
}

pub fn read_typed<R: Read>(input: &mut BufferedInput<R>, element: &Element, layout: &Layout) -> Result<TypedRecords> {
    layout.validate(element)?;

    let list_positions = layout.list_field_positions();
    let mut fixed = Vec::with_capacity(layout.fixed_size() * element.count);
    let mut lists: Vec<Vec<Vec<RawScalar>>> = vec![Vec::with_capacity(element.count); list_positions.len()];

    for _ in 0..element.count {
        let mut prop_index = 0;
        let mut list_cursor = 0;
        for field in &layout.fields {
            match field {
                FieldTag::Scalar(kind) => {
                    let prop = &element.properties[prop_index];
                    let raw = read_scalar(input, prop.element_type)?;
                    push_converted(&mut fixed, raw, *kind);
                    prop_index += 1;
                }
                FieldTag::Pack(kind, n) => {
                    for _ in 0..*n {
                        let prop = &element.properties[prop_index];
                        let raw = read_scalar(input, prop.element_type)?;
                        push_converted(&mut fixed, raw, *kind);
                        prop_index += 1;
                    }
                }
                FieldTag::Array(kind, n) => {
                    let prop = &element.properties[prop_index];
                    let len = read_list_len(input, prop)?;
                    if len != *n {
                        return Err(PlyError::ArrayLengthMismatch {
                            property: prop.name.to_string(),
                            expected: *n,
                            found: len,
                        });
                    }
                    for _ in 0..len {
                        let raw = read_scalar(input, prop.element_type)?;
                        push_converted(&mut fixed, raw, *kind);
                    }
                    prop_index += 1;
                }
                FieldTag::List(kind) => {
                    let prop = &element.properties[prop_index];
                    let len = read_list_len(input, prop)?;
                    let mut values = Vec::with_capacity(len);
                    for _ in 0..len {
                        let raw = read_scalar(input, prop.element_type)?;
                        values.push(crate::numeric::convert(raw, *kind));
                    }
                    lists[list_cursor].push(values);
                    list_cursor += 1;
                    prop_index += 1;
                }
                FieldTag::Skip => {
                    let prop = &element.properties[prop_index];
                    if prop.is_list {
                        let len = read_list_len(input, prop)?;
                        for _ in 0..len {
                            read_token(input)?;
                        }
                    } else {
                        read_token(input)?;
                    }
                    prop_index += 1;
                }
                FieldTag::Stride(kind) => {
                    fixed.extend(std::iter::repeat(0u8).take(kind.size()));
                }
            }
        }
        for prop in &element.properties[prop_index..] {
            if prop.is_list {
                let len = read_list_len(input, prop)?;
                for _ in 0..len {
                    read_token(input)?;
                }
            } else {
                read_token(input)?;
            }
        }
    }

    Ok(TypedRecords { fixed, lists })
}

pub fn write_typed<W: Write>(
    output: &mut BufferedOutput<W>,
    element: &Element,
    layout: &Layout,
    records: &TypedRecords,
) -> Result<()> {
    layout.validate(element)?;

    let record_size = layout.fixed_size();
    for row in 0..element.count {
        let mut cursor = row * record_size;
        let mut prop_index = 0;
        let mut list_cursor = 0;
        let mut first = true;
        for field in &layout.fields {
            match field {
                FieldTag::Scalar(kind) => {
                    let prop = &element.properties[prop_index];
                    write_fixed_field(output, &records.fixed, &mut cursor, *kind, prop, !first)?;
                    first = false;
                    prop_index += 1;
                }
                FieldTag::Pack(kind, n) => {
                    for _ in 0..*n {
                        let prop = &element.properties[prop_index];
                        write_fixed_field(output, &records.fixed, &mut cursor, *kind, prop, !first)?;
                        first = false;
                        prop_index += 1;
                    }
                }
                FieldTag::Array(kind, n) => {
                    let prop = &element.properties[prop_index];
                    write_scalar(output, crate::numeric::from_i64(*n as i64, prop.size_type), !first)?;
                    first = false;
                    for _ in 0..*n {
                        write_fixed_field(output, &records.fixed, &mut cursor, *kind, prop, true)?;
                    }
                    prop_index += 1;
                }
                FieldTag::List(kind) => {
                    let prop = &element.properties[prop_index];
                    let values = &records.lists[list_cursor][row];
                    write_scalar(
                        output,
                        crate::numeric::from_i64(values.len() as i64, prop.size_type),
                        !first,
                    )?;
                    first = false;
                    for &v in values {
                        write_scalar(output, crate::numeric::convert(v, prop.element_type), true)?;
                    }
                    let _ = kind;
                    list_cursor += 1;
                    prop_index += 1;
                }
                FieldTag::Skip => {
                    prop_index += 1;
                }
                FieldTag::Stride(kind) => {
                    cursor += kind.size();
                }
            }
        }
        output.write_byte(b'\n')?;
    }
    Ok(())
}

fn write_fixed_field<W: Write>(
    output: &mut BufferedOutput<W>,
    fixed: &[u8],
    cursor: &mut usize,
    kind: DataKind,
    prop: &Property,
    leading_space: bool,
) -> Result<()> {
    let raw = RawScalar::read_binary::<byteorder::NativeEndian>(kind, &fixed[*cursor..*cursor + kind.size()]);
    *cursor += kind.size();
    write_scalar(output, crate::numeric::convert(raw, prop.element_type), leading_space)
}

fn push_converted(fixed: &mut Vec<u8>, raw: RawScalar, target: DataKind) {
    let converted = crate::numeric::convert(raw, target);
    let size = target.size();
    let mut buf = [0u8; 8];
    converted.write_binary::<byteorder::NativeEndian>(&mut buf[..size]);
    fixed.extend_from_slice(&buf[..size]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataKind, Property};
    use std::io::Cursor;

    #[test]
    fn round_trips_scalar_and_list_element() {
        let element = Element::new(
            "vertex",
            2,
            vec![
                Property::scalar("x", DataKind::Float32),
                Property::list("neighbors", DataKind::UInt8, DataKind::Int32),
            ],
        );
        let mut bytes = Vec::new();
        {
            let mut out = BufferedOutput::new(&mut bytes);
            let mut block = ElementDataBlock::new(element.clone());
            block.push_scalar(RawScalar::F32(1.5));
            block.push_list(1, vec![RawScalar::I32(1), RawScalar::I32(2)]);
            block.push_scalar(RawScalar::F32(-2.25));
            block.push_list(1, vec![RawScalar::I32(3)]);
            write_element_block(&mut out, &block).unwrap();
            out.flush().unwrap();
        }

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text, "1.5 2 1 2\n-2.25 1 3\n");

        let mut input = BufferedInput::new(Cursor::new(bytes));
        let block = read_element_block(&mut input, &element).unwrap();
        assert_eq!(block.row_count(), 2);
    }

    #[test]
    fn negative_list_size_is_rejected() {
        let element = Element::new(
            "face",
            1,
            vec![Property::list("idx", DataKind::Int16, DataKind::Int32)],
        );
        let mut input = BufferedInput::new(Cursor::new(b"-1\n".to_vec()));
        assert!(read_element_block(&mut input, &element).is_err());
    }
}
