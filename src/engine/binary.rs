//! The binary format engine, generic over byte order.
//!
//! Instantiated at [`byteorder::LittleEndian`] and [`byteorder::BigEndian`]
//! for the two binary PLY formats. Grounded on `parser.hpp`'s
//! `MaybeMemcpyable` fast path: when a caller's [`Layout`] lines up
//! byte-for-byte with the element's on-disk property list, a whole record
//! is read with one `memcpy` instead of being converted property by
//! property — and since host byte order often matches the file's, that
//! copy can skip the endian swap entirely when `B` is the host's order.

use byteorder::ByteOrder;
use std::io::{Read, Write};

use crate::buffer::{BufferedInput, BufferedOutput};
use crate::element_block::{ElementDataBlock, RowField};
use crate::error::{PlyError, Result};
use crate::layout::{FieldTag, Layout, TypedRecords};
use crate::numeric::RawScalar;
use crate::schema::{DataKind, Element, Property};

fn read_scalar<B: ByteOrder, R: Read>(input: &mut BufferedInput<R>, kind: DataKind) -> Result<RawScalar> {
    let size = kind.size();
    let mut buf = [0u8; 8];
    input.read_exact_into(&mut buf[..size])?;
    Ok(RawScalar::read_binary::<B>(kind, &buf[..size]))
}

fn write_scalar<B: ByteOrder, W: Write>(output: &mut BufferedOutput<W>, raw: RawScalar) -> Result<()> {
    let size = raw.kind().size();
    let mut buf = [0u8; 8];
    raw.write_binary::<B>(&mut buf[..size]);
    output.write_bytes(&buf[..size])?;
    Ok(())
}

fn read_list_len<B: ByteOrder, R: Read>(input: &mut BufferedInput<R>, prop: &Property) -> Result<usize> {
    let raw = read_scalar::<B, R>(input, prop.size_type)?;
    let n = raw.as_i64();
    if n < 0 {
        return Err(PlyError::NegativeListSize {
            property: prop.name.to_string(),
            value: n,
        });
    }
    Ok(n as usize)
}

fn write_list_len<B: ByteOrder, W: Write>(
    output: &mut BufferedOutput<W>,
    prop: &Property,
    len: usize,
) -> Result<()> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let raw = crate::numeric::from_i64(len, prop.size_type);
    if raw.as_i64() != len {
        return Err(PlyError::NegativeListSize {
            property: prop.name.to_string(),
            value: len,
        });
    }
    write_scalar::<B, W>(output, raw)
}

/// Reads all of `element`'s records into a schema-agnostic block.
pub fn read_element_block<B: ByteOrder, R: Read>(
    input: &mut BufferedInput<R>,
    element: &Element,
) -> Result<ElementDataBlock> {
    let mut block = ElementDataBlock::new(element.clone());
    for _ in 0..element.count {
        for (index, prop) in element.properties.iter().enumerate() {
            if prop.is_list {
                let len = read_list_len::<B, R>(input, prop)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(read_scalar::<B, R>(input, prop.element_type)?);
                }
                block.push_list(index, values);
            } else {
                block.push_scalar(read_scalar::<B, R>(input, prop.element_type)?);
            }
        }
    }
    Ok(block)
}

/// Writes a schema-agnostic block back out in this engine's binary format.
pub fn write_element_block<B: ByteOrder, W: Write>(
    output: &mut BufferedOutput<W>,
    block: &ElementDataBlock,
) -> Result<()> {
    for row in 0..block.row_count() {
        block.read_row(row, |field| match field {
            RowField::Scalar(_, raw) => write_scalar::<B, W>(output, raw),
            RowField::List(prop, values) => {
                write_list_len::<B, W>(output, prop, values.len())?;
                for &v in values {
                    write_scalar::<B, W>(output, v)?;
                }
                Ok(())
            }
        })?;
    }
    Ok(())
}

/// Skips `element`'s records without materializing them. List properties
/// still have to be walked one at a time to discover their length.
pub fn skip_element<B: ByteOrder, R: Read>(input: &mut BufferedInput<R>, element: &Element) -> Result<()> {
    for _ in 0..element.count {
        for prop in &element.properties {
            if prop.is_list {
                let len = read_list_len::<B, R>(input, prop)?;
                input.skip(len * prop.element_type.size())?;
            } else {
                input.skip(prop.element_type.size())?;
            }
        }
    }
    Ok(())
}

/// Reads `element`'s records according to `layout`, taking the bulk-`memcpy`
/// fast path when `layout.is_memcpyable(element)` and `B` matches the
/// host's native byte order.
fn is_native_order<B: ByteOrder + 'static>() -> bool {
    std::any::TypeId::of::<B>() == std::any::TypeId::of::<byteorder::NativeEndian>()
}

pub fn read_typed<B: ByteOrder + 'static, R: Read>(
    input: &mut BufferedInput<R>,
    element: &Element,
    layout: &Layout,
) -> Result<TypedRecords> {
    layout.validate(element)?;

    if layout.is_memcpyable(element) && is_native_order::<B>() {
        let record_size = layout.fixed_size();
        let mut fixed = vec![0u8; record_size * element.count];
        input.read_exact_into(&mut fixed)?;
        return Ok(TypedRecords { fixed, lists: Vec::new() });
    }

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
                    let raw = read_scalar::<B, R>(input, prop.element_type)?;
                    push_converted(&mut fixed, raw, *kind);
                    prop_index += 1;
                }
                FieldTag::Pack(kind, n) => {
                    for _ in 0..*n {
                        let prop = &element.properties[prop_index];
                        let raw = read_scalar::<B, R>(input, prop.element_type)?;
                        push_converted(&mut fixed, raw, *kind);
                        prop_index += 1;
                    }
                }
                FieldTag::Array(kind, n) => {
                    let prop = &element.properties[prop_index];
                    let len = read_list_len::<B, R>(input, prop)?;
                    if len != *n {
                        return Err(PlyError::ArrayLengthMismatch {
                            property: prop.name.to_string(),
                            expected: *n,
                            found: len,
                        });
                    }
                    for _ in 0..len {
                        let raw = read_scalar::<B, R>(input, prop.element_type)?;
                        push_converted(&mut fixed, raw, *kind);
                    }
                    prop_index += 1;
                }
                FieldTag::List(kind) => {
                    let prop = &element.properties[prop_index];
                    let len = read_list_len::<B, R>(input, prop)?;
                    let mut values = Vec::with_capacity(len);
                    for _ in 0..len {
                        let raw = read_scalar::<B, R>(input, prop.element_type)?;
                        values.push(crate::numeric::convert(raw, *kind));
                    }
                    lists[list_cursor].push(values);
                    list_cursor += 1;
                    prop_index += 1;
                }
                FieldTag::Skip => {
                    let prop = &element.properties[prop_index];
                    if prop.is_list {
                        let len = read_list_len::<B, R>(input, prop)?;
                        input.skip(len * prop.element_type.size())?;
                    } else {
                        input.skip(prop.element_type.size())?;
                    }
                    prop_index += 1;
                }
                FieldTag::Stride(kind) => {
                    fixed.extend(std::iter::repeat(0u8).take(kind.size()));
                }
            }
        }
        // Trailing properties beyond what the layout consumes are read and
        // discarded: a partial-property-read layout is valid.
        for prop in &element.properties[prop_index..] {
            if prop.is_list {
                let len = read_list_len::<B, R>(input, prop)?;
                input.skip(len * prop.element_type.size())?;
            } else {
                input.skip(prop.element_type.size())?;
            }
        }
    }

    Ok(TypedRecords { fixed, lists })
}

/// Writes `records` according to `layout`, taking the bulk-`memcpy` fast
/// path under the same conditions as [`read_typed`].
pub fn write_typed<B: ByteOrder + 'static, W: Write>(
    output: &mut BufferedOutput<W>,
    element: &Element,
    layout: &Layout,
    records: &TypedRecords,
) -> Result<()> {
    layout.validate(element)?;

    if layout.is_memcpyable(element) && is_native_order::<B>() {
        output.write_bytes(&records.fixed)?;
        return Ok(());
    }

    let record_size = layout.fixed_size();
    for row in 0..element.count {
        let mut cursor = row * record_size;
        let mut prop_index = 0;
        let mut list_cursor = 0;
        for field in &layout.fields {
            match field {
                FieldTag::Scalar(kind) => {
                    let prop = &element.properties[prop_index];
                    write_fixed_field::<B, W>(output, &records.fixed, &mut cursor, *kind, prop)?;
                    prop_index += 1;
                }
                FieldTag::Pack(kind, n) => {
                    for _ in 0..*n {
                        let prop = &element.properties[prop_index];
                        write_fixed_field::<B, W>(output, &records.fixed, &mut cursor, *kind, prop)?;
                        prop_index += 1;
                    }
                }
                FieldTag::Array(kind, n) => {
                    let prop = &element.properties[prop_index];
                    write_list_len::<B, W>(output, prop, *n)?;
                    for _ in 0..*n {
                        write_fixed_field::<B, W>(output, &records.fixed, &mut cursor, *kind, prop)?;
                    }
                    prop_index += 1;
                }
                FieldTag::List(kind) => {
                    let prop = &element.properties[prop_index];
                    let values = &records.lists[list_cursor][row];
                    write_list_len::<B, W>(output, prop, values.len())?;
                    for &v in values {
                        write_scalar::<B, W>(output, crate::numeric::convert(v, prop.element_type))?;
                    }
                    let _ = kind;
                    list_cursor += 1;
                    prop_index += 1;
                }
                FieldTag::Skip => {
                    // A layout that skips a property when reading has
                    // nothing to supply for it when writing; callers that
                    // round-trip through a Skip field are expected to use
                    // the schema-agnostic ElementDataBlock path instead.
                    prop_index += 1;
                }
                FieldTag::Stride(kind) => {
                    cursor += kind.size();
                }
            }
        }
    }
    Ok(())
}

fn write_fixed_field<B: ByteOrder, W: Write>(
    output: &mut BufferedOutput<W>,
    fixed: &[u8],
    cursor: &mut usize,
    kind: DataKind,
    prop: &Property,
) -> Result<()> {
    let raw = RawScalar::read_binary::<byteorder::NativeEndian>(kind, &fixed[*cursor..*cursor + kind.size()]);
    *cursor += kind.size();
    write_scalar::<B, W>(output, crate::numeric::convert(raw, prop.element_type))
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
    use byteorder::LittleEndian;
    use std::io::Cursor;

    #[test]
    fn round_trips_scalar_and_list_element() {
        let element = Element::new(
            "face",
            1,
            vec![
                Property::scalar("flag", DataKind::UInt8),
                Property::list("vertex_indices", DataKind::UInt8, DataKind::Int32),
            ],
        );
        let mut bytes = Vec::new();
        {
            let mut out = BufferedOutput::new(&mut bytes);
            let mut block = ElementDataBlock::new(element.clone());
            block.push_scalar(RawScalar::U8(7));
            block.push_list(1, vec![RawScalar::I32(0), RawScalar::I32(1), RawScalar::I32(2)]);
            write_element_block::<LittleEndian, _>(&mut out, &block).unwrap();
            out.flush().unwrap();
        }

        let mut input = BufferedInput::new(Cursor::new(bytes));
        let block = read_element_block::<LittleEndian, _>(&mut input, &element).unwrap();
        assert_eq!(block.row_count(), 1);
    }

    #[test]
    fn skip_element_consumes_variable_length_lists() {
        let element = Element::new(
            "face",
            2,
            vec![Property::list(
                "vertex_indices",
                DataKind::UInt8,
                DataKind::Int32,
            )],
        );
        let mut bytes = Vec::new();
        {
            let mut out = BufferedOutput::new(&mut bytes);
            let mut block = ElementDataBlock::new(element.clone());
            block.push_list(0, vec![RawScalar::I32(1), RawScalar::I32(2), RawScalar::I32(3)]);
            block.push_list(0, vec![RawScalar::I32(4)]);
            write_element_block::<LittleEndian, _>(&mut out, &block).unwrap();
            out.flush().unwrap();
        }

        let mut input = BufferedInput::new(Cursor::new(bytes));
        skip_element::<LittleEndian, _>(&mut input, &element).unwrap();
        assert_eq!(input.require(1).unwrap(), 0);
    }
}
