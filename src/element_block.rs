//! Schema-agnostic, owned storage for one element's worth of decoded
//! records — the neutral intermediate representation format conversion
//! reads into and writes back out of.
//!
//! Grounded on `element_data.hpp`'s `PlyElementData`, which places a
//! `std::vector<T>` directly into raw aligned bytes via placement-new. That
//! construction has no safe Rust equivalent without `unsafe` code this
//! crate cannot validate by running a compiler or sanitizer, so the storage
//! here is a deliberate simplification (documented in `DESIGN.md`): scalar
//! properties live in one flat, host-endian byte buffer, each at its
//! natural alignment and with a reserved pointer-sized slot for every list
//! property so the stride matches what the byte-buffer layout would be if
//! lists were stored inline, and each list property's actual values live in
//! their own side column of owned `Vec`s. Every externally observable
//! invariant — ownership, drop-on-release, one row per record, row order
//! preserved — still holds.

use byteorder::NativeEndian;

use crate::numeric::RawScalar;
use crate::schema::{Element, Property};

/// One property's value for one row, as handed to a
/// [`read_row`](ElementDataBlock::read_row) callback.
pub enum RowField<'a> {
    Scalar(&'a Property, RawScalar),
    List(&'a Property, &'a [RawScalar]),
}

/// Per-record values of a single list property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListColumn {
    pub rows: Vec<Vec<RawScalar>>,
}

impl ListColumn {
    fn with_capacity(n: usize) -> Self {
        ListColumn {
            rows: Vec::with_capacity(n),
        }
    }
}

/// An owned, materialized copy of one element's records, decoded from
/// whichever format engine produced it and ready to be handed to any
/// other format engine's writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDataBlock {
    element: Element,
    row_stride: usize,
    field_offsets: Vec<usize>,
    row_buf: Vec<u8>,
    next_field: usize,
    scalars: Vec<u8>,
    lists: Vec<Option<ListColumn>>,
}

fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) / align * align
}

impl ElementDataBlock {
    /// Creates an empty block sized to hold `element.count` records.
    ///
    /// Each property is laid out at its natural alignment; a list property
    /// reserves a pointer-sized, pointer-aligned slot (its actual values
    /// live in the side `lists` column — the slot only exists so the
    /// buffer's layout matches the block's documented stride) and the
    /// overall stride is rounded up to the block's maximum alignment.
    pub fn new(element: Element) -> Self {
        let mut offset = 0usize;
        let mut max_align = 1usize;
        let mut field_offsets = Vec::with_capacity(element.properties.len());
        for p in &element.properties {
            let (size, align) = if p.is_list {
                (std::mem::size_of::<usize>(), std::mem::align_of::<usize>())
            } else {
                (p.element_type.size(), p.element_type.align())
            };
            offset = round_up(offset, align);
            field_offsets.push(offset);
            offset += size;
            max_align = max_align.max(align);
        }
        let row_stride = round_up(offset, max_align);

        let scalars = Vec::with_capacity(row_stride * element.count);
        let lists = element
            .properties
            .iter()
            .map(|p| {
                if p.is_list {
                    Some(ListColumn::with_capacity(element.count))
                } else {
                    None
                }
            })
            .collect();
        ElementDataBlock {
            element,
            row_stride,
            field_offsets,
            row_buf: vec![0u8; row_stride],
            next_field: 0,
            scalars,
            lists,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn row_count(&self) -> usize {
        self.scalars.len().checked_div(self.row_stride).unwrap_or(0).max(
            self.lists
                .iter()
                .filter_map(|c| c.as_ref())
                .map(|c| c.rows.len())
                .max()
                .unwrap_or(0),
        )
    }

    /// Appends one scalar property's value to the current (partially
    /// filled) row. Caller must append properties in schema order.
    pub fn push_scalar(&mut self, value: RawScalar) {
        let index = self.next_field;
        let kind = value.kind();
        let offset = self.field_offsets[index];
        value.write_binary::<NativeEndian>(&mut self.row_buf[offset..offset + kind.size()]);
        self.advance_field();
    }

    /// Appends one list property's row. `property_index` must refer to a
    /// property declared as a list in this block's element, and must equal
    /// the next property expected in row order.
    pub fn push_list(&mut self, property_index: usize, values: Vec<RawScalar>) {
        debug_assert_eq!(property_index, self.next_field);
        self.lists[property_index]
            .as_mut()
            .expect("push_list called on a scalar property")
            .rows
            .push(values);
        self.advance_field();
    }

    /// Advances to the next property in the current row, flushing the row
    /// buffer into the backing store once every property has been filled.
    fn advance_field(&mut self) {
        self.next_field += 1;
        if self.next_field == self.element.properties.len() {
            self.scalars.extend_from_slice(&self.row_buf);
            self.row_buf.iter_mut().for_each(|b| *b = 0);
            self.next_field = 0;
        }
    }

    /// Invokes `on_field` for every property of `row`, in schema order, to
    /// drive re-encoding by a format engine's writer. A single callback
    /// (rather than one per scalar/list case) keeps the writer free to
    /// capture its output stream mutably just once.
    pub fn read_row(
        &self,
        row: usize,
        mut on_field: impl FnMut(RowField<'_>) -> crate::error::Result<()>,
    ) -> crate::error::Result<()> {
        let row_start = row * self.row_stride;
        for (index, prop) in self.element.properties.iter().enumerate() {
            if prop.is_list {
                let column = self.lists[index]
                    .as_ref()
                    .expect("list property missing its column");
                on_field(RowField::List(prop, &column.rows[row]))?;
            } else {
                let size = prop.element_type.size();
                let offset = row_start + self.field_offsets[index];
                let raw = RawScalar::read_binary::<NativeEndian>(prop.element_type, &self.scalars[offset..offset + size]);
                on_field(RowField::Scalar(prop, raw))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataKind;

    #[test]
    fn round_trips_scalar_and_list_rows() {
        let element = Element::new(
            "face",
            2,
            vec![
                Property::scalar("confidence", DataKind::Float32),
                Property::list("vertex_indices", DataKind::UInt8, DataKind::Int32),
            ],
        );
        let mut block = ElementDataBlock::new(element);

        block.push_scalar(RawScalar::F32(0.5));
        block.push_list(1, vec![RawScalar::I32(0), RawScalar::I32(1), RawScalar::I32(2)]);

        block.push_scalar(RawScalar::F32(0.75));
        block.push_list(1, vec![RawScalar::I32(2), RawScalar::I32(3), RawScalar::I32(0)]);

        assert_eq!(block.row_count(), 2);

        let mut seen_scalars = Vec::new();
        let mut seen_lists = Vec::new();
        block
            .read_row(0, |field| {
                match field {
                    RowField::Scalar(_, v) => seen_scalars.push(v),
                    RowField::List(_, v) => seen_lists.push(v.to_vec()),
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(seen_scalars, vec![RawScalar::F32(0.5)]);
        assert_eq!(
            seen_lists,
            vec![vec![RawScalar::I32(0), RawScalar::I32(1), RawScalar::I32(2)]]
        );
    }
}
