//! Caller-declared record layouts: a runtime description of how an
//! element's properties map onto a caller's in-memory record shape.
//!
//! Grounded on `reflect.hpp`'s `Layout<Ts...>` template, reimplemented as a
//! runtime descriptor (`Vec<FieldTag>`) rather than a compile-time type
//! list: this crate favors the teacher's general preference for runtime
//! descriptors (`eclair`'s `RecordData` enum) over type-list generics, and
//! a runtime descriptor is also what lets [`PlyReader`](crate::reader::PlyReader)
//! accept a layout built from data the caller only knows at runtime (e.g.
//! a layout chosen by inspecting the schema first).

use crate::error::{PlyError, Result};
use crate::numeric::RawScalar;
use crate::schema::{DataKind, Element};

/// One field of a caller-declared record layout, matched in order against
/// an element's properties.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTag {
    /// A single scalar property, decoded/encoded as `DataKind`.
    Scalar(DataKind),
    /// `n` consecutive scalar properties of the same `DataKind`, packed
    /// contiguously into one fixed-size array field.
    Pack(DataKind, usize),
    /// A list property whose length is expected to always be `n`; mismatch
    /// is a hard error rather than silent truncation or over-read.
    Array(DataKind, usize),
    /// A list property of unknown length, materialized into an owned
    /// `Vec`.
    List(DataKind),
    /// Destination-only padding: advances the record cursor by
    /// `size_of(DataKind)` without consuming a source property. Models a
    /// field in the caller's struct that PLY data doesn't populate.
    Stride(DataKind),
    /// Consumes one source property without writing it anywhere.
    Skip,
}

impl FieldTag {
    /// Number of schema properties this field consumes.
    pub fn properties_consumed(&self) -> usize {
        match self {
            FieldTag::Scalar(_) => 1,
            FieldTag::Pack(_, n) => *n,
            FieldTag::Array(_, _) => 1,
            FieldTag::List(_) => 1,
            FieldTag::Stride(_) => 0,
            FieldTag::Skip => 1,
        }
    }

    /// Bytes this field occupies inline in the fixed-size portion of a
    /// record (list fields are stored out of line and contribute 0).
    pub fn inline_size(&self) -> usize {
        match self {
            FieldTag::Scalar(k) => k.size(),
            FieldTag::Pack(k, n) => k.size() * n,
            FieldTag::Array(k, n) => k.size() * n,
            FieldTag::Stride(k) => k.size(),
            FieldTag::List(_) | FieldTag::Skip => 0,
        }
    }
}

/// An ordered sequence of [`FieldTag`]s describing one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub fields: Vec<FieldTag>,
}

impl Layout {
    pub fn new(fields: Vec<FieldTag>) -> Self {
        Layout { fields }
    }

    /// Total inline (non-list) byte size of one record under this layout.
    pub fn fixed_size(&self) -> usize {
        self.fields.iter().map(FieldTag::inline_size).sum()
    }

    /// Total number of schema properties this layout consumes.
    pub fn properties_consumed(&self) -> usize {
        self.fields.iter().map(FieldTag::properties_consumed).sum()
    }

    /// Confirms this layout can be matched against `element`: it must not
    /// declare more properties than the element has. A layout declaring
    /// fewer is fine — the remaining trailing properties are read and
    /// discarded (a partial read).
    pub fn validate(&self, element: &Element) -> Result<()> {
        let declared = self.properties_consumed();
        if declared > element.properties.len() {
            return Err(PlyError::LayoutExceedsElement {
                element: element.name.to_string(),
                declared,
                available: element.properties.len(),
            });
        }
        Ok(())
    }

    /// True when this layout is a plain, padding-free, non-list
    /// one-to-one-or-packed match against `element`'s properties in order
    /// — the condition under which the binary engine may bulk-copy a
    /// whole record via a single `memcpy` instead of converting property
    /// by property.
    pub fn is_memcpyable(&self, element: &Element) -> bool {
        if self.properties_consumed() != element.properties.len() {
            return false;
        }
        let mut index = 0;
        for field in &self.fields {
            match field {
                FieldTag::Scalar(kind) => {
                    if !Self::matches(element, index, *kind) {
                        return false;
                    }
                    index += 1;
                }
                FieldTag::Pack(kind, n) => {
                    for _ in 0..*n {
                        if !Self::matches(element, index, *kind) {
                            return false;
                        }
                        index += 1;
                    }
                }
                FieldTag::Array(_, _) | FieldTag::List(_) | FieldTag::Stride(_) | FieldTag::Skip => {
                    return false;
                }
            }
        }
        true
    }

    fn matches(element: &Element, index: usize, kind: DataKind) -> bool {
        match element.properties.get(index) {
            Some(prop) => !prop.is_list && prop.element_type == kind,
            None => false,
        }
    }

    /// Positions within `fields` that are `FieldTag::List` — the only
    /// field kind whose storage cannot live inline in the fixed-size
    /// record buffer.
    pub fn list_field_positions(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| matches!(f, FieldTag::List(_)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Decoded (or to-be-encoded) records produced by matching a [`Layout`]
/// against one element's worth of data: a flat, row-major buffer for the
/// fixed-size portion of each record (host-endian, like
/// [`ElementDataBlock`](crate::element_block::ElementDataBlock)), plus one
/// out-of-line column per `FieldTag::List` field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedRecords {
    pub fixed: Vec<u8>,
    pub lists: Vec<Vec<Vec<RawScalar>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    fn vertex_element() -> Element {
        Element::new(
            "vertex",
            4,
            vec![
                Property::scalar("x", DataKind::Float32),
                Property::scalar("y", DataKind::Float32),
                Property::scalar("z", DataKind::Float32),
            ],
        )
    }

    #[test]
    fn pack_layout_is_memcpyable() {
        let layout = Layout::new(vec![FieldTag::Pack(DataKind::Float32, 3)]);
        assert!(layout.is_memcpyable(&vertex_element()));
    }

    #[test]
    fn partial_layout_is_not_memcpyable_but_validates() {
        let layout = Layout::new(vec![FieldTag::Scalar(DataKind::Float32)]);
        assert!(!layout.is_memcpyable(&vertex_element()));
        assert!(layout.validate(&vertex_element()).is_ok());
    }

    #[test]
    fn oversized_layout_fails_validation() {
        let layout = Layout::new(vec![FieldTag::Pack(DataKind::Float32, 4)]);
        assert!(layout.validate(&vertex_element()).is_err());
    }
}
