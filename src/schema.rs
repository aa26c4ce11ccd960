//! The schema model: the immutable types recovered from a PLY header.

use smallstr::SmallString;

/// Short, stack-allocated string type used for element and property names.
///
/// PLY identifiers are almost always a handful of ASCII characters (`x`,
/// `vertex_indices`, ...); inlining them avoids a heap allocation per name.
pub type Name = SmallString<[u8; 16]>;

/// The eight scalar data types supported by the PLY format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl DataKind {
    /// The on-disk byte size of a single value of this kind.
    pub const fn size(self) -> usize {
        match self {
            DataKind::Int8 | DataKind::UInt8 => 1,
            DataKind::Int16 | DataKind::UInt16 => 2,
            DataKind::Int32 | DataKind::UInt32 | DataKind::Float32 => 4,
            DataKind::Float64 => 8,
        }
    }

    /// Natural alignment of this kind, equal to its size.
    pub const fn align(self) -> usize {
        self.size()
    }

    /// The canonical PLY header keyword for this kind.
    pub const fn keyword(self) -> &'static str {
        match self {
            DataKind::Int8 => "char",
            DataKind::UInt8 => "uchar",
            DataKind::Int16 => "short",
            DataKind::UInt16 => "ushort",
            DataKind::Int32 => "int",
            DataKind::UInt32 => "uint",
            DataKind::Float32 => "float",
            DataKind::Float64 => "double",
        }
    }
}

/// The encoding of the PLY body: ASCII text, or one of two binary
/// endiannesses. The header itself is always ASCII text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl Format {
    pub const fn keyword(self) -> &'static str {
        match self {
            Format::Ascii => "ascii",
            Format::BinaryLittleEndian => "binary_little_endian",
            Format::BinaryBigEndian => "binary_big_endian",
        }
    }
}

/// A single property within an element: either a scalar of `element_type`, or
/// (when `is_list` is set) a variable-length list of such scalars, prefixed
/// on disk by a count of type `size_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: Name,
    pub element_type: DataKind,
    pub is_list: bool,
    pub size_type: DataKind,
}

impl Property {
    /// Constructs a non-list (scalar) property.
    pub fn scalar(name: impl Into<Name>, element_type: DataKind) -> Self {
        Property {
            name: name.into(),
            element_type,
            is_list: false,
            size_type: DataKind::UInt8,
        }
    }

    /// Constructs a list property whose element count is stored as
    /// `size_type` and whose elements are of `element_type`.
    pub fn list(name: impl Into<Name>, size_type: DataKind, element_type: DataKind) -> Self {
        Property {
            name: name.into(),
            element_type,
            is_list: true,
            size_type,
        }
    }
}

/// A named, ordered collection of homogeneous records.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: Name,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    pub fn new(name: impl Into<Name>, count: usize, properties: Vec<Property>) -> Self {
        Element {
            name: name.into(),
            count,
            properties,
        }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A single `comment` line from the header, along with the 1-based line
/// number it occupied. The first legal comment line is line 2 (after the
/// magic line and the format line).
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub line: u32,
    pub text: String,
}

/// The schema recovered from (or to be written as) a PLY header: the format,
/// the comments in header order, and the elements in on-disk order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub format: Format,
    pub comments: Vec<Comment>,
    pub elements: Vec<Element>,
}

impl Schema {
    pub fn new(format: Format, comments: Vec<Comment>, elements: Vec<Element>) -> Self {
        Schema {
            format,
            comments,
            elements,
        }
    }

    /// Looks up an element by name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_kind_sizes() {
        assert_eq!(DataKind::Int8.size(), 1);
        assert_eq!(DataKind::UInt16.size(), 2);
        assert_eq!(DataKind::Float32.size(), 4);
        assert_eq!(DataKind::Float64.size(), 8);
    }

    #[test]
    fn element_property_lookup() {
        let element = Element::new(
            "vertex",
            8,
            vec![
                Property::scalar("x", DataKind::Float32),
                Property::scalar("y", DataKind::Float32),
            ],
        );
        assert!(element.property("x").is_some());
        assert!(element.property("z").is_none());
    }
}
