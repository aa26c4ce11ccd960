//! A format-polymorphic reader and writer for the PLY (Polygon File
//! Format) mesh and point-cloud format: ASCII, binary little-endian, and
//! binary big-endian bodies behind one API.

pub mod buffer;
pub mod convert;
pub mod element_block;
pub mod engine;
pub mod error;
pub mod header;
pub mod layout;
pub mod numeric;
pub mod reader;
pub mod schema;
pub mod writer;

pub use convert::convert;
pub use element_block::ElementDataBlock;
pub use error::{PlyError, Result};
pub use layout::{FieldTag, Layout, TypedRecords};
pub use reader::PlyReader;
pub use schema::{Comment, DataKind, Element, Format, Property, Schema};
pub use writer::PlyWriter;
