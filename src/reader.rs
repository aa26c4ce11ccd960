//! The public reading API.
//!
//! Grounded on `plywoot.hpp`'s `IStream`: a sequential cursor over the
//! elements named in the header, which can be read (schema-agnostic or via
//! a caller [`Layout`]), skipped, or fast-forwarded to by name.

use std::io::Read;

use crate::buffer::BufferedInput;
use crate::element_block::ElementDataBlock;
use crate::error::{PlyError, Result};
use crate::header::HeaderParser;
use crate::layout::{Layout, TypedRecords};
use crate::schema::{Comment, Element, Format, Schema};

use crate::engine::ReaderEngine;

/// Reads a PLY stream element by element.
pub struct PlyReader<R> {
    schema: Schema,
    engine: ReaderEngine<R>,
    cursor: usize,
}

impl<R: Read> PlyReader<R> {
    /// Parses the header and returns a reader positioned at the first
    /// element's data.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_capacity(reader, crate::buffer::DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Result<Self> {
        let parser = HeaderParser::new(reader);
        let (schema, reader) = parser.parse()?;
        let input = BufferedInput::with_capacity(reader, capacity);
        let engine = ReaderEngine::new(schema.format, input);
        Ok(PlyReader {
            schema,
            engine,
            cursor: 0,
        })
    }

    pub fn format(&self) -> Format {
        self.schema.format
    }

    pub fn comments(&self) -> &[Comment] {
        &self.schema.comments
    }

    pub fn elements(&self) -> &[Element] {
        &self.schema.elements
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.schema.element(name)
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.schema.element(name).is_some()
    }

    /// The element the cursor is currently positioned on, if any remain.
    pub fn current_element(&self) -> Option<&Element> {
        self.schema.elements.get(self.cursor)
    }

    /// Skips elements until the cursor reaches one named `name` (or runs
    /// out), returning whether it was found.
    pub fn find(&mut self, name: &str) -> Result<bool> {
        while let Some(element) = self.schema.elements.get(self.cursor).cloned() {
            if element.name == name {
                return Ok(true);
            }
            log::debug!(target: "Reading PLY body", "skipping element {} to find {}", element.name, name);
            self.engine.skip_element(&element)?;
            self.cursor += 1;
        }
        Ok(false)
    }

    /// Reads the element the cursor is on, schema-agnostically, and
    /// advances the cursor.
    pub fn read_element(&mut self) -> Result<ElementDataBlock> {
        let element = self.require_current()?;
        let block = self.engine.read_element_block(&element)?;
        self.cursor += 1;
        Ok(block)
    }

    /// Reads the element the cursor is on according to `layout`, and
    /// advances the cursor.
    pub fn read_element_with_layout(&mut self, layout: &Layout) -> Result<TypedRecords> {
        let element = self.require_current()?;
        let records = self.engine.read_typed(&element, layout)?;
        self.cursor += 1;
        Ok(records)
    }

    /// Skips the element the cursor is on without materializing it, and
    /// advances the cursor.
    pub fn skip_element(&mut self) -> Result<()> {
        let element = self.require_current()?;
        self.engine.skip_element(&element)?;
        self.cursor += 1;
        Ok(())
    }

    fn require_current(&self) -> Result<Element> {
        self.schema
            .elements
            .get(self.cursor)
            .cloned()
            .ok_or(PlyError::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ascii_cube_vertices_and_faces() {
        let src = b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n1 2 3\n3 0 0 0\n".to_vec();
        let mut reader = PlyReader::new(std::io::Cursor::new(src)).unwrap();
        assert_eq!(reader.elements().len(), 2);
        let vertices = reader.read_element().unwrap();
        assert_eq!(vertices.row_count(), 1);
        let faces = reader.read_element().unwrap();
        assert_eq!(faces.row_count(), 1);
    }

    #[test]
    fn find_skips_preceding_elements() {
        let src = b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n1\n0\n".to_vec();
        let mut reader = PlyReader::new(std::io::Cursor::new(src)).unwrap();
        assert!(reader.find("face").unwrap());
        let faces = reader.read_element().unwrap();
        assert_eq!(faces.row_count(), 1);
    }
}
