//! The public writing API.
//!
//! Grounded on `plywoot.hpp`'s `OStream`: elements are staged with `add()`
//! in the order they should appear on disk, then `write()` emits the header
//! (interleaving `comment` lines back at the line position they were
//! originally read from, mirroring `OStream::writeHeader`'s
//! `maybeWriteComments` line-tracking) followed by each element's body.

use std::io::Write;

use crate::buffer::BufferedOutput;
use crate::element_block::ElementDataBlock;
use crate::engine::WriterEngine;
use crate::error::Result;
use crate::layout::{Layout, TypedRecords};
use crate::schema::{Comment, Element, Format};

enum PendingElement {
    Block(ElementDataBlock),
    Typed {
        element: Element,
        layout: Layout,
        records: TypedRecords,
    },
}

impl PendingElement {
    fn element(&self) -> &Element {
        match self {
            PendingElement::Block(block) => block.element(),
            PendingElement::Typed { element, .. } => element,
        }
    }
}

/// Accumulates elements to write, then emits a complete PLY stream.
pub struct PlyWriter {
    format: Format,
    comments: Vec<Comment>,
    pending: Vec<PendingElement>,
}

impl PlyWriter {
    pub fn new(format: Format) -> Self {
        PlyWriter {
            format,
            comments: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn with_comments(format: Format, comments: Vec<Comment>) -> Self {
        PlyWriter {
            format,
            comments,
            pending: Vec::new(),
        }
    }

    /// Stages a schema-agnostic element for writing.
    pub fn add(&mut self, block: ElementDataBlock) {
        self.pending.push(PendingElement::Block(block));
    }

    /// Stages a typed element, decoded (or assembled) according to
    /// `layout`, for writing.
    pub fn add_typed(&mut self, element: Element, layout: Layout, records: TypedRecords) {
        self.pending.push(PendingElement::Typed {
            element,
            layout,
            records,
        });
    }

    /// Writes the header and every staged element to `writer`, flushing
    /// and returning it.
    pub fn write<W: Write>(self, writer: W) -> Result<W> {
        log::debug!(
            target: "Writing PLY stream",
            "format {:?}, {} elements",
            self.format,
            self.pending.len()
        );
        let mut output = BufferedOutput::new(writer);
        self.write_header(&mut output)?;
        let mut engine = WriterEngine::new(self.format, output);
        for pending in &self.pending {
            match pending {
                PendingElement::Block(block) => engine.write_element_block(block)?,
                PendingElement::Typed {
                    element,
                    layout,
                    records,
                } => engine.write_typed(element, layout, records)?,
            }
        }
        engine.flush()?;
        engine.into_inner()
    }

    fn write_header<W: Write>(&self, output: &mut BufferedOutput<W>) -> Result<()> {
        let mut line: u32 = 0;
        let mut comment_cursor = 0;

        write_line(output, "ply")?;
        line += 1;
        flush_comments_upto(output, &self.comments, &mut comment_cursor, &mut line)?;

        write_line(output, &format!("format {} 1.0", self.format.keyword()))?;
        line += 1;
        flush_comments_upto(output, &self.comments, &mut comment_cursor, &mut line)?;

        for pending in &self.pending {
            let element = pending.element();
            write_line(output, &format!("element {} {}", element.name, element.count))?;
            line += 1;
            flush_comments_upto(output, &self.comments, &mut comment_cursor, &mut line)?;

            for prop in &element.properties {
                let text = if prop.is_list {
                    format!(
                        "property list {} {} {}",
                        prop.size_type.keyword(),
                        prop.element_type.keyword(),
                        prop.name
                    )
                } else {
                    format!("property {} {}", prop.element_type.keyword(), prop.name)
                };
                write_line(output, &text)?;
                line += 1;
                flush_comments_upto(output, &self.comments, &mut comment_cursor, &mut line)?;
            }
        }

        while comment_cursor < self.comments.len() {
            write_line(output, &comment_line(&self.comments[comment_cursor]))?;
            comment_cursor += 1;
            line += 1;
        }

        write_line(output, "end_header")
    }
}

fn write_line<W: Write>(output: &mut BufferedOutput<W>, text: &str) -> Result<()> {
    output.write_bytes(text.as_bytes())?;
    output.write_byte(b'\n')?;
    Ok(())
}

/// Renders a `comment` header line, omitting the separating space for an
/// empty comment so `comment\n` round-trips byte-identically instead of
/// growing a trailing space.
fn comment_line(comment: &Comment) -> String {
    if comment.text.is_empty() {
        "comment".to_string()
    } else {
        format!("comment {}", comment.text)
    }
}

/// Flushes every buffered comment whose recorded line has now been reached,
/// advancing `line` once per comment written so later comments (and the
/// structural line that follows) are checked against the true count of
/// physical lines emitted so far, not just non-comment ones.
fn flush_comments_upto<W: Write>(
    output: &mut BufferedOutput<W>,
    comments: &[Comment],
    cursor: &mut usize,
    line: &mut u32,
) -> Result<()> {
    while *cursor < comments.len() && comments[*cursor].line <= *line {
        write_line(output, &comment_line(&comments[*cursor]))?;
        *cursor += 1;
        *line += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::RawScalar;
    use crate::schema::{DataKind, Property};

    #[test]
    fn writes_minimal_header_and_body() {
        let element = Element::new("vertex", 1, vec![Property::scalar("x", DataKind::Float32)]);
        let mut block = ElementDataBlock::new(element);
        block.push_scalar(RawScalar::F32(1.0));

        let mut writer = PlyWriter::new(Format::Ascii);
        writer.add(block);
        let bytes = writer.write(Vec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n1\n"
        );
    }

    #[test]
    fn preserves_leading_comment_before_elements() {
        let element = Element::new("vertex", 0, vec![Property::scalar("x", DataKind::Float32)]);
        let block = ElementDataBlock::new(element);

        let mut writer = PlyWriter::with_comments(
            Format::Ascii,
            vec![Comment {
                line: 3,
                text: "generated".to_string(),
            }],
        );
        writer.add(block);
        let bytes = writer.write(Vec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\ncomment generated\n"));
    }
}
