//! Erases the choice of format engine behind a single enum so
//! [`PlyReader`](crate::reader::PlyReader)/[`PlyWriter`](crate::writer::PlyWriter)
//! don't need to be generic over it.
//!
//! Grounded on `parser_variant.hpp`/`writer_variant.hpp`, and on
//! Gargafield-Lush's `Row`/`TableRow` dispatch-by-kind pattern for the
//! per-format match arms.

use byteorder::{BigEndian, LittleEndian};
use std::io::{Read, Write};

use crate::buffer::{BufferedInput, BufferedOutput};
use crate::element_block::ElementDataBlock;
use crate::error::Result;
use crate::layout::{Layout, TypedRecords};
use crate::schema::{Element, Format};

use super::{ascii, binary};

pub enum ReaderEngine<R> {
    Ascii(BufferedInput<R>),
    BinaryLittleEndian(BufferedInput<R>),
    BinaryBigEndian(BufferedInput<R>),
}

impl<R: Read> ReaderEngine<R> {
    pub fn new(format: Format, input: BufferedInput<R>) -> Self {
        match format {
            Format::Ascii => ReaderEngine::Ascii(input),
            Format::BinaryLittleEndian => ReaderEngine::BinaryLittleEndian(input),
            Format::BinaryBigEndian => ReaderEngine::BinaryBigEndian(input),
        }
    }

    pub fn read_element_block(&mut self, element: &Element) -> Result<ElementDataBlock> {
        match self {
            ReaderEngine::Ascii(input) => ascii::read_element_block(input, element),
            ReaderEngine::BinaryLittleEndian(input) => {
                binary::read_element_block::<LittleEndian, _>(input, element)
            }
            ReaderEngine::BinaryBigEndian(input) => binary::read_element_block::<BigEndian, _>(input, element),
        }
    }

    pub fn skip_element(&mut self, element: &Element) -> Result<()> {
        match self {
            ReaderEngine::Ascii(input) => ascii::skip_element(input, element),
            ReaderEngine::BinaryLittleEndian(input) => binary::skip_element::<LittleEndian, _>(input, element),
            ReaderEngine::BinaryBigEndian(input) => binary::skip_element::<BigEndian, _>(input, element),
        }
    }

    pub fn read_typed(&mut self, element: &Element, layout: &Layout) -> Result<TypedRecords> {
        match self {
            ReaderEngine::Ascii(input) => ascii::read_typed(input, element, layout),
            ReaderEngine::BinaryLittleEndian(input) => {
                binary::read_typed::<LittleEndian, _>(input, element, layout)
            }
            ReaderEngine::BinaryBigEndian(input) => binary::read_typed::<BigEndian, _>(input, element, layout),
        }
    }

    pub fn into_inner(self) -> BufferedInput<R> {
        match self {
            ReaderEngine::Ascii(input) => input,
            ReaderEngine::BinaryLittleEndian(input) => input,
            ReaderEngine::BinaryBigEndian(input) => input,
        }
    }
}

pub enum WriterEngine<W> {
    Ascii(BufferedOutput<W>),
    BinaryLittleEndian(BufferedOutput<W>),
    BinaryBigEndian(BufferedOutput<W>),
}

impl<W: Write> WriterEngine<W> {
    pub fn new(format: Format, output: BufferedOutput<W>) -> Self {
        match format {
            Format::Ascii => WriterEngine::Ascii(output),
            Format::BinaryLittleEndian => WriterEngine::BinaryLittleEndian(output),
            Format::BinaryBigEndian => WriterEngine::BinaryBigEndian(output),
        }
    }

    pub fn write_element_block(&mut self, block: &ElementDataBlock) -> Result<()> {
        match self {
            WriterEngine::Ascii(output) => ascii::write_element_block(output, block),
            WriterEngine::BinaryLittleEndian(output) => {
                binary::write_element_block::<LittleEndian, _>(output, block)
            }
            WriterEngine::BinaryBigEndian(output) => binary::write_element_block::<BigEndian, _>(output, block),
        }
    }

    pub fn write_typed(&mut self, element: &Element, layout: &Layout, records: &TypedRecords) -> Result<()> {
        match self {
            WriterEngine::Ascii(output) => ascii::write_typed(output, element, layout, records),
            WriterEngine::BinaryLittleEndian(output) => {
                binary::write_typed::<LittleEndian, _>(output, element, layout, records)
            }
            WriterEngine::BinaryBigEndian(output) => {
                binary::write_typed::<BigEndian, _>(output, element, layout, records)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self {
            WriterEngine::Ascii(output) => output.flush()?,
            WriterEngine::BinaryLittleEndian(output) => output.flush()?,
            WriterEngine::BinaryBigEndian(output) => output.flush()?,
        };
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        let inner = match self {
            WriterEngine::Ascii(output) => output.into_inner(),
            WriterEngine::BinaryLittleEndian(output) => output.into_inner(),
            WriterEngine::BinaryBigEndian(output) => output.into_inner(),
        }?;
        Ok(inner)
    }
}
