use std::io::{self, Write};

use super::DEFAULT_BUFFER_CAPACITY;

/// A fixed-capacity buffered writer that flushes to the underlying stream
/// only when a write would overrun the buffer.
///
/// The writer is held in an `Option` so that `into_inner` can take it out
/// without a partial move, which `Drop` below otherwise forbids.
pub struct BufferedOutput<W> {
    writer: Option<W>,
    buf: Vec<u8>,
    len: usize,
}

impl<W: Write> BufferedOutput<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        BufferedOutput {
            writer: Some(writer),
            buf: vec![0u8; capacity.max(1)],
            len: 0,
        }
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if self.len > 0 {
            if let Some(writer) = self.writer.as_mut() {
                writer.write_all(&self.buf[..self.len])?;
            }
            self.len = 0;
        }
        Ok(())
    }

    /// Writes `bytes`, flushing the internal buffer first if it would not
    /// otherwise fit, and bypassing the buffer entirely for writes larger
    /// than its capacity.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.len() > self.buf.len() {
            self.flush_buffer()?;
            return self
                .writer
                .as_mut()
                .expect("write after into_inner")
                .write_all(bytes);
        }
        if self.len + bytes.len() > self.buf.len() {
            self.flush_buffer()?;
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_bytes(&[byte])
    }

    /// Flushes any buffered bytes to the underlying stream and flushes the
    /// stream itself.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Recovers the underlying writer, flushing first.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush_buffer()?;
        Ok(self.writer.take().expect("writer already taken"))
    }
}

impl<W: Write> Drop for BufferedOutput<W> {
    /// Best-effort flush on destruction, matching the crate's explicit
    /// `flush()`/`into_inner()` which surface write errors — a destructor
    /// cannot return one, so it is silently swallowed here.
    fn drop(&mut self) {
        let _ = self.flush_buffer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_small_writes_until_flush() {
        let mut out = BufferedOutput::with_capacity(Vec::new(), 8);
        out.write_bytes(b"ab").unwrap();
        out.write_bytes(b"cd").unwrap();
        let written = out.into_inner().unwrap();
        assert_eq!(written, b"abcd");
    }

    #[test]
    fn large_write_bypasses_buffer() {
        let mut out = BufferedOutput::with_capacity(Vec::new(), 4);
        out.write_bytes(b"0123456789").unwrap();
        let written = out.into_inner().unwrap();
        assert_eq!(written, b"0123456789");
    }
}
