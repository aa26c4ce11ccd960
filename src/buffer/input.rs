use std::io::{self, Read};

use super::DEFAULT_BUFFER_CAPACITY;

/// A fixed-capacity (growable on demand) buffered reader.
///
/// Unlike `std::io::BufReader`, callers can ask for a specific number of
/// bytes to be staged contiguously via [`require`](Self::require) before
/// touching them, which is what lets the binary engine memcpy a whole
/// element's fixed-size record in one shot when it is safe to do so.
pub struct BufferedInput<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
}

impl<R: Read> BufferedInput<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedInput {
            reader,
            buf: vec![0u8; capacity.max(1)],
            pos: 0,
            len: 0,
        }
    }

    /// The currently buffered, not yet consumed bytes.
    pub fn peek(&self) -> &[u8] {
        &self.buf[self.pos..self.len]
    }

    /// Marks `n` already-buffered bytes as consumed. Panics (in debug
    /// builds) if fewer than `n` bytes are buffered.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.len);
        self.pos += n;
    }

    /// Ensures at least `n` bytes are staged contiguously at the front of
    /// the buffer, compacting and refilling (growing the backing store if
    /// `n` exceeds its current capacity) as needed. Returns the number of
    /// bytes actually available, which is less than `n` only once the
    /// underlying stream has reached EOF.
    pub fn require(&mut self, n: usize) -> io::Result<usize> {
        loop {
            let available = self.len - self.pos;
            if available >= n {
                return Ok(available);
            }
            if self.pos > 0 {
                self.buf.copy_within(self.pos..self.len, 0);
                self.len -= self.pos;
                self.pos = 0;
            }
            if n > self.buf.len() {
                self.buf.resize(n, 0);
            }
            let read = self.reader.read(&mut self.buf[self.len..])?;
            if read == 0 {
                return Ok(self.len - self.pos);
            }
            self.len += read;
        }
    }

    /// Reads a single byte, or `None` at EOF.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.require(1)? == 0 {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    /// Returns the next byte without consuming it, or `None` at EOF.
    pub fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        if self.require(1)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    /// Fills `dest` completely, returning an `UnexpectedEof` error if the
    /// stream runs dry first.
    pub fn read_exact_into(&mut self, dest: &mut [u8]) -> io::Result<()> {
        let n = dest.len();
        if self.require(n)? < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected end of input while reading a fixed-size record",
            ));
        }
        dest.copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(())
    }

    /// Skips exactly `n` bytes.
    pub fn skip(&mut self, n: usize) -> io::Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            let want = remaining.min(self.buf.len().max(1));
            let available = self.require(want)?;
            if available == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unexpected end of input while skipping",
                ));
            }
            let take = available.min(remaining);
            self.consume(take);
            remaining -= take;
        }
        Ok(())
    }

    /// Skips ASCII whitespace, defined (as the original parser does) as any
    /// byte in `[0, 0x20]` rather than Rust's narrower `is_ascii_whitespace`.
    pub fn skip_whitespace(&mut self) -> io::Result<()> {
        loop {
            match self.peek_byte()? {
                Some(b) if b <= 0x20 => self.consume(1),
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_across_refills_with_a_tiny_buffer() {
        let data = b"hello, world!".to_vec();
        let mut input = BufferedInput::with_capacity(Cursor::new(data.clone()), 4);
        let mut out = vec![0u8; data.len()];
        input.read_exact_into(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn skip_whitespace_stops_at_first_non_whitespace() {
        let mut input = BufferedInput::new(Cursor::new(b"   \t\nx".to_vec()));
        input.skip_whitespace().unwrap();
        assert_eq!(input.read_byte().unwrap(), Some(b'x'));
    }

    #[test]
    fn read_exact_past_eof_errors() {
        let mut input = BufferedInput::new(Cursor::new(b"ab".to_vec()));
        let mut out = [0u8; 4];
        assert!(input.read_exact_into(&mut out).is_err());
    }
}
