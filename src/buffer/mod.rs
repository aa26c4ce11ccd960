//! Fixed-capacity buffered stream wrappers used by the header scanner and
//! the format engines.
//!
//! Grounded on `buffered_istream.hpp`/`buffered_ostream.hpp` in the original
//! implementation: a single block of memory is refilled from (or flushed to)
//! the underlying stream only when a request would otherwise cross its
//! boundary, so the common case of reading/writing a handful of bytes never
//! touches the underlying `Read`/`Write` impl at all.

pub mod input;
pub mod output;

/// Default buffer capacity, matching the 1 MiB used by the original
/// implementation.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 20;

pub use input::BufferedInput;
pub use output::BufferedOutput;
