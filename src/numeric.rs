//! Number codec: ASCII parse/format of PLY scalars, and endian conversion for
//! binary scalars.
//!
//! Mirrors the free-function style of `binary_parsing.rs` in the teacher
//! crate (`take_i32`, `read_i32`, ...), generalized from "always i32/f32/f64
//! big-endian" to all eight PLY `DataKind`s and both endiannesses via
//! `byteorder::ByteOrder`.

use byteorder::ByteOrder;

use crate::schema::DataKind;

/// A scalar value tagged with the `DataKind` it was decoded as (or is to be
/// encoded as). Used as the common currency between the ASCII/binary engines
/// and the layout's destination-type conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScalar {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
}

impl RawScalar {
    /// Reads a single scalar of the given kind out of a binary buffer using
    /// the requested byte order. `input` must be at least `kind.size()`
    /// bytes long.
    pub fn read_binary<B: ByteOrder>(kind: DataKind, input: &[u8]) -> RawScalar {
        match kind {
            DataKind::Int8 => RawScalar::I8(input[0] as i8),
            DataKind::UInt8 => RawScalar::U8(input[0]),
            DataKind::Int16 => RawScalar::I16(B::read_i16(input)),
            DataKind::UInt16 => RawScalar::U16(B::read_u16(input)),
            DataKind::Int32 => RawScalar::I32(B::read_i32(input)),
            DataKind::UInt32 => RawScalar::U32(B::read_u32(input)),
            DataKind::Float32 => RawScalar::F32(B::read_f32(input)),
            DataKind::Float64 => RawScalar::F64(B::read_f64(input)),
        }
    }

    /// Writes this scalar into `dest` (which must be at least
    /// `self.kind().size()` bytes long) using the requested byte order.
    pub fn write_binary<B: ByteOrder>(self, dest: &mut [u8]) {
        match self {
            RawScalar::I8(v) => dest[0] = v as u8,
            RawScalar::U8(v) => dest[0] = v,
            RawScalar::I16(v) => B::write_i16(dest, v),
            RawScalar::U16(v) => B::write_u16(dest, v),
            RawScalar::I32(v) => B::write_i32(dest, v),
            RawScalar::U32(v) => B::write_u32(dest, v),
            RawScalar::F32(v) => B::write_f32(dest, v),
            RawScalar::F64(v) => B::write_f64(dest, v),
        }
    }

    /// Formats this scalar as its canonical ASCII text form. Floats use
    /// Rust's default `Display`, which is guaranteed to produce the
    /// shortest decimal string that round-trips back to the same value —
    /// satisfying PLY's requirement to preserve IEEE-754 precision across
    /// an ASCII hop without hand-rolled precision control.
    pub fn format_ascii(self) -> String {
        match self {
            RawScalar::I8(v) => v.to_string(),
            RawScalar::U8(v) => v.to_string(),
            RawScalar::I16(v) => v.to_string(),
            RawScalar::U16(v) => v.to_string(),
            RawScalar::I32(v) => v.to_string(),
            RawScalar::U32(v) => v.to_string(),
            RawScalar::F32(v) => v.to_string(),
            RawScalar::F64(v) => v.to_string(),
        }
    }

    /// The `DataKind` this value is tagged with.
    pub fn kind(self) -> DataKind {
        match self {
            RawScalar::I8(_) => DataKind::Int8,
            RawScalar::U8(_) => DataKind::UInt8,
            RawScalar::I16(_) => DataKind::Int16,
            RawScalar::U16(_) => DataKind::UInt16,
            RawScalar::I32(_) => DataKind::Int32,
            RawScalar::U32(_) => DataKind::UInt32,
            RawScalar::F32(_) => DataKind::Float32,
            RawScalar::F64(_) => DataKind::Float64,
        }
    }

    /// Widening conversion to `i64`, used to interpret list-size prefixes
    /// regardless of their declared `DataKind`.
    pub fn as_i64(self) -> i64 {
        match self {
            RawScalar::I8(v) => v as i64,
            RawScalar::U8(v) => v as i64,
            RawScalar::I16(v) => v as i64,
            RawScalar::U16(v) => v as i64,
            RawScalar::I32(v) => v as i64,
            RawScalar::U32(v) => v as i64,
            RawScalar::F32(v) => v as i64,
            RawScalar::F64(v) => v as i64,
        }
    }

    /// Parses a single ASCII scalar of the given kind from `input`, returning
    /// the value and the number of bytes consumed.
    pub fn parse_ascii(kind: DataKind, input: &[u8]) -> (RawScalar, usize) {
        match kind {
            DataKind::Int8 => {
                let (v, n) = parse_ascii_signed::<i8>(input);
                (RawScalar::I8(v), n)
            }
            DataKind::UInt8 => {
                let (v, n) = parse_ascii_unsigned::<u8>(input);
                (RawScalar::U8(v), n)
            }
            DataKind::Int16 => {
                let (v, n) = parse_ascii_signed::<i16>(input);
                (RawScalar::I16(v), n)
            }
            DataKind::UInt16 => {
                let (v, n) = parse_ascii_unsigned::<u16>(input);
                (RawScalar::U16(v), n)
            }
            DataKind::Int32 => {
                let (v, n) = parse_ascii_signed::<i32>(input);
                (RawScalar::I32(v), n)
            }
            DataKind::UInt32 => {
                let (v, n) = parse_ascii_unsigned::<u32>(input);
                (RawScalar::U32(v), n)
            }
            DataKind::Float32 => {
                let (v, n) = parse_ascii_float::<f32>(input);
                (RawScalar::F32(v), n)
            }
            DataKind::Float64 => {
                let (v, n) = parse_ascii_float::<f64>(input);
                (RawScalar::F64(v), n)
            }
        }
    }
}

/// Target types a layout field tag may request as the in-memory destination
/// or source for a scalar PLY property.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug + 'static {
    /// The `DataKind` this type most naturally represents on disk.
    const NATIVE_KIND: DataKind;

    /// Value-preserving (or platform-conversion, for narrowing) conversion
    /// from a decoded raw scalar into `Self`.
    fn from_raw(raw: RawScalar) -> Self;

    /// Conversion from `Self` into the raw scalar representation needed to
    /// write a property declared with the given on-disk kind.
    fn to_raw(self, kind: DataKind) -> RawScalar;
}

macro_rules! impl_scalar {
    ($t:ty, $kind:expr, $raw_variant:ident) => {
        impl Scalar for $t {
            const NATIVE_KIND: DataKind = $kind;

            fn from_raw(raw: RawScalar) -> Self {
                match raw {
                    RawScalar::I8(v) => v as Self,
                    RawScalar::U8(v) => v as Self,
                    RawScalar::I16(v) => v as Self,
                    RawScalar::U16(v) => v as Self,
                    RawScalar::I32(v) => v as Self,
                    RawScalar::U32(v) => v as Self,
                    RawScalar::F32(v) => v as Self,
                    RawScalar::F64(v) => v as Self,
                }
            }

            fn to_raw(self, kind: DataKind) -> RawScalar {
                match kind {
                    DataKind::Int8 => RawScalar::I8(self as i8),
                    DataKind::UInt8 => RawScalar::U8(self as u8),
                    DataKind::Int16 => RawScalar::I16(self as i16),
                    DataKind::UInt16 => RawScalar::U16(self as u16),
                    DataKind::Int32 => RawScalar::I32(self as i32),
                    DataKind::UInt32 => RawScalar::U32(self as u32),
                    DataKind::Float32 => RawScalar::F32(self as f32),
                    DataKind::Float64 => RawScalar::F64(self as f64),
                }
            }
        }

        #[allow(dead_code)]
        const _: DataKind = DataKind::$raw_variant;
    };
}

impl_scalar!(i8, DataKind::Int8, Int8);
impl_scalar!(u8, DataKind::UInt8, UInt8);
impl_scalar!(i16, DataKind::Int16, Int16);
impl_scalar!(u16, DataKind::UInt16, UInt16);
impl_scalar!(i32, DataKind::Int32, Int32);
impl_scalar!(u32, DataKind::UInt32, UInt32);
impl_scalar!(f32, DataKind::Float32, Float32);
impl_scalar!(f64, DataKind::Float64, Float64);

/// Converts a decoded scalar into the representation of a different
/// `DataKind`, applying the same widen-or-platform-cast rule as
/// [`Scalar::from_raw`] but selected at runtime rather than through a
/// generic type parameter. Used by the layout engine, which only knows a
/// destination field's `DataKind`, not its Rust type.
pub fn convert(raw: RawScalar, target: DataKind) -> RawScalar {
    match target {
        DataKind::Int8 => RawScalar::I8(i8::from_raw(raw)),
        DataKind::UInt8 => RawScalar::U8(u8::from_raw(raw)),
        DataKind::Int16 => RawScalar::I16(i16::from_raw(raw)),
        DataKind::UInt16 => RawScalar::U16(u16::from_raw(raw)),
        DataKind::Int32 => RawScalar::I32(i32::from_raw(raw)),
        DataKind::UInt32 => RawScalar::U32(u32::from_raw(raw)),
        DataKind::Float32 => RawScalar::F32(f32::from_raw(raw)),
        DataKind::Float64 => RawScalar::F64(f64::from_raw(raw)),
    }
}

/// Casts a signed 64-bit value down into the representation of `target`,
/// platform-cast style (the same rule [`Scalar::to_raw`] applies). Used to
/// re-encode a list's element count, computed as a plain `usize`/`i64`,
/// into whatever `DataKind` the property declares for its size prefix.
pub fn from_i64(value: i64, target: DataKind) -> RawScalar {
    match target {
        DataKind::Int8 => RawScalar::I8(value as i8),
        DataKind::UInt8 => RawScalar::U8(value as u8),
        DataKind::Int16 => RawScalar::I16(value as i16),
        DataKind::UInt16 => RawScalar::U16(value as u16),
        DataKind::Int32 => RawScalar::I32(value as i32),
        DataKind::UInt32 => RawScalar::U32(value as u32),
        DataKind::Float32 => RawScalar::F32(value as f32),
        DataKind::Float64 => RawScalar::F64(value as f64),
    }
}

/// Parses a leading optional sign and run of ASCII digits as a signed
/// integer, saturating on overflow (matching `strtoll`'s documented
/// behavior, per spec).
fn parse_ascii_signed<T>(input: &[u8]) -> (T, usize)
where
    T: TryFrom<i64> + Copy + IntBounds,
{
    let mut i = 0;
    let negative = match input.get(0) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut acc: i64 = 0;
    let mut saw_digit = false;
    let mut overflowed = false;
    while let Some(&b) = input.get(i) {
        if !b.is_ascii_digit() {
            break;
        }
        saw_digit = true;
        let digit = (b - b'0') as i64;
        match acc.checked_mul(10).and_then(|v| v.checked_add(digit)) {
            Some(v) => acc = v,
            None => overflowed = true,
        }
        i += 1;
    }
    let _ = saw_digit;

    let mut value = if negative { -acc } else { acc };
    if overflowed {
        value = if negative { i64::MIN } else { i64::MAX };
    }

    let clamped = T::try_from(value).unwrap_or_else(|_| {
        // Saturate to the target type's extremes, matching strtoll clamping
        // at the destination width rather than only at i64's.
        let bound = if value < 0 { T::MIN_I64 } else { T::MAX_I64 };
        T::try_from(bound).unwrap_or_else(|_| unreachable!())
    });

    (clamped, i)
}

/// Parses a run of ASCII digits (no sign) as an unsigned integer, saturating
/// on overflow.
fn parse_ascii_unsigned<T>(input: &[u8]) -> (T, usize)
where
    T: TryFrom<u64> + Copy + UintBounds,
{
    // An unsigned PLY field may still carry a leading '+'.
    let mut i = 0;
    if input.get(0) == Some(&b'+') {
        i += 1;
    }

    let mut acc: u64 = 0;
    let mut overflowed = false;
    while let Some(&b) = input.get(i) {
        if !b.is_ascii_digit() {
            break;
        }
        let digit = (b - b'0') as u64;
        match acc.checked_mul(10).and_then(|v| v.checked_add(digit)) {
            Some(v) => acc = v,
            None => overflowed = true,
        }
        i += 1;
    }

    let value = if overflowed { u64::MAX } else { acc };
    let clamped = T::try_from(value).unwrap_or_else(|_| T::try_from(T::MAX_U64).unwrap_or_else(|_| unreachable!()));

    (clamped, i)
}

/// Scans the maximal decimal-float prefix of `input` (optional sign,
/// digits, optional '.', optional exponent) and parses it, matching
/// `strtof`/`strtod` semantics: an unparsable prefix yields `0`, and Rust's
/// own float parser already saturates very large magnitudes to infinity,
/// matching the spec's fallback requirement.
fn parse_ascii_float<T>(input: &[u8]) -> (T, usize)
where
    T: std::str::FromStr + Default,
{
    let mut i = 0;
    if matches!(input.get(0), Some(b'-') | Some(b'+')) {
        i += 1;
    }
    while matches!(input.get(i), Some(b) if b.is_ascii_digit()) {
        i += 1;
    }
    if input.get(i) == Some(&b'.') {
        i += 1;
        while matches!(input.get(i), Some(b) if b.is_ascii_digit()) {
            i += 1;
        }
    }
    if matches!(input.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(input.get(j), Some(b'-') | Some(b'+')) {
            j += 1;
        }
        let exp_digits_start = j;
        while matches!(input.get(j), Some(b) if b.is_ascii_digit()) {
            j += 1;
        }
        if j > exp_digits_start {
            i = j;
        }
    }

    let text = std::str::from_utf8(&input[..i]).unwrap_or("");
    let value = text.parse::<T>().unwrap_or_default();
    (value, i)
}

/// Supplies a signed integer type's extremes as `i64`, so overflow
/// saturation can clamp directly instead of probing `TryFrom` one step at a
/// time (which would never finish walking down from `i64::MIN`).
trait IntBounds {
    const MIN_I64: i64;
    const MAX_I64: i64;
}

macro_rules! impl_int_bounds {
    ($($t:ty),*) => {
        $(impl IntBounds for $t {
            const MIN_I64: i64 = <$t>::MIN as i64;
            const MAX_I64: i64 = <$t>::MAX as i64;
        })*
    };
}

impl_int_bounds!(i8, i16, i32);

/// Supplies an unsigned integer type's maximum as `u64`.
trait UintBounds {
    const MAX_U64: u64;
}

macro_rules! impl_uint_bounds {
    ($($t:ty),*) => {
        $(impl UintBounds for $t {
            const MAX_U64: u64 = <$t>::MAX as u64;
        })*
    };
}

impl_uint_bounds!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_integer_with_sign() {
        let (v, n) = parse_ascii_signed::<i32>(b"-1234 rest");
        assert_eq!(v, -1234);
        assert_eq!(n, 5);
    }

    #[test]
    fn saturates_signed_overflow() {
        let (v, _n) = parse_ascii_signed::<i8>(b"1000");
        assert_eq!(v, i8::MAX);
        let (v, _n) = parse_ascii_signed::<i8>(b"-1000");
        assert_eq!(v, i8::MIN);
    }

    #[test]
    fn parses_unsigned_integer() {
        let (v, n) = parse_ascii_unsigned::<u32>(b"42,");
        assert_eq!(v, 42);
        assert_eq!(n, 2);
    }

    #[test]
    fn parses_float_with_exponent() {
        let (v, n) = parse_ascii_float::<f32>(b"1.5e3 ");
        assert_eq!(v, 1.5e3_f32);
        assert_eq!(n, 5);
    }

    #[test]
    fn parses_plain_integer_float() {
        let (v, n) = parse_ascii_float::<f64>(b"42");
        assert_eq!(v, 42.0);
        assert_eq!(n, 2);
    }

    #[test]
    fn widening_conversion_exact() {
        let raw = RawScalar::F32(1.5);
        let widened = f64::from_raw(raw);
        assert_eq!(widened, 1.5_f64);
    }

    #[test]
    fn to_raw_narrows_via_platform_cast() {
        let raw = 1000_i32.to_raw(DataKind::Int8);
        assert_eq!(raw, RawScalar::I8(1000_i32 as i8));
    }
}
