//! Fixed-width value encoding.
//!
//! A value is reduced to the byte pattern that the filter stores. The filter
//! never hashes: the encoded bytes *are* the bit pattern, and the number of
//! encoded bytes decides which bucket the pattern lands in.
//!
//! # Module Structure
//!
//! ```text
//! encode/
//! ├── primitives.rs  - FixedEncode impls for scalars, arrays, slices, tuples
//! └── mod.rs         - Encoder, ByteOrder, FixedEncode trait (public API)
//! ```
//!
//! # Contract
//!
//! Implementations must be deterministic: equal values write equal bytes,
//! and the number of bytes written depends only on the value's shape (its
//! type, plus the element count for slices), never on its content.
//!
//! # Widths
//!
//! | Shape                          | Bytes            |
//! |--------------------------------|------------------|
//! | `bool`, `u8`, `i8`             | 1                |
//! | `u16`, `i16`                   | 2                |
//! | `u32`, `i32`, `f32`, `char`    | 4                |
//! | `u64`, `i64`, `f64`            | 8                |
//! | `u128`, `i128`                 | 16               |
//! | `()`                           | 0                |
//! | `[T; N]`, `[T]`, `Vec<T>`      | sum of elements  |
//! | tuples (up to 8 fields)        | sum of fields    |
//!
//! `usize`, `isize`, `str` and `String` are rejected at runtime with
//! [`ShapeBloomError::Encoding`]: the first two have a platform-dependent
//! width, the latter two have no fixed width at all.
//!
//! # Composite Values
//!
//! Records are packed field by field with no padding. The
//! [`fixed_encode!`](crate::fixed_encode) macro derives this for plain
//! structs:
//!
//! ```
//! use shapebloom::encode::{encode_to_vec, ByteOrder};
//! use shapebloom::fixed_encode;
//!
//! struct Sample {
//!     a: i32,
//!     b: u64,
//! }
//! fixed_encode!(Sample { a, b });
//!
//! let bytes = encode_to_vec(&Sample { a: 10, b: 300 }, ByteOrder::Little).unwrap();
//! assert_eq!(bytes.len(), 12);
//! assert_eq!(&bytes[..4], &10i32.to_le_bytes());
//! ```

mod primitives;

use crate::error::Result;

/// Byte order used for multi-byte scalars.
///
/// The choice changes where a value's bits land, so filters can only be
/// combined when they agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// A value with a deterministic fixed-width encoding.
///
/// # Examples
///
/// ```
/// use shapebloom::encode::{Encoder, FixedEncode};
/// use shapebloom::Result;
///
/// struct Point {
///     x: f32,
///     y: f32,
/// }
///
/// impl FixedEncode for Point {
///     fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
///         out.field(&self.x)?.field(&self.y)?;
///         Ok(())
///     }
/// }
/// ```
pub trait FixedEncode {
    /// Append this value's bytes to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeBloomError::Encoding`](crate::ShapeBloomError::Encoding)
    /// when the value (or one of its fields) has no fixed-width form. Bytes
    /// written before the failure are discarded by the caller.
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()>;

    /// Reject the type itself, before any value is looked at.
    ///
    /// Collections call this for their element type, so an empty
    /// `Vec<usize>` fails the same way a full one does. Types with a
    /// fixed-width form keep the default.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeBloomError::Encoding`](crate::ShapeBloomError::Encoding)
    /// when the type, or a type it contains, has no fixed-width form.
    #[inline]
    fn check_shape() -> Result<()> {
        Ok(())
    }
}

/// Append-only writer over a scratch buffer.
pub struct Encoder<'a> {
    buf: &'a mut Vec<u8>,
    order: ByteOrder,
}

macro_rules! put_scalar {
    ($($name:ident: $t:ty),* $(,)?) => {
        $(
            #[doc = concat!("Write a `", stringify!($t), "` in the encoder's byte order.")]
            #[inline]
            pub fn $name(&mut self, value: $t) {
                match self.order {
                    ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
                    ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
                }
            }
        )*
    };
}

impl<'a> Encoder<'a> {
    /// Wrap `buf`, appending after any bytes it already holds.
    pub fn new(buf: &'a mut Vec<u8>, order: ByteOrder) -> Self {
        Self { buf, order }
    }

    /// Byte order of multi-byte writes.
    #[inline]
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes in the underlying buffer.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a single byte.
    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write raw bytes as-is, ignoring byte order.
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    put_scalar! {
        put_u16: u16,
        put_u32: u32,
        put_u64: u64,
        put_u128: u128,
        put_i16: i16,
        put_i32: i32,
        put_i64: i64,
        put_i128: i128,
    }

    /// Write an `f32` by its IEEE-754 bit pattern.
    #[inline]
    pub fn put_f32(&mut self, value: f32) {
        self.put_u32(value.to_bits());
    }

    /// Write an `f64` by its IEEE-754 bit pattern.
    #[inline]
    pub fn put_f64(&mut self, value: f64) {
        self.put_u64(value.to_bits());
    }

    /// Encode a field of a composite value, chaining for the next one.
    ///
    /// # Errors
    ///
    /// Propagates the field's encoding error.
    #[inline]
    pub fn field<T: FixedEncode + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        value.encode(self)?;
        Ok(self)
    }
}

/// Encode `value` into a fresh vector.
///
/// # Errors
///
/// Returns the encoding error if `value` has no fixed-width form.
///
/// # Examples
///
/// ```
/// use shapebloom::encode::{encode_to_vec, ByteOrder};
///
/// assert_eq!(encode_to_vec(&3i64, ByteOrder::Little).unwrap(), 3i64.to_le_bytes());
/// assert_eq!(encode_to_vec(&3i64, ByteOrder::Big).unwrap(), 3i64.to_be_bytes());
/// assert!(encode_to_vec("text", ByteOrder::Little).is_err());
/// ```
pub fn encode_to_vec<V: FixedEncode + ?Sized>(value: &V, order: ByteOrder) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.encode(&mut Encoder::new(&mut buf, order))?;
    Ok(buf)
}

/// Shape check for the field that `project` selects. Used by
/// [`fixed_encode!`](crate::fixed_encode), which knows field names but not
/// field types.
#[doc(hidden)]
#[inline]
pub fn field_shape<T, F: FixedEncode + ?Sized>(_project: fn(&T) -> &F) -> Result<()> {
    F::check_shape()
}

/// Implement [`FixedEncode`] for a struct by packing the listed fields in order.
///
/// Every listed field must itself implement `FixedEncode`.
///
/// ```
/// use shapebloom::{fixed_encode, ShapeBloomFilter};
///
/// struct Reading {
///     sensor: u16,
///     value: f64,
/// }
/// fixed_encode!(Reading { sensor, value });
///
/// let filter = ShapeBloomFilter::new();
/// filter.insert(&Reading { sensor: 4, value: 21.5 }).unwrap();
/// assert!(filter.possibly_contains(&Reading { sensor: 4, value: 21.5 }).unwrap());
/// ```
#[macro_export]
macro_rules! fixed_encode {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::encode::FixedEncode for $ty {
            #[allow(unused_variables)]
            fn encode(&self, out: &mut $crate::encode::Encoder<'_>) -> $crate::Result<()> {
                $( out.field(&self.$field)?; )*
                Ok(())
            }

            fn check_shape() -> $crate::Result<()> {
                $( $crate::encode::field_shape::<$ty, _>(|v| &v.$field)?; )*
                Ok(())
            }
        }
    };
}
