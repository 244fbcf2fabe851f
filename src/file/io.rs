//! Low-level byte order and safe reading utilities for class file parsing.
//!
//! The JVM class file format stores every multi-byte quantity in big-endian order. This module
//! provides the [`crate::file::io::ClassIO`] trait and bounds-checked helpers which decode primitive
//! values from byte buffers without ever reading past the end of the data.
//!
//! # Key Components
//!
//! - [`crate::file::io::ClassIO`] - Trait defining big-endian decoding for primitive types
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance the offset
//!
//! ## Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! # Examples
//!
//! ```rust,ignore
//! use classscope::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34];
//! let mut offset = 0;
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! let major: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!(magic, 0xCAFE_BABE);
//! assert_eq!(major, 52);
//! # Ok::<(), classscope::Error>(())
//! ```

use crate::Result;

/// Trait for implementing type-specific safe big-endian decoding.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array of the primitive, which allows bounds-checked conversion from slices.
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_class_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_class_io! {
    u64 => 8,
    i64 => 8,
    u32 => 4,
    i32 => 4,
    u16 => 2,
    i16 => 2,
    u8 => 1,
    i8 => 1,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read on success and left untouched on failure.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}
