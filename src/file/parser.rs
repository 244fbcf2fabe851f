//! Cursor-based byte stream parser for class file decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over a byte
//! slice. Every read validates that enough data remains, so truncated or hostile class files
//! surface as [`crate::Error::OutOfBounds`] instead of panics.
//!
//! # Examples
//!
//! ```rust
//! use classscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! assert_eq!(parser.read_be::<u16>()?, 0);
//! assert_eq!(parser.read_be::<u16>()?, 52);
//! assert!(!parser.has_more_data());
//! # Ok::<(), classscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic big-endian binary data parser.
///
/// `Parser` maintains an internal position cursor and provides bounds checking to prevent
/// buffer overruns when reading malformed or truncated data. Sub-structures such as class file
/// attributes are typically parsed by carving them out with [`Parser::read_bytes`] and handing
/// the slice to a fresh `Parser`.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.ensure_remaining(step)?;
        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Verify that at least `needed` bytes remain.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer bytes are available.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(out_of_bounds_error!());
        }
        Ok(())
    }

    /// Verify that the whole buffer has been consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if trailing bytes are left.
    pub fn ensure_empty(&self) -> Result<()> {
        if self.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes at offset {}",
                self.remaining(),
                self.position
            ));
        }
        Ok(())
    }

    /// Read a type T from the current position in big-endian byte order and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(length)?;
        let slice = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(slice)
    }

    /// Read a `u16` length prefix followed by that many bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or payload is truncated.
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_be::<u16>()?;
        self.read_bytes(usize::from(length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn sequential_reads() {
        let data = [0x00, 0x03, 0x61, 0x62, 0x63, 0xFF];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_prefixed_bytes().unwrap(), b"abc");
        assert_eq!(parser.pos(), 5);
        assert_eq!(parser.remaining(), 1);
        assert_eq!(parser.read_be::<u8>().unwrap(), 0xFF);
        assert!(parser.ensure_empty().is_ok());
    }

    #[test]
    fn bounds_are_enforced() {
        let data = [0x00, 0x05, 0x61];
        let mut parser = Parser::new(&data);

        assert!(matches!(
            parser.read_prefixed_bytes(),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(parser.seek(4).is_err());
        assert!(parser.seek(3).is_ok());
        assert!(!parser.has_more_data());
        assert!(parser.advance_by(1).is_err());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let data = [0x01, 0x02];
        let mut parser = Parser::new(&data);
        parser.advance_by(1).unwrap();

        assert!(matches!(
            parser.ensure_empty(),
            Err(Error::Malformed { .. })
        ));
    }
}
