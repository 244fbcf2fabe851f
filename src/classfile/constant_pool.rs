//! Class file constant pool.
//!
//! The constant pool is the symbol table of a class file: every name, descriptor and literal
//! referenced by the header, the member declarations and their attributes lives here and is
//! referenced by a one-based `u16` index. Entries for `long` and `double` constants occupy two
//! slots, the second of which is unusable.
//!
//! Strings are stored in the JVM's *modified UTF-8* encoding: `NUL` is written as the two-byte
//! sequence `C0 80`, and supplementary characters are written as a surrogate pair of two
//! three-byte sequences. [`decode_modified_utf8`] converts such data into a Rust [`String`].

use strum::{FromRepr, IntoStaticStr};

use crate::{file::parser::Parser, Result};

/// Tag byte in front of every constant pool entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ConstantTag {
    /// `CONSTANT_Utf8`
    Utf8 = 1,
    /// `CONSTANT_Integer`
    Integer = 3,
    /// `CONSTANT_Float`
    Float = 4,
    /// `CONSTANT_Long`
    Long = 5,
    /// `CONSTANT_Double`
    Double = 6,
    /// `CONSTANT_Class`
    Class = 7,
    /// `CONSTANT_String`
    String = 8,
    /// `CONSTANT_Fieldref`
    FieldRef = 9,
    /// `CONSTANT_Methodref`
    MethodRef = 10,
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethodRef = 11,
    /// `CONSTANT_NameAndType`
    NameAndType = 12,
    /// `CONSTANT_MethodHandle`
    MethodHandle = 15,
    /// `CONSTANT_MethodType`
    MethodType = 16,
    /// `CONSTANT_Dynamic`
    Dynamic = 17,
    /// `CONSTANT_InvokeDynamic`
    InvokeDynamic = 18,
    /// `CONSTANT_Module`
    Module = 19,
    /// `CONSTANT_Package`
    Package = 20,
}

/// A decoded constant pool entry
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Constant {
    /// Slot 0 and the upper half of `long`/`double` entries
    Unusable,
    /// Modified UTF-8 string
    Utf8(String),
    /// 32-bit integer literal
    Integer(i32),
    /// 32-bit float literal
    Float(f32),
    /// 64-bit integer literal
    Long(i64),
    /// 64-bit float literal
    Double(f64),
    /// Class or interface reference, pointing at its internal name
    Class(u16),
    /// String literal, pointing at its value
    String(u16),
    /// Field reference
    FieldRef {
        /// Index of the owning `Class` entry
        class: u16,
        /// Index of the `NameAndType` entry
        name_and_type: u16,
    },
    /// Method reference
    MethodRef {
        /// Index of the owning `Class` entry
        class: u16,
        /// Index of the `NameAndType` entry
        name_and_type: u16,
    },
    /// Interface method reference
    InterfaceMethodRef {
        /// Index of the owning `Class` entry
        class: u16,
        /// Index of the `NameAndType` entry
        name_and_type: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Index of the name
        name: u16,
        /// Index of the descriptor
        descriptor: u16,
    },
    /// Method handle
    MethodHandle {
        /// Reference kind (1..=9)
        kind: u8,
        /// Index of the referenced member
        reference: u16,
    },
    /// Method type, pointing at a method descriptor
    MethodType(u16),
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// Index of the `NameAndType` entry
        name_and_type: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// Index of the `NameAndType` entry
        name_and_type: u16,
    },
    /// Module name
    Module(u16),
    /// Package name
    Package(u16),
}

/// Value of a field's `ConstantValue` attribute
#[derive(Debug, Clone, PartialEq)]
pub enum FieldConstant {
    /// `int`, `short`, `char`, `byte` and `boolean` constants
    Int(i32),
    /// `long` constant
    Long(i64),
    /// `float` constant
    Float(f32),
    /// `double` constant
    Double(f64),
    /// `String` constant
    String(String),
}

/// The parsed constant pool of one class file
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Parse the constant pool, starting at the `constant_pool_count` field.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags or an empty pool count, and
    /// [`crate::Error::OutOfBounds`] if the data is truncated.
    pub fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!("constant_pool_count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable);

        while entries.len() < usize::from(count) {
            let raw_tag = parser.read_be::<u8>()?;
            let Some(tag) = ConstantTag::from_repr(raw_tag) else {
                return Err(malformed_error!(
                    "Invalid constant pool tag {} at index {}",
                    raw_tag,
                    entries.len()
                ));
            };

            let entry = match tag {
                ConstantTag::Utf8 => Constant::Utf8(decode_modified_utf8(
                    parser.read_prefixed_bytes()?,
                )?),
                ConstantTag::Integer => Constant::Integer(parser.read_be::<i32>()?),
                ConstantTag::Float => Constant::Float(parser.read_be::<f32>()?),
                ConstantTag::Long => Constant::Long(parser.read_be::<i64>()?),
                ConstantTag::Double => Constant::Double(parser.read_be::<f64>()?),
                ConstantTag::Class => Constant::Class(parser.read_be::<u16>()?),
                ConstantTag::String => Constant::String(parser.read_be::<u16>()?),
                ConstantTag::FieldRef => Constant::FieldRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                ConstantTag::MethodRef => Constant::MethodRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                ConstantTag::InterfaceMethodRef => Constant::InterfaceMethodRef {
                    class: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                ConstantTag::NameAndType => Constant::NameAndType {
                    name: parser.read_be::<u16>()?,
                    descriptor: parser.read_be::<u16>()?,
                },
                ConstantTag::MethodHandle => Constant::MethodHandle {
                    kind: parser.read_be::<u8>()?,
                    reference: parser.read_be::<u16>()?,
                },
                ConstantTag::MethodType => Constant::MethodType(parser.read_be::<u16>()?),
                ConstantTag::Dynamic => Constant::Dynamic {
                    bootstrap: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                ConstantTag::InvokeDynamic => Constant::InvokeDynamic {
                    bootstrap: parser.read_be::<u16>()?,
                    name_and_type: parser.read_be::<u16>()?,
                },
                ConstantTag::Module => Constant::Module(parser.read_be::<u16>()?),
                ConstantTag::Package => Constant::Package(parser.read_be::<u16>()?),
            };

            let wide = matches!(entry, Constant::Long(_) | Constant::Double(_));
            entries.push(entry);
            if wide {
                if entries.len() >= usize::from(count) {
                    return Err(malformed_error!(
                        "8-byte constant at index {} overflows the pool",
                        entries.len() - 1
                    ));
                }
                entries.push(Constant::Unusable);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, including the unusable slot 0
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool holds no usable entry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Fetch a raw entry by index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is out of range or unusable.
    pub fn get(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(malformed_error!(
                "Invalid constant pool index {}",
                index
            )),
            Some(entry) => Ok(entry),
        }
    }

    /// Fetch a `CONSTANT_Utf8` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(type_mismatch(index, "Utf8", other)),
        }
    }

    /// Fetch the internal name a `CONSTANT_Class` entry points at.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn get_class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.get_utf8(*name_index),
            other => Err(type_mismatch(index, "Class", other)),
        }
    }

    /// Resolve the value of a `ConstantValue` attribute.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is not a loadable literal.
    pub fn get_field_constant(&self, index: u16) -> Result<FieldConstant> {
        match self.get(index)? {
            Constant::Integer(value) => Ok(FieldConstant::Int(*value)),
            Constant::Long(value) => Ok(FieldConstant::Long(*value)),
            Constant::Float(value) => Ok(FieldConstant::Float(*value)),
            Constant::Double(value) => Ok(FieldConstant::Double(*value)),
            Constant::String(value_index) => {
                Ok(FieldConstant::String(self.get_utf8(*value_index)?.to_string()))
            }
            other => Err(type_mismatch(index, "literal", other)),
        }
    }
}

fn type_mismatch(index: u16, expected: &str, found: &Constant) -> crate::Error {
    let found: &'static str = found.into();
    malformed_error!(
        "Constant pool type mismatch at index {}: expected {}, found {}",
        index,
        expected,
        found
    )
}

/// Decode a modified UTF-8 byte sequence into a [`String`].
///
/// Unpaired surrogates are replaced with `U+FFFD`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on bytes that cannot start or continue a sequence,
/// including a raw `NUL` byte.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(plain) = std::str::from_utf8(bytes) {
        if !plain.contains('\0') && plain.chars().all(|c| (c as u32) < 0x1_0000) {
            return Ok(plain.to_string());
        }
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let first = bytes[index];
        match first {
            0x01..=0x7F => {
                units.push(u16::from(first));
                index += 1;
            }
            0xC0..=0xDF => {
                let second = continuation(bytes, index + 1)?;
                units.push((u16::from(first & 0x1F) << 6) | second);
                index += 2;
            }
            0xE0..=0xEF => {
                let second = continuation(bytes, index + 1)?;
                let third = continuation(bytes, index + 2)?;
                units.push((u16::from(first & 0x0F) << 12) | (second << 6) | third);
                index += 3;
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 byte 0x{:02X} at offset {}",
                    first,
                    index
                ))
            }
        }
    }

    Ok(String::from_utf16_lossy(&units))
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16> {
    match bytes.get(index) {
        Some(byte) if byte & 0xC0 == 0x80 => Ok(u16::from(byte & 0x3F)),
        _ => Err(malformed_error!(
            "Truncated modified UTF-8 sequence at offset {}",
            index
        )),
    }
}
