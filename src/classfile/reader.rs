//! Event-based class file reader.
//!
//! [`ClassReader`] decodes the header and constant pool of a class file up front and then walks
//! the remaining structure on [`ClassReader::accept`], handing a [`ClassEvent`] to a single sink
//! for every declaration it encounters:
//!
//! 1. [`ClassEvent::Header`] - name, access flags, superclass and interfaces
//! 2. [`ClassEvent::Field`] - once per field, in class file order
//! 3. [`ClassEvent::Member`] - once per method, in class file order, each followed by the
//!    [`ClassEvent::LocalVariable`] records of its `LocalVariableTable`
//! 4. [`ClassEvent::End`]
//!
//! Any structural error aborts the walk and is returned from `accept`; consumers must discard
//! whatever they gathered from earlier events.
//!
//! # Examples
//!
//! ```rust,no_run
//! use classscope::{ClassEvent, ClassReader};
//!
//! let bytes = std::fs::read("Foo.class")?;
//! let reader = ClassReader::new(&bytes)?;
//! reader.accept(&mut |event| {
//!     if let ClassEvent::Member { name, descriptor, .. } = event {
//!         println!("{name}{descriptor}");
//!     }
//!     Ok(())
//! })?;
//! # Ok::<(), classscope::Error>(())
//! ```

use std::io::Read;

use crate::{
    classfile::{
        constant_pool::{ConstantPool, FieldConstant},
        flags::AccessFlags,
    },
    file::parser::Parser,
    Error, Result,
};

/// The class file magic number
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;
/// Highest class file major version understood by the reader (Java 25)
pub const MAX_MAJOR_VERSION: u16 = 69;

/// A structural event produced while walking a class file
#[derive(Debug, Clone, PartialEq)]
pub enum ClassEvent<'a> {
    /// The type header
    Header {
        /// Internal name of the class (`a/b/C`)
        name: &'a str,
        /// Class access flags
        access: AccessFlags,
        /// Internal name of the superclass, absent only for `java/lang/Object`
        super_name: Option<&'a str>,
        /// Internal names of the directly implemented interfaces
        interfaces: Vec<&'a str>,
    },
    /// A field declaration
    Field {
        /// Field name
        name: &'a str,
        /// Field descriptor
        descriptor: &'a str,
        /// Field access flags
        access: AccessFlags,
        /// Value of the `ConstantValue` attribute, if any
        constant: Option<FieldConstant>,
    },
    /// A method, constructor or static initializer declaration
    Member {
        /// Method name (`<init>` for constructors, `<clinit>` for the static initializer)
        name: &'a str,
        /// Method descriptor
        descriptor: &'a str,
        /// Method access flags
        access: AccessFlags,
        /// Internal names from the `Exceptions` attribute
        exceptions: Vec<&'a str>,
    },
    /// A `LocalVariableTable` entry of the most recent [`ClassEvent::Member`]
    LocalVariable {
        /// Variable name
        name: &'a str,
        /// Variable descriptor
        descriptor: &'a str,
        /// Local variable slot
        index: u16,
    },
    /// End of the class file
    End,
}

/// Reader over the bytes of a single class file
pub struct ClassReader<'a> {
    data: &'a [u8],
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    body_offset: usize,
}

impl<'a> ClassReader<'a> {
    /// Validate the header and parse the constant pool.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for empty input, [`Error::InvalidMagic`],
    /// [`Error::UnsupportedVersion`], or a parse error from the constant pool.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(data);
        let magic = parser.read_be::<u32>()?;
        if magic != CLASS_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        if major_version > MAX_MAJOR_VERSION {
            return Err(Error::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let constant_pool = ConstantPool::parse(&mut parser)?;

        Ok(ClassReader {
            data,
            minor_version,
            major_version,
            constant_pool,
            body_offset: parser.pos(),
        })
    }

    /// Extract only the dot-normalized class name.
    ///
    /// Parses up to and including `this_class`, so a buffer that has been cut off after the
    /// header is still sufficient.
    ///
    /// # Errors
    /// Returns an error if the header or constant pool is malformed or truncated.
    pub fn class_name(data: &[u8]) -> Result<String> {
        let reader = ClassReader::new(data)?;
        let mut parser = Parser::new(reader.data);
        parser.seek(reader.body_offset)?;
        let _access = parser.read_be::<u16>()?;
        let this_class = parser.read_be::<u16>()?;
        Ok(reader
            .constant_pool
            .get_class_name(this_class)?
            .replace('/', "."))
    }

    /// Drain `source` and extract the class name together with the bytes read.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] on I/O failure, or the errors of [`ClassReader::class_name`].
    pub fn read_class_name<R: Read>(mut source: R) -> Result<(String, Vec<u8>)> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        let name = Self::class_name(&bytes)?;
        Ok((name, bytes))
    }

    /// Minor class file version
    #[must_use]
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// Major class file version
    #[must_use]
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// The parsed constant pool
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// Walk the class body and emit one [`ClassEvent`] per declaration.
    ///
    /// The first error, whether raised by the reader or returned by `sink`, stops the walk.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] or [`Error::OutOfBounds`] for structural problems, or
    /// whatever error `sink` produced.
    pub fn accept<F>(&self, sink: &mut F) -> Result<()>
    where
        F: FnMut(ClassEvent<'_>) -> Result<()>,
    {
        let cp = &self.constant_pool;
        let mut parser = Parser::new(self.data);
        parser.seek(self.body_offset)?;

        let access = AccessFlags::from_raw(parser.read_be::<u16>()?);
        let name = cp.get_class_name(parser.read_be::<u16>()?)?;
        let super_index = parser.read_be::<u16>()?;
        let super_name = if super_index == 0 {
            None
        } else {
            Some(cp.get_class_name(super_index)?)
        };

        let interfaces_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(usize::from(interfaces_count));
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(parser.read_be::<u16>()?)?);
        }

        sink(ClassEvent::Header {
            name,
            access,
            super_name,
            interfaces,
        })?;

        let fields_count = parser.read_be::<u16>()?;
        for _ in 0..fields_count {
            self.read_field(&mut parser, sink)?;
        }

        let methods_count = parser.read_be::<u16>()?;
        for _ in 0..methods_count {
            self.read_method(&mut parser, sink)?;
        }

        // Class level attributes carry nothing the events expose, but they still have to be
        // well-formed for the file to be accepted.
        let attributes_count = parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let _name = cp.get_utf8(parser.read_be::<u16>()?)?;
            let length = parser.read_be::<u32>()? as usize;
            parser.advance_by(length)?;
        }
        parser.ensure_empty()?;

        sink(ClassEvent::End)
    }

    fn read_field<F>(&self, parser: &mut Parser<'a>, sink: &mut F) -> Result<()>
    where
        F: FnMut(ClassEvent<'_>) -> Result<()>,
    {
        let cp = &self.constant_pool;
        let access = AccessFlags::from_raw(parser.read_be::<u16>()?);
        let name = cp.get_utf8(parser.read_be::<u16>()?)?;
        let descriptor = cp.get_utf8(parser.read_be::<u16>()?)?;

        let mut constant = None;
        let attributes_count = parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let attr_name = cp.get_utf8(parser.read_be::<u16>()?)?;
            let length = parser.read_be::<u32>()? as usize;
            let info = parser.read_bytes(length)?;
            if attr_name == "ConstantValue" {
                let mut sub = Parser::new(info);
                constant = Some(cp.get_field_constant(sub.read_be::<u16>()?)?);
                sub.ensure_empty()?;
            }
        }

        sink(ClassEvent::Field {
            name,
            descriptor,
            access,
            constant,
        })
    }

    fn read_method<F>(&self, parser: &mut Parser<'a>, sink: &mut F) -> Result<()>
    where
        F: FnMut(ClassEvent<'_>) -> Result<()>,
    {
        let cp = &self.constant_pool;
        let access = AccessFlags::from_raw(parser.read_be::<u16>()?);
        let name = cp.get_utf8(parser.read_be::<u16>()?)?;
        let descriptor = cp.get_utf8(parser.read_be::<u16>()?)?;

        let mut exceptions = Vec::new();
        let mut code = None;
        let attributes_count = parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let attr_name = cp.get_utf8(parser.read_be::<u16>()?)?;
            let length = parser.read_be::<u32>()? as usize;
            let info = parser.read_bytes(length)?;
            match attr_name {
                "Exceptions" => {
                    let mut sub = Parser::new(info);
                    let count = sub.read_be::<u16>()?;
                    for _ in 0..count {
                        exceptions.push(cp.get_class_name(sub.read_be::<u16>()?)?);
                    }
                    sub.ensure_empty()?;
                }
                "Code" => code = Some(info),
                _ => {}
            }
        }

        sink(ClassEvent::Member {
            name,
            descriptor,
            access,
            exceptions,
        })?;

        match code {
            Some(code) => self.read_code(code, sink),
            None => Ok(()),
        }
    }

    fn read_code<F>(&self, code: &'a [u8], sink: &mut F) -> Result<()>
    where
        F: FnMut(ClassEvent<'_>) -> Result<()>,
    {
        let cp = &self.constant_pool;
        let mut parser = Parser::new(code);
        let _max_stack = parser.read_be::<u16>()?;
        let _max_locals = parser.read_be::<u16>()?;
        let code_length = parser.read_be::<u32>()? as usize;
        parser.advance_by(code_length)?;
        let exception_table_length = usize::from(parser.read_be::<u16>()?);
        parser.advance_by(exception_table_length * 8)?;

        let attributes_count = parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let attr_name = cp.get_utf8(parser.read_be::<u16>()?)?;
            let length = parser.read_be::<u32>()? as usize;
            let info = parser.read_bytes(length)?;
            if attr_name != "LocalVariableTable" {
                continue;
            }

            let mut sub = Parser::new(info);
            let count = sub.read_be::<u16>()?;
            for _ in 0..count {
                let _start_pc = sub.read_be::<u16>()?;
                let _length = sub.read_be::<u16>()?;
                let name = cp.get_utf8(sub.read_be::<u16>()?)?;
                let descriptor = cp.get_utf8(sub.read_be::<u16>()?)?;
                let index = sub.read_be::<u16>()?;
                sink(ClassEvent::LocalVariable {
                    name,
                    descriptor,
                    index,
                })?;
            }
            sub.ensure_empty()?;
        }
        parser.ensure_empty()
    }
}
