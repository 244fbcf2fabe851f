//! JVM class file decoding.
//!
//! This module turns the raw bytes of a `.class` file into a stream of structural events. It
//! knows nothing about repositories, scopes or hierarchies; those live in [`crate::metadata`].
//!
//! # Key Components
//!
//! - [`crate::classfile::reader::ClassReader`] - Header validation and the event walk
//! - [`crate::classfile::reader::ClassEvent`] - The tagged events handed to a sink
//! - [`crate::classfile::constant_pool::ConstantPool`] - Symbol table and modified UTF-8 decoding
//! - [`crate::classfile::descriptor`] - Field/method descriptors and name conventions
//! - [`crate::classfile::flags::AccessFlags`] - Class, field and method access flags

pub mod constant_pool;
pub mod descriptor;
pub mod flags;
pub mod reader;

pub use constant_pool::{ConstantPool, FieldConstant};
pub use descriptor::{
    class_descriptor, java_class_name, parse_field_descriptor, parse_method_descriptor,
    FieldType, MethodDescriptor, Primitive, ReturnType, MAX_ARRAY_DIMENSIONS,
};
pub use flags::AccessFlags;
pub use reader::{ClassEvent, ClassReader};
