//! Byte-level access to class file data.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - Bounds-checked big-endian cursor used by the class reader
//! - [`crate::file::io`] - Primitive decoding helpers backing the parser

pub mod io;
pub mod parser;
