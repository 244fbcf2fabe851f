// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # classscope
//!
//! Structural metadata for JVM classes, read straight from class files without loading them.
//!
//! `classscope` parses `.class` files into immutable, cached records describing a type's shape:
//! its modifiers, superclass and interfaces, declared fields, methods and constructors (with
//! parameter names recovered from debug information), and its place in the type hierarchy.
//! Primitive and array types get synthetic records that behave like their reflective
//! counterparts.
//!
//! ## Features
//!
//! - **Event-based reader** - A single pass over the class file produces a stream of
//!   [`ClassEvent`]s
//! - **Scope-partitioned cache** - One independent partition per class source, held weakly
//! - **Lazy hierarchy** - Supertypes are resolved on first use and never form reference cycles
//! - **Override-aware lookup** - Members are found by name/descriptor identity across the
//!   hierarchy, the way the JVM resolves them
//!
//! ## Architecture
//!
//! - [`classfile`] - Class file decoding: header, constant pool, descriptors, the event walk
//! - [`metadata`] - Records, the repository, scopes and hierarchy resolution
//! - [`config`] - Repository configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use classscope::prelude::*;
//!
//! let repository = ClassInfoRepository::new(RepositoryConfig::default());
//! let scope = Arc::new(DirectoryScope::new("target/classes"));
//! let id = repository.register_scope(&scope);
//!
//! let info = repository.get("com.example.Service", id)?;
//! println!("{} extends {:?}", info.name(), info.super_name());
//! for superclass in info.superclasses()? {
//!     println!("  <- {}", superclass.name());
//! }
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Parse errors are never cached, so a
//! failed lookup can simply be retried once the bytes are fixed. Missing supertypes become
//! placeholder records by default; see [`RepositoryConfig::strict`] to surface them as errors.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types
pub mod prelude;

/// Class file decoding
pub mod classfile;

/// Repository configuration
pub mod config;

/// Class records, the repository and hierarchy resolution
pub mod metadata;

/// `classscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `classscope` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use classfile::{AccessFlags, ClassEvent, ClassReader, FieldConstant, Primitive};
pub use config::RepositoryConfig;
pub use file::parser::Parser;
pub use metadata::{
    annotation::{AnnotationElement, AnnotationMap, AnnotationSource, NoAnnotations},
    builder::ClassInfoBuilder,
    class::{ClassInfo, ClassInfoRc, ClassInfoRef, ClassKind},
    hash::MemberHash,
    member::{
        AnyMember, ConstructorInfo, ConstructorInfoRc, FieldInfo, FieldInfoRc, Member,
        MethodInfo, MethodInfoRc, MethodKind, StaticInitializerInfo,
    },
    repository::{ClassInfoRepository, ScopeId},
    resolver::ArrayName,
    scope::{ClassScope, DirectoryScope, MemoryScope, NameStyle},
};
