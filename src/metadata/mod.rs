//! Class metadata records, their cache and hierarchy resolution.
//!
//! # Key Components
//!
//! - [`repository`] - The scope-partitioned cache and its lookup algorithm
//! - [`class`] - The [`class::ClassInfo`] record and hierarchy queries
//! - [`member`] - Fields, methods, constructors and the static initializer
//! - [`builder`] - Assembles a record from class reader events
//! - [`resolver`] - Synthetic records for primitive and array types
//! - [`hash`] - Member identity hashing
//! - [`scope`] - Sources of class file bytes
//! - [`annotation`] - Pluggable annotation lookup
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use classscope::{ClassInfoRepository, MemberHash, MemoryScope, RepositoryConfig};
//!
//! let scope = Arc::new(MemoryScope::new("generated"));
//! scope.insert(std::fs::read("Foo.class")?)?;
//!
//! let repository = ClassInfoRepository::new(RepositoryConfig::default());
//! let id = repository.register_scope(&scope);
//! let foo = repository.get("Foo", id)?;
//!
//! // Inherited from java.lang.Object unless Foo overrides it
//! let to_string = foo.method(MemberHash::of("toString", "()Ljava/lang/String;"))?;
//! println!("{:?}", to_string.map(|m| m.declaring_type.clone()));
//! # Ok::<(), classscope::Error>(())
//! ```

/// Pluggable annotation lookup
pub mod annotation;
/// Event consumer that assembles class records
pub mod builder;
/// The class record and hierarchy resolution
pub mod class;
/// Member identity hashing
pub mod hash;
/// Field, method and constructor records
pub mod member;
/// The scope-partitioned class record cache
pub mod repository;
/// Primitive and array type records
pub mod resolver;
/// Sources of class file bytes
pub mod scope;
