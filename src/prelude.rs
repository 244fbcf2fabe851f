//! # classscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classscope library. Import this module to get quick access to the essential
//! types for class metadata analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classscope operations
pub use crate::Error;

/// The result type used throughout classscope
pub use crate::Result;

/// Configuration for the class record cache
pub use crate::RepositoryConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The scope-partitioned class record cache
pub use crate::metadata::repository::{ClassInfoRepository, ScopeId};

/// Sources of class file bytes
pub use crate::metadata::scope::{ClassScope, DirectoryScope, MemoryScope, NameStyle};

// ================================================================================================
// Records
// ================================================================================================

/// Class records and hierarchy links
pub use crate::metadata::class::{ClassInfo, ClassInfoRc, ClassInfoRef, ClassKind};

/// Member records
pub use crate::metadata::member::{
    AnyMember, ConstructorInfo, ConstructorInfoRc, FieldInfo, FieldInfoRc, Member, MethodInfo,
    MethodInfoRc, MethodKind, StaticInitializerInfo,
};

/// Member identity hashing
pub use crate::metadata::hash::MemberHash;

/// Annotations
pub use crate::metadata::annotation::{AnnotationElement, AnnotationSource};

// ================================================================================================
// Class File Level
// ================================================================================================

/// Reader, events and descriptor types
pub use crate::classfile::{
    AccessFlags, ClassEvent, ClassReader, FieldConstant, FieldType, MethodDescriptor, Primitive,
    ReturnType,
};
