//! Shared helpers for integration tests.

#![allow(dead_code)]

#[path = "../../src/test/classfile.rs"]
mod classfile;

use std::sync::Arc;

use classscope::prelude::*;

pub use classfile::{ClassFileBuilder, MethodSpec};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Repository with a single in-memory scope holding `classes`
pub fn memory_repository(
    config: RepositoryConfig,
    classes: &[ClassFileBuilder],
) -> Result<(ClassInfoRepository, Arc<MemoryScope>, ScopeId)> {
    init_logging();
    let repository = ClassInfoRepository::new(config);
    let scope = Arc::new(MemoryScope::new("integration"));
    for class in classes {
        scope.insert(class.build())?;
    }
    let id = repository.register_scope(&scope);
    Ok((repository, scope, id))
}

pub fn object_class() -> ClassFileBuilder {
    ClassFileBuilder::new("java/lang/Object")
        .no_super()
        .default_constructor()
        .method(MethodSpec::new(0x0001, "toString", "()Ljava/lang/String;"))
}
