//! Shared fixtures for unit tests.

mod classfile;

use std::sync::Arc;

pub use classfile::*;

use crate::{
    metadata::{repository::ClassInfoRepository, repository::ScopeId, scope::MemoryScope},
    RepositoryConfig,
};

/// A repository with one in-memory scope holding `classes`.
///
/// The scope is returned as well; dropping it makes the partition unreachable.
pub fn repository_with(
    config: RepositoryConfig,
    classes: &[ClassFileBuilder],
) -> (ClassInfoRepository, Arc<MemoryScope>, ScopeId) {
    let repository = ClassInfoRepository::new(config);
    let scope = Arc::new(MemoryScope::new("test"));
    for class in classes {
        scope.insert(class.build()).unwrap();
    }
    let id = repository.register_scope(&scope);
    (repository, scope, id)
}

/// `java/lang/Object` with the members hierarchy tests rely on
pub fn object_class() -> ClassFileBuilder {
    ClassFileBuilder::new("java/lang/Object")
        .no_super()
        .default_constructor()
        .method(MethodSpec::new(0x0001, "toString", "()Ljava/lang/String;"))
        .method(MethodSpec::new(0x0001, "hashCode", "()I"))
        .method(
            MethodSpec::new(0x0001, "equals", "(Ljava/lang/Object;)Z")
                .local("this", "Ljava/lang/Object;", 0)
                .local("obj", "Ljava/lang/Object;", 1),
        )
}
