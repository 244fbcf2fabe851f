//! The class record cache.
//!
//! A [`ClassInfoRepository`] maps class names to [`ClassInfo`] records, with one independent
//! partition per registered [`ClassScope`]. The same name in two scopes yields two unrelated
//! records, which is how several versions of a class can be inspected side by side.
//!
//! # Lookup
//!
//! [`ClassInfoRepository::get`] resolves a name in this order:
//!
//! 1. Primitive names (`int`, `void`, ...) return the repository-wide canonical record.
//! 2. A cached record in the scope's partition is returned as is.
//! 3. Array names (`int[][]`, `[Ljava/lang/String;`) resolve their element type and wrap it
//!    once per dimension, caching every intermediate array.
//! 4. Anything else is requested from the scope, parsed and cached.
//!
//! A class the scope does not know is either replaced by a placeholder record (see
//! [`ClassInfo::is_unresolved`]) or reported as [`Error::UnresolvableReference`], depending on
//! [`RepositoryConfig::substitute_placeholders`]. Placeholders are cached like any other record
//! until they are invalidated.
//!
//! # Scope lifetime
//!
//! The repository only holds weak references to scopes. Once the last strong reference to a
//! scope is dropped, lookups in it fail with [`Error::ScopeGone`] and its partition is discarded
//! on the next [`ClassInfoRepository::purge`] or [`ClassInfoRepository::register_scope`].
//!
//! # Thread Safety
//!
//! Partitions are [`DashMap`]s and no map guard is ever held while class bytes are fetched or
//! parsed. Two threads that miss on the same name concurrently may both build a record; the
//! first one inserted wins and is returned to both.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use classscope::{ClassInfoRepository, DirectoryScope, RepositoryConfig};
//!
//! let repository = ClassInfoRepository::new(RepositoryConfig::default());
//! let scope = Arc::new(DirectoryScope::new("target/classes"));
//! let id = repository.register_scope(&scope);
//!
//! let info = repository.get("com.example.Service", id)?;
//! for method in info.methods().iter() {
//!     println!("{}{} {:?}", method.name, method.descriptor, method.parameter_names);
//! }
//! # Ok::<(), classscope::Error>(())
//! ```

use std::{
    fmt,
    io::Read,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;

use crate::{
    classfile::ClassReader,
    config::RepositoryConfig,
    metadata::{
        annotation::{AnnotationElement, AnnotationSource, NoAnnotations},
        builder::ClassInfoBuilder,
        class::{ClassInfo, ClassInfoRc},
        resolver::{array_of, primitive_info, ArrayName, Primitive},
        scope::ClassScope,
    },
    Error, Result,
};

/// Identifies a registered scope and its cache partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    /// The raw identifier
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The cache partition of one scope
struct Partition {
    scope: Weak<dyn ClassScope>,
    loader: String,
    classes: DashMap<String, ClassInfoRc>,
}

impl Partition {
    fn get(&self, name: &str) -> Option<ClassInfoRc> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    /// Remove `name` and every cached array built over it. Returns how many records were dropped.
    fn remove_with_arrays(&self, name: &str) -> usize {
        let array_prefix = format!("{name}[]");
        let mut removed = 0_usize;
        self.classes.retain(|cached, _| {
            let stale = cached == name || cached.starts_with(&array_prefix);
            if stale {
                removed += 1;
            }
            !stale
        });
        removed
    }

    /// Keep an existing record, unless it is a placeholder and `info` is not
    fn insert_if_absent(&self, name: String, info: ClassInfoRc) -> ClassInfoRc {
        match self.classes.entry(name) {
            Entry::Occupied(mut entry) if entry.get().is_unresolved() && !info.is_unresolved() => {
                entry.insert(info.clone());
                info
            }
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                entry.insert(info.clone());
                info
            }
        }
    }
}

/// Shared state behind a [`ClassInfoRepository`] handle
pub(crate) struct RepositoryInner {
    config: RepositoryConfig,
    partitions: DashMap<ScopeId, Arc<Partition>>,
    primitives: FxHashMap<Primitive, ClassInfoRc>,
    annotations: Arc<dyn AnnotationSource>,
    next_scope: AtomicU64,
}

impl RepositoryInner {
    fn context(self: &Arc<Self>, scope: ScopeId) -> ResolutionContext {
        ResolutionContext {
            repository: Arc::downgrade(self),
            scope: Some(scope),
            max_depth: self.config.max_hierarchy_depth,
        }
    }

    /// The partition of `scope` together with the scope itself, dropping partitions of scopes
    /// that no longer exist
    fn live_partition(&self, scope: ScopeId) -> Result<(Arc<Partition>, Arc<dyn ClassScope>)> {
        let partition = self
            .partitions
            .get(&scope)
            .map(|entry| entry.value().clone())
            .ok_or(Error::ScopeGone)?;

        match partition.scope.upgrade() {
            Some(alive) => Ok((partition, alive)),
            None => {
                debug!(
                    "Scope {scope} [{}] is gone, dropping its partition",
                    partition.loader
                );
                self.partitions.remove(&scope);
                Err(Error::ScopeGone)
            }
        }
    }

    fn build(self: &Arc<Self>, bytes: &[u8], scope: ScopeId) -> Result<ClassInfo> {
        ClassInfoBuilder::build(
            bytes,
            self.context(scope),
            self.config.collect_parameter_names,
        )
    }

    fn lookup(self: &Arc<Self>, name: &str, scope: ScopeId) -> Result<ClassInfoRc> {
        if name.is_empty() {
            return Err(Error::Empty);
        }

        let (partition, class_scope) = self.live_partition(scope)?;
        let parsed = ArrayName::parse(name)?;

        if !parsed.is_array() {
            if let Some(primitive) = parsed.primitive().and_then(|p| self.primitives.get(&p)) {
                return Ok(primitive.clone());
            }
        }

        let key = parsed.to_string();
        if let Some(hit) = partition.get(&key) {
            trace!("Cache hit for {key} in scope {scope}");
            return Ok(hit);
        }

        if parsed.is_array() {
            return self.lookup_array(&parsed, scope, &partition);
        }
        self.load(&key, scope, &partition, class_scope.as_ref())
    }

    fn lookup_array(
        self: &Arc<Self>,
        name: &ArrayName,
        scope: ScopeId,
        partition: &Partition,
    ) -> Result<ClassInfoRc> {
        let mut current = match name.primitive() {
            Some(Primitive::Void) => return Err(Error::InvalidDescriptor(name.to_string())),
            Some(primitive) => self
                .primitives
                .get(&primitive)
                .cloned()
                .ok_or_else(|| Error::InvalidDescriptor(name.to_string()))?,
            None => self.lookup(&name.component, scope)?,
        };

        for _ in 0..name.dimensions {
            let key = format!("{}[]", current.name());
            let cached = partition.get(&key);
            current = match cached {
                Some(existing) => existing,
                None => {
                    let array = Arc::new(array_of(&current, self.context(scope)));
                    partition.insert_if_absent(key, array)
                }
            };
        }
        Ok(current)
    }

    fn load(
        self: &Arc<Self>,
        name: &str,
        scope: ScopeId,
        partition: &Partition,
        class_scope: &dyn ClassScope,
    ) -> Result<ClassInfoRc> {
        let request = class_scope.name_style().apply(name);
        debug!("Loading {request} from [{}]", partition.loader);

        let Some(bytes) = class_scope.class_bytes(&request) else {
            return self.unresolvable(name, scope, partition);
        };

        let info = self.build(&bytes, scope)?;
        if info.name() != name {
            return Err(malformed_error!(
                "Loader [{}] returned class {} when asked for {}",
                partition.loader,
                info.name(),
                name
            ));
        }
        Ok(partition.insert_if_absent(name.to_string(), Arc::new(info)))
    }

    fn unresolvable(
        self: &Arc<Self>,
        name: &str,
        scope: ScopeId,
        partition: &Partition,
    ) -> Result<ClassInfoRc> {
        if !self.config.substitute_placeholders {
            return Err(Error::UnresolvableReference {
                name: name.to_string(),
                loader: partition.loader.clone(),
            });
        }

        warn!(
            "Could not resolve class [{name}] in loader [{}], using a placeholder",
            partition.loader
        );
        let placeholder = Arc::new(ClassInfo::unresolved(name, self.context(scope)));
        Ok(partition.insert_if_absent(name.to_string(), placeholder))
    }

    /// Resolve a hierarchy link. Failures other than a missing scope become uncached
    /// placeholders when placeholders are enabled, so a broken supertype never poisons the cache.
    fn resolve_link(self: &Arc<Self>, name: &str, scope: ScopeId) -> Result<ClassInfoRc> {
        match self.lookup(name, scope) {
            Ok(info) => Ok(info),
            Err(error @ (Error::ScopeGone | Error::UnresolvableReference { .. })) => Err(error),
            Err(error) if self.config.substitute_placeholders => {
                warn!("Failed to load class [{name}] ({error}), using a placeholder");
                Ok(Arc::new(ClassInfo::unresolved(name, self.context(scope))))
            }
            Err(error) => Err(error),
        }
    }
}

/// How a record reaches back into its repository and scope
#[derive(Clone)]
pub(crate) struct ResolutionContext {
    repository: Weak<RepositoryInner>,
    scope: Option<ScopeId>,
    max_depth: usize,
}

impl ResolutionContext {
    /// A context that belongs to no repository
    pub(crate) fn detached() -> Self {
        ResolutionContext {
            repository: Weak::new(),
            scope: None,
            max_depth: RepositoryConfig::default().max_hierarchy_depth,
        }
    }

    pub(crate) fn scope_id(&self) -> Option<ScopeId> {
        self.scope
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn repository(&self) -> Result<Arc<RepositoryInner>> {
        self.repository.upgrade().ok_or(Error::ScopeGone)
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<ClassInfoRc> {
        let repository = self.repository()?;
        match self.scope {
            Some(scope) => repository.resolve_link(name, scope),
            None => Primitive::from_java_name(name)
                .and_then(|primitive| repository.primitives.get(&primitive).cloned())
                .ok_or(Error::ScopeGone),
        }
    }

    pub(crate) fn scope(&self) -> Result<Option<Arc<dyn ClassScope>>> {
        let Some(scope) = self.scope else {
            return Ok(None);
        };
        let (_, alive) = self.repository()?.live_partition(scope)?;
        Ok(Some(alive))
    }

    pub(crate) fn loader_identity(&self) -> Option<String> {
        let scope = self.scope?;
        let repository = self.repository.upgrade()?;
        let loader = repository
            .partitions
            .get(&scope)
            .map(|entry| entry.value().loader.clone());
        loader
    }

    pub(crate) fn annotations(&self, class_name: &str) -> Result<Vec<AnnotationElement>> {
        let Some(scope) = self.scope else {
            return Ok(Vec::new());
        };
        let repository = self.repository()?;
        let (_, alive) = repository.live_partition(scope)?;
        Ok(repository.annotations.annotations(class_name, alive.as_ref()))
    }
}

/// Cache of [`ClassInfo`] records, partitioned by scope.
///
/// Cloning the repository yields another handle to the same cache.
#[derive(Clone)]
pub struct ClassInfoRepository {
    inner: Arc<RepositoryInner>,
}

impl ClassInfoRepository {
    /// Create an empty repository without an annotation source
    #[must_use]
    pub fn new(config: RepositoryConfig) -> Self {
        Self::with_annotation_source(config, Arc::new(NoAnnotations))
    }

    /// Create an empty repository that asks `source` for class annotations
    #[must_use]
    pub fn with_annotation_source(
        config: RepositoryConfig,
        source: Arc<dyn AnnotationSource>,
    ) -> Self {
        let inner = Arc::new_cyclic(|repository: &Weak<RepositoryInner>| {
            let context = ResolutionContext {
                repository: repository.clone(),
                scope: None,
                max_depth: config.max_hierarchy_depth,
            };
            let primitives = Primitive::iter()
                .map(|primitive| {
                    (
                        primitive,
                        Arc::new(primitive_info(primitive, context.clone())),
                    )
                })
                .collect();

            RepositoryInner {
                config,
                partitions: DashMap::new(),
                primitives,
                annotations: source,
                next_scope: AtomicU64::new(1),
            }
        });
        ClassInfoRepository { inner }
    }

    /// The configuration this repository was created with
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.inner.config
    }

    /// Register a scope and return the identifier of its partition.
    ///
    /// Registering the same scope again returns the existing identifier. Only a weak reference
    /// is kept; the caller decides how long the scope lives.
    pub fn register_scope<S: ClassScope + 'static>(&self, scope: &Arc<S>) -> ScopeId {
        self.purge();

        let weak: Weak<S> = Arc::downgrade(scope);
        let weak: Weak<dyn ClassScope> = weak;
        let existing = self
            .inner
            .partitions
            .iter()
            .find(|entry| entry.value().scope.ptr_eq(&weak))
            .map(|entry| *entry.key());
        if let Some(existing) = existing {
            return existing;
        }

        let id = ScopeId(self.inner.next_scope.fetch_add(1, Ordering::Relaxed));
        let loader = scope.loader_identity();
        debug!("Registered scope {id} for loader [{loader}]");
        self.inner.partitions.insert(
            id,
            Arc::new(Partition {
                scope: weak,
                loader,
                classes: DashMap::new(),
            }),
        );
        id
    }

    /// Drop a scope's partition and every record cached in it.
    ///
    /// Records already handed out stay valid, but can no longer resolve their supertypes.
    pub fn unregister_scope(&self, scope: ScopeId) -> bool {
        let removed = self.inner.partitions.remove(&scope).is_some();
        if removed {
            debug!("Unregistered scope {scope}");
        }
        removed
    }

    /// The scope behind `scope`.
    ///
    /// # Errors
    /// Returns [`Error::ScopeGone`] if the scope was dropped or unregistered.
    pub fn scope(&self, scope: ScopeId) -> Result<Arc<dyn ClassScope>> {
        Ok(self.inner.live_partition(scope)?.1)
    }

    /// Look up a class by name, loading it from the scope on a cache miss.
    ///
    /// `name` may use Java (`a.b.C`, `int[]`), internal (`a/b/C`) or descriptor-style array
    /// (`[I`) spelling.
    ///
    /// # Errors
    /// - [`Error::Empty`] for an empty name
    /// - [`Error::ScopeGone`] if the scope was dropped or unregistered
    /// - [`Error::UnresolvableReference`] for unknown classes when placeholders are disabled
    /// - any parse error of the class bytes, in which case nothing is cached
    pub fn get(&self, name: &str, scope: ScopeId) -> Result<ClassInfoRc> {
        self.inner.lookup(name, scope)
    }

    /// The canonical record of a primitive type
    #[must_use]
    pub fn primitive(&self, primitive: Primitive) -> Option<ClassInfoRc> {
        self.inner.primitives.get(&primitive).cloned()
    }

    /// Return the cached record for the class in `bytes`, building it from `bytes` on a miss.
    ///
    /// A cached placeholder is replaced by the record built from `bytes`.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for empty input, [`Error::ScopeGone`], or any parse error.
    pub fn get_from_bytes(&self, bytes: &[u8], scope: ScopeId) -> Result<ClassInfoRc> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }
        let name = ClassReader::class_name(bytes)?;
        self.get_named(&name, bytes, scope)
    }

    /// Drain `source` and proceed as [`ClassInfoRepository::get_from_bytes`].
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if reading fails, otherwise as `get_from_bytes`.
    pub fn get_from_reader<R: Read>(&self, source: R, scope: ScopeId) -> Result<ClassInfoRc> {
        let (name, bytes) = ClassReader::read_class_name(source)?;
        self.get_named(&name, &bytes, scope)
    }

    /// Build a record from `bytes` and store it, replacing any cached record of the same name.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for empty input, [`Error::ScopeGone`], or any parse error, in
    /// which case the cache is left untouched.
    pub fn get_or_create_from_bytes(&self, bytes: &[u8], scope: ScopeId) -> Result<ClassInfoRc> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }
        let (partition, _) = self.inner.live_partition(scope)?;
        let info = Arc::new(self.inner.build(bytes, scope)?);

        let stale = partition.remove_with_arrays(info.name());
        debug!(
            "Storing fresh record for {} in scope {scope} ({stale} stale records dropped)",
            info.name()
        );
        partition
            .classes
            .insert(info.name().to_string(), info.clone());
        Ok(info)
    }

    /// Drop the cached record for `name`, together with cached arrays of it.
    ///
    /// Records already handed out are unaffected. Returns `true` if anything was removed.
    pub fn invalidate(&self, name: &str, scope: ScopeId) -> bool {
        let Some(partition) = self
            .inner
            .partitions
            .get(&scope)
            .map(|entry| entry.value().clone())
        else {
            return false;
        };

        let key = ArrayName::parse(name).map_or_else(|_| name.to_string(), |n| n.to_string());
        let removed = partition.remove_with_arrays(&key);

        if removed > 0 {
            debug!("Invalidated {key} in scope {scope} ({removed} records)");
        }
        removed > 0
    }

    /// Mark a class as changed after its bytes were rewritten; same as
    /// [`ClassInfoRepository::invalidate`]
    pub fn mark_dirty(&self, name: &str, scope: ScopeId) -> bool {
        self.invalidate(name, scope)
    }

    /// `true` if a record for `name` is cached in the partition of `scope`
    #[must_use]
    pub fn contains(&self, name: &str, scope: ScopeId) -> bool {
        let Ok(parsed) = ArrayName::parse(name) else {
            return false;
        };
        self.inner
            .partitions
            .get(&scope)
            .map(|entry| entry.value().clone())
            .is_some_and(|partition| partition.classes.contains_key(&parsed.to_string()))
    }

    /// Number of cached records over all partitions, primitives excluded
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .partitions
            .iter()
            .map(|entry| entry.value().classes.len())
            .sum()
    }

    /// `true` if no records are cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered partitions
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.inner.partitions.len()
    }

    /// Drop the partitions of scopes that no longer exist. Returns how many were dropped.
    pub fn purge(&self) -> usize {
        let mut purged = 0_usize;
        self.inner.partitions.retain(|scope, partition| {
            let alive = partition.scope.strong_count() > 0;
            if !alive {
                debug!(
                    "Purging partition {scope} [{}] with {} records",
                    partition.loader,
                    partition.classes.len()
                );
                purged += 1;
            }
            alive
        });
        purged
    }

    fn get_named(&self, name: &str, bytes: &[u8], scope: ScopeId) -> Result<ClassInfoRc> {
        let (partition, _) = self.inner.live_partition(scope)?;
        if let Some(hit) = partition.get(name).filter(|hit| !hit.is_unresolved()) {
            trace!("Cache hit for {name} in scope {scope}");
            return Ok(hit);
        }

        let info = self.inner.build(bytes, scope)?;
        Ok(partition.insert_if_absent(info.name().to_string(), Arc::new(info)))
    }
}

impl fmt::Debug for ClassInfoRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfoRepository")
            .field("config", &self.inner.config)
            .field("partitions", &self.partition_count())
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::scope::{DirectoryScope, MemoryScope},
        test::{ClassFileBuilder, MethodSpec},
    };

    fn scope_with(classes: &[ClassFileBuilder]) -> Arc<MemoryScope> {
        let scope = Arc::new(MemoryScope::new("test"));
        for class in classes {
            scope.insert(class.build()).unwrap();
        }
        scope
    }

    #[test]
    fn get_is_reference_stable() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[ClassFileBuilder::new("p/A")]);
        let id = repository.register_scope(&scope);

        let first = repository.get("p.A", id).unwrap();
        let second = repository.get("p/A", id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(repository.contains("p.A", id));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn register_scope_is_idempotent() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[]);
        let a = repository.register_scope(&scope);
        let b = repository.register_scope(&scope);
        assert_eq!(a, b);
        assert_eq!(repository.partition_count(), 1);

        let other = scope_with(&[]);
        assert_ne!(repository.register_scope(&other), a);
        assert_eq!(repository.partition_count(), 2);

        let directory = Arc::new(DirectoryScope::new("classes"));
        let on_disk = repository.register_scope(&directory);
        assert_eq!(repository.register_scope(&directory), on_disk);
        assert_eq!(repository.scope(on_disk).unwrap().loader_identity(), "directory:classes");
        assert_eq!(repository.partition_count(), 3);
    }

    #[test]
    fn dropped_scopes_are_gone() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[ClassFileBuilder::new("p/A")]);
        let id = repository.register_scope(&scope);
        let info = repository.get("p.A", id).unwrap();

        drop(scope);
        assert!(matches!(repository.get("p.A", id), Err(Error::ScopeGone)));
        assert_eq!(repository.partition_count(), 0);
        assert_eq!(info.name(), "p.A");
        assert!(matches!(info.superclass(), Err(Error::ScopeGone)));

        let scope = scope_with(&[]);
        let id = repository.register_scope(&scope);
        assert!(repository.unregister_scope(id));
        assert!(matches!(repository.get("p.A", id), Err(Error::ScopeGone)));
    }

    #[test]
    fn purge_drops_partitions_of_dead_scopes() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let kept = scope_with(&[]);
        let dropped = scope_with(&[]);
        repository.register_scope(&kept);
        repository.register_scope(&dropped);
        drop(dropped);
        assert_eq!(repository.purge(), 1);
        assert_eq!(repository.partition_count(), 1);
    }

    #[test]
    fn placeholders_are_cached_until_invalidated() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[]);
        let id = repository.register_scope(&scope);

        let missing = repository.get("p.Missing", id).unwrap();
        assert!(missing.is_unresolved());
        assert!(missing.superclass().unwrap().is_none());
        assert!(Arc::ptr_eq(&missing, &repository.get("p.Missing", id).unwrap()));

        scope.insert(ClassFileBuilder::new("p/Missing").build()).unwrap();
        assert!(repository.get("p.Missing", id).unwrap().is_unresolved());
        assert!(repository.invalidate("p.Missing", id));
        assert!(!repository.get("p.Missing", id).unwrap().is_unresolved());
    }

    #[test]
    fn strict_mode_reports_missing_classes() {
        let repository = ClassInfoRepository::new(RepositoryConfig::strict());
        let scope = scope_with(&[]);
        let id = repository.register_scope(&scope);

        match repository.get("p.Missing", id) {
            Err(Error::UnresolvableReference { name, loader }) => {
                assert_eq!(name, "p.Missing");
                assert_eq!(loader, "test");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(repository.is_empty());
    }

    #[test]
    fn malformed_bytes_are_not_cached() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[]);
        scope.insert_named("p/Broken", vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0]);
        let id = repository.register_scope(&scope);

        assert!(repository.get("p.Broken", id).is_err());
        assert!(!repository.contains("p.Broken", id));
        assert!(matches!(
            repository.get_or_create_from_bytes(&[], id),
            Err(Error::Empty)
        ));
        assert!(matches!(repository.get("", id), Err(Error::Empty)));
    }

    #[test]
    fn bytes_for_the_wrong_class_are_rejected() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[]);
        scope.insert_named("p/A", ClassFileBuilder::new("p/B").build());
        let id = repository.register_scope(&scope);
        assert!(matches!(
            repository.get("p.A", id),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn get_or_create_replaces_and_get_from_bytes_reuses() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[ClassFileBuilder::new("p/A")]);
        let id = repository.register_scope(&scope);

        let cached = repository.get("p.A", id).unwrap();
        let bytes = ClassFileBuilder::new("p/A")
            .method(MethodSpec::new(0x0001, "added", "()V"))
            .build();

        let reused = repository.get_from_bytes(&bytes, id).unwrap();
        assert!(Arc::ptr_eq(&cached, &reused));
        assert!(reused.methods().is_empty());

        let replaced = repository.get_or_create_from_bytes(&bytes, id).unwrap();
        assert!(!Arc::ptr_eq(&cached, &replaced));
        assert_eq!(replaced.methods().len(), 1);
        assert!(Arc::ptr_eq(&replaced, &repository.get("p.A", id).unwrap()));

        let from_reader = repository.get_from_reader(&bytes[..], id).unwrap();
        assert!(Arc::ptr_eq(&replaced, &from_reader));
    }

    #[test]
    fn arrays_are_cached_per_dimension_and_invalidated_with_their_component() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[ClassFileBuilder::new("p/A")]);
        let id = repository.register_scope(&scope);

        let two = repository.get("p.A[][]", id).unwrap();
        assert!(repository.contains("p.A[]", id));
        assert!(repository.contains("[Lp/A;", id));
        assert!(Arc::ptr_eq(&two, &repository.get("[[Lp/A;", id).unwrap()));
        assert_eq!(two.signature(), "[[Lp/A;");

        assert!(repository.invalidate("p.A", id));
        assert!(!repository.contains("p.A[]", id));
        assert!(!repository.contains("p.A[][]", id));
        assert!(!repository.invalidate("p.A", id));
    }

    #[test]
    fn get_or_create_drops_arrays_of_the_replaced_record() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[ClassFileBuilder::new("p/A")]);
        let id = repository.register_scope(&scope);

        let old = repository.get("p.A", id).unwrap();
        let old_array = repository.get("p.A[]", id).unwrap();
        repository.get("p.A[][]", id).unwrap();

        let bytes = ClassFileBuilder::new("p/A").field(0x0001, "x", "I").build();
        let replaced = repository.get_or_create_from_bytes(&bytes, id).unwrap();
        assert!(!repository.contains("p.A[]", id));
        assert!(!repository.contains("p.A[][]", id));

        let array = repository.get("p.A[]", id).unwrap();
        assert!(!Arc::ptr_eq(&array, &old_array));
        let component = array.component_type().unwrap().unwrap();
        assert!(Arc::ptr_eq(&component, &replaced));
        assert_eq!(component.fields().len(), 1);
        assert!(old.fields().is_empty());
    }

    #[test]
    fn excessive_array_dimensions_are_rejected() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let scope = scope_with(&[]);
        let id = repository.register_scope(&scope);

        let descriptor = format!("{}I", "[".repeat(60_000));
        assert!(matches!(
            repository.get(&descriptor, id),
            Err(Error::InvalidDescriptor(_))
        ));
        let java_spelling = format!("int{}", "[]".repeat(256));
        assert!(matches!(
            repository.get(&java_spelling, id),
            Err(Error::InvalidDescriptor(_))
        ));
        let deepest = repository.get(&format!("int{}", "[]".repeat(255)), id).unwrap();
        assert_eq!(deepest.dimensions(), 255);

        let bytes = ClassFileBuilder::new("p/Deep")
            .field(0x0001, "grid", &descriptor)
            .build();
        assert!(matches!(
            repository.get_from_bytes(&bytes, id),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(!repository.contains("p.Deep", id));
    }

    #[test]
    fn primitives_are_shared_across_scopes() {
        let repository = ClassInfoRepository::new(RepositoryConfig::default());
        let first = repository.register_scope(&scope_with(&[]));
        let keep = scope_with(&[]);
        let second = repository.register_scope(&keep);

        let int = repository.get("int", second).unwrap();
        assert!(Arc::ptr_eq(
            &int,
            &repository.primitive(Primitive::Int).unwrap()
        ));
        assert!(matches!(repository.get("int", first), Err(Error::ScopeGone)));
        assert!(matches!(
            repository.get("void[]", second),
            Err(Error::InvalidDescriptor(_))
        ));
    }
}
