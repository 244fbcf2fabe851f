//! The class record: one cached, immutable description of a type within a scope.
//!
//! A [`ClassInfo`] owns the members it declares and refers to its superclass, interfaces and
//! component type only by name. Those links are resolved through the repository on first use and
//! then remembered as weak references ([`ClassInfoRef`]), so records never keep each other alive
//! and a reclaimed target is simply looked up again.
//!
//! # Lookup order
//!
//! Member lookups by identity hash mirror how the JVM finds inherited members:
//!
//! - methods: declared, then each interface depth-first in declaration order, then the superclass
//! - fields: declared, then the superclass chain, then interfaces
//! - constructors: declared, then the superclass chain
//!
//! A declared member therefore always shadows an inherited member with the same identity.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, RwLock, Weak},
};

use rustc_hash::FxHashSet;

use crate::{
    classfile::{java_class_name, AccessFlags, Primitive},
    metadata::{
        annotation::AnnotationElement,
        member::{
            AnyMember, ConstructorInfoRc, FieldInfo, FieldInfoRc, MemberTable, MethodInfo,
            MethodInfoRc, StaticInitializerInfo,
        },
        repository::{ResolutionContext, ScopeId},
        scope::ClassScope,
    },
    Error, Result,
};

/// Reference to a [`ClassInfo`]
pub type ClassInfoRc = Arc<ClassInfo>;

/// Name of the root of every class hierarchy
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// A weak, name-carrying reference to a [`ClassInfo`]
#[derive(Clone, Debug)]
pub struct ClassInfoRef {
    name: String,
    weak_ref: Weak<ClassInfo>,
}

impl ClassInfoRef {
    /// Create a new `ClassInfoRef` from a strong reference
    #[must_use]
    pub fn new(strong_ref: &ClassInfoRc) -> Self {
        ClassInfoRef {
            name: strong_ref.name.clone(),
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference, or `None` if the record has been reclaimed
    #[must_use]
    pub fn upgrade(&self) -> Option<ClassInfoRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced record is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Name of the referenced class, available even after it was reclaimed
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&ClassInfoRc> for ClassInfoRef {
    fn from(strong_ref: &ClassInfoRc) -> Self {
        Self::new(strong_ref)
    }
}

/// What a [`ClassInfo`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// A class, abstract or concrete
    Class,
    /// An interface or annotation type
    Interface,
    /// One of the primitive types, including `void`
    Primitive(Primitive),
    /// An array type
    Array {
        /// Number of dimensions, at least 1
        dimensions: usize,
    },
    /// Placeholder for a class that could not be obtained from its scope
    Unresolved,
}

/// Lazily resolved, weakly held hierarchy links
struct LazyLinks {
    names: Vec<String>,
    slot: RwLock<Option<Vec<ClassInfoRef>>>,
}

impl LazyLinks {
    fn new(names: Vec<String>) -> Self {
        LazyLinks {
            names,
            slot: RwLock::new(None),
        }
    }

    fn resolved(target: &ClassInfoRc) -> Self {
        LazyLinks {
            names: vec![target.name.clone()],
            slot: RwLock::new(Some(vec![ClassInfoRef::new(target)])),
        }
    }

    fn resolve(&self, context: &ResolutionContext) -> Result<Vec<ClassInfoRc>> {
        if self.names.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(links) = read_lock!(self.slot).as_ref() {
            let alive: Option<Vec<_>> = links.iter().map(ClassInfoRef::upgrade).collect();
            if let Some(alive) = alive {
                return Ok(alive);
            }
        }

        let mut targets = Vec::with_capacity(self.names.len());
        for name in &self.names {
            targets.push(context.resolve(name)?);
        }
        *write_lock!(self.slot) = Some(targets.iter().map(ClassInfoRef::new).collect());
        Ok(targets)
    }
}

/// Everything a record is made of, gathered before the record is sealed
pub(crate) struct ClassShape {
    pub name: String,
    pub signature: String,
    pub flags: AccessFlags,
    pub kind: ClassKind,
    pub super_name: Option<String>,
    pub interface_names: Vec<String>,
    pub has_static_initializer: bool,
    pub fields: MemberTable<FieldInfo>,
    pub methods: MemberTable<MethodInfo>,
    pub constructors: MemberTable<MethodInfo>,
}

impl ClassShape {
    pub(crate) fn empty(
        name: String,
        signature: String,
        flags: AccessFlags,
        kind: ClassKind,
    ) -> Self {
        ClassShape {
            name,
            signature,
            flags,
            kind,
            super_name: None,
            interface_names: Vec::new(),
            has_static_initializer: false,
            fields: MemberTable::new(),
            methods: MemberTable::new(),
            constructors: MemberTable::new(),
        }
    }
}

/// Metadata of a single class, interface, array or primitive type.
///
/// Two records are equal exactly when their names are equal, regardless of which scope or build
/// produced them.
pub struct ClassInfo {
    name: String,
    signature: String,
    flags: AccessFlags,
    kind: ClassKind,
    super_name: Option<String>,
    interface_names: Vec<String>,
    has_static_initializer: bool,
    fields: MemberTable<FieldInfo>,
    methods: MemberTable<MethodInfo>,
    constructors: MemberTable<MethodInfo>,
    superclass: LazyLinks,
    interfaces: LazyLinks,
    component: Option<LazyLinks>,
    static_initializer: OnceLock<StaticInitializerInfo>,
    annotations: OnceLock<Arc<[AnnotationElement]>>,
    context: ResolutionContext,
}

impl ClassInfo {
    pub(crate) fn from_shape(shape: ClassShape, context: ResolutionContext) -> Self {
        ClassInfo {
            superclass: LazyLinks::new(shape.super_name.iter().cloned().collect()),
            interfaces: LazyLinks::new(shape.interface_names.clone()),
            component: None,
            name: shape.name,
            signature: shape.signature,
            flags: shape.flags,
            kind: shape.kind,
            super_name: shape.super_name,
            interface_names: shape.interface_names,
            has_static_initializer: shape.has_static_initializer,
            fields: shape.fields,
            methods: shape.methods,
            constructors: shape.constructors,
            static_initializer: OnceLock::new(),
            annotations: OnceLock::new(),
            context,
        }
    }

    /// A one-dimensional array record over `component`
    pub(crate) fn array(
        shape: ClassShape,
        component: &ClassInfoRc,
        context: ResolutionContext,
    ) -> Self {
        let mut info = Self::from_shape(shape, context);
        info.component = Some(LazyLinks::resolved(component));
        info
    }

    /// Placeholder for a class that could not be found, terminal in every hierarchy walk
    pub(crate) fn unresolved(name: &str, context: ResolutionContext) -> Self {
        let signature = crate::classfile::class_descriptor(name);
        Self::from_shape(
            ClassShape::empty(
                name.to_string(),
                signature,
                AccessFlags::empty(),
                ClassKind::Unresolved,
            ),
            context,
        )
    }

    /// Dot-normalized name, e.g. `java.lang.String` or `int[][]`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type descriptor, e.g. `Ljava/lang/String;`, `[[I` or `I`
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Access flags
    #[must_use]
    pub fn flags(&self) -> AccessFlags {
        self.flags
    }

    /// What kind of type this record describes
    #[must_use]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// `true` for interfaces and annotation types
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// `true` for the primitive types, including `void`
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, ClassKind::Primitive(_))
    }

    /// `true` for array types
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ClassKind::Array { .. })
    }

    /// `true` for placeholders standing in for classes that could not be found
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.kind == ClassKind::Unresolved
    }

    /// Number of array dimensions, 0 for everything but arrays
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match self.kind {
            ClassKind::Array { dimensions } => dimensions,
            _ => 0,
        }
    }

    /// Name of the superclass, absent for `java.lang.Object`, interfaces without a declared
    /// super, primitives and placeholders
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Names of the directly implemented interfaces, in declaration order
    #[must_use]
    pub fn interface_names(&self) -> &[String] {
        &self.interface_names
    }

    /// Name of the element type of an array
    #[must_use]
    pub fn component_name(&self) -> Option<&str> {
        self.component
            .as_ref()
            .and_then(|links| links.names.first())
            .map(String::as_str)
    }

    /// `true` if the class declares a `<clinit>` method
    #[must_use]
    pub fn has_static_initializer(&self) -> bool {
        self.has_static_initializer
    }

    /// The static initializer, if the class declares one
    #[must_use]
    pub fn static_initializer(&self) -> Option<&StaticInitializerInfo> {
        if !self.has_static_initializer {
            return None;
        }
        Some(
            self.static_initializer
                .get_or_init(|| StaticInitializerInfo::new(&self.name)),
        )
    }

    /// Identity of the cache partition this record belongs to, if any
    #[must_use]
    pub fn scope_id(&self) -> Option<ScopeId> {
        self.context.scope_id()
    }

    /// The scope this record was loaded from.
    ///
    /// Returns `Ok(None)` for records that do not belong to a scope, such as primitives.
    ///
    /// # Errors
    /// Returns [`Error::ScopeGone`] if the scope has been dropped or unregistered.
    pub fn scope(&self) -> Result<Option<Arc<dyn ClassScope>>> {
        self.context.scope()
    }

    /// Diagnostic identity of the owning scope, if it is still around
    #[must_use]
    pub fn loader_identity(&self) -> Option<String> {
        self.context.loader_identity()
    }

    /// The superclass.
    ///
    /// # Errors
    /// Returns [`Error::ScopeGone`] if the scope is gone, or [`Error::UnresolvableReference`]
    /// if the superclass is missing and placeholders are disabled.
    pub fn superclass(&self) -> Result<Option<ClassInfoRc>> {
        Ok(self.superclass.resolve(&self.context)?.into_iter().next())
    }

    /// The directly implemented interfaces, in declaration order.
    ///
    /// # Errors
    /// See [`ClassInfo::superclass`].
    pub fn interfaces(&self) -> Result<Vec<ClassInfoRc>> {
        self.interfaces.resolve(&self.context)
    }

    /// The element type of an array, one dimension down.
    ///
    /// # Errors
    /// See [`ClassInfo::superclass`].
    pub fn component_type(&self) -> Result<Option<ClassInfoRc>> {
        match &self.component {
            Some(links) => Ok(links.resolve(&self.context)?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// Declared fields, in class file order
    #[must_use]
    pub fn fields(&self) -> Arc<[FieldInfoRc]> {
        self.fields.all()
    }

    /// Declared methods, in class file order, without constructors and the static initializer
    #[must_use]
    pub fn methods(&self) -> Arc<[MethodInfoRc]> {
        self.methods.all()
    }

    /// Declared constructors, in class file order
    #[must_use]
    pub fn constructors(&self) -> Arc<[ConstructorInfoRc]> {
        self.constructors.all()
    }

    /// A field declared by this class
    #[must_use]
    pub fn declared_field(&self, hash: u64) -> Option<FieldInfoRc> {
        self.fields.get(hash).cloned()
    }

    /// A method declared by this class
    #[must_use]
    pub fn declared_method(&self, hash: u64) -> Option<MethodInfoRc> {
        self.methods.get(hash).cloned()
    }

    /// A constructor declared by this class
    #[must_use]
    pub fn declared_constructor(&self, hash: u64) -> Option<ConstructorInfoRc> {
        self.constructors.get(hash).cloned()
    }

    /// Find a method by identity hash, here or in a supertype.
    ///
    /// The superclass of an interface is only consulted once the interfaces are exhausted, so
    /// `java.lang.Object` never shadows an override further up the class chain.
    ///
    /// # Errors
    /// Returns the first error raised while resolving a supertype.
    pub fn method(&self, hash: u64) -> Result<Option<MethodInfoRc>> {
        let found = self.search(Order::InterfacesFirst, |class| class.declared_method(hash))?;
        if found.is_some() {
            return Ok(found);
        }
        if self.is_interface() {
            if let Some(superclass) = self.superclass()? {
                return superclass.method(hash);
            }
        }
        Ok(None)
    }

    /// Find a field by identity hash, here or in a supertype.
    ///
    /// # Errors
    /// Returns the first error raised while resolving a supertype.
    pub fn field(&self, hash: u64) -> Result<Option<FieldInfoRc>> {
        self.search(Order::SuperclassFirst, |class| class.declared_field(hash))
    }

    /// Find a constructor by identity hash, here or along the superclass chain.
    ///
    /// # Errors
    /// Returns the first error raised while resolving a superclass.
    pub fn constructor(&self, hash: u64) -> Result<Option<ConstructorInfoRc>> {
        self.search(Order::SuperclassOnly, |class| class.declared_constructor(hash))
    }

    /// Find any member by identity hash: methods first, then constructors, then fields.
    ///
    /// # Errors
    /// Returns the first error raised while resolving a supertype.
    pub fn member(&self, hash: u64) -> Result<Option<AnyMember>> {
        if let Some(method) = self.method(hash)? {
            return Ok(Some(AnyMember::Method(method)));
        }
        if let Some(constructor) = self.constructor(hash)? {
            return Ok(Some(AnyMember::Constructor(constructor)));
        }
        Ok(self.field(hash)?.map(AnyMember::Field))
    }

    /// The superclass chain, nearest first, ending at the root.
    ///
    /// # Errors
    /// Returns [`Error::CyclicHierarchy`] if the chain loops, [`Error::RecursionLimit`] if it is
    /// longer than the configured maximum, or any error from resolving a superclass.
    pub fn superclasses(&self) -> Result<Vec<ClassInfoRc>> {
        let max_depth = self.context.max_depth();
        let mut visited = FxHashSet::default();
        visited.insert(self.name.clone());

        let mut chain = Vec::new();
        let mut next = self.superclass()?;
        while let Some(current) = next {
            if !visited.insert(current.name.clone()) {
                return Err(Error::CyclicHierarchy(current.name.clone()));
            }
            if chain.len() >= max_depth {
                return Err(Error::RecursionLimit(max_depth));
            }
            next = current.superclass()?;
            chain.push(current);
        }
        Ok(chain)
    }

    /// `true` if this type is `name` or inherits from it through classes or interfaces.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDescriptor`] for a malformed descriptor-style `name`,
    /// [`Error::RecursionLimit`] if a supertype lies deeper than the configured depth, or any
    /// error from resolving a supertype.
    pub fn is_subtype_of(&self, name: &str) -> Result<bool> {
        let target = java_class_name(name)?;
        if self.name == target {
            return Ok(true);
        }

        let max_depth = self.context.max_depth();
        let mut visited = FxHashSet::default();
        visited.insert(self.name.clone());
        let mut worklist: Vec<_> = self
            .supertypes()?
            .into_iter()
            .map(|supertype| (supertype, 1_usize))
            .collect();

        while let Some((current, depth)) = worklist.pop() {
            if current.name == target {
                return Ok(true);
            }
            if !visited.insert(current.name.clone()) {
                continue;
            }
            if depth > max_depth {
                return Err(Error::RecursionLimit(max_depth));
            }
            worklist.extend(
                current
                    .supertypes()?
                    .into_iter()
                    .map(|supertype| (supertype, depth + 1)),
            );
        }
        Ok(false)
    }

    /// Annotations on this class, fetched from the repository's annotation source on first use.
    ///
    /// Primitives, arrays and placeholders have none.
    ///
    /// # Errors
    /// Returns [`Error::ScopeGone`] if the scope has gone away before the first fetch.
    pub fn annotations(&self) -> Result<Arc<[AnnotationElement]>> {
        if let Some(cached) = self.annotations.get() {
            return Ok(cached.clone());
        }

        let fetched: Arc<[AnnotationElement]> = match self.kind {
            ClassKind::Class | ClassKind::Interface => {
                self.context.annotations(&self.name)?.into()
            }
            _ => Arc::from(Vec::new()),
        };
        Ok(self.annotations.get_or_init(|| fetched).clone())
    }

    fn supertypes(&self) -> Result<Vec<ClassInfoRc>> {
        let mut supertypes = self.interfaces()?;
        supertypes.extend(self.superclass()?);
        Ok(supertypes)
    }

    /// Depth-first search of the hierarchy with an explicit stack.
    ///
    /// Every class is inspected at most once, so a malformed cyclic hierarchy ends the search
    /// instead of looping.
    fn search<T>(
        &self,
        order: Order,
        find: impl Fn(&ClassInfo) -> Option<T>,
    ) -> Result<Option<T>> {
        if let Some(found) = find(self) {
            return Ok(Some(found));
        }

        let mut visited = FxHashSet::default();
        visited.insert(self.name.clone());
        let mut stack = Vec::new();
        self.push_next(order, &mut stack)?;

        while let Some(current) = stack.pop() {
            if !visited.insert(current.name.clone()) {
                continue;
            }
            if let Some(found) = find(current.as_ref()) {
                return Ok(Some(found));
            }
            current.push_next(order, &mut stack)?;
        }
        Ok(None)
    }

    /// Push the supertypes to visit after this class; the last pushed is visited first
    fn push_next(&self, order: Order, stack: &mut Vec<ClassInfoRc>) -> Result<()> {
        match order {
            Order::InterfacesFirst => {
                if !self.is_interface() {
                    stack.extend(self.superclass()?);
                }
                stack.extend(self.interfaces()?.into_iter().rev());
            }
            Order::SuperclassFirst => {
                stack.extend(self.interfaces()?.into_iter().rev());
                stack.extend(self.superclass()?);
            }
            Order::SuperclassOnly => stack.extend(self.superclass()?),
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Order {
    InterfacesFirst,
    SuperclassFirst,
    SuperclassOnly,
}

impl PartialEq for ClassInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassInfo {}

impl Hash for ClassInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("super_name", &self.super_name)
            .field("interfaces", &self.interface_names)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .finish_non_exhaustive()
    }
}
