//! Member records: fields, methods, constructors and the static initializer.
//!
//! Members are created once while a class file is visited and never change afterwards. Each
//! carries the identity hash from [`crate::metadata::hash::MemberHash`] that is used as the key
//! for hierarchy lookups.

use std::sync::{Arc, OnceLock};

use log::warn;
use rustc_hash::FxHashMap;

use crate::{
    classfile::{AccessFlags, FieldConstant, FieldType, MethodDescriptor},
    metadata::hash::MemberHash,
    Result,
};

/// Reference to a [`FieldInfo`]
pub type FieldInfoRc = Arc<FieldInfo>;
/// Reference to a [`MethodInfo`]
pub type MethodInfoRc = Arc<MethodInfo>;
/// Constructors share the method representation
pub type ConstructorInfo = MethodInfo;
/// Reference to a [`ConstructorInfo`]
pub type ConstructorInfoRc = Arc<ConstructorInfo>;

/// Name of instance initializers
pub const CONSTRUCTOR_NAME: &str = "<init>";
/// Name of the static initializer
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";
/// Descriptor of the static initializer
pub const STATIC_INITIALIZER_DESCRIPTOR: &str = "()V";

/// Common view over every kind of member
pub trait Member {
    /// Dot-normalized name of the declaring class
    fn declaring_type(&self) -> &str;
    /// Simple member name
    fn name(&self) -> &str;
    /// Field or method descriptor
    fn descriptor(&self) -> &str;
    /// Access flags
    fn flags(&self) -> AccessFlags;
    /// Identity hash of `name` and `descriptor`
    fn identity_hash(&self) -> u64;
}

/// A field declared by a class
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Dot-normalized name of the declaring class
    pub declaring_type: String,
    /// Field name
    pub name: String,
    /// Field descriptor, e.g. `I` or `Ljava/lang/String;`
    pub descriptor: String,
    /// The decoded descriptor
    pub field_type: FieldType,
    /// Field access flags
    pub flags: AccessFlags,
    /// Identity hash
    pub hash: u64,
    /// Compile time constant from the `ConstantValue` attribute
    pub constant: Option<FieldConstant>,
}

impl FieldInfo {
    /// Java spelling of the field type, e.g. `int` or `java.lang.String[]`
    #[must_use]
    pub fn type_name(&self) -> String {
        self.field_type.java_name()
    }
}

/// Distinguishes methods from constructors in [`MethodInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// A regular method
    Method,
    /// An instance initializer (`<init>`)
    Constructor,
}

/// A method or constructor declared by a class
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Dot-normalized name of the declaring class
    pub declaring_type: String,
    /// Method name, `<init>` for constructors
    pub name: String,
    /// Method descriptor, e.g. `(ILjava/lang/String;)V`
    pub descriptor: String,
    /// The decoded descriptor
    pub signature: MethodDescriptor,
    /// Method access flags
    pub flags: AccessFlags,
    /// Identity hash
    pub hash: u64,
    /// Method or constructor
    pub kind: MethodKind,
    /// One entry per declared parameter; empty strings where no debug information was present
    pub parameter_names: Vec<String>,
    /// Dot-normalized names from the `throws` clause
    pub exceptions: Vec<String>,
}

impl MethodInfo {
    /// `true` for instance initializers
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    /// Java spelling of each parameter type
    #[must_use]
    pub fn parameter_types(&self) -> Vec<String> {
        self.signature
            .params
            .iter()
            .map(FieldType::java_name)
            .collect()
    }

    /// Java spelling of the return type
    #[must_use]
    pub fn return_type(&self) -> String {
        self.signature.return_type.java_name()
    }
}

/// The static initializer of a class, synthesized on request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticInitializerInfo {
    declaring_type: String,
    hash: u64,
}

impl StaticInitializerInfo {
    pub(crate) fn new(declaring_type: &str) -> Self {
        StaticInitializerInfo {
            declaring_type: declaring_type.to_string(),
            hash: MemberHash::of(STATIC_INITIALIZER_NAME, STATIC_INITIALIZER_DESCRIPTOR),
        }
    }
}

impl Member for FieldInfo {
    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn flags(&self) -> AccessFlags {
        self.flags
    }

    fn identity_hash(&self) -> u64 {
        self.hash
    }
}

impl Member for MethodInfo {
    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn flags(&self) -> AccessFlags {
        self.flags
    }

    fn identity_hash(&self) -> u64 {
        self.hash
    }
}

impl Member for StaticInitializerInfo {
    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn name(&self) -> &str {
        STATIC_INITIALIZER_NAME
    }

    fn descriptor(&self) -> &str {
        STATIC_INITIALIZER_DESCRIPTOR
    }

    fn flags(&self) -> AccessFlags {
        AccessFlags::STATIC
    }

    fn identity_hash(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for FieldInfo {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.name == other.name
            && self.descriptor == other.descriptor
    }
}

impl Eq for FieldInfo {}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.name == other.name
            && self.descriptor == other.descriptor
    }
}

impl Eq for MethodInfo {}

/// Result of [`crate::metadata::class::ClassInfo::member`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyMember {
    /// A regular method
    Method(MethodInfoRc),
    /// A constructor
    Constructor(ConstructorInfoRc),
    /// A field
    Field(FieldInfoRc),
}

impl AnyMember {
    /// The member behind the variant
    #[must_use]
    pub fn as_member(&self) -> &dyn Member {
        match self {
            AnyMember::Method(method) | AnyMember::Constructor(method) => method.as_ref(),
            AnyMember::Field(field) => field.as_ref(),
        }
    }
}

/// Members of one kind, in the order the class file listed them and indexed by identity hash.
///
/// The externally visible array is only assembled on the first call to [`MemberTable::all`]
/// and shared afterwards.
#[derive(Debug)]
pub struct MemberTable<T> {
    ordered: Vec<Arc<T>>,
    index: FxHashMap<u64, usize>,
    materialized: OnceLock<Arc<[Arc<T>]>>,
}

impl<T: Member> MemberTable<T> {
    pub(crate) fn new() -> Self {
        MemberTable {
            ordered: Vec::new(),
            index: FxHashMap::default(),
            materialized: OnceLock::new(),
        }
    }

    /// Append a member.
    ///
    /// A member whose name and descriptor repeat an earlier one is rejected. A different member
    /// that happens to share a hash is kept in order but is not reachable through the index.
    pub(crate) fn insert(&mut self, member: T) -> Result<()> {
        let hash = member.identity_hash();
        if let Some(&position) = self.index.get(&hash) {
            let existing = &self.ordered[position];
            if existing.name() == member.name() && existing.descriptor() == member.descriptor() {
                return Err(malformed_error!(
                    "Duplicate member {}{} in {}",
                    member.name(),
                    member.descriptor(),
                    member.declaring_type()
                ));
            }

            warn!(
                "Identity hash collision in {} between {}{} and {}{}",
                member.declaring_type(),
                existing.name(),
                existing.descriptor(),
                member.name(),
                member.descriptor()
            );
        } else {
            self.index.insert(hash, self.ordered.len());
        }

        self.ordered.push(Arc::new(member));
        Ok(())
    }

    /// Find a member by identity hash
    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&Arc<T>> {
        self.index.get(&hash).map(|&position| &self.ordered[position])
    }

    /// All members in class file order
    #[must_use]
    pub fn all(&self) -> Arc<[Arc<T>]> {
        self.materialized
            .get_or_init(|| self.ordered.iter().cloned().collect())
            .clone()
    }

    /// Iterate over the members in class file order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.ordered.iter()
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// `true` if there are no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::{parse_field_descriptor, parse_method_descriptor, Primitive};

    fn field(name: &str, descriptor: &str) -> FieldInfo {
        FieldInfo {
            declaring_type: "p.A".to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            field_type: parse_field_descriptor(descriptor).unwrap(),
            flags: AccessFlags::PRIVATE,
            hash: MemberHash::of(name, descriptor),
            constant: None,
        }
    }

    fn method(name: &str, descriptor: &str) -> MethodInfo {
        MethodInfo {
            declaring_type: "p.A".to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: parse_method_descriptor(descriptor).unwrap(),
            flags: AccessFlags::PUBLIC,
            hash: MemberHash::of(name, descriptor),
            kind: MethodKind::Method,
            parameter_names: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn table_keeps_class_file_order() {
        let mut table = MemberTable::new();
        table.insert(field("z", "I")).unwrap();
        table.insert(field("a", "J")).unwrap();
        table.insert(field("m", "Ljava/lang/String;")).unwrap();

        let names: Vec<_> = table.all().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(
            table.get(MemberHash::of("a", "J")).unwrap().field_type,
            FieldType::Base(Primitive::Long)
        );
        assert!(table.get(MemberHash::of("a", "I")).is_none());
    }

    #[test]
    fn materialized_array_is_shared() {
        let mut table = MemberTable::new();
        table.insert(method("f", "()V")).unwrap();
        let first = table.all();
        let second = table.all();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn exact_duplicates_are_malformed() {
        let mut table = MemberTable::new();
        table.insert(method("f", "()V")).unwrap();
        assert!(table.insert(method("f", "(I)V")).is_ok());
        assert!(matches!(
            table.insert(method("f", "()V")),
            Err(crate::Error::Malformed { .. })
        ));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn method_type_names() {
        let m = method("g", "(J[Ljava/lang/String;)[[I");
        assert_eq!(m.parameter_types(), vec!["long", "java.lang.String[]"]);
        assert_eq!(m.return_type(), "int[][]");
        assert!(!m.is_constructor());
        assert_eq!(field("s", "[Z").type_name(), "boolean[]");
    }

    #[test]
    fn static_initializer_shape() {
        let clinit = StaticInitializerInfo::new("p.A");
        assert_eq!(clinit.name(), "<clinit>");
        assert_eq!(clinit.descriptor(), "()V");
        assert_eq!(clinit.flags(), AccessFlags::STATIC);
        assert_eq!(clinit.identity_hash(), MemberHash::of("<clinit>", "()V"));
        assert_eq!(clinit.declaring_type(), "p.A");
    }

    #[test]
    fn equality_ignores_flags() {
        let mut a = method("f", "()V");
        let b = method("f", "()V");
        a.flags = AccessFlags::PRIVATE;
        assert_eq!(a, b);
    }
}
