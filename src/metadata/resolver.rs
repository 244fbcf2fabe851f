//! Synthetic records for primitive and array types.
//!
//! Neither primitives nor arrays have a class file. Their records are derived from a fixed table
//! (primitives) or from the component record (arrays), following what reflection reports for
//! them on the JVM:
//!
//! | Type      | Modifiers                                           | Superclass         |
//! |-----------|-----------------------------------------------------|--------------------|
//! | primitive | `public abstract final`                             | none               |
//! | array     | component modifiers + `abstract final`, no `interface` | `java.lang.Object` |

use std::fmt;

pub use crate::classfile::Primitive;
use crate::{
    classfile::{java_class_name, AccessFlags, MAX_ARRAY_DIMENSIONS},
    metadata::{
        class::{ClassInfo, ClassInfoRc, ClassKind, ClassShape, OBJECT_CLASS},
        repository::ResolutionContext,
    },
    Error, Result,
};

/// A type name split into its element name and array dimensions.
///
/// Accepts Java spelling (`int[][]`, `java.lang.String[]`), internal names (`java/lang/String`)
/// and descriptor-style array names (`[[I`, `[Ljava/lang/String;`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayName {
    /// Dot-normalized name of the innermost element type
    pub component: String,
    /// Number of array dimensions, 0 for non-array names
    pub dimensions: usize,
}

impl ArrayName {
    /// Split `name` into component and dimension count.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] for a malformed descriptor-style name or one
    /// with more than [`MAX_ARRAY_DIMENSIONS`] dimensions.
    pub fn parse(name: &str) -> Result<Self> {
        let java = java_class_name(name)?;
        let mut component = java.as_str();
        let mut dimensions = 0;
        while let Some(inner) = component.strip_suffix("[]") {
            component = inner;
            dimensions += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(Error::InvalidDescriptor(name.to_string()));
        }
        Ok(ArrayName {
            component: component.to_string(),
            dimensions,
        })
    }

    /// `true` if the name denotes an array type
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// The primitive element type, if any
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        Primitive::from_java_name(&self.component)
    }
}

impl fmt::Display for ArrayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.component)?;
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// The canonical record of a primitive type
pub(crate) fn primitive_info(primitive: Primitive, context: ResolutionContext) -> ClassInfo {
    ClassInfo::from_shape(
        ClassShape::empty(
            primitive.to_string(),
            primitive.descriptor_char().to_string(),
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT | AccessFlags::FINAL,
            ClassKind::Primitive(primitive),
        ),
        context,
    )
}

/// A record for the array type with one more dimension than `component`
pub(crate) fn array_of(component: &ClassInfoRc, context: ResolutionContext) -> ClassInfo {
    let flags = (component.flags() | AccessFlags::ABSTRACT | AccessFlags::FINAL)
        .difference(AccessFlags::INTERFACE);

    let mut shape = ClassShape::empty(
        format!("{}[]", component.name()),
        format!("[{}", component.signature()),
        flags,
        ClassKind::Array {
            dimensions: component.dimensions() + 1,
        },
    );
    shape.super_name = Some(OBJECT_CLASS.to_string());

    ClassInfo::array(shape, component, context)
}
