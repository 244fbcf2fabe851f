//! Field and method descriptors, and conversions between the naming conventions in use.
//!
//! Three spellings of a type name show up when working with class files:
//!
//! | Convention | Example                                   |
//! |------------|-------------------------------------------|
//! | internal   | `java/lang/String`                        |
//! | descriptor | `Ljava/lang/String;`, `[[I`               |
//! | Java       | `java.lang.String`, `int[][]`             |
//!
//! Metadata records are keyed by the Java spelling. The helpers in this module parse
//! descriptors and translate between the three forms.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// Largest number of array dimensions a descriptor may carry
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// The primitive types of the JVM, including `void`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    /// `void`, only valid as a return type
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl Primitive {
    /// Look up a primitive by its Java keyword (`int`, `void`, ...)
    #[must_use]
    pub fn from_java_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Look up a primitive by its descriptor character
    #[must_use]
    pub fn from_descriptor_char(c: char) -> Option<Self> {
        match c {
            'V' => Some(Primitive::Void),
            'Z' => Some(Primitive::Boolean),
            'B' => Some(Primitive::Byte),
            'C' => Some(Primitive::Char),
            'S' => Some(Primitive::Short),
            'I' => Some(Primitive::Int),
            'J' => Some(Primitive::Long),
            'F' => Some(Primitive::Float),
            'D' => Some(Primitive::Double),
            _ => None,
        }
    }

    /// The single-character descriptor of this primitive
    #[must_use]
    pub fn descriptor_char(self) -> char {
        match self {
            Primitive::Void => 'V',
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
        }
    }

    /// Number of local variable slots a value of this type occupies
    #[must_use]
    pub fn register_width(self) -> usize {
        match self {
            Primitive::Long | Primitive::Double => 2,
            Primitive::Void => 0,
            _ => 1,
        }
    }
}

/// A decoded field descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A primitive value type (never `void`)
    Base(Primitive),
    /// A class or interface, by internal name
    Object(String),
    /// An array of the inner type
    Array(Box<FieldType>),
}

impl FieldType {
    /// The Java spelling of this type, e.g. `java.lang.String[]`
    #[must_use]
    pub fn java_name(&self) -> String {
        match self {
            FieldType::Base(primitive) => primitive.to_string(),
            FieldType::Object(internal) => internal.replace('/', "."),
            FieldType::Array(component) => format!("{}[]", component.java_name()),
        }
    }

    /// The descriptor spelling of this type, e.g. `[Ljava/lang/String;`
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Base(primitive) => primitive.descriptor_char().to_string(),
            FieldType::Object(internal) => format!("L{internal};"),
            FieldType::Array(component) => format!("[{}", component.descriptor()),
        }
    }

    /// Number of local variable slots a value of this type occupies
    #[must_use]
    pub fn register_width(&self) -> usize {
        match self {
            FieldType::Base(primitive) => primitive.register_width(),
            _ => 1,
        }
    }
}

/// Return type of a method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// `V`
    Void,
    /// Any field type
    Type(FieldType),
}

impl ReturnType {
    /// The Java spelling of the return type
    #[must_use]
    pub fn java_name(&self) -> String {
        match self {
            ReturnType::Void => Primitive::Void.to_string(),
            ReturnType::Type(ty) => ty.java_name(),
        }
    }
}

/// A decoded method descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Parameter types in declaration order
    pub params: Vec<FieldType>,
    /// The return type
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// Number of local variable slots taken by the declared parameters, excluding `this`
    #[must_use]
    pub fn register_depth(&self) -> usize {
        self.params.iter().map(FieldType::register_width).sum()
    }
}

/// Parse a complete field descriptor.
///
/// # Errors
/// Returns [`Error::InvalidDescriptor`] if the input is not exactly one field type.
pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

/// Parse a complete method descriptor.
///
/// # Errors
/// Returns [`Error::InvalidDescriptor`] if the input is not of the form `(params)return`.
pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) =
            parse_field_type(rest).map_err(|_| Error::InvalidDescriptor(desc.to_string()))?;
        params.push(param);
        rest = after;
    }

    let return_type = if rest == "V" {
        ReturnType::Void
    } else {
        ReturnType::Type(
            parse_field_descriptor(rest).map_err(|_| Error::InvalidDescriptor(desc.to_string()))?,
        )
    };

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let element = input.trim_start_matches('[');
    let dimensions = input.len() - element.len();
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return Err(Error::InvalidDescriptor(input.to_string()));
    }

    let Some(first) = element.chars().next() else {
        return Err(Error::InvalidDescriptor(input.to_string()));
    };
    let (mut ty, rest) = match first {
        'L' => match element.find(';') {
            Some(end) if end > 1 => (
                FieldType::Object(element[1..end].to_string()),
                &element[end + 1..],
            ),
            _ => return Err(Error::InvalidDescriptor(input.to_string())),
        },
        c => match Primitive::from_descriptor_char(c) {
            Some(Primitive::Void) | None => {
                return Err(Error::InvalidDescriptor(input.to_string()))
            }
            Some(primitive) => (FieldType::Base(primitive), &element[1..]),
        },
    };

    for _ in 0..dimensions {
        ty = FieldType::Array(Box::new(ty));
    }
    Ok((ty, rest))
}

/// Convert an internal or descriptor-form name into its Java spelling.
///
/// `java/lang/String` becomes `java.lang.String`, `[[I` becomes `int[][]` and
/// `[Ljava/lang/Object;` becomes `java.lang.Object[]`. Names that are already in Java form are
/// returned unchanged.
///
/// # Errors
/// Returns [`Error::InvalidDescriptor`] if a name starting with `[` is not a valid descriptor.
pub fn java_class_name(name: &str) -> Result<String> {
    if name.starts_with('[') {
        Ok(parse_field_descriptor(name)?.java_name())
    } else {
        Ok(name.replace('/', "."))
    }
}

/// Compute the type descriptor of a Java-spelled type name.
///
/// `int` becomes `I`, `int[][]` becomes `[[I` and `a.b.C` becomes `La/b/C;`.
#[must_use]
pub fn class_descriptor(java_name: &str) -> String {
    let mut component = java_name;
    let mut descriptor = String::with_capacity(java_name.len() + 2);
    while let Some(inner) = component.strip_suffix("[]") {
        descriptor.push('[');
        component = inner;
    }

    match Primitive::from_java_name(component) {
        Some(primitive) => descriptor.push(primitive.descriptor_char()),
        None => {
            descriptor.push('L');
            descriptor.push_str(&component.replace('.', "/"));
            descriptor.push(';');
        }
    }
    descriptor
}
