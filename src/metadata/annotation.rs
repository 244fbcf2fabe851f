//! Annotation lookup.
//!
//! Decoding annotation values is left to an external [`AnnotationSource`]. A class record asks
//! the source once, on the first call to
//! [`crate::metadata::class::ClassInfo::annotations`], and keeps the answer.

use dashmap::DashMap;

use crate::metadata::scope::ClassScope;

/// A decoded annotation attached to a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationElement {
    /// Dot-normalized name of the annotation type
    pub type_name: String,
    /// Element name / rendered value pairs
    pub values: Vec<(String, String)>,
}

impl AnnotationElement {
    /// Create an annotation without values
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        AnnotationElement {
            type_name: type_name.into(),
            values: Vec::new(),
        }
    }

    /// Add an element value
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Look up an element value by name
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Supplies the annotations of a class within a scope
pub trait AnnotationSource: Send + Sync {
    /// Annotations of the dot-normalized class `class_name`
    fn annotations(&self, class_name: &str, scope: &dyn ClassScope) -> Vec<AnnotationElement>;
}

/// Source that never reports any annotation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl AnnotationSource for NoAnnotations {
    fn annotations(&self, _class_name: &str, _scope: &dyn ClassScope) -> Vec<AnnotationElement> {
        Vec::new()
    }
}

/// Source backed by a fixed table, independent of the scope
#[derive(Debug, Default)]
pub struct AnnotationMap {
    entries: DashMap<String, Vec<AnnotationElement>>,
}

impl AnnotationMap {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `element` to `class_name`
    pub fn insert(&self, class_name: &str, element: AnnotationElement) {
        self.entries
            .entry(class_name.to_string())
            .or_default()
            .push(element);
    }
}

impl AnnotationSource for AnnotationMap {
    fn annotations(&self, class_name: &str, _scope: &dyn ClassScope) -> Vec<AnnotationElement> {
        self.entries
            .get(class_name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::scope::MemoryScope;

    #[test]
    fn map_source_returns_inserted_elements() {
        let map = AnnotationMap::new();
        map.insert(
            "p.A",
            AnnotationElement::new("p.Marker").with_value("value", "\"x\""),
        );
        map.insert("p.A", AnnotationElement::new("java.lang.Deprecated"));

        let scope = MemoryScope::new("memory");
        let found = map.annotations("p.A", &scope);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value("value"), Some("\"x\""));
        assert_eq!(found[1].type_name, "java.lang.Deprecated");
        assert!(map.annotations("p.B", &scope).is_empty());
        assert!(NoAnnotations.annotations("p.A", &scope).is_empty());
    }
}
