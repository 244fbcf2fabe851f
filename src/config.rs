//! Repository configuration
//!
//! Controls how a [`crate::ClassInfoRepository`] reacts to missing classes, whether parameter
//! names are recovered from debug information, and how deep hierarchy walks may go.

/// Configuration for a [`crate::ClassInfoRepository`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Substitute an unresolved placeholder when a class cannot be obtained from its scope.
    /// When disabled, lookups fail with [`crate::Error::UnresolvableReference`] instead
    pub substitute_placeholders: bool,

    /// Recover parameter names from `LocalVariableTable` records.
    /// When disabled, every parameter is reported with an empty name
    pub collect_parameter_names: bool,

    /// Maximum number of supertypes visited by a hierarchy walk (default: 256)
    pub max_hierarchy_depth: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            substitute_placeholders: true,
            collect_parameter_names: true,
            max_hierarchy_depth: 256,
        }
    }
}

impl RepositoryConfig {
    /// Creates a lenient configuration that keeps traversals total
    ///
    /// Missing classes become placeholders, which end the hierarchy at that point.
    #[must_use]
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Creates a strict configuration that reports every missing class as an error
    #[must_use]
    pub fn strict() -> Self {
        Self {
            substitute_placeholders: false,
            ..Self::default()
        }
    }

    /// Creates a configuration for name and shape queries only
    ///
    /// Skips the `LocalVariableTable` scan, which is the most expensive part of building a record.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            collect_parameter_names: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(RepositoryConfig::lenient(), RepositoryConfig::default());
        assert!(!RepositoryConfig::strict().substitute_placeholders);
        assert!(RepositoryConfig::strict().collect_parameter_names);
        assert!(!RepositoryConfig::minimal().collect_parameter_names);
        assert_eq!(RepositoryConfig::minimal().max_hierarchy_depth, 256);
    }
}
