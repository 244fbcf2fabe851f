//! Resolution scopes: where class file bytes come from.
//!
//! A [`ClassScope`] plays the role of a class loader. It hands out the bytes of a named class or
//! reports that it does not know it, and it describes itself for diagnostics. Every scope
//! registered with a [`crate::ClassInfoRepository`] gets its own cache partition.
//!
//! Two implementations are provided:
//!
//! - [`MemoryScope`] - classes held in memory, e.g. freshly generated or redefined bytes
//! - [`DirectoryScope`] - one or more class path roots on disk

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::RwLock,
};

use log::debug;
use rustc_hash::FxHashMap;

use crate::{classfile::ClassReader, Result};

/// Naming convention a scope expects in [`ClassScope::class_bytes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameStyle {
    /// Internal names, `java/lang/String`
    #[default]
    Slash,
    /// Java names, `java.lang.String`
    Dot,
}

impl NameStyle {
    /// Convert a dot-normalized class name into this convention
    #[must_use]
    pub fn apply(self, java_name: &str) -> String {
        match self {
            NameStyle::Slash => java_name.replace('.', "/"),
            NameStyle::Dot => java_name.to_string(),
        }
    }
}

/// A source of class file bytes
pub trait ClassScope: Send + Sync {
    /// Bytes of the class `name`, spelled according to [`ClassScope::name_style`], or `None` if
    /// the scope does not know it
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>>;

    /// Human readable identity used in log messages and errors
    fn loader_identity(&self) -> String;

    /// Naming convention expected by [`ClassScope::class_bytes`]
    fn name_style(&self) -> NameStyle {
        NameStyle::Slash
    }
}

/// Class files held in memory, keyed by internal name
pub struct MemoryScope {
    identity: String,
    classes: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl MemoryScope {
    /// Create an empty scope
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        MemoryScope {
            identity: identity.into(),
            classes: RwLock::new(FxHashMap::default()),
        }
    }

    /// Add a class file, keyed by the name in its header. Returns the dot-normalized name.
    ///
    /// # Errors
    /// Returns an error if the class name cannot be read from `bytes`.
    pub fn insert(&self, bytes: Vec<u8>) -> Result<String> {
        let name = ClassReader::class_name(&bytes)?;
        self.insert_named(&name.replace('.', "/"), bytes);
        Ok(name)
    }

    /// Add bytes under an explicit internal name, replacing any previous entry
    pub fn insert_named(&self, internal_name: &str, bytes: Vec<u8>) {
        write_lock!(self.classes).insert(internal_name.to_string(), bytes);
    }

    /// Remove a class by internal name
    pub fn remove(&self, internal_name: &str) -> bool {
        write_lock!(self.classes).remove(internal_name).is_some()
    }

    /// Number of classes held
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.classes).len()
    }

    /// `true` if no classes are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read_lock!(self.classes).is_empty()
    }
}

impl ClassScope for MemoryScope {
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>> {
        read_lock!(self.classes).get(name).cloned()
    }

    fn loader_identity(&self) -> String {
        self.identity.clone()
    }
}

/// Class files laid out below one or more class path roots, `<root>/a/b/C.class`
pub struct DirectoryScope {
    roots: Vec<PathBuf>,
}

impl DirectoryScope {
    /// Create a scope over a single root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryScope {
            roots: vec![root.into()],
        }
    }

    /// Append another root; earlier roots take precedence
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// The configured roots in lookup order
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn class_path(root: &Path, internal_name: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        let mut segments = internal_name.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}.class"));
            }
        }
        path
    }
}

impl ClassScope for DirectoryScope {
    fn class_bytes(&self, name: &str) -> Option<Vec<u8>> {
        if name.is_empty() || name.split('/').any(|s| s.is_empty() || s == "..") {
            return None;
        }

        for root in &self.roots {
            let path = Self::class_path(root, name);
            match std::fs::read(&path) {
                Ok(bytes) => return Some(bytes),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => debug!("Skipping {}: {error}", path.display()),
            }
        }
        None
    }

    fn loader_identity(&self) -> String {
        let mut identity = String::from("directory:");
        for (i, root) in self.roots.iter().enumerate() {
            if i > 0 {
                identity.push(':');
            }
            let _ = write!(identity, "{}", root.display());
        }
        identity
    }
}
