//! Insertion-ordered class registry

use std::collections::HashMap;

/// Ordered set of unique class names with O(1) name-to-index lookup.
///
/// Keeps first-occurrence order so matrices and reports iterate classes the
/// way they were declared, while cells index into a plain 2D array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRegistry {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from names, dropping duplicates and preserving the
    /// order of first occurrence.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.get_or_insert(name.as_ref());
        }
        registry
    }

    /// Index of `name`, if registered
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Index of `name`, registering it at the end on first sight
    pub fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.index.get(name) {
            return *idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered names in insertion order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_order() {
        let registry = ClassRegistry::from_names(["bug", "code", "bug", "other", "code"]);
        assert_eq!(registry.names(), &["bug", "code", "other"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup() {
        let registry = ClassRegistry::from_names(["bug", "code"]);
        assert_eq!(registry.get("bug"), Some(0));
        assert_eq!(registry.get("code"), Some(1));
        assert_eq!(registry.get("chore"), None);
        assert!(registry.contains("bug"));
        assert!(!registry.contains("chore"));
    }

    #[test]
    fn test_get_or_insert_appends() {
        let mut registry = ClassRegistry::from_names(["bug"]);
        assert_eq!(registry.get_or_insert("bug"), 0);
        assert_eq!(registry.get_or_insert("chore"), 1);
        assert_eq!(registry.get_or_insert("chore"), 1);
        assert_eq!(registry.names(), &["bug", "chore"]);
    }

    #[test]
    fn test_empty() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.names(), &[] as &[String]);
    }
}
