//! Process-lifetime manifest memoization.
//!
//! Manifests are keyed by root index and canonical namespace path. Entries
//! are computed once and never invalidated: declarations cannot change while
//! the process runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::manifest::ManifestIndex;

/// Canonical identity of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceKey {
    pub root: usize,
    pub path: Vec<String>,
}

impl NamespaceKey {
    pub fn new(root: usize, path: &[String]) -> Self {
        Self {
            root,
            path: path.to_vec(),
        }
    }

    /// `a/b/c` form used in logs and error messages.
    pub fn display_path(&self) -> String {
        if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path.join("/")
        }
    }
}

/// Memoized [`ManifestIndex`] per namespace.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: RwLock<HashMap<NamespaceKey, Arc<ManifestIndex>>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NamespaceKey) -> Option<Arc<ManifestIndex>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Returns the cached index, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the error of `load`; nothing is cached in that case.
    pub fn get_or_try_insert_with<F>(&self, key: &NamespaceKey, load: F) -> Result<Arc<ManifestIndex>>
    where
        F: FnOnce() -> Result<ManifestIndex>,
    {
        if let Some(index) = self.get(key) {
            return Ok(index);
        }

        let index = Arc::new(load()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(key.clone()).or_insert(index).clone())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RegistryError;
    use crate::manifest::SubcommandDefinition;

    use super::*;

    #[test]
    fn test_loads_once() {
        let cache = ManifestCache::new();
        let key = NamespaceKey::new(0, &["bar".to_string()]);

        let first = cache
            .get_or_try_insert_with(&key, || {
                ManifestIndex::build("bar", vec![SubcommandDefinition::new("x")])
            })
            .unwrap();
        let second = cache
            .get_or_try_insert_with(&key, || panic!("must not reload"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ManifestCache::new();
        let key = NamespaceKey::new(1, &[]);

        let result = cache.get_or_try_insert_with(&key, || {
            Err(RegistryError::InvalidName("-x".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert_eq!(key.display_path(), "/");
    }
}
