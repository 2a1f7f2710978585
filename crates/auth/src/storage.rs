//! Client-side key/value storage.
//!
//! Two scopes exist: durable "local" storage for the bearer token and
//! tab-scoped "session" storage for the impersonation context. Both are plain
//! string maps behind [`KeyValueStorage`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// String key/value storage.
///
/// Operations are infallible from the caller's point of view; backends log
/// their own IO failures. A value that cannot be read is reported as absent.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// Remove several keys as one write.
    fn remove_many(&self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}

impl<S> KeyValueStorage for Arc<S>
where
    S: KeyValueStorage + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn remove_many(&self, keys: &[&str]) {
        (**self).remove_many(keys)
    }
}

/// In-memory storage, used for session scope and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().map(|m| m.is_empty()).unwrap_or(true)
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(key);
        }
    }

    fn remove_many(&self, keys: &[&str]) {
        if let Ok(mut map) = self.inner.write() {
            for key in keys {
                map.remove(*key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("k"), None);

        storage.set("k", "v");
        assert_eq!(storage.get("k").as_deref(), Some("v"));

        storage.remove("k");
        assert_eq!(storage.get("k"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn remove_many_through_arc() {
        let storage: Arc<dyn KeyValueStorage> = InMemoryStorage::shared();
        storage.set("a", "1");
        storage.set("b", "2");
        storage.set("c", "3");

        storage.remove_many(&["a", "b", "missing"]);
        assert_eq!(storage.get("a"), None);
        assert_eq!(storage.get("b"), None);
        assert_eq!(storage.get("c").as_deref(), Some("3"));
    }
}
