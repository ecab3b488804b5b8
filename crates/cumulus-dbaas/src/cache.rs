//! Keyed cache of live connection handles with single-flight creation.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::classifier::Classifier;

/// Composite cache key: database type, classifier content and an optional
/// discriminator distinguishing physical connections that share a classifier.
///
/// Two keys with equal content resolve to the same cache entry regardless of
/// object identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    db_type: String,
    classifier: Classifier,
    discriminator: Option<String>,
}

impl CacheKey {
    pub fn new(db_type: impl Into<String>, classifier: Classifier) -> Self {
        Self {
            db_type: db_type.into(),
            classifier,
            discriminator: None,
        }
    }

    pub fn with_discriminator(
        db_type: impl Into<String>,
        classifier: Classifier,
        discriminator: impl Into<String>,
    ) -> Self {
        Self {
            db_type: db_type.into(),
            classifier,
            discriminator: Some(discriminator.into()),
        }
    }

    pub fn db_type(&self) -> &str {
        &self.db_type
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

type Slot<V> = Arc<Mutex<Option<V>>>;

/// Cache of live handles keyed by [`CacheKey`].
///
/// Creation is serialized per key: at most one factory runs at a time for a
/// given key, and every concurrent caller for that key awaits the in-flight
/// creation and shares its result. Different keys never contend.
pub struct ConnectionCache<V> {
    entries: DashMap<CacheKey, Slot<V>>,
}

impl<V: Clone> ConnectionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle cached under `key`, invoking `factory` on a miss.
    ///
    /// A factory error leaves the slot empty, so the next caller retries the
    /// creation instead of observing a poisoned entry.
    pub async fn get_or_create<F, Fut, E>(&self, key: &CacheKey, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }
        let value = factory().await?;
        *guard = Some(value.clone());
        Ok(value)
    }

    /// Stores `value` under `key`, replacing whatever was there.
    pub async fn insert(&self, key: &CacheKey, value: V) {
        let slot = self.slot(key);
        *slot.lock().await = Some(value);
    }

    /// Evicts `key`. Callers already holding the old handle are unaffected;
    /// the next lookup recreates the entry.
    pub fn delete(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    fn slot(&self, key: &CacheKey) -> Slot<V> {
        self.entries.entry(key.clone()).or_default().clone()
    }
}

impl<V> Default for ConnectionCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}
