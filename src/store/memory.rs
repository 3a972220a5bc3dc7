//! In-process counter store.
//!
//! Values are kept as strings, the same way Redis holds them, so integer
//! coercion on read behaves identically. Reachability can be toggled to
//! simulate an outage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CounterConnection, CounterStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    values: DashMap<String, String>,
    unreachable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing the increment path.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        self.inner.values.insert(key.to_string(), value.into());
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            Err(StoreError::Unreachable("memory store marked unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn open(&self) -> Result<Box<dyn CounterConnection>, StoreError> {
        self.check_reachable()?;
        Ok(Box::new(MemoryConnection {
            store: self.clone(),
        }))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

struct MemoryConnection {
    store: MemoryStore,
}

fn parse(key: &str, raw: &str) -> Result<i64, StoreError> {
    raw.parse().map_err(|_| StoreError::Malformed {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[async_trait]
impl CounterConnection for MemoryConnection {
    async fn ping(&mut self) -> Result<(), StoreError> {
        self.store.check_reachable()
    }

    async fn get(&mut self, key: &str) -> Result<Option<i64>, StoreError> {
        self.store.check_reachable()?;
        match self.store.inner.values.get(key) {
            Some(raw) => parse(key, raw.value()).map(Some),
            None => Ok(None),
        }
    }

    async fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        self.store.check_reachable()?;
        // The entry guard holds the shard lock for the whole update.
        let mut entry = self
            .store
            .inner
            .values
            .entry(key.to_string())
            .or_insert_with(|| "0".to_string());
        let next = parse(key, entry.value())?
            .checked_add(1)
            .ok_or_else(|| StoreError::Overflow {
                key: key.to_string(),
            })?;
        *entry.value_mut() = next.to_string();
        Ok(next)
    }
}
