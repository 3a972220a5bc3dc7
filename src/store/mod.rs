//! Counter store subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → acquire() opens a fresh connection (redis.rs or memory.rs)
//!     → PING liveness probe
//!     → Some(connection) | None on connectivity fault
//!     → GET / INCR on the connection
//!     → connection dropped when the handler returns
//! ```
//!
//! # Design Decisions
//! - No pooling: every request owns its connection exclusively
//! - Only connectivity faults are swallowed; everything else propagates
//! - Increments use the store's native atomic primitive, never read-modify-write

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

use crate::observability::metrics;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Key holding the visit counter.
pub const COUNTER_KEY: &str = "visit_count";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (refused, dropped, timed out, I/O).
    #[error("counter store unreachable: {0}")]
    Unreachable(String),

    /// A stored value could not be read as an integer.
    #[error("value {value:?} stored at {key} is not an integer")]
    Malformed { key: String, value: String },

    /// Incrementing would exceed the store's integer range.
    #[error("incrementing {key} would overflow")]
    Overflow { key: String },

    #[error("redis error: {0}")]
    Redis(#[source] ::redis::RedisError),
}

impl StoreError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, StoreError::Unreachable(_))
    }
}

/// Opens connections to a counter store.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Open a new, unvalidated connection.
    async fn open(&self) -> Result<Box<dyn CounterConnection>, StoreError>;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}

/// A single exclusively-owned store connection.
#[async_trait]
pub trait CounterConnection: Send {
    /// Liveness probe.
    async fn ping(&mut self) -> Result<(), StoreError>;

    /// Read an integer value; `None` when the key is absent.
    async fn get(&mut self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Atomically add one to `key` and return the new value.
    async fn incr(&mut self, key: &str) -> Result<i64, StoreError>;
}

/// Open a connection and probe it.
///
/// Returns `Ok(None)` when the store is unreachable. `operation` labels the
/// unavailability metric.
pub async fn acquire(
    store: &dyn CounterStore,
    operation: &'static str,
) -> Result<Option<Box<dyn CounterConnection>>, StoreError> {
    let probed = match store.open().await {
        Ok(mut conn) => conn.ping().await.map(|_| conn),
        Err(e) => Err(e),
    };

    match probed {
        Ok(conn) => Ok(Some(conn)),
        Err(StoreError::Unreachable(reason)) => {
            tracing::warn!(
                store = %store.describe(),
                operation,
                reason = %reason,
                "Counter store unavailable"
            );
            metrics::record_store_unavailable(operation);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_reachable() {
        let store = MemoryStore::new();
        let mut conn = acquire(&store, "test").await.unwrap().expect("connection");
        assert_eq!(conn.get(COUNTER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_acquire_unreachable_is_none() {
        let store = MemoryStore::new();
        store.set_reachable(false);
        assert!(acquire(&store, "test").await.unwrap().is_none());
    }

    #[test]
    fn test_unreachable_classification() {
        assert!(StoreError::Unreachable("refused".into()).is_unreachable());
        let malformed = StoreError::Malformed {
            key: COUNTER_KEY.into(),
            value: "abc".into(),
        };
        assert!(!malformed.is_unreachable());
    }
}
