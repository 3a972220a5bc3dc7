//! Redis-backed counter store.
//!
//! Each `open` builds a new multiplexed connection; it is closed when the
//! returned box is dropped.

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, ErrorKind, RedisError};
use async_trait::async_trait;
use tracing::debug;

use super::{CounterConnection, CounterStore, StoreError};
use crate::config::StoreConfig;

pub struct RedisStore {
    host: String,
    port: u16,
}

impl RedisStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }

    /// Structured address, so IPv6 literals need no URL bracketing.
    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: Default::default(),
        }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn open(&self) -> Result<Box<dyn CounterConnection>, StoreError> {
        let client = Client::open(self.connection_info()).map_err(classify)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(classify)?;
        debug!(store = %self.describe(), "Opened redis connection");
        Ok(Box::new(RedisConnection { conn }))
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct RedisConnection {
    conn: MultiplexedConnection,
}

#[async_trait]
impl CounterConnection for RedisConnection {
    async fn ping(&mut self) -> Result<(), StoreError> {
        let _: String = ::redis::cmd("PING")
            .query_async(&mut self.conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<i64>, StoreError> {
        // Redis hands back a bulk string; FromRedisValue parses it into i64.
        self.conn.get(key).await.map_err(classify)
    }

    async fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        self.conn.incr(key, 1).await.map_err(classify)
    }
}

/// Split connectivity faults from everything else.
///
/// A server still loading its dataset or rejecting our credentials is
/// treated like one that cannot be reached.
fn classify(err: RedisError) -> StoreError {
    let not_ready = matches!(
        err.kind(),
        ErrorKind::BusyLoadingError | ErrorKind::AuthenticationFailed
    );
    if not_ready
        || err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        StoreError::Unreachable(err.to_string())
    } else {
        StoreError::Redis(err)
    }
}
