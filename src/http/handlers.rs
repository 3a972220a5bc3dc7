//! Endpoint handlers.
//!
//! Every store-touching handler acquires its own connection, which is dropped
//! on return, including on the `?` paths.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::http::server::AppState;
use crate::store::{self, COUNTER_KEY};

/// Name reported by `GET /`.
pub const APP_NAME: &str = "EKS 3-Tier Backend";

/// Paths listed by `GET /`.
pub const ENDPOINTS: [&str; 3] = ["/health", "/api/counter", "/api/info"];

const STORE_UNAVAILABLE: &str = "Redis unavailable";
const INCREMENTED: &str = "Counter incremented";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub redis: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub app: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterReading {
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CounterReading {
    fn value(count: i64) -> Self {
        Self {
            count,
            message: None,
            error: None,
        }
    }

    fn unavailable() -> Self {
        Self {
            count: 0,
            message: None,
            error: Some(STORE_UNAVAILABLE.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub redis_host: String,
    pub redis_port: u16,
}

/// `GET /health`. Always 200; store state goes in the body.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>> {
    let conn = store::acquire(state.store.as_ref(), "health").await?;
    let (status, redis) = match conn {
        Some(_) => ("healthy", "connected"),
        None => ("degraded", "disconnected"),
    };
    Ok(Json(HealthStatus {
        status: status.to_string(),
        redis: redis.to_string(),
    }))
}

/// `GET /`.
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        app: APP_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// `GET /api/counter`. A missing key reads as zero.
pub async fn get_counter(State(state): State<AppState>) -> Result<Json<CounterReading>> {
    let Some(mut conn) = store::acquire(state.store.as_ref(), "get_counter").await? else {
        return Ok(Json(CounterReading::unavailable()));
    };
    let count = conn.get(COUNTER_KEY).await?.unwrap_or(0);
    tracing::debug!(count, "Read counter");
    Ok(Json(CounterReading::value(count)))
}

/// `POST /api/counter`. Relies on the store's atomic increment.
pub async fn increment_counter(State(state): State<AppState>) -> Result<Json<CounterReading>> {
    let Some(mut conn) = store::acquire(state.store.as_ref(), "increment_counter").await? else {
        return Ok(Json(CounterReading::unavailable()));
    };
    let count = conn.incr(COUNTER_KEY).await?;
    tracing::debug!(count, "Incremented counter");
    Ok(Json(CounterReading {
        message: Some(INCREMENTED.to_string()),
        ..CounterReading::value(count)
    }))
}

/// `GET /api/info`.
pub async fn host_info(State(state): State<AppState>) -> Result<Json<HostInfo>> {
    let hostname = hostname::get()
        .map_err(AppError::Hostname)?
        .to_string_lossy()
        .into_owned();
    Ok(Json(HostInfo {
        hostname,
        redis_host: state.config.store.host.clone(),
        redis_port: state.config.store.port,
    }))
}
