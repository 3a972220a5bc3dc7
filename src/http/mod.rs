//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS, request ID, tracing, metrics)
//!     → handlers.rs (acquire store connection, GET / INCR, build payload)
//!     → JSON response
//! ```

pub mod handlers;
pub mod server;

pub use server::{build_router, AppState, HttpServer, X_REQUEST_ID};
