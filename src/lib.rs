//! Visit counter backend library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::schema::CounterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
