//! Typed HTTP client for the visit counter API.

pub mod client;

pub use client::{CounterClient, CounterReading, HealthStatus, HostInfo, ServiceInfo};
