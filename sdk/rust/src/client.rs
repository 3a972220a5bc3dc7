use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors are boxed so callers can move them across tasks.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub redis: String,
}

impl HealthStatus {
    pub fn is_connected(&self) -> bool {
        self.redis == "connected"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub app: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterReading {
    pub count: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub redis_host: String,
    pub redis_port: u16,
}

pub struct CounterClient {
    client: Client,
    base_url: String,
}

impl CounterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured reqwest client (pool settings, proxies).
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<HealthStatus, Error> {
        let resp = self.client.get(self.url("/health")).send().await?;
        decode(resp).await
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, Error> {
        let resp = self.client.get(self.url("/")).send().await?;
        decode(resp).await
    }

    /// Read the counter without changing it.
    pub async fn count(&self) -> Result<CounterReading, Error> {
        let resp = self.client.get(self.url("/api/counter")).send().await?;
        decode(resp).await
    }

    pub async fn increment(&self) -> Result<CounterReading, Error> {
        let resp = self.client.post(self.url("/api/counter")).send().await?;
        decode(resp).await
    }

    pub async fn info(&self) -> Result<HostInfo, Error> {
        let resp = self.client.get(self.url("/api/info")).send().await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("API returned error status {}: {}", status, text).into());
    }

    match serde_json::from_str::<T>(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(e.into()),
    }
}
