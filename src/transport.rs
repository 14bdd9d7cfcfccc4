//! HTTP transport abstraction
//!
//! The check client only needs "GET this URL, give me the body". Keeping
//! that behind a trait lets tests and embedding tools substitute their own
//! client.

use crate::error::{CheckError, CheckResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;
use url::Url;

/// Global timeout for one check request
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum response body size (1 MB)
pub const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

const USER_AGENT: &str = concat!("checkpoint/", env!("CARGO_PKG_VERSION"));

/// Issues the GET request for a check
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// Non-2xx statuses are errors.
    async fn get(&self, url: &Url) -> CheckResult<String>;
}

/// Blocking `ureq` client run on tokio's blocking pool
#[derive(Clone)]
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> CheckResult<String> {
        let agent = self.agent.clone();
        let target = url.to_string();
        debug!("GET {}", target);

        tokio::task::spawn_blocking(move || fetch(&agent, &target))
            .await
            .map_err(|e| CheckError::Internal(format!("request task failed: {}", e)))?
    }
}

fn fetch(agent: &Agent, url: &str) -> CheckResult<String> {
    agent
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json")
        .call()
        .map_err(|e| CheckError::network(url, e))?
        .into_body()
        .with_config()
        .limit(MAX_RESPONSE_SIZE)
        .read_to_string()
        .map_err(|e| CheckError::network(url, e))
}
