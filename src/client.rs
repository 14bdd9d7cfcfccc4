//! One update check: opt-out, cache, network, cache refresh

use crate::cache::{self, CacheRecord};
use crate::config::{Settings, CHECK_INTERVAL};
use crate::error::CheckResult;
use crate::params::CheckParams;
use crate::request::CheckRequest;
use crate::response::CheckResponse;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Performs update checks through a [`Transport`]
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct CheckClient {
    transport: Arc<dyn Transport>,
    settings: Option<Settings>,
}

impl CheckClient {
    /// Create a client using the default HTTP transport
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            settings: None,
        }
    }

    /// Pin the settings instead of reading the environment on every check
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    fn settings(&self) -> Settings {
        self.settings.clone().unwrap_or_else(Settings::from_env)
    }

    /// Check for the latest version of `params.product`.
    ///
    /// Returns the empty response without any IO when checks are disabled
    /// and `params.force` is off. A fresh cached response is served without
    /// touching the network. Network and decode failures are returned as
    /// errors even when a stale cached response exists.
    pub async fn check(&self, params: &CheckParams) -> CheckResult<CheckResponse> {
        params.validate()?;

        let settings = self.settings();
        if settings.disabled && !params.force {
            debug!("Update checks disabled, skipping {}", params.product);
            return Ok(CheckResponse::default());
        }

        if let Some(path) = &params.cache_file {
            let window = params.cache_duration.unwrap_or(CHECK_INTERVAL);
            if let Some(record) = cache::read(path).await? {
                if record.is_fresh(window) {
                    debug!(
                        "Using cached response for {} ({}s old)",
                        params.product,
                        record.age_secs()
                    );
                    let mut response = record.response;
                    response.refresh_outdated(&params.version);
                    return Ok(response);
                }
                debug!("Cached response in {} is stale", path.display());
            }
        }

        let request = CheckRequest::build(params).await?;
        let url = request.url(&settings.base_url)?;
        let body = self.transport.get(&url).await?;
        let response: CheckResponse = serde_json::from_str(&body)?;

        if let Some(path) = &params.cache_file {
            let record = CacheRecord::new(response.clone());
            if let Err(e) = cache::write(path, &record).await {
                warn!("Failed to cache update check response: {}", e);
            }
        }

        Ok(response)
    }
}

impl Default for CheckClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Check for updates using the default HTTP transport
pub async fn check(params: &CheckParams) -> CheckResult<CheckResponse> {
    CheckClient::new().check(params).await
}
