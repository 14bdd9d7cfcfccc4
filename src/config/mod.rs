//! Process-level configuration for checkpoint
//!
//! The disable switch and endpoint override live in the environment and are
//! read fresh on every check, so a host tool (or a test) can flip them at
//! runtime without rebuilding anything.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that opts out of all update checks
pub const DISABLE_ENV: &str = "CHECKPOINT_DISABLE";

/// Environment variable that replaces the endpoint base URL
pub const URL_ENV: &str = "CHECKPOINT_URL";

/// Endpoint base URL used when `CHECKPOINT_URL` is unset
pub const DEFAULT_BASE_URL: &str = "https://checkpoint-api.hashicorp.com";

/// Base check interval.
///
/// A cached response younger than this is served without touching the
/// network, for one-shot checks and scheduled checks alike.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Snapshot of the environment-level switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Checks short-circuit to an empty response unless forced
    pub disabled: bool,

    /// Endpoint base URL
    pub base_url: String,
}

impl Settings {
    /// Read the current settings from the environment
    pub fn from_env() -> Self {
        Self::from_values(
            env::var(DISABLE_ENV).ok().as_deref(),
            env::var(URL_ENV).ok().as_deref(),
        )
    }

    fn from_values(disable: Option<&str>, url: Option<&str>) -> Self {
        let base_url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();

        Self {
            disabled: disable.is_some_and(is_truthy),
            base_url,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

/// Any non-empty value except the usual "off" spellings
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["0", "false", "no", "off"]
            .iter()
            .any(|off| value.eq_ignore_ascii_case(off))
}

/// Default location of the persisted anonymous signature
pub fn default_signature_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".checkpoint_signature")
}

/// Default cache file for a product, under the user cache directory
pub fn default_cache_path(product: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("checkpoint")
        .join(format!("{}.json", product))
}
