//! Check response as returned by the endpoint

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize};

/// Operator-issued alert attached to a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckAlert {
    pub id: i64,

    /// Unix timestamp of the alert
    pub date: i64,

    pub url: String,

    /// Severity, e.g. "info", "warn", "critical"
    pub level: String,

    pub message: String,
}

/// Latest-version information for a product
///
/// The zero value is what a disabled check returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckResponse {
    pub current_version: String,

    /// Release date of `current_version`, Unix seconds
    #[serde(rename = "current_release")]
    pub current_release_date: i64,

    pub current_download_url: String,
    pub current_changelog_url: String,
    pub project_website: String,

    /// Whether the caller's version is older than `current_version`
    pub outdated: bool,

    #[serde(deserialize_with = "null_as_empty")]
    pub alerts: Vec<CheckAlert>,
}

/// Servers send `"alerts": null` when there are none
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CheckAlert>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CheckAlert>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CheckResponse {
    /// Recompute `outdated` for an installed version.
    ///
    /// Keeps the server's answer when either version is not semver.
    pub fn refresh_outdated(&mut self, installed: &str) {
        let parse = |v: &str| Version::parse(v.trim().trim_start_matches('v')).ok();
        if let (Some(installed), Some(latest)) = (parse(installed), parse(&self.current_version)) {
            self.outdated = installed < latest;
        }
    }

    /// True for the empty response of a disabled check
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
