//! Outbound request construction

use crate::error::{CheckError, CheckResult};
use crate::params::{CheckParams, Flag};
use crate::signature;
use url::Url;

/// Everything sent to the endpoint for one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub product: String,
    pub version: String,
    pub os: String,
    pub arch: String,
    pub signature: String,

    /// Static flags first, then the computed ones in produced order
    pub flags: Vec<Flag>,
}

impl CheckRequest {
    /// Assemble the request for `params`.
    ///
    /// Reads or creates the signature file when one is configured.
    pub async fn build(params: &CheckParams) -> CheckResult<Self> {
        let signature = match &params.signature_file {
            Some(path) => signature::load_or_create(path).await?,
            None => signature::ephemeral(),
        };

        Ok(Self {
            product: params.product.clone(),
            version: params.version.clone(),
            os: params.os().to_string(),
            arch: params.arch().to_string(),
            signature,
            flags: collect_flags(params),
        })
    }

    /// Render the request as `<base>/v1/check/<product>?...`
    pub fn url(&self, base: &str) -> CheckResult<Url> {
        let endpoint_error = |reason: String| CheckError::Endpoint {
            url: base.to_string(),
            reason,
        };

        let mut url = Url::parse(base).map_err(|e| endpoint_error(e.to_string()))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| endpoint_error("URL cannot be a base".to_string()))?;
            segments.pop_if_empty().extend(["v1", "check", self.product.as_str()]);
        }

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("version", &self.version)
                .append_pair("arch", &self.arch)
                .append_pair("os", &self.os)
                .append_pair("signature", &self.signature);
            for flag in &self.flags {
                query.append_pair("flag", &format!("{}={}", flag.key, flag.value));
            }
        }

        Ok(url)
    }
}

/// Flatten static and computed flags into one list
fn collect_flags(params: &CheckParams) -> Vec<Flag> {
    let mut flags: Vec<Flag> = params
        .flags
        .iter()
        .map(|(key, value)| Flag::new(key.as_str(), value.as_str()))
        .collect();
    // Map order is random; keep the wire form stable
    flags.sort_by(|a, b| a.key.cmp(&b.key));

    if let Some(extra) = &params.extra_flags {
        flags.extend(extra());
    }

    flags
}
