//! Check parameters supplied by the embedding tool

use crate::error::{CheckError, CheckResult};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A single `key=value` flag sent with a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub key: String,
    pub value: String,
}

impl Flag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Producer of flags computed at check time
pub type ExtraFlagsFn = Arc<dyn Fn() -> Vec<Flag> + Send + Sync>;

/// Parameters for one update check
#[derive(Clone, Default)]
pub struct CheckParams {
    /// Product name, used in the endpoint path
    pub product: String,

    /// Version currently installed
    pub version: String,

    /// CPU architecture, defaults to the running one when empty
    pub arch: String,

    /// Operating system, defaults to the running one when empty
    pub os: String,

    /// Persisted signature file; a random signature is used per check when unset
    pub signature_file: Option<PathBuf>,

    /// Response cache file; caching is off when unset
    pub cache_file: Option<PathBuf>,

    /// Freshness window override for the cache
    pub cache_duration: Option<Duration>,

    /// Static flags
    pub flags: HashMap<String, String>,

    /// Flags computed once per check, appended after `flags`
    pub extra_flags: Option<ExtraFlagsFn>,

    /// Check even when `CHECKPOINT_DISABLE` is set
    pub force: bool,
}

impl CheckParams {
    /// Create parameters for a product and its installed version
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    pub fn with_signature_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.signature_file = Some(path.into());
        self
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = Some(duration);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }

    pub fn with_extra_flags<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Vec<Flag> + Send + Sync + 'static,
    {
        self.extra_flags = Some(Arc::new(producer));
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Reject parameters that can never produce a valid request
    pub fn validate(&self) -> CheckResult<()> {
        if self.product.trim().is_empty() {
            return Err(CheckError::Validation(
                "product must not be empty".to_string(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(CheckError::Validation(
                "version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Architecture to report
    pub fn arch(&self) -> &str {
        if self.arch.is_empty() {
            std::env::consts::ARCH
        } else {
            &self.arch
        }
    }

    /// Operating system to report
    pub fn os(&self) -> &str {
        if self.os.is_empty() {
            std::env::consts::OS
        } else {
            &self.os
        }
    }
}

impl fmt::Debug for CheckParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckParams")
            .field("product", &self.product)
            .field("version", &self.version)
            .field("arch", &self.arch)
            .field("os", &self.os)
            .field("signature_file", &self.signature_file)
            .field("cache_file", &self.cache_file)
            .field("cache_duration", &self.cache_duration)
            .field("flags", &self.flags)
            .field("extra_flags", &self.extra_flags.as_ref().map(|_| "Fn"))
            .field("force", &self.force)
            .finish()
    }
}
