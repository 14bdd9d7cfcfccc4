//! Cache record persistence

use crate::error::{CheckError, CheckResult};
use crate::response::CheckResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Age of a record relative to a freshness window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than the window
    Fresh,
    /// At or past the window, or stamped in the future
    Stale,
}

/// Cached response with the time it was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Unix seconds when the record was written
    pub timestamp: i64,

    /// Response as decoded from the endpoint
    pub response: CheckResponse,
}

impl CacheRecord {
    /// Stamp a response with the current time
    pub fn new(response: CheckResponse) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            response,
        }
    }

    /// Seconds since the record was written, negative if from the future
    pub fn age_secs(&self) -> i64 {
        Utc::now().timestamp().saturating_sub(self.timestamp)
    }

    /// Classify the record against a freshness window
    pub fn freshness(&self, window: Duration) -> Freshness {
        let age = self.age_secs();
        // Clock went backwards: do not pin a record forever
        if age < 0 {
            return Freshness::Stale;
        }
        let window = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        if age < window {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }

    pub fn is_fresh(&self, window: Duration) -> bool {
        self.freshness(window) == Freshness::Fresh
    }
}

/// Read the record at `path`.
///
/// A missing file is `Ok(None)`. Other IO failures and undecodable
/// contents are errors.
pub async fn read(path: &Path) -> CheckResult<Option<CacheRecord>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No cache file at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(CheckError::io(
                format!("reading cache file {}", path.display()),
                e,
            ))
        }
    };

    let record: CacheRecord = serde_json::from_str(&content)?;
    Ok(Some(record))
}

/// Write `record` to `path`, creating parent directories.
pub async fn write(path: &Path, record: &CacheRecord) -> CheckResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            CheckError::io(format!("creating cache directory {}", parent.display()), e)
        })?;
    }

    let content = serde_json::to_string(record)?;
    let temp = temp_path(path);

    fs::write(&temp, content).await.map_err(|e| {
        CheckError::io(format!("writing cache file {}", temp.display()), e)
    })?;

    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(CheckError::io(
            format!("replacing cache file {}", path.display()),
            e,
        ));
    }

    debug!("Cached response in {}", path.display());
    Ok(())
}

/// Unique sibling of `path` so concurrent writers never share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(OsStr::new("cache")));
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}
