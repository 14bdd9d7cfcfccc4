//! Anonymous installation signature
//!
//! The signature is a random UUID persisted on first use so the endpoint can
//! de-duplicate counts per installation. It carries no identifying data.

use crate::error::{CheckError, CheckResult};
use std::path::Path;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

const SIGNATURE_NOTE: &str = "\
This signature is a randomly generated UUID used to de-duplicate
alerts and version information. This signature is random, it is
not based on any personally identifiable information. To create
a new signature, you can simply delete this file at any time.
";

/// Generate a signature that is not persisted anywhere
pub fn ephemeral() -> String {
    Uuid::new_v4().to_string()
}

/// Load the signature stored at `path`, creating it if absent
pub async fn load_or_create(path: &Path) -> CheckResult<String> {
    match fs::read_to_string(path).await {
        Ok(content) => {
            if let Some(signature) = content.lines().next().map(str::trim) {
                if !signature.is_empty() {
                    return Ok(signature.to_string());
                }
            }
            debug!("Signature file {} is empty, regenerating", path.display());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CheckError::io(
                format!("reading signature file {}", path.display()),
                e,
            ))
        }
    }

    let signature = ephemeral();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            CheckError::io(format!("creating directory {}", parent.display()), e)
        })?;
    }

    let content = format!("{}\n\n{}", signature, SIGNATURE_NOTE);
    fs::write(path, content).await.map_err(|e| {
        CheckError::io(format!("writing signature file {}", path.display()), e)
    })?;

    debug!("Created signature file {}", path.display());
    Ok(signature)
}
