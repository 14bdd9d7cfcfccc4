//! Watch command - periodic update checks until interrupted

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::cli::output;
use crate::client::CheckClient;
use crate::config::Settings;
use crate::error::{CheckError, CheckResult};
use tracing::{info, warn};

/// Execute the watch command
pub async fn execute(args: WatchArgs) -> CheckResult<()> {
    let target = args.target;
    let params = target.to_params();
    let product = target.product.clone();
    let installed = target.version.clone();
    let format: OutputFormat = target.format;
    let force = params.force;

    info!(
        "Watching {} every ~{:?} (Ctrl-C to stop)",
        product, args.interval
    );

    let handle = CheckClient::new().start_interval(params, args.interval, move |result| {
        match result {
            Ok(resp) => {
                let skipped = !force && Settings::from_env().disabled;
                if let Err(e) = output::response(&product, &installed, &resp, skipped, format) {
                    warn!("Failed to print response: {}", e);
                }
            }
            Err(e) => output::check_error(&e),
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CheckError::io("waiting for Ctrl-C", e))?;

    info!("Stopping");
    handle.shutdown().await
}
