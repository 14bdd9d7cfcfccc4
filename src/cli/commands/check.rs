//! Check command - one update check

use crate::cli::args::CheckArgs;
use crate::cli::output;
use crate::client::CheckClient;
use crate::config::Settings;
use crate::error::CheckResult;
use tracing::info;

/// Execute the check command
pub async fn execute(args: CheckArgs) -> CheckResult<()> {
    let target = &args.target;
    let params = target.to_params();

    info!("Checking {} {}", params.product, params.version);
    let skipped = !params.force && Settings::from_env().disabled;
    let resp = CheckClient::new().check(&params).await?;

    output::response(&target.product, &target.version, &resp, skipped, target.format)
}
