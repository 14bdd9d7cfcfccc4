//! Output functions for consistent CLI formatting

use crate::cli::args::OutputFormat;
use crate::error::{CheckError, CheckResult};
use crate::response::CheckResponse;
use chrono::DateTime;
use console::style;

/// What the summary line of a text response reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// The check was skipped by `CHECKPOINT_DISABLE`
    Skipped,
    /// The endpoint answered without release details
    NoRelease,
    Outdated,
    Current,
}

fn status(resp: &CheckResponse, skipped: bool) -> Status {
    if skipped {
        Status::Skipped
    } else if resp.is_empty() {
        Status::NoRelease
    } else if resp.outdated {
        Status::Outdated
    } else {
        Status::Current
    }
}

/// Print a check response in the requested format.
///
/// `skipped` marks a response produced by the disable switch rather than
/// by the endpoint.
pub fn response(
    product: &str,
    installed: &str,
    resp: &CheckResponse,
    skipped: bool,
    format: OutputFormat,
) -> CheckResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(resp)?);
        }
        OutputFormat::Text => response_text(product, installed, resp, skipped),
    }
    Ok(())
}

fn response_text(product: &str, installed: &str, resp: &CheckResponse, skipped: bool) {
    match status(resp, skipped) {
        Status::Skipped => {
            println!(
                "{} Update checks are disabled (CHECKPOINT_DISABLE)",
                style("[SKIP]").dim()
            );
            return;
        }
        Status::NoRelease => {
            println!(
                "{} {} no release information returned",
                style("[WARN]").yellow(),
                style(product).cyan()
            );
            return;
        }
        Status::Outdated => println!(
            "{} {} {} is available (installed: {})",
            style("[UPDATE]").yellow(),
            style(product).cyan(),
            style(&resp.current_version).green().bold(),
            installed
        ),
        Status::Current => println!(
            "{} {} {} is up to date",
            style("[OK]").green(),
            style(product).cyan(),
            installed
        ),
    }

    if let Some(released) = DateTime::from_timestamp(resp.current_release_date, 0)
        .filter(|_| resp.current_release_date > 0)
    {
        println!("  Released:  {}", released.format("%Y-%m-%d"));
    }
    if !resp.current_download_url.is_empty() {
        println!("  Download:  {}", resp.current_download_url);
    }
    if !resp.current_changelog_url.is_empty() {
        println!("  Changelog: {}", resp.current_changelog_url);
    }
    if !resp.project_website.is_empty() {
        println!("  Website:   {}", resp.project_website);
    }

    for alert in &resp.alerts {
        let level = match alert.level.as_str() {
            "critical" | "emergency" => style(alert.level.to_uppercase()).red().bold(),
            "warn" | "warning" => style(alert.level.to_uppercase()).yellow(),
            _ => style(alert.level.to_uppercase()).dim(),
        };
        println!("  [{}] {}", level, alert.message);
        if !alert.url.is_empty() {
            println!("        {}", style(&alert.url).dim());
        }
    }
}

/// Print a failed check without aborting
pub fn check_error(err: &CheckError) {
    eprintln!("{} {}", style("[ERROR]").red(), err);
    if let Some(hint) = err.hint() {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
}
