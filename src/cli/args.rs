//! CLI argument definitions using clap derive

use crate::config::{default_cache_path, default_signature_path};
use crate::params::CheckParams;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// checkpoint - check a product for updates and alerts
///
/// Queries the version-check endpoint (CHECKPOINT_URL) unless
/// CHECKPOINT_DISABLE is set.
#[derive(Parser, Debug)]
#[command(name = "checkpoint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check once and print the result
    Check(CheckArgs),

    /// Check repeatedly on a staggered interval until interrupted
    Watch(WatchArgs),
}

/// Product and request options shared by all commands
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Product name
    #[arg(short, long)]
    pub product: String,

    /// Installed version of the product
    #[arg(id = "installed", short = 'i', long = "installed", value_name = "VERSION")]
    pub version: String,

    /// Response cache file (caching is off when omitted)
    #[arg(long, env = "CHECKPOINT_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Persisted signature file (a random one is used per check when omitted)
    #[arg(long, env = "CHECKPOINT_SIGNATURE_FILE")]
    pub signature_file: Option<PathBuf>,

    /// Extra flag sent with the check (KEY=VALUE, repeatable)
    #[arg(short, long = "flag", value_parser = parse_flag)]
    pub flags: Vec<(String, String)>,

    /// Persist the signature and cache responses in the default locations
    /// (~/.checkpoint_signature and the user cache directory) unless the
    /// paths are given explicitly
    #[arg(long)]
    pub persist: bool,

    /// Check even when CHECKPOINT_DISABLE is set
    #[arg(long)]
    pub force: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl TargetArgs {
    /// Build check parameters from the arguments
    pub fn to_params(&self) -> CheckParams {
        let mut params = CheckParams::new(&self.product, &self.version).with_force(self.force);
        params.cache_file = self.cache_file.clone();
        params.signature_file = self.signature_file.clone();
        if self.persist {
            params
                .cache_file
                .get_or_insert_with(|| default_cache_path(&self.product));
            params
                .signature_file
                .get_or_insert_with(default_signature_path);
        }
        for (key, value) in &self.flags {
            params = params.with_flag(key, value);
        }
        params
    }
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Base interval between checks (e.g. 500ms, 30s, 10m, 24h)
    #[arg(long, default_value = "24h", value_parser = parse_interval)]
    pub interval: Duration,
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON response
    Json,
}

fn parse_flag(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Parse `<n>ms`, `<n>s`, `<n>m` or `<n>h`
fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("missing unit in '{s}' (use ms, s, m or h)"))?;
    let (number, unit) = s.split_at(split);
    let n: u64 = number
        .parse()
        .map_err(|_| format!("invalid number in interval '{s}'"))?;

    let interval = match unit {
        "ms" => Duration::from_millis(n),
        "s" => Duration::from_secs(n),
        "m" => Duration::from_secs(n.saturating_mul(60)),
        "h" => Duration::from_secs(n.saturating_mul(60 * 60)),
        other => return Err(format!("unknown unit '{other}' (use ms, s, m or h)")),
    };

    if interval.is_zero() {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(interval)
}
