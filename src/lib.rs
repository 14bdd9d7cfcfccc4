//! checkpoint - update and alert checks for command-line tools
//!
//! Asks a version-check endpoint for the latest release of a product and
//! any operator alerts, caches the answer on disk, and can poll in the
//! background on a staggered interval. Setting `CHECKPOINT_DISABLE`
//! turns every check into a no-op.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod schedule;
pub mod signature;
pub mod transport;

pub use client::{check, CheckClient};
pub use config::{Settings, CHECK_INTERVAL};
pub use error::{CheckError, CheckResult};
pub use params::{CheckParams, Flag};
pub use response::{CheckAlert, CheckResponse};
pub use schedule::{random_stagger, start_interval, IntervalHandle};
pub use transport::{HttpTransport, Transport};
