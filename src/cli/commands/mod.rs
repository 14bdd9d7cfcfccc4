//! CLI command implementations

pub mod check;
pub mod watch;

pub use check::execute as check;
pub use watch::execute as watch;
