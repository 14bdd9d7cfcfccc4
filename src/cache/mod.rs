//! On-disk response cache
//!
//! One file per caller-chosen path holds the last successful response and
//! the time it was fetched. A fresh record short-circuits the network.
//!
//! # Record States
//!
//! | State | Check behavior |
//! |-------|----------------|
//! | Missing | Query the endpoint, write the record |
//! | Stale | Query the endpoint, overwrite the record |
//! | Fresh | Serve the cached response, no network |
//!
//! There is no locking. Writes go to a temp file that is renamed over the
//! target, so readers see either the old or the new record, never a mix.

pub mod store;

pub use store::{read, write, CacheRecord, Freshness};
