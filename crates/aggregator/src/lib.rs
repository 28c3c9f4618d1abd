//! Poll aggregation engine.
//!
//! Builds per-region snapshots from the upstream feed and serves them from a
//! TTL cache with single-flight refresh.

pub mod aggregate;
pub mod cache;
pub mod queries;

pub use aggregate::{aggregate_polls, normalize_record};
pub use cache::{CacheStatus, SnapshotCache};
pub use queries::PollQueries;
