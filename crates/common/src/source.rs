//! Abstraction over the upstream poll feed.
//!
//! The `PollSource` trait decouples the cache and aggregation logic from the
//! concrete HTTP client, so tests can substitute canned or failing sources.

use crate::types::PollRecord;
use crate::Result;
use async_trait::async_trait;

/// Trait for fetching the current batch of upstream poll records.
#[async_trait]
pub trait PollSource: Send + Sync {
    async fn fetch_polls(&self) -> Result<Vec<PollRecord>>;
}
