//! Read operations over the cached aggregate.

use std::sync::Arc;

use common::{Aggregate, CandidateResult, RegionSnapshot, Result};

use crate::cache::SnapshotCache;

/// Read-side facade over the snapshot cache.
///
/// Each call goes through the cache exactly once, so a request sees one
/// consistent aggregate even while a refresh is replacing it.
#[derive(Clone)]
pub struct PollQueries {
    cache: Arc<SnapshotCache>,
}

impl PollQueries {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    /// All region snapshots, sorted by region code.
    pub async fn regions(&self) -> Result<Arc<Aggregate>> {
        self.cache.get().await
    }

    /// The snapshot for one region, matched by exact code.
    pub async fn region(&self, code: &str) -> Result<Option<RegionSnapshot>> {
        let aggregate = self.cache.get().await?;
        Ok(aggregate.iter().find(|s| s.region == code).cloned())
    }

    /// Every candidate line across all regions, in region order.
    pub async fn results(&self) -> Result<Vec<CandidateResult>> {
        let aggregate = self.cache.get().await?;
        Ok(aggregate
            .iter()
            .flat_map(|s| s.results.iter().cloned())
            .collect())
    }

    /// The first candidate line whose name matches `candidate` exactly.
    pub async fn result(&self, candidate: &str) -> Result<Option<CandidateResult>> {
        let aggregate = self.cache.get().await?;
        Ok(aggregate
            .iter()
            .flat_map(|s| s.results.iter())
            .find(|r| r.candidate == candidate)
            .cloned())
    }
}
