//! TTL cache for the aggregated snapshot.
//!
//! Concurrent refreshes collapse into one upstream fetch: the first caller
//! past the TTL starts a refresh task, everyone else waits on its outcome
//! through a broadcast channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::{Aggregate, Error, PollSource};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate_polls;

/// Cache freshness report for health checks and heartbeat logs.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub has_data: bool,
    pub regions: usize,
    pub age_secs: Option<u64>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    aggregate: Arc<Aggregate>,
    /// Monotonic fetch time, for TTL checks.
    fetched_at: Instant,
    /// Wall-clock fetch time, for status reporting.
    refreshed_at: DateTime<Utc>,
}

struct CacheState {
    entry: Option<CacheEntry>,
    in_flight: Option<broadcast::Sender<Result<Arc<Aggregate>, Error>>>,
}

/// Serves the aggregated snapshot from memory, refetching through the
/// source once the entry is older than the TTL.
pub struct SnapshotCache {
    source: Arc<dyn PollSource>,
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn PollSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Arc::new(Mutex::new(CacheState {
                entry: None,
                in_flight: None,
            })),
        }
    }

    /// Return the current aggregate, refreshing when the cached copy is
    /// missing or expired.
    ///
    /// Every caller that arrives during a refresh receives that refresh's
    /// outcome, success or error alike. A failed refresh is not cached, so
    /// the next call retries; a previously cached aggregate survives the
    /// failure and stays visible through `status`.
    pub async fn get(&self) -> Result<Arc<Aggregate>, Error> {
        let mut rx = {
            let mut state = self.state.lock().await;

            if let Some(entry) = &state.entry {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("Returning cached aggregate");
                    return Ok(Arc::clone(&entry.aggregate));
                }
            }

            match &state.in_flight {
                Some(tx) => tx.subscribe(),
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    state.in_flight = Some(tx);
                    self.spawn_refresh();
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Upstream(
                "refresh task dropped without a result".into(),
            )),
        }
    }

    /// Report cache freshness without triggering a refresh.
    pub async fn status(&self) -> CacheStatus {
        let state = self.state.lock().await;
        match &state.entry {
            Some(entry) => CacheStatus {
                has_data: true,
                regions: entry.aggregate.len(),
                age_secs: Some(entry.fetched_at.elapsed().as_secs()),
                refreshed_at: Some(entry.refreshed_at),
            },
            None => CacheStatus {
                has_data: false,
                regions: 0,
                age_secs: None,
                refreshed_at: None,
            },
        }
    }

    /// Run the fetch-and-aggregate on its own task, so a caller that gives
    /// up waiting cannot abandon the other subscribers mid-refresh.
    fn spawn_refresh(&self) {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            // Fetch on a task of its own so that even a panicking source
            // yields an outcome; the sender parked in `in_flight` must never
            // be left without one.
            let fetched = tokio::spawn(async move {
                let polls = source.fetch_polls().await?;
                let aggregate = Arc::new(aggregate_polls(&polls));
                info!(
                    "Refreshed poll aggregate: {} records across {} regions",
                    polls.len(),
                    aggregate.len()
                );
                Ok(aggregate)
            })
            .await;

            let outcome = match fetched {
                Ok(Ok(aggregate)) => Ok(aggregate),
                Ok(Err(e)) => {
                    warn!("Poll refresh failed: {e}");
                    Err(e)
                }
                Err(e) => {
                    warn!("Poll refresh task panicked: {e}");
                    Err(Error::Upstream("refresh task panicked".into()))
                }
            };

            let mut state = state.lock().await;
            if let Ok(aggregate) = &outcome {
                state.entry = Some(CacheEntry {
                    aggregate: Arc::clone(aggregate),
                    fetched_at: Instant::now(),
                    refreshed_at: Utc::now(),
                });
            }
            if let Some(tx) = state.in_flight.take() {
                // Send while still holding the lock: anyone who saw this
                // refresh as in-flight has already subscribed. Having no
                // receivers left is fine.
                let _ = tx.send(outcome);
            }
        });
    }
}
