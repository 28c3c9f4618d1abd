//! Domain types shared across the polls server.

use serde::{Deserialize, Serialize};

// ── Upstream feed types ───────────────────────────────────────────────

/// Top-level body of the upstream poll feed.
#[derive(Debug, Clone, Deserialize)]
pub struct PollsResponse {
    pub polls: Vec<PollRecord>,
}

/// One poll as delivered by the upstream feed.
///
/// The feed carries many more fields (sponsors, margins, race metadata);
/// only what the aggregation needs is decoded here, everything else is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PollRecord {
    /// Region code, e.g. "NV" (or "US" for the national average).
    pub geo: String,

    /// Instant this poll's results became authoritative, as delivered:
    /// "YYYY-MM-DD HH:MM:SS". Kept opaque and compared lexically.
    pub ready_at: String,

    pub pollster: String,
    pub sample_size: i64,

    /// Per-candidate lines, in feed order.
    pub results: Vec<PollResultEntry>,
}

/// Per-candidate line inside one poll.
#[derive(Debug, Clone, Deserialize)]
pub struct PollResultEntry {
    pub candidate_name: String,

    /// Party code, e.g. "DEM"/"REP"; empty when the feed omits it.
    #[serde(default)]
    pub party: String,

    pub pct: f64,
    pub leader: bool,
}

// ── Aggregated view ───────────────────────────────────────────────────

/// One candidate line in a region snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate: String,
    pub percentage: f64,
    /// Readiness timestamp of the poll this line came from.
    pub date: String,
    pub leader: bool,
    pub pollster: String,
    pub sample_size: i64,
    pub party: String,
}

/// Latest accepted poll results for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub region: String,
    pub results: Vec<CandidateResult>,
}

/// All region snapshots at one point in time, sorted by region code.
pub type Aggregate = Vec<RegionSnapshot>;
