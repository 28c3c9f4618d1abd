//! Builds the per-region snapshot from a batch of poll records.

use std::collections::HashMap;

use common::{Aggregate, CandidateResult, PollRecord, RegionSnapshot};

/// Flatten one poll into candidate lines, stamping each with the poll's
/// readiness timestamp, pollster, and sample size.
pub fn normalize_record(poll: &PollRecord) -> Vec<CandidateResult> {
    poll.results
        .iter()
        .map(|entry| CandidateResult {
            candidate: entry.candidate_name.clone(),
            percentage: entry.pct,
            date: poll.ready_at.clone(),
            leader: entry.leader,
            pollster: poll.pollster.clone(),
            sample_size: poll.sample_size,
            party: entry.party.clone(),
        })
        .collect()
}

/// Reduce a batch of polls to one snapshot per region, sorted by region code.
///
/// Records are walked in feed order. A poll replaces the region's current
/// results only when its `ready_at` is strictly later than the timestamp on
/// the last stored line; timestamps are compared lexically, which orders
/// correctly for the feed's "YYYY-MM-DD HH:MM:SS" format. A tie keeps the
/// poll seen first. A poll with no candidate lines installs nothing, so the
/// stored lines (and the timestamp the guard reads) survive it.
pub fn aggregate_polls(polls: &[PollRecord]) -> Aggregate {
    let mut regions: HashMap<String, Vec<CandidateResult>> = HashMap::new();

    for poll in polls {
        // Entry first, so a region is listed even when every poll is rejected
        // or carries no candidate lines.
        let results = regions.entry(poll.geo.clone()).or_default();
        if poll.results.is_empty() {
            continue;
        }
        let accept = match results.last() {
            None => true,
            Some(last) => last.date.as_str() < poll.ready_at.as_str(),
        };
        if accept {
            *results = normalize_record(poll);
        }
    }

    let mut aggregate: Aggregate = regions
        .into_iter()
        .map(|(region, results)| RegionSnapshot { region, results })
        .collect();
    aggregate.sort_by(|a, b| a.region.cmp(&b.region));
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PollResultEntry;

    fn make_entry(candidate: &str, party: &str, pct: f64, leader: bool) -> PollResultEntry {
        PollResultEntry {
            candidate_name: candidate.into(),
            party: party.into(),
            pct,
            leader,
        }
    }

    fn make_poll(geo: &str, ready_at: &str, results: Vec<PollResultEntry>) -> PollRecord {
        PollRecord {
            geo: geo.into(),
            ready_at: ready_at.into(),
            pollster: "TestPollster".into(),
            sample_size: 500,
            results,
        }
    }

    #[test]
    fn test_later_poll_replaces_earlier_one() {
        let polls = vec![
            make_poll(
                "NV",
                "2024-11-01 10:00:00",
                vec![make_entry("Kamala Harris", "DEM", 48.0, true)],
            ),
            make_poll(
                "NV",
                "2024-11-02 20:36:00",
                vec![
                    make_entry("Donald Trump", "REP", 52.0, true),
                    make_entry("Kamala Harris", "DEM", 46.0, false),
                ],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate.len(), 1);
        let snapshot = &aggregate[0];
        assert_eq!(snapshot.region, "NV");
        assert_eq!(snapshot.results.len(), 2);
        assert_eq!(snapshot.results[0].candidate, "Donald Trump");
        assert_eq!(snapshot.results[0].date, "2024-11-02 20:36:00");
        assert_eq!(snapshot.results[1].candidate, "Kamala Harris");
        assert!((snapshot.results[1].percentage - 46.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_earlier_poll_after_later_one_is_rejected() {
        let polls = vec![
            make_poll(
                "NV",
                "2024-11-02 20:36:00",
                vec![make_entry("Donald Trump", "REP", 52.0, true)],
            ),
            make_poll(
                "NV",
                "2024-11-01 10:00:00",
                vec![make_entry("Kamala Harris", "DEM", 48.0, true)],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate[0].results.len(), 1);
        assert_eq!(aggregate[0].results[0].candidate, "Donald Trump");
        assert_eq!(aggregate[0].results[0].date, "2024-11-02 20:36:00");
    }

    #[test]
    fn test_equal_timestamps_keep_first_poll() {
        let polls = vec![
            make_poll(
                "PA",
                "2024-11-01 09:00:00",
                vec![make_entry("Kamala Harris", "DEM", 49.0, true)],
            ),
            make_poll(
                "PA",
                "2024-11-01 09:00:00",
                vec![make_entry("Donald Trump", "REP", 50.0, true)],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate[0].results.len(), 1);
        assert_eq!(aggregate[0].results[0].candidate, "Kamala Harris");
    }

    #[test]
    fn test_regions_sorted_by_code() {
        let polls = vec![
            make_poll("TX", "2024-11-01 10:00:00", vec![]),
            make_poll("AL", "2024-11-01 10:00:00", vec![]),
            make_poll("NV", "2024-11-01 10:00:00", vec![]),
        ];

        let aggregate = aggregate_polls(&polls);

        let codes: Vec<&str> = aggregate.iter().map(|s| s.region.as_str()).collect();
        assert_eq!(codes, vec!["AL", "NV", "TX"]);
    }

    #[test]
    fn test_region_with_no_candidate_lines_still_listed() {
        let polls = vec![make_poll("WY", "2024-11-01 10:00:00", vec![])];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate[0].region, "WY");
        assert!(aggregate[0].results.is_empty());
    }

    #[test]
    fn test_empty_poll_between_records_keeps_the_stored_lines() {
        // The empty poll at T5 installs nothing, so the T3 lines stay put
        // and still reject the T1 poll that follows.
        let polls = vec![
            make_poll(
                "GA",
                "2024-11-03 12:00:00",
                vec![make_entry("Donald Trump", "REP", 51.0, true)],
            ),
            make_poll("GA", "2024-11-05 12:00:00", vec![]),
            make_poll(
                "GA",
                "2024-11-01 12:00:00",
                vec![make_entry("Kamala Harris", "DEM", 47.0, true)],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate[0].results.len(), 1);
        assert_eq!(aggregate[0].results[0].candidate, "Donald Trump");
        assert_eq!(aggregate[0].results[0].date, "2024-11-03 12:00:00");
    }

    #[test]
    fn test_leading_empty_poll_does_not_block_an_earlier_record() {
        // An empty poll leaves the region with no stored lines, so the next
        // record is accepted even though its timestamp is older.
        let polls = vec![
            make_poll("GA", "2024-11-05 12:00:00", vec![]),
            make_poll(
                "GA",
                "2024-11-01 12:00:00",
                vec![make_entry("Kamala Harris", "DEM", 47.0, true)],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate[0].results.len(), 1);
        assert_eq!(aggregate[0].results[0].candidate, "Kamala Harris");
        assert_eq!(aggregate[0].results[0].date, "2024-11-01 12:00:00");
    }

    #[test]
    fn test_regions_aggregate_independently() {
        let polls = vec![
            make_poll(
                "NV",
                "2024-11-01 10:00:00",
                vec![make_entry("Donald Trump", "REP", 50.0, true)],
            ),
            make_poll(
                "PA",
                "2024-11-05 10:00:00",
                vec![make_entry("Kamala Harris", "DEM", 49.0, true)],
            ),
            make_poll(
                "NV",
                "2024-11-09 10:00:00",
                vec![make_entry("Donald Trump", "REP", 52.0, true)],
            ),
        ];

        let aggregate = aggregate_polls(&polls);

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate[0].region, "NV");
        assert_eq!(aggregate[0].results[0].date, "2024-11-09 10:00:00");
        assert_eq!(aggregate[1].region, "PA");
        assert_eq!(aggregate[1].results[0].date, "2024-11-05 10:00:00");
    }

    #[test]
    fn test_normalize_copies_poll_fields_onto_each_line() {
        let poll = PollRecord {
            geo: "NV".into(),
            ready_at: "2024-11-02 20:36:00".into(),
            pollster: "AtlasIntel".into(),
            sample_size: 782,
            results: vec![
                make_entry("Donald Trump", "REP", 52.0, true),
                make_entry("Kamala Harris", "DEM", 46.0, false),
            ],
        };

        let lines = normalize_record(&poll);

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.date, "2024-11-02 20:36:00");
            assert_eq!(line.pollster, "AtlasIntel");
            assert_eq!(line.sample_size, 782);
        }
        assert_eq!(lines[0].candidate, "Donald Trump");
        assert_eq!(lines[0].party, "REP");
        assert!(lines[0].leader);
        assert!(!lines[1].leader);
    }
}
