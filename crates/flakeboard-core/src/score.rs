//! Flakiness score and report ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::aggregate::{AggregateEntry, AggregateMap};

/// Identifiers beyond this add no further weight.
pub const MAX_WEIGHTED_IDENTIFIERS: usize = 6;

/// Whole days between `last_seen` and `now`, never negative.
pub fn days_since(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let hours = now.signed_duration_since(last_seen).num_hours();
    u64::try_from(hours / 24).unwrap_or(0)
}

/// `floor(10 * min(6, ids) * failures / max(1, days))`, floored at 1 when
/// the entry has both failures and identifiers.
pub fn score(entry: &AggregateEntry, now: DateTime<Utc>) -> u64 {
    let days = entry
        .last_seen
        .map(|seen| days_since(seen, now))
        .unwrap_or(1)
        .max(1);
    let weighted_ids = entry.identifiers.len().min(MAX_WEIGHTED_IDENTIFIERS) as u64;

    let score = 10 * weighted_ids * entry.failure_count / days;
    if score == 0 && entry.failure_count > 0 && !entry.identifiers.is_empty() {
        1
    } else {
        score
    }
}

/// `"N days ago"`, or empty when the run time was never known.
pub fn last_seen_text(entry: &AggregateEntry, now: DateTime<Utc>) -> String {
    entry
        .last_seen
        .map(|seen| format!("{} days ago", days_since(seen, now)))
        .unwrap_or_default()
}

/// A scored signature, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub name: String,
    pub score: u64,
    pub last_seen_text: String,
    pub entry: AggregateEntry,
}

impl RankedEntry {
    pub fn new(name: String, entry: AggregateEntry, now: DateTime<Utc>) -> Self {
        Self {
            score: score(&entry, now),
            last_seen_text: last_seen_text(&entry, now),
            name,
            entry,
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.entry.failure_count
    }

    pub fn identifier_count(&self) -> usize {
        self.entry.identifiers.len()
    }
}

/// Score desc, failures desc, identifier count desc, name desc.
pub fn report_order(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.failure_count().cmp(&a.failure_count()))
        .then_with(|| b.identifier_count().cmp(&a.identifier_count()))
        .then_with(|| b.name.cmp(&a.name))
}

/// Score every entry and sort into report order.
pub fn rank(entries: AggregateMap, now: DateTime<Utc>) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entries
        .into_iter()
        .map(|(name, entry)| RankedEntry::new(name, entry, now))
        .collect();
    ranked.sort_by(report_order);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identifier;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    fn entry(failures: u64, ids: u64, age_hours: Option<i64>) -> AggregateEntry {
        AggregateEntry {
            failure_count: failures,
            identifiers: (0..ids).map(Identifier::Pull).collect(),
            last_seen: age_hours.map(|h| now() - Duration::hours(h)),
            ..AggregateEntry::default()
        }
    }

    #[test]
    fn test_score_recent_failures() {
        // 2 ids, 4 failures, seen 10 hours ago: d = 1
        let e = entry(4, 2, Some(10));
        assert_eq!(score(&e, now()), 80);
    }

    #[test]
    fn test_score_worked_example() {
        // 3 PRs, 4 failures, last seen 3 days ago: 10*3*4/3 = 40
        let e = entry(4, 3, Some(3 * 24 + 5));
        assert_eq!(score(&e, now()), 40);
    }

    #[test]
    fn test_score_floor_is_one() {
        // 1 PR, 1 failure, 13 days ago: 10/13 = 0 -> 1
        let e = entry(1, 1, Some(13 * 24));
        assert_eq!(score(&e, now()), 1);
    }

    #[test]
    fn test_score_forty_days_old_single_failure() {
        // 1 PR, 1 failure, 40 days ago: 10/40 = 0 -> 1
        let e = entry(1, 1, Some(40 * 24));
        assert_eq!(score(&e, now()), 1);
        assert_eq!(last_seen_text(&e, now()), "40 days ago");
    }

    #[test]
    fn test_score_without_identifiers_can_be_zero() {
        assert_eq!(score(&entry(5, 0, Some(1)), now()), 0);
        assert_eq!(score(&entry(0, 0, None), now()), 0);
    }

    #[test]
    fn test_identifier_weight_is_capped() {
        let six = score(&entry(1, 6, None), now());
        let nine = score(&entry(1, 9, None), now());
        assert_eq!(six, 60);
        assert_eq!(six, nine);
    }

    #[test]
    fn test_future_last_seen_counts_as_today() {
        let e = entry(2, 1, Some(-48));
        assert_eq!(score(&e, now()), 20);
        assert_eq!(last_seen_text(&e, now()), "0 days ago");
    }

    #[test]
    fn test_last_seen_text() {
        assert_eq!(last_seen_text(&entry(1, 1, Some(50)), now()), "2 days ago");
        assert_eq!(last_seen_text(&entry(1, 1, None), now()), "");
    }

    #[test]
    fn test_rank_tie_breaks() {
        let map = AggregateMap::from([
            ("alpha".to_string(), entry(2, 2, None)),
            ("beta".to_string(), entry(2, 2, None)),
            ("gamma".to_string(), entry(4, 1, None)),
            ("delta".to_string(), entry(1, 4, None)),
            ("top".to_string(), entry(10, 3, None)),
        ]);
        let names: Vec<String> = rank(map, now()).into_iter().map(|r| r.name).collect();

        // top=300; gamma, delta, alpha, beta all score 40.
        // gamma (4 failures) > alpha/beta (2) > delta (1); beta > alpha by name.
        assert_eq!(names, ["top", "gamma", "beta", "alpha", "delta"]);
    }

    proptest! {
        #[test]
        fn prop_score_monotonic(
            failures in 0u64..200,
            ids in 0u64..10,
            days in 0i64..60,
        ) {
            let base = score(&entry(failures, ids, Some(days * 24)), now());

            prop_assert!(score(&entry(failures + 1, ids, Some(days * 24)), now()) >= base);
            prop_assert!(score(&entry(failures, ids + 1, Some(days * 24)), now()) >= base);
            prop_assert!(score(&entry(failures, ids, Some((days + 1) * 24)), now()) <= base);
        }

        #[test]
        fn prop_rank_is_total_and_stable(
            rows in proptest::collection::hash_map("[a-e]{1,3}", (0u64..5, 0u64..4, proptest::option::of(0i64..200)), 0..12),
        ) {
            let map: AggregateMap = rows
                .into_iter()
                .map(|(name, (f, i, age))| (name, entry(f, i, age)))
                .collect();
            let ranked = rank(map, now());

            for pair in ranked.windows(2) {
                prop_assert_ne!(report_order(&pair[0], &pair[1]), Ordering::Greater);
            }
            let mut resorted = ranked.clone();
            resorted.sort_by(report_order);
            prop_assert_eq!(resorted, ranked);
        }
    }
}
