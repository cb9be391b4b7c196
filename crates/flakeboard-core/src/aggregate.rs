//! Aggregation of search hits into per-signature failure entries.
//!
//! A signature is a cleaned failure line. Every job URL in a search result
//! contributes one occurrence per distinct line of each match; occurrences
//! are folded into an [`AggregateEntry`] by [`apply_occurrence`], which does
//! no I/O.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::FailurePolicy;
use crate::error::{FlakeError, FlakeResult};
use crate::fetch::LogSource;
use crate::run_type::{IdentifierScheme, RunType};
use crate::runtime::extract_run_time;
use crate::strip::LineCleaner;
use crate::types::{Identifier, Match, SearchResult};

/// Job URLs containing this are CI config rehearsals, not real runs.
const REHEARSAL_MARKER: &str = "rehearse";

/// Everything known about one failure signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateEntry {
    /// Occurrences across jobs.
    pub failure_count: u64,
    /// Distinct identifiers, in order of first appearance.
    pub identifiers: Vec<Identifier>,
    /// Latest run time among occurrences with a known run time.
    pub last_seen: Option<DateTime<Utc>>,
    /// Build-log URLs per identifier, one per occurrence.
    pub log_urls: HashMap<Identifier, Vec<String>>,
}

impl AggregateEntry {
    pub fn log_urls_for(&self, identifier: &Identifier) -> &[String] {
        self.log_urls
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Signature → entry.
pub type AggregateMap = HashMap<String, AggregateEntry>;

/// One sighting of a signature in one job.
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub run_time: Option<DateTime<Utc>>,
    pub identifier: Option<&'a Identifier>,
    pub log_url: &'a str,
}

/// Fold one occurrence of `signature` into `map`.
pub fn apply_occurrence<'m>(
    map: &'m mut AggregateMap,
    signature: &str,
    occurrence: &Occurrence<'_>,
) -> &'m AggregateEntry {
    let entry = map.entry(signature.to_string()).or_default();

    entry.failure_count += 1;

    if let Some(run_time) = occurrence.run_time {
        entry.last_seen = Some(match entry.last_seen {
            Some(current) => current.max(run_time),
            None => run_time,
        });
    }

    if let Some(identifier) = occurrence.identifier {
        if !entry.identifiers.contains(identifier) {
            entry.identifiers.push(identifier.clone());
        }
        entry
            .log_urls
            .entry(identifier.clone())
            .or_default()
            .push(occurrence.log_url.to_string());
    }

    entry
}

/// Fold all matches of one job into `map`; returns the number of occurrences applied.
///
/// Lines are deduplicated within a single match only: the same line under
/// another match group of the same job counts again. A line that cleans to
/// the empty string is a signature like any other.
pub fn apply_job_matches<'g>(
    map: &mut AggregateMap,
    cleaner: &LineCleaner,
    groups: impl IntoIterator<Item = &'g Vec<Match>>,
    occurrence: &Occurrence<'_>,
) -> usize {
    let mut applied = 0;
    for matches in groups {
        for m in matches {
            let mut seen = HashSet::new();
            for line in &m.context {
                let signature = cleaner.clean(line);
                if !seen.insert(signature.clone()) {
                    continue;
                }
                apply_occurrence(map, &signature, occurrence);
                applied += 1;
            }
        }
    }
    applied
}

/// Counters for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub jobs: usize,
    pub rehearsals_skipped: usize,
    pub failed_skipped: usize,
    pub without_identifier: usize,
    pub without_run_time: usize,
    pub occurrences: usize,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub entries: AggregateMap,
    pub stats: AggregateStats,
}

/// Builds the aggregate map for one run type.
pub struct Aggregator<'a> {
    source: &'a dyn LogSource,
    cleaner: &'a LineCleaner,
    run_type: RunType,
    scheme: IdentifierScheme,
    policy: FailurePolicy,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        source: &'a dyn LogSource,
        cleaner: &'a LineCleaner,
        run_type: RunType,
        scheme: IdentifierScheme,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            source,
            cleaner,
            run_type,
            scheme,
            policy,
        }
    }

    /// Aggregate a decoded search result.
    ///
    /// Jobs are visited in URL order so that identifier and log-link order is
    /// reproducible between runs.
    pub async fn aggregate(&self, result: &SearchResult) -> FlakeResult<Aggregation> {
        let mut aggregation = Aggregation::default();
        let jobs: BTreeMap<&String, _> = result.iter().collect();

        for (job_url, groups) in jobs {
            let stats = &mut aggregation.stats;
            if job_url.contains(REHEARSAL_MARKER) {
                debug!(job_url = %job_url, "skipping rehearsal job");
                stats.rehearsals_skipped += 1;
                continue;
            }

            let (log_url, run_time) = match self.enrich(job_url).await {
                Ok(enriched) => enriched,
                Err(e) if self.policy == FailurePolicy::Skip && e.is_per_item() => {
                    warn!(job_url = %job_url, error = %e, "skipping job, build log unavailable");
                    stats.failed_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let identifier = self.scheme.extract(job_url);
            if identifier.is_none() {
                stats.without_identifier += 1;
            }
            if run_time.is_none() {
                stats.without_run_time += 1;
            }

            let occurrence = Occurrence {
                run_time,
                identifier: identifier.as_ref(),
                log_url: &log_url,
            };
            let ordered_groups: BTreeMap<&String, &Vec<Match>> = groups.iter().collect();
            stats.occurrences += apply_job_matches(
                &mut aggregation.entries,
                self.cleaner,
                ordered_groups.into_values(),
                &occurrence,
            );
            stats.jobs += 1;
        }

        info!(
            run_type = %self.run_type,
            jobs = aggregation.stats.jobs,
            signatures = aggregation.entries.len(),
            rehearsals_skipped = aggregation.stats.rehearsals_skipped,
            failed_skipped = aggregation.stats.failed_skipped,
            without_identifier = aggregation.stats.without_identifier,
            without_run_time = aggregation.stats.without_run_time,
            occurrences = aggregation.stats.occurrences,
            "aggregated search results"
        );
        Ok(aggregation)
    }

    /// Log URL and run time for one job.
    async fn enrich(&self, job_url: &str) -> FlakeResult<(String, Option<DateTime<Utc>>)> {
        let log_url = self.source.log_url(job_url, self.run_type)?;
        let log = self.source.fetch_log(job_url, self.run_type).await?;

        let run_time = match extract_run_time(&log) {
            Ok(run_time) => run_time,
            Err(e @ FlakeError::Timestamp { .. }) if self.policy == FailurePolicy::Skip => {
                warn!(job_url, error = %e, "unreadable run time, treating as unknown");
                None
            }
            Err(e) => return Err(e),
        };
        Ok((log_url, run_time))
    }
}
