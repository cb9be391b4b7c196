//! One report pass per run type: search, aggregate, rank, render.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate::Aggregator;
use crate::client::CiClient;
use crate::config::ReportConfig;
use crate::error::{FlakeError, FlakeResult};
use crate::fetch::LogSource;
use crate::report::Report;
use crate::run_type::RunType;
use crate::score::rank;
use crate::strip::LineCleaner;

/// Drives report passes against one search client and log source.
pub struct Pipeline<'a> {
    config: &'a ReportConfig,
    client: &'a CiClient,
    source: &'a dyn LogSource,
    cleaner: LineCleaner,
}

impl<'a> Pipeline<'a> {
    /// Fails when the configured strip pattern does not compile.
    pub fn new(
        config: &'a ReportConfig,
        client: &'a CiClient,
        source: &'a dyn LogSource,
    ) -> FlakeResult<Self> {
        Ok(Self {
            config,
            client,
            source,
            cleaner: LineCleaner::with_pattern(config.regex.as_deref())?,
        })
    }

    /// Build the report for one run type, scored relative to `now`.
    pub async fn run(&self, run_type: RunType, now: DateTime<Utc>) -> FlakeResult<Report> {
        let config = self.config;
        let window_days = config.window_days().ok_or_else(|| FlakeError::Config {
            message: format!("invalid maxAge {:?}", config.max_age),
        })?;

        let result = self.client.search(config, run_type).await?;

        let aggregator = Aggregator::new(
            self.source,
            &self.cleaner,
            run_type,
            run_type.identifier_scheme(&config.repo_org, &config.repo_name),
            config.failure_policy,
        );
        let aggregation = aggregator.aggregate(&result).await?;

        let ranked = rank(aggregation.entries, now);
        let report = Report::new(
            run_type,
            &config.repo_org,
            &config.repo_name,
            window_days,
            ranked,
            now,
        );
        info!(run_type = %run_type, rows = report.rows.len(), "report ready");
        Ok(report)
    }

    /// Run every enabled run type concurrently; results come back pull first.
    pub async fn run_enabled(&self, now: DateTime<Utc>) -> Vec<(RunType, FlakeResult<Report>)> {
        let pull = async {
            if self.config.pull {
                Some(self.run(RunType::Pull, now).await)
            } else {
                None
            }
        };
        let periodic = async {
            if self.config.periodic {
                Some(self.run(RunType::Periodic, now).await)
            } else {
                None
            }
        };

        let (pull, periodic) = tokio::join!(pull, periodic);
        [(RunType::Pull, pull), (RunType::Periodic, periodic)]
            .into_iter()
            .filter_map(|(run_type, outcome)| outcome.map(|result| (run_type, result)))
            .collect()
    }
}
