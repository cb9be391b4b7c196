//! Flaky-test reporting for OpenShift CI jobs.
//!
//! This crate turns search hits for failure markers in CI build logs into a
//! ranked markdown report, providing:
//!
//! - Search client for the CI log-search service
//! - Build-log download with a local content cache (21-day retention)
//! - ANSI stripping and failure-line normalisation
//! - Aggregation per failure signature across pull and periodic runs
//! - Flakiness scoring, ranking and markdown rendering
//!
//! # Quick Start
//!
//! ```no_run
//! use flakeboard_core::{BlobCache, CiClient, LogFetcher, Pipeline, ReportConfig, RunType};
//!
//! # async fn example() -> flakeboard_core::FlakeResult<()> {
//! let config = ReportConfig::default().with_repo("redhat-developer", "odo");
//! config.validate()?;
//!
//! let cache = BlobCache::open(&config.cache_dir).await?;
//! let client = CiClient::new(&config)?;
//! let fetcher = LogFetcher::new(client.clone(), cache, &config);
//!
//! let pipeline = Pipeline::new(&config, &client, &fetcher)?;
//! let report = pipeline.run(RunType::Pull, chrono::Utc::now()).await?;
//! println!("{}", report.to_markdown());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FLAKEBOARD_REPO_ORG` | GitHub organisation (required) |
//! | `FLAKEBOARD_REPO_NAME` | Repository name (required) |
//! | `FLAKEBOARD_SEARCH` | Failure-marker regex (default: `\[FAIL\]`) |
//! | `FLAKEBOARD_MAX_AGE` | Search window (default: `336h`) |
//! | `FLAKEBOARD_CACHE_DIR` | Log cache directory (default: `./.cache`) |
//! | `FLAKEBOARD_FAILURE_POLICY` | `skip` or `abort` on per-job fetch failures |

pub mod aggregate;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod report;
pub mod run_type;
pub mod runtime;
pub mod score;
pub mod strip;
pub mod types;

// Re-export main types
pub use aggregate::{apply_occurrence, AggregateEntry, AggregateMap, Aggregation, Aggregator};
pub use cache::{BlobCache, DEFAULT_CACHE_DIR, RETENTION};
pub use client::CiClient;
pub use config::{FailurePolicy, ReportConfig};
pub use error::{FlakeError, FlakeResult};
pub use fetch::{build_log_url, LogFetcher, LogSource};
pub use pipeline::Pipeline;
pub use report::Report;
pub use run_type::{IdentifierScheme, RunType};
pub use runtime::extract_run_time;
pub use score::{rank, score, RankedEntry};
pub use strip::{strip_line, LineCleaner};
pub use types::{Identifier, Match, SearchResult};
