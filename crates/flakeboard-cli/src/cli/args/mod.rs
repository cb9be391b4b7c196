use std::path::PathBuf;

use clap::Parser;
use flakeboard_core::FailurePolicy;

/// Config file read when neither `--config` nor `--env-file` is given.
pub const DEFAULT_CONFIG_FILE: &str = "userconfig.json";

#[derive(Parser, Debug)]
#[command(
    name = "flakeboard",
    version,
    about = "Ranked markdown report of flaky tests in OpenShift CI jobs"
)]
pub struct Cli {
    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ReportArgs {
    /// JSON config file (defaults to ./userconfig.json when present)
    #[arg(long, env = "FLAKEBOARD_CONFIG", conflicts_with = "env_file")]
    pub config: Option<PathBuf>,

    /// Env-style config file of comma-separated key=value pairs
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// GitHub organisation of the repository
    #[arg(long)]
    pub repo_org: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo_name: Option<String>,

    /// Failure-marker regex sent to the search service
    #[arg(long)]
    pub search: Option<String>,

    /// Extra regex removed from failure lines before grouping
    #[arg(long)]
    pub strip_regex: Option<String>,

    /// Branch segment of the job names
    #[arg(long)]
    pub branch: Option<String>,

    /// Search window, e.g. 336h
    #[arg(long)]
    pub max_age: Option<String>,

    /// Skip the pull-request report
    #[arg(long)]
    pub no_pull: bool,

    /// Skip the periodic report
    #[arg(long)]
    pub no_periodic: bool,

    /// skip|abort when a job's build log cannot be fetched
    #[arg(long)]
    pub failure_policy: Option<FailurePolicy>,

    /// Build-log cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Search endpoint
    #[arg(long)]
    pub search_url: Option<String>,

    /// Build-log storage base URL
    #[arg(long)]
    pub storage_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
