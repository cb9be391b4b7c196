//! Report configuration.
//!
//! Values are layered: built-in defaults, then a JSON file
//! (`userconfig.json`) or a comma-separated env file (`userconfig.env`), then
//! `FLAKEBOARD_*` environment variables, then CLI flags.
//!
//! | Key (file) | Environment Variable | Default |
//! |------------|----------------------|---------|
//! | `repoOrg` | `FLAKEBOARD_REPO_ORG` | required |
//! | `repoName` | `FLAKEBOARD_REPO_NAME` | required |
//! | `searchStr` | `FLAKEBOARD_SEARCH` | `\[FAIL\]` |
//! | `regex` | `FLAKEBOARD_STRIP_REGEX` | none |
//! | `branch` | `FLAKEBOARD_BRANCH` | `master` |
//! | `maxAge` | `FLAKEBOARD_MAX_AGE` | `336h` |
//! | `pull` | `FLAKEBOARD_PULL` | `true` |
//! | `periodic` | `FLAKEBOARD_PERIODIC` | `true` |
//! | `failurePolicy` | `FLAKEBOARD_FAILURE_POLICY` | `skip` |
//! | `cacheDir` | `FLAKEBOARD_CACHE_DIR` | `./.cache` |
//! | `searchUrl` | `FLAKEBOARD_SEARCH_URL` | `https://search.ci.openshift.org/search` |
//! | `storageUrl` | `FLAKEBOARD_STORAGE_URL` | `https://storage.googleapis.com/test-platform-results` |
//! | `timeoutSecs` | `FLAKEBOARD_TIMEOUT` | `30` |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::DEFAULT_CACHE_DIR;
use crate::error::{FlakeError, FlakeResult};

/// Environment variable names, paired with the file key they override.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("FLAKEBOARD_REPO_ORG", "repoOrg"),
    ("FLAKEBOARD_REPO_NAME", "repoName"),
    ("FLAKEBOARD_SEARCH", "searchStr"),
    ("FLAKEBOARD_STRIP_REGEX", "regex"),
    ("FLAKEBOARD_BRANCH", "branch"),
    ("FLAKEBOARD_MAX_AGE", "maxAge"),
    ("FLAKEBOARD_PULL", "pull"),
    ("FLAKEBOARD_PERIODIC", "periodic"),
    ("FLAKEBOARD_FAILURE_POLICY", "failurePolicy"),
    ("FLAKEBOARD_CACHE_DIR", "cacheDir"),
    ("FLAKEBOARD_SEARCH_URL", "searchUrl"),
    ("FLAKEBOARD_STORAGE_URL", "storageUrl"),
    ("FLAKEBOARD_TIMEOUT", "timeoutSecs"),
];

/// What the aggregator does when a job's build log cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and leave the job out of the report.
    #[default]
    Skip,
    /// Fail the whole pass for that run type.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = FlakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(FlakeError::Config {
                message: format!("unknown failure policy {other:?} (expected skip or abort)"),
            }),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// GitHub organisation of the repository under test.
    #[serde(default)]
    pub repo_org: String,

    /// Repository name.
    #[serde(default)]
    pub repo_name: String,

    /// Failure-marker regex sent to the search service.
    #[serde(default = "default_search_str")]
    pub search_str: String,

    /// Extra pattern stripped from failure lines before grouping.
    #[serde(default)]
    pub regex: Option<String>,

    /// Branch segment of the job names.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Search window as a duration string (`336h`).
    #[serde(default = "default_max_age")]
    pub max_age: String,

    /// Report pull-request jobs.
    #[serde(default = "default_true")]
    pub pull: bool,

    /// Report periodic jobs.
    #[serde(default = "default_true")]
    pub periodic: bool,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Log cache directory.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Search endpoint.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Build-log storage base URL.
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_search_str() -> String {
    r"\[FAIL\]".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_max_age() -> String {
    "336h".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_search_url() -> String {
    "https://search.ci.openshift.org/search".to_string()
}

fn default_storage_url() -> String {
    "https://storage.googleapis.com/test-platform-results".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            repo_org: String::new(),
            repo_name: String::new(),
            search_str: default_search_str(),
            regex: None,
            branch: default_branch(),
            max_age: default_max_age(),
            pull: true,
            periodic: true,
            failure_policy: FailurePolicy::default(),
            cache_dir: default_cache_dir(),
            search_url: default_search_url(),
            storage_url: default_storage_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ReportConfig {
    /// Load a JSON config file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> FlakeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FlakeError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| FlakeError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Load an env file of comma-separated `key=value` pairs.
    pub fn from_env_file(path: &Path) -> FlakeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FlakeError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::default().with_pairs(&content)
    }

    /// Apply `key=value` pairs separated by commas or newlines.
    pub fn with_pairs(mut self, pairs: &str) -> FlakeResult<Self> {
        for pair in pairs.split([',', '\n']) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| FlakeError::Config {
                message: format!("expected key=value, got {pair:?}"),
            })?;
            self.set(key.trim(), value.trim())?;
        }
        Ok(self)
    }

    /// Overlay `FLAKEBOARD_*` environment variables.
    pub fn with_env(mut self) -> FlakeResult<Self> {
        for (var, key) in ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                self.set(key, &value)?;
            }
        }
        Ok(self)
    }

    /// Set a single value by its file key.
    pub fn set(&mut self, key: &str, value: &str) -> FlakeResult<()> {
        match key {
            "repoOrg" => self.repo_org = value.to_string(),
            "repoName" => self.repo_name = value.to_string(),
            "searchStr" => self.search_str = value.to_string(),
            "regex" => self.regex = Some(value.to_string()).filter(|v| !v.is_empty()),
            "branch" => self.branch = value.to_string(),
            "maxAge" => self.max_age = value.to_string(),
            "pull" => self.pull = parse_bool(key, value)?,
            "periodic" => self.periodic = parse_bool(key, value)?,
            "failurePolicy" => self.failure_policy = value.parse()?,
            "cacheDir" => self.cache_dir = PathBuf::from(value),
            "searchUrl" => self.search_url = value.to_string(),
            "storageUrl" => self.storage_url = value.to_string(),
            "timeoutSecs" => {
                self.timeout_secs = value.parse().map_err(|_| FlakeError::Config {
                    message: format!("timeoutSecs must be a number of seconds, got {value:?}"),
                })?
            }
            other => {
                return Err(FlakeError::Config {
                    message: format!("unknown configuration key {other:?}"),
                })
            }
        }
        Ok(())
    }

    /// Check required fields and URL shapes.
    pub fn validate(&self) -> FlakeResult<()> {
        if self.repo_org.trim().is_empty() || self.repo_name.trim().is_empty() {
            return Err(FlakeError::Config {
                message: "repoOrg and repoName are required".to_string(),
            });
        }
        if self.search_str.is_empty() {
            return Err(FlakeError::Config {
                message: "searchStr must not be empty".to_string(),
            });
        }
        for (name, value) in [("searchUrl", &self.search_url), ("storageUrl", &self.storage_url)] {
            Url::parse(value).map_err(|e| FlakeError::Config {
                message: format!("{name} {value:?} is not a valid URL: {e}"),
            })?;
        }
        if self.window_hours().is_none() {
            return Err(FlakeError::Config {
                message: format!("maxAge {:?} must be a whole number of hours, e.g. 336h", self.max_age),
            });
        }
        Ok(())
    }

    /// Search window in hours, parsed from `max_age`.
    pub fn window_hours(&self) -> Option<u64> {
        self.max_age.strip_suffix('h')?.parse().ok()
    }

    /// Search window in whole days, for report headings.
    pub fn window_days(&self) -> Option<u64> {
        self.window_hours().map(|h| h / 24)
    }

    /// Set the repository.
    pub fn with_repo(mut self, org: impl Into<String>, name: impl Into<String>) -> Self {
        self.repo_org = org.into();
        self.repo_name = name.into();
        self
    }

    /// Set the search endpoint.
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Set the build-log storage base URL.
    pub fn with_storage_url(mut self, url: impl Into<String>) -> Self {
        self.storage_url = url.into();
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> FlakeResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FlakeError::Config {
            message: format!("{key} must be true or false, got {value:?}"),
        }),
    }
}
