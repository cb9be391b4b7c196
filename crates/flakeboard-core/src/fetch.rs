//! Build-log download with a local cache in front.
//!
//! Search hits point at the job's web view, e.g.
//!
//! ```text
//! https://prow.ci.openshift.org/view/gs/test-platform-results/pr-logs/pull/redhat-developer_odo/5809/pull-ci-redhat-developer-odo-main-v4.10-integration-e2e/1541287908823011328
//! ```
//!
//! The raw log lives on the storage host under the same trailing three path
//! segments:
//!
//! ```text
//! https://storage.googleapis.com/test-platform-results/pr-logs/pull/redhat-developer_odo/5809/pull-ci-redhat-developer-odo-main-v4.10-integration-e2e/1541287908823011328/build-log.txt
//! ```

use async_trait::async_trait;
use tracing::debug;

use crate::cache::BlobCache;
use crate::client::CiClient;
use crate::config::ReportConfig;
use crate::error::{FlakeError, FlakeResult};
use crate::run_type::RunType;

const BUILD_LOG_FILE: &str = "/build-log.txt";

/// Source of build logs for search hits.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Build-log URL derived from a search-hit URL.
    fn log_url(&self, job_url: &str, run_type: RunType) -> FlakeResult<String>;

    /// Raw build-log text for a search hit.
    async fn fetch_log(&self, job_url: &str, run_type: RunType) -> FlakeResult<String>;
}

/// Derive the build-log URL: `storage_base` + last three path segments of
/// `job_url` + `/build-log.txt`.
pub fn build_log_url(job_url: &str, storage_base: &str) -> FlakeResult<String> {
    let fail = |reason: &str| FlakeError::UrlParse {
        url: job_url.to_string(),
        reason: reason.to_string(),
    };

    let last = job_url
        .rfind('/')
        .ok_or_else(|| fail("no path separator"))?;
    let second = job_url[..last]
        .rfind('/')
        .ok_or_else(|| fail("only one path separator"))?;
    let third = job_url[..second]
        .rfind('/')
        .ok_or_else(|| fail("only two path separators"))?;

    Ok(format!("{}{}{}", storage_base, &job_url[third..], BUILD_LOG_FILE))
}

/// Fetches build logs over HTTP, caching bodies by search-hit URL.
#[derive(Debug, Clone)]
pub struct LogFetcher {
    client: CiClient,
    cache: BlobCache,
    storage_url: String,
    repo_org: String,
    repo_name: String,
}

impl LogFetcher {
    pub fn new(client: CiClient, cache: BlobCache, config: &ReportConfig) -> Self {
        Self {
            client,
            cache,
            storage_url: config.storage_url.clone(),
            repo_org: config.repo_org.clone(),
            repo_name: config.repo_name.clone(),
        }
    }

    pub fn cache(&self) -> &BlobCache {
        &self.cache
    }
}

#[async_trait]
impl LogSource for LogFetcher {
    fn log_url(&self, job_url: &str, run_type: RunType) -> FlakeResult<String> {
        let base = run_type.storage_base(&self.storage_url, &self.repo_org, &self.repo_name);
        build_log_url(job_url, &base)
    }

    async fn fetch_log(&self, job_url: &str, run_type: RunType) -> FlakeResult<String> {
        // An empty cached body is treated as a miss.
        if let Some(body) = self.cache.retrieve(job_url).await? {
            if !body.is_empty() {
                return Ok(body);
            }
        }

        let url = self.log_url(job_url, run_type)?;
        let body = self.client.fetch_text(&url).await?;
        self.cache.store(job_url, &body).await?;
        debug!(job_url, log_url = %url, bytes = body.len(), "downloaded build log");
        Ok(body)
    }
}
