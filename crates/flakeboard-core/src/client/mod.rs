//! Client for the CI search service and the build-log storage host.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};
use url::Url;

use crate::config::ReportConfig;
use crate::error::{FlakeError, FlakeResult};
use crate::run_type::RunType;
use crate::types::SearchResult;

mod helpers;
mod http;

use http::HttpBackend;

const USER_AGENT_VALUE: &str = concat!("flakeboard/", env!("CARGO_PKG_VERSION"));

/// Client for search queries and raw log downloads.
#[derive(Debug, Clone)]
pub struct CiClient {
    http: HttpBackend,
    search_url: String,
}

impl CiClient {
    pub fn new(config: &ReportConfig) -> FlakeResult<Self> {
        Self::with_timeout(&config.search_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(search_url: &str, timeout: Duration) -> FlakeResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| FlakeError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend { client },
            search_url: search_url.to_string(),
        })
    }

    /// Query the search service for one run type's failures.
    pub async fn search(
        &self,
        config: &ReportConfig,
        run_type: RunType,
    ) -> FlakeResult<SearchResult> {
        let url = self.search_request_url(config, run_type)?;
        debug!(url = %url, run_type = %run_type, "querying search service");

        let body = self.http.get_text(url.as_str()).await?;
        let result: SearchResult =
            serde_json::from_str(&body).map_err(|e| FlakeError::InvalidResponse {
                message: format!("failed to parse search response: {}", e),
            })?;

        info!(run_type = %run_type, jobs = result.len(), "search returned");
        Ok(result)
    }

    /// Download a raw text body (build logs).
    pub async fn fetch_text(&self, url: &str) -> FlakeResult<String> {
        debug!(url, "downloading build log");
        self.http.get_text(url).await
    }

    /// Full search URL including the query string.
    pub fn search_request_url(&self, config: &ReportConfig, run_type: RunType) -> FlakeResult<Url> {
        Url::parse_with_params(&self.search_url, helpers::search_params(config, run_type)).map_err(
            |e| FlakeError::Config {
                message: format!("invalid search URL {:?}: {}", self.search_url, e),
            },
        )
    }
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> (CiClient, ReportConfig) {
        let config = ReportConfig::default()
            .with_repo("openshift", "odo")
            .with_search_url(format!("{}/search", mock_server.uri()));
        let client = CiClient::new(&config).expect("failed to create client");
        (client, config)
    }

    #[tokio::test]
    async fn test_search_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", "pull-ci-openshift-odo-master-"))
            .and(query_param("type", "build-log"))
            .and(query_param("maxMatches", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"https://prow/view/gs/r/pr-logs/pull/openshift_odo/1/job/2": {"\\[FAIL\\]": [{"filename": "build-log.txt", "context": ["[FAIL] x"]}]}}"#,
            ))
            .mount(&mock_server)
            .await;

        let (client, config) = create_test_client(&mock_server);
        let result = client.search(&config, RunType::Pull).await.expect("search failed");

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_search_malformed_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let (client, config) = create_test_client(&mock_server);
        let result = client.search(&config, RunType::Pull).await;

        assert!(matches!(result, Err(FlakeError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_search_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let (client, config) = create_test_client(&mock_server);
        match client.search(&config, RunType::Periodic).await {
            Err(FlakeError::Network { message }) => {
                assert!(message.contains("503"), "message: {message}");
                assert!(message.contains("overloaded"), "message: {message}");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logs/job/1/build-log.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let (client, _config) = create_test_client(&mock_server);
        let url = format!("{}/logs/job/1/build-log.txt", mock_server.uri());
        let result = client.fetch_text(&url).await;

        assert!(matches!(result, Err(FlakeError::Network { .. })));
    }
}
