//! Pure helpers: search query parameters and error excerpts (no HTTP).

use crate::config::ReportConfig;
use crate::run_type::RunType;

/// Context lines requested around each match.
pub(crate) const CONTEXT_LINES: &str = "0";
/// Only build logs are searched.
pub(crate) const SEARCH_TYPE: &str = "build-log";
/// Matches returned per job.
pub(crate) const MAX_MATCHES: &str = "5";
/// Bytes scanned per log (20 MiB).
pub(crate) const MAX_BYTES: &str = "20971520";

const EXCERPT_CHARS: usize = 200;

/// Query parameters for one run type, in the order the service documents them.
pub(crate) fn search_params(config: &ReportConfig, run_type: RunType) -> Vec<(&'static str, String)> {
    vec![
        ("search", config.search_str.clone()),
        ("maxAge", config.max_age.clone()),
        ("context", CONTEXT_LINES.to_string()),
        ("type", SEARCH_TYPE.to_string()),
        (
            "name",
            run_type.job_name_prefix(&config.repo_org, &config.repo_name, &config.branch),
        ),
        ("maxMatches", MAX_MATCHES.to_string()),
        ("maxBytes", MAX_BYTES.to_string()),
    ]
}

/// First characters of an error body, for messages.
pub(crate) fn body_excerpt(body: &str) -> String {
    if body.is_empty() {
        "empty body".to_string()
    } else {
        body.chars().take(EXCERPT_CHARS).collect()
    }
}
