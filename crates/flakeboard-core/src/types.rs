//! Response types for the CI search service and shared value types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single match reported by the search service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// File label (`build-log.txt` etc.).
    #[serde(rename = "filename", default)]
    pub file_name: String,

    /// Lines surrounding and including the failure marker.
    #[serde(default)]
    pub context: Vec<String>,

    /// Number of additional matching lines the service did not return.
    #[serde(rename = "moreLines", default)]
    pub more_lines: u64,
}

/// Decoded search response: job URL → regex label → matches.
pub type SearchResult = HashMap<String, HashMap<String, Vec<Match>>>;

/// Change identifier a job run is attributed to.
///
/// Pull jobs carry the PR number; periodic jobs carry a token taken from the
/// job name, so that runs of the same job variant group together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Pull(u64),
    Periodic(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pull(number) => write!(f, "{number}"),
            Self::Periodic(token) => f.write_str(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_search_response() {
        let body = r#"{
            "https://prow.ci.openshift.org/view/gs/test-platform-results/logs/periodic-ci-a-b-master-e2e/1": {
                "\\[FAIL\\]": [
                    {"filename": "build-log.txt", "context": ["[FAIL] one", "[FAIL] two"], "moreLines": 3},
                    {"filename": "build-log.txt"}
                ]
            }
        }"#;

        let result: SearchResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.len(), 1);

        let groups = result.values().next().unwrap();
        let matches = &groups["\\[FAIL\\]"];
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].context, vec!["[FAIL] one", "[FAIL] two"]);
        assert_eq!(matches[0].more_lines, 3);
        assert!(matches[1].context.is_empty());
        assert_eq!(matches[1].more_lines, 0);
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::Pull(5809).to_string(), "5809");
        assert_eq!(Identifier::Periodic("v4.10".to_string()).to_string(), "v4.10");
    }
}
