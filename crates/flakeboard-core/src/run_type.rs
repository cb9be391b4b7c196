//! Run types and the per-run-type URL and naming conventions.
//!
//! Everything that differs between pull-request jobs and periodic jobs lives
//! here: the job-name prefix sent to search, the storage layout of build
//! logs, where the identifier sits inside a job URL, and how many distinct
//! identifiers a failure needs before it is reported.

use std::fmt;

use crate::types::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunType {
    Pull,
    Periodic,
}

impl RunType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Periodic => "periodic",
        }
    }

    /// Capitalised name for report headings.
    pub fn title(self) -> &'static str {
        match self {
            Self::Pull => "Pull",
            Self::Periodic => "Periodic",
        }
    }

    /// Job-name prefix used as the search `name` filter.
    pub fn job_name_prefix(self, org: &str, repo: &str, branch: &str) -> String {
        format!("{}-ci-{}-{}-{}-", self.as_str(), org, repo, branch)
    }

    /// Base URL under which this run type's build logs are stored.
    pub fn storage_base(self, storage_url: &str, org: &str, repo: &str) -> String {
        let storage_url = storage_url.trim_end_matches('/');
        match self {
            Self::Pull => format!("{}/pr-logs/pull/{}_{}", storage_url, org, repo),
            Self::Periodic => storage_url.to_string(),
        }
    }

    /// Where the identifier sits inside a job URL.
    pub fn identifier_scheme(self, org: &str, repo: &str) -> IdentifierScheme {
        match self {
            // .../pull/{org}_{repo}/{pr}/{job}/{build}
            Self::Pull => IdentifierScheme {
                marker: format!("{}_{}", org, repo),
                separator: '/',
                offset: 1,
                parse: parse_pull_number,
            },
            // .../logs/periodic-ci-{org}-{repo}-{branch}-{token}-.../{build}
            Self::Periodic => {
                let marker = format!("{}-{}", org, repo);
                let offset = marker.split('-').count() + 1;
                IdentifierScheme {
                    marker,
                    separator: '-',
                    offset,
                    parse: parse_periodic_token,
                }
            }
        }
    }

    /// Minimum number of distinct identifiers for a failure to be reported.
    ///
    /// A failure seen on a single PR is most likely caused by that PR.
    pub fn report_threshold(self) -> usize {
        match self {
            Self::Pull => 2,
            Self::Periodic => 1,
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional contract for locating an identifier in a job URL.
///
/// The URL is cut at the first occurrence of `marker`, split on `separator`,
/// and the component at `offset` is handed to `parse`.
#[derive(Debug, Clone)]
pub struct IdentifierScheme {
    pub marker: String,
    pub separator: char,
    pub offset: usize,
    pub parse: fn(&str) -> Option<Identifier>,
}

impl IdentifierScheme {
    /// Extract the identifier, or `None` when the URL does not follow the scheme.
    pub fn extract(&self, url: &str) -> Option<Identifier> {
        let start = url.find(&self.marker)?;
        let component = url[start..].split(self.separator).nth(self.offset)?;
        (self.parse)(component)
    }
}

fn parse_pull_number(component: &str) -> Option<Identifier> {
    component.parse().ok().map(Identifier::Pull)
}

fn parse_periodic_token(component: &str) -> Option<Identifier> {
    // The last job-name component runs into the build path.
    let token = component.split('/').next().unwrap_or_default();
    (!token.is_empty()).then(|| Identifier::Periodic(token.to_string()))
}
