//! Job start time recovered from a build log header.
//!
//! ci-operator logs start with a line such as
//! `\x1b[36mINFO\x1b[0m[2023-06-15T10:38:01Z] Using namespace ...`; the
//! bracketed timestamp is when the job started, which is close enough to when
//! it failed for recency scoring.

use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FlakeError, FlakeResult};

const TIMESTAMP_LAYOUT: &str = "[%Y-%m-%dT%H:%M:%SZ]";

lazy_static! {
    /// Colour-wrapped level tag (`\x1b[36mINFO\x1b[0m`).
    static ref COLOUR_WRAPPED: Regex = Regex::new(r"\x1b\[\d+m(.*?)\x1b\[\d+m").unwrap();
    static ref BRACKETED: Regex = Regex::new(r"\[(.*?)\]").unwrap();
}

/// Parse the start time from the first line of `log`.
///
/// Returns `Ok(None)` when the header carries no timestamp, and an error
/// only when a bracketed value is present but is not a timestamp.
pub fn extract_run_time(log: &str) -> FlakeResult<Option<DateTime<Utc>>> {
    let first_line = match log.lines().next() {
        Some(line) => line,
        None => return Ok(None),
    };
    let token = match first_line.split_whitespace().next() {
        // A path glued to the header token is not part of it.
        Some(token) => token.split('/').next().unwrap_or(token),
        None => return Ok(None),
    };

    let uncoloured = COLOUR_WRAPPED.replace_all(token, "");
    let raw = match BRACKETED.find(&uncoloured) {
        Some(m) => m.as_str(),
        None => return Ok(None),
    };

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_LAYOUT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| FlakeError::Timestamp {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}
