//! Control-sequence and harness-noise stripping for failure lines.
//!
//! A cleaned line is the deduplication key for a failure signature, so the
//! output must be stable: identical input always yields identical output, and
//! stripping an already stripped line is a no-op.
//!
//! Removed unconditionally:
//! - ANSI / C1 control sequences (colour codes, cursor movement, OSC titles)
//! - harness elapsed-time annotations such as `(12.34s)`
//! - the kuttl harness prefix `--- FAIL: kuttl/harness/`

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{FlakeError, FlakeResult};

lazy_static! {
    /// Terminal escape grammar (CSI, OSC terminated by BEL, single-char controls).
    static ref ANSI_ESCAPE: Regex = Regex::new(
        r"[\x1B\x{9B}][\[\]()#;?]*(?:(?:(?:[a-zA-Z\d]*(?:;[a-zA-Z\d]*)*)?\x07)|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PRZcf-ntqry=><~]))"
    )
    .unwrap();
    /// `(0.52s)` style timing appended by go test / kuttl.
    static ref ELAPSED_TIME: Regex = Regex::new(r"\(\d+\.\d+s\)").unwrap();
    static ref KUTTL_PREFIX: Regex = Regex::new(r"---\s+FAIL:\s+kuttl/harness/").unwrap();
}

/// Strips the built-in patterns from `line`.
pub fn strip_line(line: &str) -> String {
    strip_with(line, None)
}

/// Line cleaner: built-in patterns plus an optional user-supplied pattern.
#[derive(Debug, Clone, Default)]
pub struct LineCleaner {
    extra: Option<Regex>,
}

impl LineCleaner {
    /// Cleaner with only the built-in patterns.
    pub fn new() -> Self {
        Self { extra: None }
    }

    /// Cleaner that also removes every match of `pattern`.
    ///
    /// An empty pattern is treated as absent.
    pub fn with_pattern(pattern: Option<&str>) -> FlakeResult<Self> {
        let extra = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Some(Regex::new(p).map_err(|e| FlakeError::Config {
                message: format!("invalid strip pattern {p:?}: {e}"),
            })?),
            None => None,
        };
        Ok(Self { extra })
    }

    /// Removes all patterns from `line`.
    pub fn strip(&self, line: &str) -> String {
        strip_with(line, self.extra.as_ref())
    }

    /// Strips and trims surrounding whitespace; the result is the signature key.
    pub fn clean(&self, line: &str) -> String {
        self.strip(line.trim()).trim().to_string()
    }
}

fn strip_with(line: &str, extra: Option<&Regex>) -> String {
    let mut current = line.to_string();
    // Removing one pattern can splice together the pieces of another; run to a fixpoint.
    loop {
        let next = strip_once(&current, extra);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(line: &str, extra: Option<&Regex>) -> String {
    let s = ANSI_ESCAPE.replace_all(line, "");
    let s = ELAPSED_TIME.replace_all(&s, "");
    let s = KUTTL_PREFIX.replace_all(&s, "");
    let s: Cow<'_, str> = match extra {
        Some(re) => Cow::Owned(re.replace_all(&s, "").into_owned()),
        None => s,
    };
    s.into_owned()
}
