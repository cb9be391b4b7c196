//! Markdown rendering of a ranked run-type pass.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::run_type::RunType;
use crate::score::RankedEntry;
use crate::types::Identifier;

const TABLE_HEADER: &str =
    "| Failure Score<sup>*</sup> | Failures | Test Name | Last Seen | PR List and Logs |";
const TABLE_RULE: &str = "|---|---|---|---|---|";

/// One run type's flaky-test report.
#[derive(Debug, Clone)]
pub struct Report {
    pub run_type: RunType,
    pub repo_org: String,
    pub repo_name: String,
    pub window_days: u64,
    pub generated_at: DateTime<Utc>,
    /// Ranked entries that met the run type's report threshold.
    pub rows: Vec<RankedEntry>,
}

impl Report {
    /// Keep the ranked entries that clear the run type's threshold, preserving order.
    pub fn new(
        run_type: RunType,
        repo_org: impl Into<String>,
        repo_name: impl Into<String>,
        window_days: u64,
        ranked: Vec<RankedEntry>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let threshold = run_type.report_threshold();
        let rows = ranked
            .into_iter()
            .filter(|r| r.identifier_count() >= threshold)
            .collect();
        Self {
            run_type,
            repo_org: repo_org.into(),
            repo_name: repo_name.into(),
            window_days,
            generated_at,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        if self.rows.is_empty() {
            return format!(
                "### *No test failures found for last {} days of __{}__ test runs*\n",
                self.window_days,
                self.run_type.title()
            );
        }

        let mut md = String::new();
        md.push_str(&format!(
            "## FLAKY TESTS: Failed test scenarios in past {} days ({} jobs)\n",
            self.window_days,
            self.run_type.title()
        ));
        md.push_str(&format!(
            "_Last update: {}_\n\n",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        md.push_str(TABLE_HEADER);
        md.push('\n');
        md.push_str(TABLE_RULE);
        md.push('\n');

        for row in &self.rows {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.score,
                row.failure_count(),
                escape_cell(&row.name),
                row.last_seen_text,
                self.identifier_cell(row)
            ));
        }
        md
    }

    /// `<n>: ` then one fragment per identifier with its numbered log links.
    fn identifier_cell(&self, row: &RankedEntry) -> String {
        let fragments: Vec<String> = row
            .entry
            .identifiers
            .iter()
            .map(|id| {
                let mut fragment = self.identifier_link(id);
                let logs = row.entry.log_urls_for(id);
                if !logs.is_empty() {
                    let links: Vec<String> = logs
                        .iter()
                        .enumerate()
                        .map(|(i, url)| format!("[{}]({})", i + 1, url))
                        .collect();
                    fragment.push_str(&format!("<sup>{}</sup>", links.join(", ")));
                }
                fragment
            })
            .collect();

        format!("{}: {}", row.identifier_count(), fragments.join(" "))
    }

    fn identifier_link(&self, id: &Identifier) -> String {
        match id {
            Identifier::Pull(number) => format!(
                "[#{number}](https://github.com/{}/{}/pull/{number})",
                self.repo_org, self.repo_name
            ),
            Identifier::Periodic(token) => format!("[{token}]"),
        }
    }
}

/// Failure lines may contain pipes, which would split the table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
