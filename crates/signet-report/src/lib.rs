//! Step logging and HTML report rendering for automation runs.
//!
//! Every flow appends ordered `(description, status)` records to a
//! [`StepLog`]; at the end of a run the log renders into a minimal static
//! HTML table and overwrites the previous report file. The log is an
//! explicit accumulator handed to each stage rather than shared global
//! state, and it is append-only: records come back out in exactly the
//! order they went in.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

/// Outcome recorded for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Pass,
    Fail,
    /// Expected absences and other neutral observations.
    Info,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pass => "PASS",
            StepStatus::Fail => "FAIL",
            StepStatus::Info => "INFO",
        };
        f.write_str(s)
    }
}

/// One recorded step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub description: String,
    pub status: StepStatus,
}

/// Append-only, order-preserving sequence of step records for one run.
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Vec<StepRecord>,
}

/// Errors writing a report to disk.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step with an explicit status. The record also echoes to
    /// the tracing log as it is appended.
    pub fn push(&mut self, description: impl Into<String>, status: StepStatus) {
        let description = description.into();
        info!("{description}: {status}");
        self.steps.push(StepRecord {
            description,
            status,
        });
    }

    pub fn pass(&mut self, description: impl Into<String>) {
        self.push(description, StepStatus::Pass);
    }

    pub fn fail(&mut self, description: impl Into<String>) {
        self.push(description, StepStatus::Fail);
    }

    pub fn info(&mut self, description: impl Into<String>) {
        self.push(description, StepStatus::Info);
    }

    /// Concatenate another log onto this one, preserving order.
    pub fn append(&mut self, mut other: StepLog) {
        self.steps.append(&mut other.steps);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.status == StepStatus::Fail)
    }

    /// Render the log as a static HTML table, one row per step in
    /// insertion order. Zero steps still yield a well-formed table.
    pub fn render_html(&self, title: &str) -> String {
        let mut html = String::with_capacity(256 + self.steps.len() * 64);
        html.push_str("<html><head><title>");
        html.push_str(&escape(title));
        html.push_str("</title></head><body>\n<h2>");
        html.push_str(&escape(title));
        html.push_str("</h2><table border='1'>\n<tr><th>Step</th><th>Status</th></tr>\n");
        for step in &self.steps {
            html.push_str("<tr><td>");
            html.push_str(&escape(&step.description));
            html.push_str("</td><td>");
            html.push_str(&step.status.to_string());
            html.push_str("</td></tr>\n");
        }
        html.push_str("</table></body></html>\n");
        html
    }

    /// Write the rendered report, replacing any previous file at `path`.
    pub fn write_html(&self, path: impl AsRef<Path>, title: &str) -> Result<(), ReportError> {
        std::fs::write(path.as_ref(), self.render_html(title))?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
