//! Console reporter - human-readable test results

use super::{Reporter, ReporterOptions};
use crate::protocol::decode_description;
use crate::status::{Status, TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use colored::*;
use std::io::{self, Write};

/// Console reporter with output configuration
pub struct ConsoleReporter<W: Write> {
    writer: W,
    /// Colorize output
    color: bool,
    /// Only show failures and the summary
    errors_only: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(options: ReporterOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W, options: ReporterOptions) -> Self {
        Self {
            writer,
            color: options.color,
            errors_only: options.errors_only,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.writer, "{}", text) {
            tracing::debug!("console reporter write failed: {}", err);
        }
    }

    /// Print a failure line, with the reason on the following lines
    fn print_failure(&mut self, headline: String, result: &TestResult) {
        let mut text = self.paint(&headline, |s| s.red().bold());
        if !result.description.is_empty() {
            text.push_str("\nReason: ");
            text.push_str(&decode_description(&result.description));
        }
        self.line(&text);
    }

    /// Print one `Label: count / total` row, padded to the widest total
    fn print_count(&mut self, label: String, padding: usize, count: usize, total: usize) {
        let width = total.to_string().len();
        let text = format!(
            "{}{}{:>width$} / {}",
            label,
            " ".repeat(padding),
            count,
            total,
            width = width
        );
        self.line(&text);
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &Suite) {
        if !self.errors_only {
            self.line(&format!("entering suite `{}`.", suite.name()));
        }
    }

    fn suite_finished(&mut self, suite: &Suite) {
        if !self.errors_only {
            self.line(&format!("leaving suite `{}`.\n", suite.name()));
        }
    }

    fn test_started(&mut self, test: &TestCase) {
        if !self.errors_only {
            self.line(&format!("executing test `{}`.", test.name()));
        }
    }

    fn test_output(&mut self, line: &str) {
        if !self.errors_only {
            self.line(line);
        }
    }

    fn test_finished(&mut self, result: &TestResult) {
        let millis = result.duration.as_millis();
        match result.status {
            Status::Passed => {
                if !self.errors_only {
                    let text = format!("test passed: `{}`, in {}ms.", result.name, millis);
                    let text = self.paint(&text, |s| s.green());
                    self.line(&text);
                }
            }
            Status::Failed => {
                let headline = format!("test failed: `{}`, in {}ms.", result.name, millis);
                self.print_failure(headline, result)
            }
            Status::Crashed => {
                let headline = format!("test crashed: `{}`, in {}ms.", result.name, millis);
                self.print_failure(headline, result)
            }
            Status::TimedOut => {
                let text = format!("test timed out: `{}`.", result.name);
                let text = self.paint(&text, |s| s.yellow().bold());
                self.line(&text);
            }
            Status::NotFound => {
                let text = format!("test not found: `{}`.", result.name);
                let text = self.paint(&text, |s| s.red().bold());
                self.line(&text);
            }
            Status::NotStarted => {
                let text = format!("test not started: `{}`.", result.name);
                self.line(&text);
            }
        }
    }

    fn summary(&mut self, summary: &TestsSummary) {
        if !summary.failed_tests.is_empty() {
            let heading = self.paint("\nSummary:", |s| s.bold());
            self.line(&heading);

            for (status, name) in &summary.failed_tests {
                let label = match status {
                    Status::TimedOut => self.paint(status.label(), |s| s.yellow().bold()),
                    _ => self.paint(status.label(), |s| s.red().bold()),
                };
                self.line(&format!(" - {}: {}", name, label));
            }

            self.line("");
        }

        if summary.total == 0 {
            let text = self.paint("No tests found.", |s| s.bold());
            self.line(&text);
            return;
        }

        if summary.all_passed() {
            let text = self.paint("All tests passed!", |s| s.green().bold());
            self.line(&text);
        }

        let crashed = summary.count(Status::Crashed);
        let timed_out = summary.count(Status::TimedOut);
        let not_found = summary.count(Status::NotFound);
        let failed = summary
            .total
            .saturating_sub(summary.passed + crashed + timed_out + not_found);

        let rows: [(&str, fn(&str) -> ColoredString, usize, usize); 5] = [
            ("Passed", |s: &str| s.green().bold(), summary.passed, 4),
            ("Failed", |s: &str| s.red().bold(), failed, 4),
            ("Crashed", |s: &str| s.red().bold(), crashed, 3),
            ("Timed out", |s: &str| s.yellow().bold(), timed_out, 1),
            ("Not found", |s: &str| s.red().bold(), not_found, 1),
        ];

        for (label, style, count, padding) in rows {
            if count > 0 {
                let label = format!("{}:", self.paint(label, style));
                self.print_count(label, padding, count, summary.total);
            }
        }

        let millis = summary.wall_clock.as_millis();
        if millis > 0 {
            let label = self.paint("Clock time taken", |s| s.green().bold());
            self.line(&format!("{}: {}ms.", label, millis));
        }
    }
}
