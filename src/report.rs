//! Plain-text rendering of a completed run.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::probe::{Category, ProbeStatus};
use crate::run::TestRun;
use crate::summary::SummaryCounts;

/// A completed run together with its summary, as printed by `check --json`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run: &'a TestRun,
    pub summary: SummaryCounts,
}

impl<'a> RunReport<'a> {
    pub fn new(run: &'a TestRun) -> Self {
        Self {
            run,
            summary: run.summary(),
        }
    }
}

impl fmt::Display for RunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_text(f, self.run)
    }
}

/// Render a run as a categorized table. Empty categories are omitted.
pub fn render_text(run: &TestRun) -> String {
    RunReport::new(run).to_string()
}

/// Write the categorized table to `out`, stopping at the first write error.
pub fn write_text(out: &mut impl fmt::Write, run: &TestRun) -> fmt::Result {
    for category in Category::ALL {
        let results = run.category(category);
        if results.is_empty() {
            continue;
        }

        writeln!(out, "{} ({})", category.label(), category.description())?;
        for result in results {
            let measurement = match result.status {
                ProbeStatus::Success => format!("{}ms", result.latency_ms),
                ProbeStatus::Error => "failed".to_string(),
            };
            write!(
                out,
                "  {:<24} {:<40} {:>8}  {:<8}",
                result.name,
                result.url,
                measurement,
                result.tier()
            )?;
            if !result.error_detail.is_empty() {
                write!(out, " {}", result.error_detail)?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    let summary = run.summary();
    writeln!(
        out,
        "total {} | good {} | moderate {} | poor {}",
        summary.total, summary.good, summary.moderate, summary.poor
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Endpoint, ProbeResult};

    #[test]
    fn test_render_text() {
        let router = Endpoint::new("Router", "http://10.0.0.1", Category::Internal);
        let google = Endpoint::new("Google", "https://www.google.com", Category::Overseas);
        let run = TestRun::from_results(
            1,
            chrono::Utc::now(),
            vec![
                ProbeResult::success(&router, 42),
                ProbeResult::failure(&google, 10_000, "timed out after 10s"),
            ],
        );

        let text = render_text(&run);
        assert!(text.contains("Internal sites"));
        assert!(!text.contains("Domestic sites"));
        assert!(text.contains("42ms"));
        assert!(text.contains("failed"));
        assert!(text.contains("timed out after 10s"));
        assert!(text.ends_with("total 2 | good 1 | moderate 0 | poor 1\n"));
    }

    #[test]
    fn test_render_empty_run() {
        let run = TestRun::from_results(1, chrono::Utc::now(), Vec::new());
        assert_eq!(
            render_text(&run),
            "total 0 | good 0 | moderate 0 | poor 0\n"
        );
    }

    /// Accepts a fixed number of bytes, then fails every write.
    struct FullBuffer {
        written: String,
        capacity: usize,
    }

    impl Write for FullBuffer {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.capacity {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_write_text_stops_on_error() {
        let router = Endpoint::new("Router", "http://10.0.0.1", Category::Internal);
        let run = TestRun::from_results(
            1,
            chrono::Utc::now(),
            vec![ProbeResult::success(&router, 42)],
        );

        let mut out = FullBuffer {
            written: String::new(),
            capacity: 20,
        };
        assert!(write_text(&mut out, &run).is_err());
        assert!(out.written.starts_with("Internal sites"));
        assert!(!out.written.contains("total"));

        let mut out = String::new();
        write_text(&mut out, &run).unwrap();
        assert_eq!(out, RunReport::new(&run).to_string());
    }

    #[test]
    fn test_report_json() {
        let run = TestRun::from_results(3, chrono::Utc::now(), Vec::new());
        let json = serde_json::to_value(RunReport::new(&run)).unwrap();

        assert_eq!(json["run"]["generation"], 3);
        assert_eq!(json["summary"]["total"], 0);
    }
}
