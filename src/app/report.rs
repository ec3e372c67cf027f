use crate::error::{Context, Result};
use crate::gather::BatchReport;

/// Human-readable summary: totals, elapsed time, then failure counts.
pub fn render_summary(report: &BatchReport) -> String {
    format!(
        "Net price of {} prices queried: {}\nTotal time taken to execute: {} ms\nFailed fetches: {}, timed out items: {}",
        report.results,
        report.total,
        report.elapsed.as_millis(),
        report.failures,
        report.timed_out_items
    )
}

pub fn render_json(report: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string(report).context("Failed to serialize batch report")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> BatchReport {
        BatchReport {
            results: 18,
            total: 3600,
            failures: 6,
            timed_out_items: 0,
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn summary_lists_totals_then_elapsed() {
        let text = render_summary(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Net price of 18 prices queried: 3600");
        assert_eq!(lines[1], "Total time taken to execute: 42 ms");
        assert_eq!(lines[2], "Failed fetches: 6, timed out items: 0");
    }

    #[test]
    fn json_report_is_one_object() {
        let json = render_json(&sample()).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["results"], 18);
        assert_eq!(value["failures"], 6);
        assert_eq!(value["elapsed_ms"], 42);
    }
}
