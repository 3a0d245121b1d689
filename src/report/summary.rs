use crate::report::status::Status;
use std::fmt;

/// Title of the block appended below the data rows
pub(crate) const SUMMARY_TITLE: &str = "TEST SUMMARY";

/// Counts of case outcomes, recomputed from the rows on every request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    /// Tallies statuses; every status counts towards the total.
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Summary {
        statuses.into_iter().fold(Summary::default(), |mut summary, status| {
            summary.total += 1;
            match Status::parse(status) {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::Skip => summary.skipped += 1,
                Status::Other(_) => (),
            }
            summary
        })
    }

    /// Share of passed cases in percent, zero when there are none.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }

    /// Label/value pairs in the order they are written to the sheet.
    pub(crate) fn entries(&self) -> [(&'static str, String); 5] {
        [
            ("Total Tests", self.total.to_string()),
            ("Passed", self.passed.to_string()),
            ("Failed", self.failed.to_string()),
            ("Skipped", self.skipped.to_string()),
            ("Pass Rate", self.formatted_pass_rate()),
        ]
    }

    /// "50.00%", or "0%" for an empty run.
    pub fn formatted_pass_rate(&self) -> String {
        if self.total == 0 {
            "0%".to_owned()
        } else {
            format!("{:.2}%", self.pass_rate())
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests, {} passed, {} failed, {} skipped ({})",
            self.total,
            self.passed,
            self.failed,
            self.skipped,
            self.formatted_pass_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tally() {
        let summary = Summary::tally(["PASS", "pass", "FAIL", "Skip"]);
        assert_eq!(summary, Summary { total: 4, passed: 2, failed: 1, skipped: 1 });
        assert_eq!(summary.formatted_pass_rate(), "50.00%");
        assert_eq!(summary.to_string(), "4 tests, 2 passed, 1 failed, 1 skipped (50.00%)");

        let summary = Summary::tally(["PASS", "PASS", "FAIL", "BLOCKED"]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed + summary.failed + summary.skipped, 3);

        assert_eq!(Summary::tally(["PASS", "FAIL", "FAIL"]).formatted_pass_rate(), "33.33%");
    }

    #[test]
    fn summary_empty() {
        let summary = Summary::tally([] as [&str; 0]);
        assert_eq!(summary.pass_rate(), 0.0);
        assert_eq!(summary.formatted_pass_rate(), "0%");
        assert_eq!(summary.entries()[4], ("Pass Rate", "0%".to_owned()));
    }
}
