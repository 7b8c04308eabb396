//! Summary of a mirror run
//!
//! The crawler fills a [`MirrorReport`] as it goes; the binary prints it once
//! the run ends.

use std::fmt;
use std::time::Duration;

/// Counters collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Page files written
    pub pages_written: u64,

    /// Pages whose fetch or write failed; no file was written for them
    pub pages_aborted: u64,

    /// Anchors not followed because the page was already taken on, or
    /// because its file belongs to another URL
    pub pages_skipped: u64,

    /// Asset files written
    pub assets_downloaded: u64,

    /// Asset references rewritten to a file written earlier in the run
    pub assets_reused: u64,

    /// Asset fetches or writes that failed; the reference stays remote
    pub assets_failed: u64,

    /// References left untouched because their origin is out of scope
    pub out_of_scope: u64,

    /// The run was cancelled before the stack drained
    pub cancelled: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl MirrorReport {
    /// Returns true if nothing at all was written
    pub fn is_empty(&self) -> bool {
        self.pages_written == 0 && self.assets_downloaded == 0
    }
}

impl fmt::Display for MirrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages:")?;
        writeln!(f, "  Written: {}", self.pages_written)?;
        writeln!(f, "  Aborted: {}", self.pages_aborted)?;
        writeln!(f, "  Skipped: {}", self.pages_skipped)?;
        writeln!(f, "Assets:")?;
        writeln!(f, "  Downloaded: {}", self.assets_downloaded)?;
        writeln!(f, "  Reused: {}", self.assets_reused)?;
        writeln!(f, "  Failed: {}", self.assets_failed)?;
        writeln!(f, "Out-of-scope references: {}", self.out_of_scope)?;
        write!(f, "Elapsed: {:.2}s", self.elapsed.as_secs_f64())
    }
}

/// Prints the report to stdout
pub fn print_report(report: &MirrorReport) {
    if report.cancelled {
        println!("=== Mirror Cancelled ===\n");
    } else {
        println!("=== Done Downloading ===\n");
    }
    if report.is_empty() && !report.cancelled {
        println!("Nothing was saved.\n");
    }
    println!("{}", report);
}
