//! Output module for reporting mirror results
//!
//! This module handles:
//! - Collecting per-run counters
//! - Printing the completion summary

pub mod report;

pub use report::{print_report, MirrorReport};
