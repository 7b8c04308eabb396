//! State module for tracking mirror progress
//!
//! # Components
//!
//! - `TaskState`: Tracks the state of an individual page task (start, rewriting,
//!   discovering, finalizing, done, aborted)

mod task_state;

// Re-export main types
pub use task_state::TaskState;
