/// Task state definitions for tracking the progress of one page
///
/// This module defines the states a page task moves through while it is
/// mirrored.
use std::fmt;

/// Represents the current state of a page task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task created; the page is about to be fetched
    Start,

    /// Page fetched; markup parsed and assets being downloaded
    Rewriting,

    /// Anchors being followed depth-first
    Discovering,

    /// Page being rendered and written
    Finalizing,

    // ===== Terminal States =====
    /// Page file written
    Done,

    /// Page fetch failed or the page could not be written; no file
    Aborted,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if this is an active state (the task may still progress)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Start -> Rewriting -> [Discovering] -> Finalizing -> Done
    ///   \________________________________________\______> Aborted
    /// ```
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::Rewriting)
                | (Self::Start, Self::Aborted)
                | (Self::Rewriting, Self::Discovering)
                | (Self::Rewriting, Self::Finalizing)
                | (Self::Discovering, Self::Finalizing)
                | (Self::Finalizing, Self::Done)
                | (Self::Finalizing, Self::Aborted)
        )
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Rewriting => "rewriting",
            Self::Discovering => "discovering",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Start,
            Self::Rewriting,
            Self::Discovering,
            Self::Finalizing,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
