//! Operator confirmation seam for destructive steps.
//!
//! Declining is a normal outcome: callers record the artifact as retained.

/// Asks the operator whether a destructive step may proceed.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str, default_yes: bool) -> bool;
}

/// Fixed answer, for non-interactive runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm {
    answer: bool,
}

impl AutoConfirm {
    pub fn yes() -> Self {
        Self { answer: true }
    }

    pub fn no() -> Self {
        Self { answer: false }
    }
}

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, prompt: &str, _default_yes: bool) -> bool {
        log::debug!(
            "event=confirm module=confirm status=auto answer={} prompt_len={}",
            self.answer,
            prompt.len()
        );
        self.answer
    }
}

/// Result of one individually confirmable destructive step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The artifact was deleted.
    Removed,
    /// The operator declined; the artifact is kept for manual follow-up.
    Retained,
    /// Deletion was attempted and failed; the surrounding sequence continued.
    Failed(String),
    /// Nothing to remove.
    Absent,
    /// The step does not apply on this machine.
    Skipped,
}
