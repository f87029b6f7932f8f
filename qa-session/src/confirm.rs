//! Explicit user confirmation for destructive or long-running actions.

/// Asks the user to approve `prompt`.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
