//! Interrupt confirmation.
//!
//! An interaction with a `check_interrupt` gate receives an `InterruptDecision`
//! whenever something tries to interrupt it. Resolving the decision consumes it,
//! so exactly one of `confirm` or `cancel` can ever run. The decision is `Send`
//! and may be held on to, e.g. until the user answers a confirmation dialog;
//! the handler stays in its current state until then.

use std::fmt;
use tracing::warn;

/// One-shot continuation run after an interrupt resolves
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// Pending outcome of a gated interrupt.
pub struct InterruptDecision {
    interaction: String,
    outcome: Option<(Continuation, Continuation)>,
}

impl InterruptDecision {
    pub(crate) fn new(interaction: String, confirm: Continuation, cancel: Continuation) -> Self {
        Self {
            interaction,
            outcome: Some((confirm, cancel)),
        }
    }

    /// Name of the interaction being interrupted
    pub fn interaction(&self) -> &str {
        &self.interaction
    }

    /// Let the interrupt proceed: the interaction ends and the interrupting
    /// caller's continuation runs.
    pub fn confirm(mut self) {
        if let Some((confirm, _)) = self.outcome.take() {
            confirm();
        }
    }

    /// Refuse the interrupt: the interaction stays active and the interrupting
    /// caller's cancel continuation runs, if it supplied one.
    pub fn cancel(mut self) {
        if let Some((_, cancel)) = self.outcome.take() {
            cancel();
        }
    }
}

impl Drop for InterruptDecision {
    fn drop(&mut self) {
        if self.outcome.is_some() {
            warn!(
                interaction = %self.interaction,
                "interrupt decision dropped without confirm or cancel; interrupt abandoned"
            );
        }
    }
}

impl fmt::Debug for InterruptDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptDecision")
            .field("interaction", &self.interaction)
            .field("resolved", &self.outcome.is_none())
            .finish()
    }
}
