//! Interaction lifecycle state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active(name)         (start_interaction on a registered name)
//! Active(a) -> Active(a)       (start_interaction(a) - restart, no interrupt)
//! Active(a) -> Idle            (end_interaction, confirmed interrupt)
//! Active(a) -> Active(b)       (interrupt a, then start b)
//! ```
//!
//! A gated interrupt that has not been confirmed or cancelled yet leaves the
//! state at `Active(a)`; there is no externally visible transitioning state.

/// Which interaction, if any, is currently engaged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionState {
    /// No active interaction
    #[default]
    Idle,

    /// Exactly one interaction is active
    Active {
        /// Registered name of the active interaction
        name: String,
    },
}

impl InteractionState {
    /// Returns true if the state is Idle
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if any interaction is active
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Get the active interaction name, if any
    pub fn active_name(&self) -> Option<&str> {
        match self {
            Self::Active { name } => Some(name),
            Self::Idle => None,
        }
    }

    /// Returns true if `name` is the active interaction
    pub fn is_active_named(&self, name: &str) -> bool {
        self.active_name() == Some(name)
    }

    /// Mark `name` as the active interaction
    pub(crate) fn activate(&mut self, name: &str) {
        *self = Self::Active {
            name: name.to_string(),
        };
    }

    /// Reset to Idle state, returning the name that was active
    pub(crate) fn reset(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Active { name } => Some(name),
            Self::Idle => None,
        }
    }
}
