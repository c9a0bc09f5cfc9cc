//! Handler configuration.
//!
//! Configuration is plain JSON so hosts can keep it next to their own settings:
//!
//! ```json
//! { "map_listeners": ["click", "pointermove"], "ui_event": "click" }
//! ```
//!
//! Missing fields fall back to their defaults.

use crate::constants::DEFAULT_UI_EVENT;
use crate::error::InteractionResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Map event types to arm as soon as the handler is created
    pub map_listeners: Vec<String>,
    /// Default element event for UI bindings
    pub ui_event: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            map_listeners: Vec::new(),
            ui_event: DEFAULT_UI_EVENT.to_string(),
        }
    }
}

impl HandlerConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> InteractionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a map event type to arm on construction.
    pub fn with_map_listener(mut self, event_type: impl Into<String>) -> Self {
        self.map_listeners.push(event_type.into());
        self
    }

    /// Set the default UI binding event.
    pub fn with_ui_event(mut self, event_type: impl Into<String>) -> Self {
        self.ui_event = event_type.into();
        self
    }
}
