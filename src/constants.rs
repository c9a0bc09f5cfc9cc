//! Crate-wide constants.

/// Element event a UI binding listens on unless configured otherwise
pub const DEFAULT_UI_EVENT: &str = "click";
