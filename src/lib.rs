//! Interaction handling for interactive map surfaces.
//!
//! Groups map interactions that carry on/off state (edit modes, drawing tools)
//! and arbitrates between them so that at most one is active at a time.
//! Starting an interaction interrupts whatever was active before, optionally
//! gated by a confirmation step ("discard unsaved edits?").
//!
//! ## Modules
//!
//! - `interaction` - Definitions, registry, lifecycle state and the handler itself
//! - `map` - Map surface seam and per-event listener fan-out
//! - `ui` - Binding UI elements to interaction starts and interrupts
//! - `config` - Handler configuration
//! - `error` - Error types

pub mod config;
pub mod constants;
pub mod error;
pub mod interaction;
pub mod map;
pub mod ui;

pub use config::HandlerConfig;
pub use error::{InteractionError, InteractionResult};
pub use interaction::{
    Continuation, EndOptions, InteractionDefinition, InteractionHandler, InteractionRegistry,
    InteractionState, InterruptDecision,
};
pub use map::{MapListener, MapSurface};
pub use ui::{
    BindingMode, EventDisposition, UiBindingOptions, UiCallback, UiElement, UiListener, ValueSource,
};
