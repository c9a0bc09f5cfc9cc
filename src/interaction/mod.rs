//! Interaction lifecycle.
//!
//! ## Architecture
//!
//! `InteractionHandler` owns the registry and the single "which interaction
//! is active" value (`InteractionState`). Every transition goes through
//! `start_interaction`, `end_interaction` or `interrupt`; nothing else writes
//! the state.
//!
//! Callbacks are always invoked with the handler's lock released, so a callback
//! may call straight back into the handler. Because the new interaction is
//! marked active before its `start` runs, a re-entrant call from inside `start`
//! already observes it.
//!
//! ## Modules
//!
//! - `definition` - The callbacks making up one interaction
//! - `registry` - Name -> definition map
//! - `state` - Idle/Active lifecycle state
//! - `interrupt` - One-shot confirm/cancel decision for gated interrupts
//! - `handler` - The handler and its transitions

mod definition;
mod handler;
mod interrupt;
mod registry;
mod state;

pub use definition::{
    ActionFn, CheckInterruptFn, EndFn, InteractionDefinition, MapEventFn, RestartFn, StartFn,
};
pub use handler::{
    ClearHook, Definition, EndHook, EndOptions, InteractionHandler, StartHook, UpdateHook,
};
pub use interrupt::{Continuation, InterruptDecision};
pub use registry::InteractionRegistry;
pub use state::InteractionState;
