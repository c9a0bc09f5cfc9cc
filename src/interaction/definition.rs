//! Interaction definitions - the callbacks a registrant hands to the handler.
//!
//! A definition is immutable once registered. Only `start` and `end` are
//! required; everything else is optional and checked for presence before use.

use super::interrupt::InterruptDecision;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Called when the interaction becomes active
pub type StartFn<E> = Box<dyn Fn(Option<&E>) -> anyhow::Result<()> + Send + Sync>;
/// Called when the interaction stops being active; `true` means discard changes
pub type EndFn<E> = Box<dyn Fn(Option<&E>, bool) -> anyhow::Result<Option<Value>> + Send + Sync>;
/// Called when the already active interaction is started again
pub type RestartFn<E> = Box<dyn Fn(Option<&E>) -> anyhow::Result<bool> + Send + Sync>;
/// Parameterless definition callback (`cancel_start`, `clear`)
pub type ActionFn = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;
/// Gate deciding whether the interaction may be interrupted
pub type CheckInterruptFn = Box<dyn Fn(InterruptDecision) -> anyhow::Result<()> + Send + Sync>;
/// Handler for one map event type
pub type MapEventFn<E> = Box<dyn Fn(&E) -> anyhow::Result<()> + Send + Sync>;

/// A named, registrable interaction mode.
///
/// `E` is the surface event type and `B` the attachable behavior type.
///
/// ```ignore
/// let draw = InteractionDefinition::new(
///     |_evt| Ok(()),
///     |_evt, cancel| Ok(Some(json!({ "saved": !cancel }))),
/// )
/// .with_check_interrupt(|decision| {
///     decision.confirm();
///     Ok(())
/// })
/// .on_map("click", |evt| add_vertex(evt))
/// .with_map_behavior(draw_tool);
/// ```
pub struct InteractionDefinition<E, B = ()> {
    pub(crate) start: StartFn<E>,
    pub(crate) end: EndFn<E>,
    pub(crate) restart: Option<RestartFn<E>>,
    pub(crate) cancel_start: Option<ActionFn>,
    pub(crate) clear: Option<ActionFn>,
    pub(crate) check_interrupt: Option<CheckInterruptFn>,
    pub(crate) map: HashMap<String, MapEventFn<E>>,
    pub(crate) map_behavior: Option<B>,
    pub(crate) save_on_interrupt: bool,
}

impl<E, B> InteractionDefinition<E, B> {
    pub fn new<S, F>(start: S, end: F) -> Self
    where
        S: Fn(Option<&E>) -> anyhow::Result<()> + Send + Sync + 'static,
        F: Fn(Option<&E>, bool) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        Self {
            start: Box::new(start),
            end: Box::new(end),
            restart: None,
            cancel_start: None,
            clear: None,
            check_interrupt: None,
            map: HashMap::new(),
            map_behavior: None,
            save_on_interrupt: false,
        }
    }

    /// Called instead of a plain start when the interaction is already active.
    /// Returning `Ok(false)` skips the following `start` call.
    pub fn with_restart<F>(mut self, restart: F) -> Self
    where
        F: Fn(Option<&E>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.restart = Some(Box::new(restart));
        self
    }

    /// Undo caller-side changes when a start attempt is refused because the
    /// active interaction declined to be interrupted.
    pub fn with_cancel_start<F>(mut self, cancel_start: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.cancel_start = Some(Box::new(cancel_start));
        self
    }

    /// Interaction-specific part of the clear step.
    pub fn with_clear<F>(mut self, clear: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.clear = Some(Box::new(clear));
        self
    }

    /// Gate interruption behind a decision. The callback must eventually
    /// resolve the decision it receives, now or later.
    pub fn with_check_interrupt<F>(mut self, check: F) -> Self
    where
        F: Fn(InterruptDecision) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.check_interrupt = Some(Box::new(check));
        self
    }

    /// Handle map events of `event_type` while active. The event type must also
    /// be armed on the handler with `add_map_listener`.
    pub fn on_map<F>(mut self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.map.insert(event_type.into(), Box::new(handler));
        self
    }

    /// Behavior attached to the map surface while active.
    pub fn with_map_behavior(mut self, behavior: B) -> Self {
        self.map_behavior = Some(behavior);
        self
    }

    /// Treat a confirmed interruption as a normal, saving end.
    pub fn save_on_interrupt(mut self, save: bool) -> Self {
        self.save_on_interrupt = save;
        self
    }

    pub fn has_restart(&self) -> bool {
        self.restart.is_some()
    }

    pub fn has_check_interrupt(&self) -> bool {
        self.check_interrupt.is_some()
    }

    pub fn handles_map_event(&self, event_type: &str) -> bool {
        self.map.contains_key(event_type)
    }

    pub fn map_behavior(&self) -> Option<&B> {
        self.map_behavior.as_ref()
    }

    pub fn saves_on_interrupt(&self) -> bool {
        self.save_on_interrupt
    }
}

impl<E, B: fmt::Debug> fmt::Debug for InteractionDefinition<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map_events: Vec<&str> = self.map.keys().map(String::as_str).collect();
        map_events.sort_unstable();
        f.debug_struct("InteractionDefinition")
            .field("restart", &self.restart.is_some())
            .field("cancel_start", &self.cancel_start.is_some())
            .field("clear", &self.clear.is_some())
            .field("check_interrupt", &self.check_interrupt.is_some())
            .field("map", &map_events)
            .field("map_behavior", &self.map_behavior)
            .field("save_on_interrupt", &self.save_on_interrupt)
            .finish()
    }
}
