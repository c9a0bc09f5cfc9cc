//! The interaction handler - registration, start/end/interrupt transitions and
//! the generic hook pipeline.

use super::definition::InteractionDefinition;
use super::interrupt::{Continuation, InterruptDecision};
use super::registry::InteractionRegistry;
use super::state::InteractionState;
use crate::config::HandlerConfig;
use crate::error::{InteractionError, InteractionResult};
use crate::map::{MapListener, MapSurface};
use anyhow::anyhow;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Definition type used by a handler over surface `M`
pub type Definition<M> =
    InteractionDefinition<<M as MapSurface>::Event, <M as MapSurface>::Behavior>;

/// Runs before any start; `Ok(false)` vetoes it
pub type StartHook<E> = Arc<dyn Fn(Option<&E>, &str) -> anyhow::Result<bool> + Send + Sync>;
/// Runs after any end with the ended name and the cancel flag
pub type EndHook<E> = Arc<dyn Fn(Option<&E>, &str, bool) -> anyhow::Result<()> + Send + Sync>;
/// Runs first in every clear step
pub type ClearHook = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;
/// Runs last in every end with the ended name, the end object and the last error
pub type UpdateHook =
    Arc<dyn Fn(&str, Option<&Value>, Option<&str>) -> anyhow::Result<()> + Send + Sync>;

pub(crate) struct Hooks<E> {
    start: Option<StartHook<E>>,
    end: Option<EndHook<E>>,
    clear: Option<ClearHook>,
    update: Option<UpdateHook>,
}

impl<E> Default for Hooks<E> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            clear: None,
            update: None,
        }
    }
}

/// Everything behind the handler's lock
pub(crate) struct HandlerState<M: MapSurface> {
    pub(crate) registry: InteractionRegistry<M::Event, M::Behavior>,
    pub(crate) state: InteractionState,
    /// Temporarily suppresses map event dispatch; cleared by every end
    pub(crate) map_blocked: bool,
    pub(crate) map_listeners: HashMap<String, MapListener<M::Event>>,
    pub(crate) hooks: Hooks<M::Event>,
}

pub(crate) struct Shared<M: MapSurface> {
    pub(crate) surface: M,
    pub(crate) ui_event: String,
    pub(crate) inner: Mutex<HandlerState<M>>,
}

/// Options for `end_interaction_with`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndOptions {
    /// Discard instead of save
    pub cancel: bool,
    /// Skip the clear step
    pub suppress_clear: bool,
    /// Skip the update hook
    pub suppress_update: bool,
}

impl EndOptions {
    pub fn cancelled(cancel: bool) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    pub fn without_clear(mut self) -> Self {
        self.suppress_clear = true;
        self
    }

    pub fn without_update(mut self) -> Self {
        self.suppress_update = true;
        self
    }
}

/// Coordinates mutually exclusive interactions on one map surface.
///
/// Cloning is cheap and yields another handle to the same handler.
pub struct InteractionHandler<M: MapSurface> {
    pub(crate) shared: Arc<Shared<M>>,
}

impl<M: MapSurface> Clone for InteractionHandler<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M: MapSurface> InteractionHandler<M> {
    pub fn new(surface: M) -> Self {
        Self::with_config(surface, HandlerConfig::default())
    }

    /// Create a handler and arm the configured map listeners.
    pub fn with_config(surface: M, config: HandlerConfig) -> Self {
        let handler = Self {
            shared: Arc::new(Shared {
                surface,
                ui_event: config.ui_event,
                inner: Mutex::new(HandlerState {
                    registry: InteractionRegistry::new(),
                    state: InteractionState::Idle,
                    map_blocked: false,
                    map_listeners: HashMap::new(),
                    hooks: Hooks::default(),
                }),
            }),
        };
        for event_type in &config.map_listeners {
            handler.add_map_listener(event_type);
        }
        handler
    }

    pub fn surface(&self) -> &M {
        &self.shared.surface
    }

    /// Never hold the returned guard across a callback or surface call.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HandlerState<M>> {
        self.shared.inner.lock()
    }

    pub fn is_active(&self) -> bool {
        self.lock().state.is_active()
    }

    /// Name of the active interaction, if any
    pub fn active_interaction(&self) -> Option<String> {
        self.lock().state.active_name().map(str::to_string)
    }

    /// Snapshot of the lifecycle state
    pub fn state(&self) -> InteractionState {
        self.lock().state.clone()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register an interaction, returning the definition it replaced.
    pub fn add_interaction(
        &self,
        name: impl Into<String>,
        definition: Definition<M>,
    ) -> Option<Arc<Definition<M>>> {
        self.lock().registry.add(name, definition)
    }

    /// Remove an interaction.
    ///
    /// Unknown names are ignored. If `name` is active it is interrupted first and
    /// only removed once the interrupt goes through, which may be later (or never)
    /// when the interaction gates interrupts; `None` is returned in that case.
    /// Otherwise the removed definition is returned.
    pub fn remove_interaction(&self, name: &str) -> Option<Arc<Definition<M>>> {
        let is_active = {
            let inner = self.lock();
            if !inner.registry.contains(name) {
                return None;
            }
            inner.state.is_active_named(name)
        };
        if is_active {
            let handler = self.clone();
            let name = name.to_string();
            self.interrupt_with(
                None,
                Some(Box::new(move || {
                    handler.remove_interaction(&name);
                })),
                None,
            );
            return None;
        }
        self.lock().registry.remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Definition<M>>> {
        self.lock().registry.get(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().registry.contains(name)
    }

    /// Registered interaction names, sorted
    pub fn interaction_names(&self) -> Vec<String> {
        self.lock().registry.names()
    }

    // ========================================================================
    // Generic hooks
    // ========================================================================

    /// Hook run before any start with the event and the requested name.
    /// Returning `Ok(false)` cancels the start.
    pub fn on_interaction_start<F>(&self, hook: F)
    where
        F: Fn(Option<&M::Event>, &str) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        let replaced = std::mem::replace(&mut self.lock().hooks.start, Some(Arc::new(hook)));
        drop(replaced);
    }

    /// Hook run after any end with the event, the ended name and the cancel flag.
    pub fn on_interaction_end<F>(&self, hook: F)
    where
        F: Fn(Option<&M::Event>, &str, bool) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let replaced = std::mem::replace(&mut self.lock().hooks.end, Some(Arc::new(hook)));
        drop(replaced);
    }

    /// Hook run at the start of every clear step, e.g. for resetting UI.
    pub fn on_clear<F>(&self, hook: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let replaced = std::mem::replace(&mut self.lock().hooks.clear, Some(Arc::new(hook)));
        drop(replaced);
    }

    /// Hook run once an end has finished, with whatever the interaction's `end`
    /// returned and the end sequence's last error message.
    pub fn on_update<F>(&self, hook: F)
    where
        F: Fn(&str, Option<&Value>, Option<&str>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let replaced = std::mem::replace(&mut self.lock().hooks.update, Some(Arc::new(hook)));
        drop(replaced);
    }

    pub fn clear_hooks(&self) {
        // the guard is released before the old hooks drop
        let replaced = std::mem::take(&mut self.lock().hooks);
        drop(replaced);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Start (or restart) the interaction registered as `name`.
    ///
    /// A different active interaction is interrupted first and the start is
    /// retried from the interrupt's success continuation. If the interrupt is
    /// refused, `name`'s `cancel_start` runs instead. Restarting the active
    /// interaction never interrupts it.
    ///
    /// Unregistered names are ignored once the pre-start hook has run.
    pub fn start_interaction(&self, name: &str, event: Option<M::Event>) {
        let active = self.active_interaction();
        let restart = match active.as_deref() {
            Some(active) if active != name => {
                let retry: Continuation = {
                    let handler = self.clone();
                    let name = name.to_string();
                    let event = event.clone();
                    Box::new(move || handler.start_interaction(&name, event))
                };
                let cancel: Continuation = {
                    let handler = self.clone();
                    let name = name.to_string();
                    Box::new(move || handler.cancel_start_interaction(&name))
                };
                self.interrupt_with(event, Some(retry), Some(cancel));
                return;
            }
            Some(_) => true,
            None => false,
        };

        let hook = self.lock().hooks.start.clone();
        if let Some(hook) = hook {
            match hook(event.as_ref(), name) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(interaction = name, "start vetoed by pre-start hook");
                    if !restart {
                        self.interrupt(event);
                    }
                    return;
                }
                Err(err) => {
                    error!(interaction = name, "pre-start hook failed: {err:#}");
                    return;
                }
            }
        }

        let Some(definition) = self.lookup(name) else {
            debug!(interaction = name, "start requested for unregistered interaction");
            return;
        };

        self.lock().state.activate(name);

        if let Err(err) = run_start(&definition, event.as_ref(), restart) {
            error!(interaction = name, restart, "start failed: {err:#}");
            let mut inner = self.lock();
            if inner.state.is_active_named(name) {
                inner.state.reset();
            }
            return;
        }

        if restart {
            return;
        }
        let Some(behavior) = definition.map_behavior() else {
            return;
        };
        let still_active = self.lock().state.is_active_named(name);
        if !still_active {
            debug!(interaction = name, "ended during start; map behavior not attached");
            return;
        }
        if let Err(err) = self.shared.surface.add_interaction(behavior) {
            error!(interaction = name, "attaching map behavior failed: {err:#}");
        }
    }

    /// Run `name`'s `cancel_start` callback, if it has one.
    pub fn cancel_start_interaction(&self, name: &str) {
        let Some(definition) = self.lookup(name) else {
            return;
        };
        if let Some(cancel_start) = &definition.cancel_start {
            if let Err(err) = cancel_start() {
                error!(interaction = name, "cancel_start failed: {err:#}");
            }
        }
    }

    /// End the active interaction. See `end_interaction_with`.
    pub fn end_interaction(&self, event: Option<M::Event>, cancel: bool) -> InteractionResult<()> {
        self.end_interaction_with(event, EndOptions::cancelled(cancel))
    }

    /// End the active interaction; a no-op returning `Ok(())` when idle.
    ///
    /// Runs, in order and each independently of the others' failures: the
    /// interaction's `end`, map behavior detach, the clear step, the end hook,
    /// the state reset (which also re-enables map interactions) and the update
    /// hook. The last failure, if any, is returned as `EndFailed`.
    pub fn end_interaction_with(
        &self,
        event: Option<M::Event>,
        options: EndOptions,
    ) -> InteractionResult<()> {
        let Some((name, definition)) = self.active_entry() else {
            return Ok(());
        };
        let event = event.as_ref();
        let mut failure = None;

        let ended = match &definition {
            Some(definition) => (definition.end)(event, options.cancel),
            None => Err(anyhow!("interaction `{name}` is no longer registered")),
        };
        let end_obj = record_step(&mut failure, &name, "end", ended).flatten();

        if let Some(behavior) = definition.as_ref().and_then(|d| d.map_behavior()) {
            let detached = self.shared.surface.remove_interaction(behavior);
            record_step(&mut failure, &name, "detach", detached);
        }

        if !options.suppress_clear {
            let cleared = self.run_clear(definition.as_deref());
            record_step(&mut failure, &name, "clear", cleared);
        }

        let end_hook = self.lock().hooks.end.clone();
        if let Some(hook) = end_hook {
            let notified = hook(event, &name, options.cancel);
            record_step(&mut failure, &name, "on_interaction_end", notified);
        }

        {
            let mut inner = self.lock();
            inner.state.reset();
            inner.map_blocked = false;
        }

        if !options.suppress_update {
            let update_hook = self.lock().hooks.update.clone();
            if let Some(hook) = update_hook {
                let updated = hook(&name, end_obj.as_ref(), failure.as_deref());
                record_step(&mut failure, &name, "on_update", updated);
            }
        }

        match failure {
            Some(message) => Err(InteractionError::EndFailed { name, message }),
            None => Ok(()),
        }
    }

    /// Run the clear step for the active interaction: the clear hook, then the
    /// interaction's own `clear`. Usually reached through `end_interaction`.
    pub fn clear_interaction(&self) -> InteractionResult<()> {
        let Some((name, definition)) = self.active_entry() else {
            return Err(InteractionError::NotActive);
        };
        self.run_clear(definition.as_deref()).map_err(|err| {
            error!(interaction = %name, "clear failed: {err:#}");
            InteractionError::ClearFailed {
                name,
                message: err.to_string(),
            }
        })
    }

    /// Interrupt the active interaction. See `interrupt_with`.
    pub fn interrupt(&self, event: Option<M::Event>) {
        self.interrupt_with(event, None, None);
    }

    /// Interrupt the active interaction.
    ///
    /// Without a `check_interrupt` gate (or with nothing active) the interaction
    /// ends normally and `on_interrupt` runs right away. With a gate, the gate
    /// gets an `InterruptDecision`: confirming ends the interaction, discarding
    /// changes unless it saves on interrupt, then runs `on_interrupt`; cancelling
    /// runs `on_cancel`. Nothing happens until the decision is resolved.
    pub fn interrupt_with(
        &self,
        event: Option<M::Event>,
        on_interrupt: Option<Continuation>,
        on_cancel: Option<Continuation>,
    ) {
        let gated = self.active_entry().and_then(|(name, definition)| {
            definition
                .filter(|d| d.has_check_interrupt())
                .map(|d| (name, d))
        });
        let Some((name, definition)) = gated else {
            // step failures are already logged by the end sequence
            let _ = self.end_interaction(event, false);
            if let Some(on_interrupt) = on_interrupt {
                on_interrupt();
            }
            return;
        };

        let cancel_on_confirm = !definition.saves_on_interrupt();
        let confirm: Continuation = {
            let handler = self.clone();
            Box::new(move || {
                let _ = handler.end_interaction(event, cancel_on_confirm);
                if let Some(on_interrupt) = on_interrupt {
                    on_interrupt();
                }
            })
        };
        let cancel: Continuation = match on_cancel {
            Some(on_cancel) => on_cancel,
            None => Box::new(|| {}),
        };
        let decision = InterruptDecision::new(name.clone(), confirm, cancel);

        if let Some(check_interrupt) = &definition.check_interrupt {
            if let Err(err) = check_interrupt(decision) {
                error!(interaction = %name, "check_interrupt failed: {err:#}");
            }
        }
    }

    /// Whether interrupting right now would go through a `check_interrupt` gate
    pub fn interrupt_is_gated(&self) -> bool {
        self.active_entry()
            .and_then(|(_, definition)| definition)
            .is_some_and(|d| d.has_check_interrupt())
    }

    /// Active name plus its definition, if it is still registered
    fn active_entry(&self) -> Option<(String, Option<Arc<Definition<M>>>)> {
        let inner = self.lock();
        let name = inner.state.active_name()?;
        Some((name.to_string(), inner.registry.get(name)))
    }

    fn run_clear(&self, definition: Option<&Definition<M>>) -> anyhow::Result<()> {
        let hook = self.lock().hooks.clear.clone();
        if let Some(hook) = hook {
            hook()?;
        }
        if let Some(clear) = definition.and_then(|d| d.clear.as_ref()) {
            clear()?;
        }
        Ok(())
    }
}

/// `restart` (on restarts) then `start`, unless `restart` declined
fn run_start<E, B>(
    definition: &InteractionDefinition<E, B>,
    event: Option<&E>,
    restart: bool,
) -> anyhow::Result<()> {
    let proceed = match (&definition.restart, restart) {
        (Some(restart_fn), true) => restart_fn(event)?,
        _ => true,
    };
    if proceed {
        (definition.start)(event)?;
    }
    Ok(())
}

/// Log a failed end step and remember it as the latest failure
fn record_step<T>(
    failure: &mut Option<String>,
    interaction: &str,
    step: &str,
    result: anyhow::Result<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(interaction, step, "end step failed: {err:#}");
            *failure = Some(err.to_string());
            None
        }
    }
}
