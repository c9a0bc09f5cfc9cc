//! Map event fan-out.
//!
//! Each armed event type gets exactly one subscription on the surface. The
//! subscription forwards events to the active interaction's `map` handler for
//! that type, unless map interactions are blocked.

use super::surface::{MapListener, MapSurface};
use crate::interaction::InteractionHandler;
use std::sync::Arc;
use tracing::error;

impl<M: MapSurface> InteractionHandler<M> {
    /// Arm dispatch of `event_type` map events to the active interaction.
    /// Re-arming replaces the previous subscription.
    pub fn add_map_listener(&self, event_type: &str) {
        self.remove_map_listener(event_type);

        // weak so the surface's subscriber list doesn't keep the handler alive
        let shared = Arc::downgrade(&self.shared);
        let armed_type = event_type.to_string();
        let listener: MapListener<M::Event> = Arc::new(move |event: &M::Event| {
            if let Some(shared) = shared.upgrade() {
                InteractionHandler { shared }.dispatch_map_event(&armed_type, event);
            }
        });

        self.lock()
            .map_listeners
            .insert(event_type.to_string(), Arc::clone(&listener));
        self.shared.surface.on(event_type, listener);
    }

    /// Unsubscribe and forget `event_type`.
    pub fn remove_map_listener(&self, event_type: &str) {
        let listener = self.lock().map_listeners.remove(event_type);
        if let Some(listener) = listener {
            self.shared.surface.un(event_type, &listener);
        }
    }

    /// Unsubscribe and forget every armed event type.
    pub fn remove_all_map_listeners(&self) {
        let listeners: Vec<_> = self.lock().map_listeners.drain().collect();
        for (event_type, listener) in listeners {
            self.shared.surface.un(&event_type, &listener);
        }
    }

    /// Suppress map event dispatch without unsubscribing. Cleared again by
    /// `enable_map_interactions` or the next end of an interaction.
    pub fn disable_map_interactions(&self) {
        self.lock().map_blocked = true;
    }

    pub fn enable_map_interactions(&self) {
        self.lock().map_blocked = false;
    }

    pub fn map_interactions_blocked(&self) -> bool {
        self.lock().map_blocked
    }

    /// Armed event types, sorted
    pub fn armed_map_listeners(&self) -> Vec<String> {
        let mut armed: Vec<String> = self.lock().map_listeners.keys().cloned().collect();
        armed.sort_unstable();
        armed
    }

    fn dispatch_map_event(&self, event_type: &str, event: &M::Event) {
        let target = {
            let inner = self.lock();
            if inner.map_blocked {
                return;
            }
            let Some(name) = inner.state.active_name() else {
                return;
            };
            inner.registry.get(name).map(|d| (name.to_string(), d))
        };
        let Some((name, definition)) = target else {
            return;
        };
        let Some(handler) = definition.map.get(event_type) else {
            return;
        };
        if let Err(err) = handler(event) {
            error!(interaction = %name, event_type, "map handler failed: {err:#}");
        }
    }
}
