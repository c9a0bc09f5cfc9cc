//! The host map surface, seen from the handler.
//!
//! The handler never renders anything. It only attaches/detaches the opaque
//! behavior objects carried by interaction definitions and subscribes to named
//! surface events.

use std::sync::Arc;

/// Listener subscribed to a surface event type.
///
/// Surfaces identify listeners by `Arc` pointer identity, so `un` must be
/// handed a clone of the same `Arc` that was passed to `on`.
pub type MapListener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Capability offered by the host map surface.
pub trait MapSurface: Send + Sync + 'static {
    /// Event object delivered by the surface and passed through to callbacks
    type Event: Clone + Send + Sync + 'static;
    /// Attachable behavior, e.g. a drawing tool
    type Behavior: Send + Sync + 'static;

    /// Attach a behavior to the surface.
    fn add_interaction(&self, behavior: &Self::Behavior) -> anyhow::Result<()>;

    /// Detach a previously attached behavior.
    fn remove_interaction(&self, behavior: &Self::Behavior) -> anyhow::Result<()>;

    /// Subscribe `listener` to events of `event_type`.
    fn on(&self, event_type: &str, listener: MapListener<Self::Event>);

    /// Unsubscribe `listener` from events of `event_type`.
    fn un(&self, event_type: &str, listener: &MapListener<Self::Event>);
}
