//! Binding UI elements to interactions.
//!
//! A convenience layer: element events either start the interaction named by
//! the element's value (tool buttons) or only interrupt whatever is active
//! (cancel buttons). Nothing here touches lifecycle state directly; it all
//! goes through `start_interaction` and `interrupt_with`.

use crate::interaction::{Continuation, InteractionHandler};
use crate::map::MapSurface;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Listener installed on an element; the returned disposition tells the host
/// whether to let the event's default behavior and propagation continue.
pub type UiListener<E> = Arc<dyn Fn(Option<&E>) -> EventDisposition + Send + Sync>;

/// Callback without arguments run by a binding
pub type UiCallback = Arc<dyn Fn() + Send + Sync>;

/// What the host should do with an element event after the listener ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Let the default behavior and propagation continue
    Continue,
    /// Prevent the default behavior and stop propagation
    Suppress,
}

/// A host UI element that can be bound to the handler.
pub trait UiElement<E>: Send + Sync + 'static {
    /// The element's value, used as the interaction name by default
    fn value(&self) -> Option<String>;

    /// Install `listener` for `event_type` events on this element.
    fn add_event_listener(&self, event_type: &str, listener: UiListener<E>);

    /// Trigger the element's click again.
    fn click(&self);
}

/// How a start binding picks the interaction name
pub enum ValueSource<E> {
    /// The element's own `value()`
    ElementValue,
    /// A fixed interaction name
    Constant(String),
    /// Computed from the element
    Computed(Arc<dyn Fn(&dyn UiElement<E>) -> Option<String> + Send + Sync>),
}

impl<E: 'static> ValueSource<E> {
    fn resolve(&self, element: &dyn UiElement<E>) -> Option<String> {
        match self {
            Self::ElementValue => element.value(),
            Self::Constant(name) => Some(name.clone()),
            Self::Computed(compute) => compute(element),
        }
    }
}

/// What a binding does when its event fires
#[derive(Default)]
pub enum BindingMode {
    /// Start the interaction named by the value source
    #[default]
    Start,
    /// Only interrupt the active interaction, running `on_interrupt` afterwards
    InterruptOnly { on_interrupt: Option<UiCallback> },
}

pub struct UiBindingOptions<E> {
    event_type: String,
    value: ValueSource<E>,
    always: Option<UiCallback>,
    mode: BindingMode,
}

impl<E> Default for UiBindingOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> UiBindingOptions<E> {
    /// Start bindings on `click`, named by the element's value.
    pub fn new() -> Self {
        Self {
            event_type: crate::constants::DEFAULT_UI_EVENT.to_string(),
            value: ValueSource::ElementValue,
            always: None,
            mode: BindingMode::Start,
        }
    }

    pub fn event(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn value(mut self, value: ValueSource<E>) -> Self {
        self.value = value;
        self
    }

    /// Fixed interaction name instead of the element's value.
    pub fn constant(self, name: impl Into<String>) -> Self {
        self.value(ValueSource::Constant(name.into()))
    }

    /// Run `always` on every event, before any interaction handling.
    pub fn always<F>(mut self, always: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.always = Some(Arc::new(always));
        self
    }

    /// Only interrupt, e.g. for a cancel button. `on_interrupt` runs every time
    /// the interrupt goes through, whether or not anything was active.
    pub fn interrupt_only(mut self, on_interrupt: Option<UiCallback>) -> Self {
        self.mode = BindingMode::InterruptOnly { on_interrupt };
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

impl<M: MapSurface> InteractionHandler<M> {
    /// Binding options using the configured default UI event.
    pub fn ui_binding_options(&self) -> UiBindingOptions<M::Event> {
        UiBindingOptions::new().event(self.shared.ui_event.clone())
    }

    /// Install listeners driving this handler on every element in `elements`.
    pub fn bind_ui_elements<I>(&self, elements: I, options: UiBindingOptions<M::Event>)
    where
        I: IntoIterator<Item = Arc<dyn UiElement<M::Event>>>,
    {
        let options = Arc::new(options);
        for element in elements {
            let listener = self.ui_listener(Arc::downgrade(&element), Arc::clone(&options));
            element.add_event_listener(&options.event_type, listener);
        }
    }

    fn ui_listener(
        &self,
        element: Weak<dyn UiElement<M::Event>>,
        options: Arc<UiBindingOptions<M::Event>>,
    ) -> UiListener<M::Event> {
        let handler = self.clone();
        Arc::new(move |event: Option<&M::Event>| {
            if let Some(always) = &options.always {
                always();
            }
            let Some(element) = element.upgrade() else {
                return EventDisposition::Continue;
            };
            match &options.mode {
                BindingMode::Start => {
                    match options.value.resolve(element.as_ref()) {
                        Some(name) => handler.start_from_ui(&name, event.cloned()),
                        None => debug!("bound element has no interaction value"),
                    }
                    EventDisposition::Continue
                }
                BindingMode::InterruptOnly { on_interrupt } => {
                    handler.interrupt_from_ui(&element, on_interrupt.clone(), event.cloned())
                }
            }
        })
    }

    fn start_from_ui(&self, name: &str, event: Option<M::Event>) {
        let restart = self.lock().state.is_active_named(name);
        if restart {
            self.start_interaction(name, event);
            return;
        }
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
    }

    fn interrupt_from_ui(
        &self,
        element: &Arc<dyn UiElement<M::Event>>,
        on_interrupt: Option<UiCallback>,
        event: Option<M::Event>,
    ) -> EventDisposition {
        // a gated interrupt may resolve later, so hold the event back and
        // replay the click once it is confirmed
        let gated = self.interrupt_is_gated();
        let retrigger = Arc::downgrade(element);
        let after: Continuation = Box::new(move || {
            if let Some(on_interrupt) = on_interrupt {
                on_interrupt();
            }
            if gated {
                if let Some(element) = retrigger.upgrade() {
                    element.click();
                }
            }
        });
        self.interrupt_with(event, Some(after), None);
        if gated {
            EventDisposition::Suppress
        } else {
            EventDisposition::Continue
        }
    }
}
