use crossbeam_channel::Sender;
use serde::Serialize;

use crate::paginator::Page;
use crate::types::{SeriesId, ZoomWindow};

/// Notifications published by [`SignalView`](crate::view::SignalView) after a state change
/// has been fully applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewEvent {
    ZoomChanged(ZoomWindow),
    DetailRendered { bin_size: usize },
    SeriesSkipped { id: SeriesId, reason: String },
    PageChanged(Page),
    Status(String),
}

pub trait ViewListener {
    /// Handle one event. Returning false unsubscribes the listener.
    fn on_event(&mut self, event: &ViewEvent) -> bool;
}

impl ViewListener for Sender<ViewEvent> {
    fn on_event(&mut self, event: &ViewEvent) -> bool {
        self.send(event.clone()).is_ok()
    }
}

/// Ordered fan-out to all registered listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn ViewListener + Send>>,
}

impl EventBus {
    pub fn subscribe(&mut self, listener: Box<dyn ViewListener + Send>) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: ViewEvent) {
        self.listeners.retain_mut(|listener| listener.on_event(&event));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
