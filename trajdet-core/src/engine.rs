//! Engine side of the detector contract
//!
//! The transport engine only needs to accept listeners and push events at
//! them. [`ReplayEngine`] does exactly that for a recorded event sequence.
//! Listeners are held weakly: dropping the last strong handle to a detector
//! unsubscribes it.

use crate::detector::Detector;
use crate::error::DetectorError;
use crate::event::{Event, EventKind};
use std::cell::RefCell;
use std::rc::Weak;
use tracing::{debug, warn};

/// Anything detectors can subscribe to
pub trait Engine {
    /// Register a listener. Duplicate or late registrations may be refused.
    fn add_listener(&mut self, listener: Weak<RefCell<dyn Detector>>) -> Result<(), DetectorError>;
}

/// Delivers recorded events to registered detectors, in registration order
#[derive(Default)]
pub struct ReplayEngine {
    listeners: Vec<Weak<RefCell<dyn Detector>>>,
    started: bool,
    delivered: u64,
}

impl ReplayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners whose detector is still alive
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }

    /// Whether any event has been emitted yet
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Events emitted so far
    pub fn events_delivered(&self) -> u64 {
        self.delivered
    }

    /// Deliver one event to every live listener
    pub fn emit(&mut self, event: &Event) {
        self.started = true;
        self.delivered += 1;

        let before = self.listeners.len();
        self.listeners.retain(|l| l.strong_count() > 0);
        if self.listeners.len() != before {
            debug!(dropped = before - self.listeners.len(), "pruned dropped listeners");
        }

        for listener in &self.listeners {
            let Some(detector) = listener.upgrade() else {
                continue;
            };
            match detector.try_borrow_mut() {
                Ok(mut guard) => guard.on_event(event),
                Err(_) => warn!(id = event.id, "listener busy, event skipped"),
            };
        }
    }

    /// Emit every event of `events` in order; returns how many were emitted
    pub fn replay<I>(&mut self, events: I) -> u64
    where
        I: IntoIterator<Item = Event>,
    {
        let mut count = 0;
        for event in events {
            self.emit(&event);
            count += 1;
        }
        debug!(events = count, "replay finished");
        count
    }

    /// Emit a run-level event that carries no electron state
    pub fn emit_kind(&mut self, kind: EventKind) {
        self.emit(&Event::bare(kind));
    }
}

impl Engine for ReplayEngine {
    fn add_listener(&mut self, listener: Weak<RefCell<dyn Detector>>) -> Result<(), DetectorError> {
        if self.started {
            return Err(DetectorError::Setup(
                "cannot register a listener after the run has started".to_string(),
            ));
        }
        if listener.strong_count() == 0 {
            return Err(DetectorError::Setup("listener has already been dropped".to_string()));
        }
        if self.listeners.iter().any(|l| Weak::ptr_eq(l, &listener)) {
            return Err(DetectorError::Setup("listener is already registered".to_string()));
        }
        self.listeners.push(listener);
        debug!(listeners = self.listeners.len(), "listener added");
        Ok(())
    }
}
