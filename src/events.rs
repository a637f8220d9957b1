//! Synchronous publish/subscribe for engine changes.
//!
//! Subscribers run in subscription order on the thread that performed the
//! mutation, before the mutating call returns. Publishing while a delivery
//! is in progress fails with [`EngineError::ReentrantMutation`].

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::model::{Step, Tour};

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    /// The set of tours or a tour's content changed. Carries a snapshot of
    /// the affected tour, or `None` after a bulk reload.
    TourListChanged(Option<Tour>),

    /// The user selected a step of the active tour.
    StepSelected(Step),
}

pub type Subscriber = Box<dyn FnMut(&TourEvent)>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
    cancelled: RefCell<Vec<SubscriptionId>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. One added during a delivery starts with the
    /// next event.
    pub fn subscribe(&self, subscriber: impl FnMut(&TourEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber. One removed during a delivery still receives
    /// the event being delivered.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.dispatching.get() {
            self.cancelled.borrow_mut().push(id);
        }
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Delivers `event` to every subscriber in subscription order.
    ///
    /// If a subscriber panics, the subscriber list is restored before the
    /// panic continues and the bus stays usable.
    pub fn publish(&self, event: &TourEvent) -> Result<()> {
        if self.dispatching.replace(true) {
            return Err(EngineError::ReentrantMutation);
        }

        // Taken out so subscribers may subscribe or unsubscribe meanwhile.
        let mut dispatch = Dispatch {
            bus: self,
            delivering: self.subscribers.take(),
        };
        tracing::trace!(subscribers = dispatch.delivering.len(), ?event, "publishing");
        for (_, subscriber) in &mut dispatch.delivering {
            subscriber(event);
        }
        Ok(())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .field("dispatching", &self.dispatching.get())
            .finish_non_exhaustive()
    }
}

/// An in-progress delivery. Dropping it puts the subscribers back, merged
/// with those added and removed meanwhile, and clears the dispatch flag,
/// also when a subscriber panics.
struct Dispatch<'a> {
    bus: &'a EventBus,
    delivering: Vec<(SubscriptionId, Subscriber)>,
}

impl Drop for Dispatch<'_> {
    fn drop(&mut self) {
        let mut subscribers = std::mem::take(&mut self.delivering);
        subscribers.extend(self.bus.subscribers.take());
        let cancelled = self.bus.cancelled.take();
        subscribers.retain(|(id, _)| !cancelled.contains(id));
        *self.bus.subscribers.borrow_mut() = subscribers;
        self.bus.dispatching.set(false);
    }
}
