//! Synchronous observer lists plus the payloads the creature publishes.

use std::fmt;

use crate::math::Vec3d;

type Handler<E> = Box<dyn FnMut(&E) + Send + Sync>;

/// Token returned by [`EventEmitter::subscribe`]; hand it back to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

pub struct EventEmitter<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self { next_id: 0, handlers: Vec::new() }
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter").field("handlers", &self.handlers.len()).finish()
    }
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        Subscription(id)
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription.0);
        self.handlers.len() != before
    }

    /// Runs handlers in subscription order.
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A foot touched down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    pub leg: usize,
    pub position: Vec3d,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitGroundEvent {
    pub position: Vec3d,
    /// Downward speed just before the body was stopped.
    pub impact_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackEvent {
    pub direction: Vec3d,
    pub strength: f64,
}
