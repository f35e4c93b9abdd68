//! Log handlers and the condition checkers they drive.
//!
//! A [`LogHandler`] owns a parser and an ordered list of
//! [`ConditionChecker`]s. Handlers keep no state of their own; all state
//! lives in the checkers, which are only ever driven through `&mut self`
//! by the single task that owns the handler.

use crate::notifier::Event;

pub mod signage_point;

/// Turns one batch of raw log text into notable events.
pub trait LogHandler: Send {
    /// Parse `logs`, run every message through every checker, and collect
    /// the emitted events in order.
    fn handle(&mut self, logs: &str) -> Vec<Event>;
}

/// A stateful condition evaluated over a sequence of messages.
pub trait ConditionChecker<M>: Send {
    /// Inspect the next message; return an event if the condition fires.
    fn check(&mut self, message: &M) -> Option<Event>;
}
