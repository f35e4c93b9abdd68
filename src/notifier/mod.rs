//! Notification events and delivery sinks.
//!
//! Condition checkers produce [`Event`]s; a [`NotifyManager`] fans them out
//! to every configured [`Notifier`]. Delivery failures are reported as a
//! boolean and never feed back into checker state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod telegram;

/// Category of an event, deciding which sinks deliver it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Meant for a human reader.
    User,
    /// Liveness signal; never delivered to users.
    Keepalive,
}

/// Ordered priority of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    /// Delivered silently.
    Low,
    /// Regular notification.
    Normal,
    /// Delivered with an attention marker.
    High,
}

/// Upstream Chia subsystem an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventService {
    /// The full node.
    FullNode,
    /// The harvester.
    Harvester,
    /// The farmer.
    Farmer,
    /// The wallet.
    Wallet,
    /// The chia daemon.
    Daemon,
}

impl EventService {
    /// Upper-case label used in notification titles.
    pub fn label(self) -> &'static str {
        match self {
            Self::FullNode => "FULL_NODE",
            Self::Harvester => "HARVESTER",
            Self::Farmer => "FARMER",
            Self::Wallet => "WALLET",
            Self::Daemon => "DAEMON",
        }
    }
}

impl std::fmt::Display for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A notable occurrence produced by a condition checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Delivery category.
    pub kind: EventKind,
    /// Priority level.
    pub priority: EventPriority,
    /// Subsystem the event concerns.
    pub service: EventService,
    /// Human-readable description.
    pub message: String,
}

/// A sink that delivers events to a user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Deliver every user-facing event in `events`.
    ///
    /// Returns `true` when at least one delivery failed.
    async fn send_events_to_user(&self, events: &[Event]) -> bool;
}

/// Fans events out to all configured notifiers.
#[derive(Default)]
pub struct NotifyManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifyManager {
    /// Create a manager over the given notifiers.
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Number of registered notifiers.
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Whether no notifier is registered.
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Send `events` through every notifier in registration order.
    ///
    /// Returns `true` when any notifier reported a delivery failure.
    pub async fn process_events(&self, events: &[Event]) -> bool {
        if events.is_empty() {
            return false;
        }

        let mut errors = false;
        for notifier in &self.notifiers {
            if notifier.send_events_to_user(events).await {
                warn!(notifier = notifier.name(), "failed to deliver some events");
                errors = true;
            } else {
                debug!(
                    notifier = notifier.name(),
                    count = events.len(),
                    "events delivered"
                );
            }
        }
        errors
    }
}
