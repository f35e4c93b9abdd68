//! Handler for finished signage point activity of the full node.
//!
//! The full node finishes a signage point roughly every 9.4 seconds and
//! the index wraps at 64. A missing index usually means the node lost
//! connectivity and could not take part in some challenges.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info, warn};

use super::{ConditionChecker, LogHandler};
use crate::notifier::{Event, EventKind, EventPriority, EventService};
use crate::parsers::signage_point::{SignagePointMessage, SignagePointParser};

/// Number of signage points per sub-slot; the index wraps after this.
pub const ROLLOVER_POINT: u32 = 64;

/// Gaps shorter than this are network-wide noise rather than a local skip.
///
/// Points arrive every 8-10 seconds, so a real skip shows up as a gap of
/// at least two intervals.
pub const SKIP_GRACE_SECS: i64 = 15;

/// Roughly how long the index takes to cycle through all 64 points.
const FULL_CYCLE_SECS: i64 = 600;

const SECS_PER_DAY: i64 = 86_400;

/// Boxed checker over signage point messages.
pub type SignagePointChecker = Box<dyn ConditionChecker<SignagePointMessage>>;

/// Parses signage point lines and runs them through its checkers.
pub struct SignagePointHandler {
    parser: SignagePointParser,
    checkers: Vec<SignagePointChecker>,
}

impl SignagePointHandler {
    /// Create a handler with the default checkers, tagging events with `service`.
    pub fn new(service: EventService) -> Self {
        Self::with_checkers(vec![Box::new(SkippedSignagePoints::new(service))])
    }

    /// Create a handler with an explicit checker list, run in the given order.
    pub fn with_checkers(checkers: Vec<SignagePointChecker>) -> Self {
        Self {
            parser: SignagePointParser::new(),
            checkers,
        }
    }

    /// Number of registered checkers.
    pub fn checker_count(&self) -> usize {
        self.checkers.len()
    }
}

impl LogHandler for SignagePointHandler {
    fn handle(&mut self, logs: &str) -> Vec<Event> {
        let messages = self.parser.parse(logs);

        let mut events = Vec::new();
        for message in &messages {
            for checker in &mut self.checkers {
                if let Some(event) = checker.check(message) {
                    events.push(event);
                }
            }
        }
        events
    }
}

/// The last signage point a checker accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastSeen {
    timestamp: NaiveDateTime,
    signage_point: u32,
}

/// Fires when the full node skips signage points.
///
/// Compares each index with the previous one modulo [`ROLLOVER_POINT`].
/// Anything other than an advance by exactly one counts as a skip, but is
/// only reported when at least [`SKIP_GRACE_SECS`] passed since the
/// previous point. The gap is the seconds-within-day part of the elapsed
/// time; clock skew is not corrected.
#[derive(Debug)]
pub struct SkippedSignagePoints {
    service: EventService,
    last: Option<LastSeen>,
}

impl SkippedSignagePoints {
    /// Create an unprimed checker whose events concern `service`.
    pub fn new(service: EventService) -> Self {
        info!("enabled check for finished signage points");
        Self {
            service,
            last: None,
        }
    }

    /// Index of the last accepted signage point, if any.
    pub fn last_signage_point(&self) -> Option<u32> {
        self.last.map(|l| l.signage_point)
    }

    /// Timestamp of the last accepted signage point, if any.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last.map(|l| l.timestamp)
    }
}

impl ConditionChecker<SignagePointMessage> for SkippedSignagePoints {
    fn check(&mut self, message: &SignagePointMessage) -> Option<Event> {
        let current = LastSeen {
            timestamp: message.timestamp,
            signage_point: message.signage_point,
        };

        let last = self.last.replace(current)?;

        let time_diff_seconds =
            seconds_component(message.timestamp.signed_duration_since(last.timestamp));
        let expected_next = last.signage_point % ROLLOVER_POINT;
        let increment_diff =
            i64::from(message.signage_point).saturating_sub(i64::from(expected_next));

        if increment_diff == 1 {
            if time_diff_seconds >= FULL_CYCLE_SECS {
                debug!(
                    last = last.signage_point,
                    current = message.signage_point,
                    time_diff_seconds,
                    "signage point advanced after more than a full cycle"
                );
            }
            return None;
        }

        if time_diff_seconds < SKIP_GRACE_SECS {
            info!(
                last = last.signage_point,
                current = message.signage_point,
                time_diff_seconds,
                "detected unusual network activity, seems unrelated to the local node, ignoring"
            );
            return None;
        }

        let text = format!(
            "Experiencing networking issues? Skipped some signage points! \
             Last {last}/{ROLLOVER_POINT}, current {current}/{ROLLOVER_POINT}.",
            last = last.signage_point,
            current = message.signage_point,
        );
        warn!(
            last = last.signage_point,
            current = message.signage_point,
            time_diff_seconds,
            "skipped signage points"
        );

        Some(Event {
            kind: EventKind::User,
            priority: EventPriority::Normal,
            service: self.service,
            message: text,
        })
    }
}

/// Seconds-within-day component of a duration, always in `0..86_400`.
///
/// The day part is dropped and negative durations borrow a whole day, so
/// `-30s` yields `86_370` and `1d 5s` yields `5`.
fn seconds_component(delta: TimeDelta) -> i64 {
    let whole = delta.num_seconds();
    let floored = if delta.subsec_nanos() < 0 {
        whole.saturating_sub(1)
    } else {
        whole
    };
    floored.rem_euclid(SECS_PER_DAY)
}
