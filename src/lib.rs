//! Chiawatch: watches Chia full node logs and reports anomalies.
//!
//! Raw log text flows through a parser into typed messages, stateful
//! condition checkers decide what is worth reporting, and notifiers
//! deliver the resulting events via Telegram.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading and validation.
pub mod config;
/// `.env` credential loading.
pub mod credentials;
/// Log handlers and condition checkers.
pub mod handlers;
/// Tracing subscriber setup.
pub mod logging;
/// Event model and notification sinks.
pub mod notifier;
/// Log line parsers.
pub mod parsers;
/// Incremental log file tailing.
pub mod watcher;
