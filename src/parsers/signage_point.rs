//! Parser for "Finished signage point" lines from the full node.
//!
//! The full node logs one such line per signage point, e.g.
//!
//! ```text
//! 2021-04-18T19:37:19.811 full_node chia.full_node.full_node: INFO     ⏲️  Finished signage point 18/64: CC: 3bb5... RC: 9d2d...
//! ```

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

/// Timestamp layout printed at the start of every Chia log line.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static SIGNAGE_POINT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?) full_node (?:src|chia)\.full_node\.full_node\s*: INFO\s+[^\n]*?Finished signage point (\d+)/64",
    )
    .expect("signage point regex is valid")
});

/// A finished signage point extracted from one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignagePointMessage {
    /// When the full node logged the line (local wall-clock time).
    pub timestamp: NaiveDateTime,
    /// Signage point index, cycling through `1..=64`.
    pub signage_point: u32,
}

/// Extracts [`SignagePointMessage`]s from raw full node logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignagePointParser;

impl SignagePointParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse every matching line in `logs`, preserving input order.
    ///
    /// Lines that don't match, or whose timestamp or counter can't be
    /// converted, are skipped.
    pub fn parse(&self, logs: &str) -> Vec<SignagePointMessage> {
        let mut messages = Vec::new();

        for caps in SIGNAGE_POINT_REGEX.captures_iter(logs) {
            let (_, [raw_ts, raw_sp]) = caps.extract();

            let timestamp = match NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT) {
                Ok(ts) => ts,
                Err(e) => {
                    debug!(timestamp = raw_ts, error = %e, "skipping line with bad timestamp");
                    continue;
                }
            };
            let signage_point = match raw_sp.parse::<u32>() {
                Ok(sp) => sp,
                Err(e) => {
                    debug!(signage_point = raw_sp, error = %e, "skipping line with bad counter");
                    continue;
                }
            };

            messages.push(SignagePointMessage {
                timestamp,
                signage_point,
            });
        }

        if !messages.is_empty() {
            debug!(count = messages.len(), "parsed signage point messages");
        }

        messages
    }
}
