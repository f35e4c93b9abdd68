//! Shared fixtures for signage point tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use chiawatch::parsers::signage_point::SignagePointMessage;

/// Start of every fixture timeline.
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 4, 18)
        .and_then(|d| d.and_hms_milli_opt(19, 37, 19, 811))
        .expect("valid fixture time")
}

/// `secs` after [`base_time`].
pub fn at(secs: i64) -> NaiveDateTime {
    base_time()
        .checked_add_signed(TimeDelta::seconds(secs))
        .expect("fixture time in range")
}

/// A message `secs` after [`base_time`] carrying `signage_point`.
pub fn msg(secs: i64, signage_point: u32) -> SignagePointMessage {
    SignagePointMessage {
        timestamp: at(secs),
        signage_point,
    }
}

/// A full node "Finished signage point" log line as the node prints it.
pub fn sp_line(secs: i64, signage_point: u32) -> String {
    format!(
        "{} full_node chia.full_node.full_node: INFO     \u{23f2}\u{fe0f}  Finished signage point {signage_point}/64: CC: 3bb5b1c2a0f7e9d4 RC: 9d2d6a1f4c8b0e37",
        at(secs).format("%Y-%m-%dT%H:%M:%S%.3f"),
    )
}

/// Unrelated full node chatter interleaved with the interesting lines.
pub fn noise_line(secs: i64) -> String {
    format!(
        "{} full_node chia.full_node.full_node: INFO     Added unfinished_block 7f3a, not farmed by us, SP: 12 farmer response time: 0.0042",
        at(secs).format("%Y-%m-%dT%H:%M:%S%.3f"),
    )
}

/// Join lines into a log batch with a trailing newline.
pub fn batch(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
