//! Tests for the skipped signage point checker.

use chiawatch::handlers::signage_point::{SkippedSignagePoints, ROLLOVER_POINT, SKIP_GRACE_SECS};
use chiawatch::handlers::ConditionChecker;
use chiawatch::notifier::{EventKind, EventPriority, EventService};

use crate::common::{at, msg};

/// A checker already primed with `signage_point` at time zero.
fn primed(signage_point: u32) -> SkippedSignagePoints {
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    assert!(checker.check(&msg(0, signage_point)).is_none());
    checker
}

// ---------------------------------------------------------------------------
// First message
// ---------------------------------------------------------------------------

#[test]
fn first_message_never_fires() {
    for sp in [0, 1, 13, 63, 64, 200] {
        let mut checker = SkippedSignagePoints::new(EventService::FullNode);
        assert_eq!(checker.last_signage_point(), None);
        assert!(checker.check(&msg(0, sp)).is_none());
        assert_eq!(checker.last_signage_point(), Some(sp));
        assert_eq!(checker.last_timestamp(), Some(at(0)));
    }
}

// ---------------------------------------------------------------------------
// Normal advance
// ---------------------------------------------------------------------------

#[test]
fn advance_by_one_is_quiet_for_any_gap() {
    for gap in [0, 1, 9, 14, 15, 60, 3600] {
        let mut checker = primed(10);
        assert!(
            checker.check(&msg(gap, 11)).is_none(),
            "advance by one fired with gap {gap}"
        );
    }
}

#[test]
fn steady_stream_is_quiet() {
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    let mut secs = 0;
    for sp in 1..=ROLLOVER_POINT {
        assert!(checker.check(&msg(secs, sp)).is_none(), "fired at {sp}");
        secs = secs.checked_add(9).expect("small");
    }
    assert!(checker.check(&msg(secs, 1)).is_none());
}

#[test]
fn rollover_from_64_to_1_is_normal() {
    for gap in [0, 9, 30] {
        let mut checker = primed(64);
        assert!(checker.check(&msg(gap, 1)).is_none());
        assert_eq!(checker.last_signage_point(), Some(1));
    }
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

#[test]
fn skip_with_long_gap_fires() {
    let mut checker = primed(10);
    let event = checker
        .check(&msg(SKIP_GRACE_SECS, 13))
        .expect("skip after grace period should fire");

    assert_eq!(event.kind, EventKind::User);
    assert_eq!(event.priority, EventPriority::Normal);
    assert_eq!(event.service, EventService::FullNode);
    assert!(event.message.contains("10/64"), "{}", event.message);
    assert!(event.message.contains("13/64"), "{}", event.message);
    assert_eq!(
        event.message,
        "Experiencing networking issues? Skipped some signage points! Last 10/64, current 13/64."
    );
}

#[test]
fn skip_with_short_gap_is_suppressed_but_state_moves() {
    let mut checker = primed(10);
    assert!(checker.check(&msg(14, 13)).is_none());
    assert_eq!(checker.last_signage_point(), Some(13));
    assert_eq!(checker.last_timestamp(), Some(at(14)));

    // The next point is judged against 13, not 10.
    assert!(checker.check(&msg(23, 14)).is_none());
}

#[test]
fn gap_is_truncated_to_whole_seconds() {
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    assert!(checker.check(&msg(0, 10)).is_none());

    // 14.9 seconds later: truncates to 14, still inside the grace period.
    let almost = chiawatch::parsers::signage_point::SignagePointMessage {
        timestamp: at(14)
            .checked_add_signed(chrono::TimeDelta::milliseconds(900))
            .expect("in range"),
        signage_point: 13,
    };
    assert!(checker.check(&almost).is_none());
}

#[test]
fn decreasing_counter_fires() {
    let mut checker = primed(20);
    let event = checker
        .check(&msg(15, 15))
        .expect("decrease after grace period should fire");
    assert!(event.message.contains("Last 20/64, current 15/64"));
}

#[test]
fn duplicate_counter_fires_after_grace() {
    let mut checker = primed(20);
    assert!(checker.check(&msg(16, 20)).is_some());
}

#[test]
fn duplicate_counter_within_grace_is_suppressed() {
    let mut checker = primed(20);
    assert!(checker.check(&msg(3, 20)).is_none());
}

#[test]
fn wrap_to_wrong_point_fires() {
    let mut checker = primed(64);
    let event = checker.check(&msg(20, 3)).expect("wrapped skip should fire");
    assert!(event.message.contains("Last 64/64, current 3/64"));
}

#[test]
fn backwards_clock_wraps_to_a_long_gap() {
    // Thirty seconds backwards is 86_370 s into the previous day.
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    assert!(checker.check(&msg(100, 10)).is_none());
    let event = checker
        .check(&msg(70, 30))
        .expect("skip across a backwards clock should fire");
    assert!(event.message.contains("Last 10/64, current 30/64"));
    assert_eq!(checker.last_signage_point(), Some(30));
}

#[test]
fn sub_second_backwards_step_is_not_a_short_gap() {
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    assert!(checker.check(&msg(10, 10)).is_none());

    let earlier = chiawatch::parsers::signage_point::SignagePointMessage {
        timestamp: at(10)
            .checked_sub_signed(chrono::TimeDelta::milliseconds(500))
            .expect("in range"),
        signage_point: 12,
    };
    assert!(checker.check(&earlier).is_some());
}

#[test]
fn whole_days_are_dropped_from_the_gap() {
    // One day and five seconds counts as a five second gap.
    let mut checker = primed(10);
    assert!(checker.check(&msg(86_405, 30)).is_none());
    assert_eq!(checker.last_signage_point(), Some(30));

    // One day and twenty seconds counts as twenty.
    let mut checker = primed(10);
    assert!(checker.check(&msg(86_420, 30)).is_some());
}

#[test]
fn network_scramble_only_reports_real_gap() {
    // Reordered and duplicated points arriving within seconds of each
    // other, followed by a real stall.
    let mut checker = SkippedSignagePoints::new(EventService::FullNode);
    let sequence = [
        (0, 40),
        (2, 42),
        (3, 41),
        (4, 43),
        (13, 44),
        (22, 45),
        (60, 50),
    ];

    let fired: Vec<u32> = sequence
        .iter()
        .filter_map(|&(secs, sp)| checker.check(&msg(secs, sp)).map(|_| sp))
        .collect();

    assert_eq!(fired, vec![50]);
}

#[test]
fn service_comes_from_construction() {
    let mut checker = SkippedSignagePoints::new(EventService::Harvester);
    assert!(checker.check(&msg(0, 1)).is_none());
    let event = checker.check(&msg(30, 5)).expect("skip should fire");
    assert_eq!(event.service, EventService::Harvester);
}
