// Integration tests for the countdown engine and driver.
// Native-friendly: synthetic instants, no browser clock.

use chrono::{DateTime, Duration, FixedOffset};
use tet_countdown::countdown::{Countdown, CountdownEngine, TimeLeft};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn total_ms(left: &TimeLeft) -> i64 {
    ((left.days as i64 * 24 + left.hours as i64) * 60 + left.minutes as i64) * 60_000 + left.seconds as i64 * 1_000
}

#[test]
fn fields_rebuild_the_truncated_difference() {
    let engine = CountdownEngine::default();
    let target = engine.target().timestamp_millis();
    // Sweep offsets from sub-second up to ~400 days with awkward remainders.
    let mut diff: i64 = 1;
    while diff < 400 * 86_400_000 {
        let got = engine.sample_millis(target - diff);
        let left = got.time_left().unwrap_or_else(|| panic!("reached too early at diff {diff}"));
        assert_eq!(total_ms(&left), diff / 1_000 * 1_000, "diff {diff}");
        assert!(left.hours < 24 && left.minutes < 60 && left.seconds < 60, "out of range {:?}", left);
        diff = diff * 3 + 7;
    }
}

#[test]
fn reached_for_every_instant_at_or_past_target() {
    let engine = CountdownEngine::default();
    let target = engine.target().timestamp_millis();
    for past in [0, 1, 999, 1_000, 86_400_000, 10 * 365 * 86_400_000] {
        assert_eq!(engine.sample_millis(target + past), Countdown::Reached, "target + {past}ms");
    }
}

#[test]
fn total_seconds_strictly_decrease_across_whole_seconds() {
    let engine = CountdownEngine::default();
    let start = at("2026-01-01T00:00:00+07:00");
    let mut prev: Option<u64> = None;
    for step in 0..500 {
        let now = start + Duration::seconds(step * 7_919);
        let Countdown::Counting(left) = engine.sample(&now) else {
            break;
        };
        let total = left.total_seconds();
        if let Some(p) = prev {
            assert!(total < p, "not decreasing at step {step}: {total} >= {p}");
        }
        prev = Some(total);
    }
    assert!(prev.is_some());
}

#[test]
fn last_second_before_tet() {
    let engine = CountdownEngine::new(at("2026-02-17T00:00:00+07:00"));
    assert_eq!(
        engine.sample(&at("2026-02-16T23:59:59+07:00")),
        Countdown::Counting(TimeLeft { days: 0, hours: 0, minutes: 0, seconds: 1 })
    );
}

#[test]
fn one_second_after_tet() {
    let engine = CountdownEngine::new(at("2026-02-17T00:00:00+07:00"));
    assert_eq!(engine.sample(&at("2026-02-17T00:00:01+07:00")), Countdown::Reached);
}

#[test]
fn new_year_in_hanoi_from_utc_clock() {
    let engine = CountdownEngine::default();
    let left = engine.sample(&at("2026-01-01T00:00:00Z")).time_left().unwrap();
    // 2026-01-01T07:00+07 to 2026-02-17T00:00+07 is 46 days 17 hours.
    assert_eq!(left, TimeLeft { days: 46, hours: 17, minutes: 0, seconds: 0 });
}
