// The analysis endpoint answers 202 while the report is generated
// server-side. The client must wait at least the poll interval between
// requests and must eventually give up instead of polling forever.

use std::time::{Duration, Instant};

use screener_cli::config::Config;
use screener_cli::error::ApiError;
use screener_cli::poller::AnalysisPoller;

#[test]
fn follow_up_requests_are_spaced_by_the_poll_interval() {
    let start = Instant::now();
    let interval = Duration::from_secs(5);
    let mut poller = AnalysisPoller::new_at("AAPL", interval, 120, start);

    // Initial 202 received at `start`: nothing due during the first 5s
    for millis in [0u64, 1000, 2500, 4999] {
        assert!(
            !poller.is_due_at(start + Duration::from_millis(millis)),
            "poll fired {}ms after the 202",
            millis
        );
    }
    assert!(poller.is_due_at(start + interval));

    // Another 202 at t=6s reschedules relative to that response
    let second_202 = start + Duration::from_secs(6);
    poller.record_processing_at(second_202).unwrap();
    assert!(!poller.is_due_at(second_202 + Duration::from_millis(4999)));
    assert!(poller.is_due_at(second_202 + Duration::from_secs(5)));
}

#[test]
fn polling_survives_many_attempts_below_the_cap() {
    let start = Instant::now();
    let mut poller = AnalysisPoller::new_at("MSFT", Duration::from_secs(5), 120, start);

    let mut now = start;
    for _ in 0..119 {
        now += Duration::from_secs(5);
        poller.record_processing_at(now).expect("below the cap");
    }
    assert_eq!(poller.attempts(), 119);
}

#[test]
fn exhausted_cap_turns_into_a_timeout_error() {
    let start = Instant::now();
    let mut poller = AnalysisPoller::new_at("GOOG", Duration::from_secs(5), 2, start);

    poller.record_processing_at(start).unwrap();
    match poller.record_processing_at(start) {
        Err(ApiError::AnalysisTimeout { symbol, attempts }) => {
            assert_eq!(symbol, "GOOG");
            assert_eq!(attempts, 2);
        }
        other => panic!("expected timeout, got {:?}", other.err()),
    }
}

#[test]
fn default_config_polls_every_five_seconds() {
    let config = Config::default();
    assert_eq!(config.poll_interval(), Duration::from_secs(5));
    assert!(config.server.poll_max_attempts > 0);
}
