use std::time::{Duration, Instant};

use crate::error::{ApiError, ApiResult};

/// Retry schedule for the analysis endpoint's 202 responses.
///
/// After each "still processing" answer the next request becomes due no
/// sooner than `interval` later (5 seconds by default). Attempts are
/// capped so an endpoint that never finishes eventually reports a timeout
/// instead of polling forever.
#[derive(Debug, Clone)]
pub struct AnalysisPoller {
    symbol: String,
    interval: Duration,
    max_attempts: u32,
    attempts: u32,
    next_due: Instant,
}

impl AnalysisPoller {
    pub fn new(symbol: &str, interval: Duration, max_attempts: u32) -> Self {
        Self::new_at(symbol, interval, max_attempts, Instant::now())
    }

    pub fn new_at(symbol: &str, interval: Duration, max_attempts: u32, now: Instant) -> Self {
        Self {
            symbol: symbol.to_string(),
            interval,
            max_attempts,
            attempts: 0,
            // First follow-up waits a full interval after the initial 202
            next_due: now + interval,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether enough time has passed to issue the next request.
    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    pub fn is_due_at(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Record another 202 and reschedule, or fail once the cap is hit.
    pub fn record_processing(&mut self) -> ApiResult<()> {
        self.record_processing_at(Instant::now())
    }

    pub fn record_processing_at(&mut self, now: Instant) -> ApiResult<()> {
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            return Err(ApiError::AnalysisTimeout {
                symbol: self.symbol.clone(),
                attempts: self.attempts,
            });
        }
        self.next_due = now + self.interval;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_interval() {
        let start = Instant::now();
        let poller = AnalysisPoller::new_at("AAPL", Duration::from_secs(5), 10, start);

        assert!(!poller.is_due_at(start));
        assert!(!poller.is_due_at(start + Duration::from_secs(4)));
        assert!(poller.is_due_at(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_processing_reschedules_full_interval() {
        let start = Instant::now();
        let mut poller = AnalysisPoller::new_at("AAPL", Duration::from_secs(5), 10, start);

        let first_due = start + Duration::from_secs(5);
        poller.record_processing_at(first_due).unwrap();

        // Next request is due no sooner than 5s after the previous response
        assert!(!poller.is_due_at(first_due + Duration::from_secs(4)));
        assert!(poller.is_due_at(first_due + Duration::from_secs(5)));
        assert_eq!(poller.attempts(), 1);
    }

    #[test]
    fn test_attempt_cap_reports_timeout() {
        let start = Instant::now();
        let mut poller = AnalysisPoller::new_at("MSFT", Duration::from_millis(1), 3, start);

        poller.record_processing_at(start).unwrap();
        poller.record_processing_at(start).unwrap();
        let err = poller.record_processing_at(start).unwrap_err();

        match err {
            ApiError::AnalysisTimeout { symbol, attempts } => {
                assert_eq!(symbol, "MSFT");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected AnalysisTimeout, got {:?}", other),
        }
    }
}
