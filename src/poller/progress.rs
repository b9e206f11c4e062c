//! Per-minute fetch statistics.

use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// One emitted summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// 1-based count of reports emitted so far.
    pub minute: u64,
    /// Attempts since the previous report.
    pub attempts: u64,
    /// Successful fetches since the previous report.
    pub successes: u64,
    /// Attempts since the logger was created.
    pub total_attempts: u64,
    /// Successful fetches since the logger was created.
    pub total_successes: u64,
}

/// Counts fetch attempts and successes and logs a summary once per
/// reporting window.
#[derive(Debug)]
pub struct ProgressLogger {
    interval: Duration,
    window_start: Instant,
    attempts: u64,
    successes: u64,
    total_attempts: u64,
    total_successes: u64,
    minute: u64,
}

impl ProgressLogger {
    /// Start counting now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            window_start: start,
            attempts: 0,
            successes: 0,
            total_attempts: 0,
            total_successes: 0,
            minute: 0,
        }
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    /// Emit and return a summary if a full window has elapsed at `now`,
    /// then start a new window.
    pub fn report_if_due(&mut self, now: Instant) -> Option<ProgressReport> {
        if now.saturating_duration_since(self.window_start) < self.interval {
            return None;
        }

        self.minute += 1;
        self.total_attempts += self.attempts;
        self.total_successes += self.successes;

        let report = ProgressReport {
            minute: self.minute,
            attempts: self.attempts,
            successes: self.successes,
            total_attempts: self.total_attempts,
            total_successes: self.total_successes,
        };

        info!(
            "Minute {}: {} prices fetched in {} attempts (total {} in {})",
            report.minute,
            report.successes,
            report.attempts,
            report.total_successes,
            report.total_attempts
        );

        self.attempts = 0;
        self.successes = 0;
        self.window_start = now;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_no_report_before_interval() {
        let start = Instant::now();
        let mut logger = ProgressLogger::starting_at(MINUTE, start);
        logger.record_attempt();
        logger.record_success();
        assert_eq!(logger.report_if_due(start + Duration::from_secs(59)), None);
    }

    #[test]
    fn test_report_and_reset() {
        let start = Instant::now();
        let mut logger = ProgressLogger::starting_at(MINUTE, start);
        for _ in 0..5 {
            logger.record_attempt();
        }
        for _ in 0..3 {
            logger.record_success();
        }

        let first = logger.report_if_due(start + MINUTE).unwrap();
        assert_eq!(
            first,
            ProgressReport {
                minute: 1,
                attempts: 5,
                successes: 3,
                total_attempts: 5,
                total_successes: 3,
            }
        );

        // The window restarted at the report time.
        assert_eq!(logger.report_if_due(start + MINUTE + Duration::from_secs(30)), None);

        logger.record_attempt();
        logger.record_success();
        let second = logger.report_if_due(start + MINUTE * 2).unwrap();
        assert_eq!(second.minute, 2);
        assert_eq!(second.attempts, 1);
        assert_eq!(second.successes, 1);
        assert_eq!(second.total_attempts, 6);
        assert_eq!(second.total_successes, 4);
    }

    #[test]
    fn test_empty_minute_still_reports() {
        let start = Instant::now();
        let mut logger = ProgressLogger::starting_at(MINUTE, start);
        let report = logger.report_if_due(start + Duration::from_secs(90)).unwrap();
        assert_eq!(report.attempts, 0);
        assert_eq!(report.total_attempts, 0);
    }
}
