//! Timeout configuration for search requests.

use std::time::Duration;

/// Timeout configuration for a backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Time until response headers arrive.
    pub response: Duration,
    /// Total request timeout, body included.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, response: Duration, total: Duration) -> Self {
        Self {
            connect,
            response,
            total,
        }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: total / 4,
            response: total / 2,
            total,
        }
    }

    /// Create from a connect and a total timeout, in milliseconds.
    ///
    /// Response headers may take up to the whole total.
    pub fn from_millis(connect_ms: u64, total_ms: u64) -> Self {
        let total = Duration::from_millis(total_ms);
        Self {
            connect: Duration::from_millis(connect_ms).min(total),
            response: total,
            total,
        }
    }

    /// Set the response timeout, capped at the total.
    pub fn with_response(mut self, response: Duration) -> Self {
        self.response = response.min(self.total);
        self
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_millis(2_000, 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total() {
        let t = TimeoutConfig::from_total(Duration::from_millis(800));
        assert_eq!(t.connect, Duration::from_millis(200));
        assert_eq!(t.response, Duration::from_millis(400));
        assert_eq!(t.total, Duration::from_millis(800));
    }

    #[test]
    fn test_connect_never_exceeds_total() {
        let t = TimeoutConfig::from_millis(5_000, 1_000);
        assert_eq!(t.connect, Duration::from_secs(1));
        assert_eq!(t.response, Duration::from_secs(1));
    }

    #[test]
    fn test_response_timeout_is_capped_at_total() {
        let t = TimeoutConfig::from_millis(500, 3_000);
        assert_eq!(t.with_response(Duration::from_secs(1)).response, Duration::from_secs(1));
        assert_eq!(t.with_response(Duration::from_secs(9)).response, Duration::from_secs(3));
    }

    #[test]
    fn test_default() {
        let t = TimeoutConfig::default();
        assert_eq!(t.connect, Duration::from_secs(2));
        assert_eq!(t.response, Duration::from_secs(10));
        assert_eq!(t.total, Duration::from_secs(10));
    }
}
