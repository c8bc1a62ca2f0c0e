//! Connection metrics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for traffic over the debate connection.
#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    /// Total inbound frames
    frames_received: AtomicU64,
    /// Total outbound requests
    requests_sent: AtomicU64,
    /// Connect failures and abnormal closes
    errors: AtomicU64,
    /// Successful opens, including reconnects
    opens: AtomicU64,
}

impl ConnectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_open(&self) {
        self.opens.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> ConnectionStats {
        ConnectionStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            opens: self.opens.load(Ordering::Relaxed),
        }
    }
}

/// Connection statistics at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub frames_received: u64,
    pub requests_sent: u64,
    pub errors: u64,
    pub opens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ConnectionMetrics::new();
        metrics.record_open();
        metrics.record_received();
        metrics.record_received();
        metrics.record_sent();
        metrics.record_error();

        assert_eq!(
            metrics.get_metrics(),
            ConnectionStats {
                frames_received: 2,
                requests_sent: 1,
                errors: 1,
                opens: 1,
            }
        );
    }
}
