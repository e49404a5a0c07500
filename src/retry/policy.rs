use std::time::Duration;

/// Default pause between a failed or dropped connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// Default upper bound on a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Strategy for re-establishing the rover link.
///
/// The delay is fixed: no jitter, no growth, no cap on the number of
/// attempts. The link retries for as long as the process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Pause inserted after every connect failure or disconnect.
    pub delay: Duration,
    /// Upper bound on a single connect attempt (TCP + WebSocket handshake).
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Delay before the given retry (1-based). Constant for every attempt.
    pub fn backoff_delay(&self, _retry_index: u32) -> Duration {
        self.delay
    }
}
