mod policy;

pub use policy::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RECONNECT_DELAY, ReconnectPolicy};

use std::time::Duration;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;

/// Classification of recoverable link failures.
///
/// None of these are fatal: every one ends in a backoff and a fresh
/// connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// TCP connect or WebSocket handshake failed.
    Connect,
    /// Connect attempt exceeded the policy's timeout.
    Timeout,
    /// Transport error while reading from a live socket.
    Read,
    /// Transport error while writing to a live socket.
    Write,
    /// Rover sent a close frame or the stream ended.
    PeerClosed,
}

impl RetryReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Read => "read",
            Self::Write => "write",
            Self::PeerClosed => "peer_closed",
        }
    }
}

/// Metadata for one scheduled reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    pub attempt: u32,
    pub delay: Duration,
    pub reason: RetryReason,
}

/// Classify a read-side WebSocket error.
pub fn classify_read_error(err: &tungstenite::Error) -> RetryReason {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            RetryReason::PeerClosed
        }
        _ => RetryReason::Read,
    }
}

/// Sleep for the policy's backoff, waking early on cancellation.
///
/// Returns `false` if the token fired and the caller should stop retrying.
pub async fn wait_before_retry(
    policy: &ReconnectPolicy,
    attempt: u32,
    cancel: &CancellationToken,
) -> bool {
    let delay = policy.backoff_delay(attempt);
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
