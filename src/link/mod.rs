//! Rover link: owns the WebSocket to the rover's control endpoint.
//!
//! The [`ConnectionManager`] runs a single connect/read/reconnect loop on its
//! own task. Everything else talks to it through channels:
//!
//! - [`LinkHandle`] publishes the connection state and accepts outbound
//!   messages for the live connection.
//! - [`LinkEvent`]s (status changes and decoded inbound frames) are pushed to
//!   an unbounded channel in the order they happen on the socket.

mod state;

pub use state::{ConnectionState, LinkError, LinkHandle};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Endpoint;
use crate::protocol::{DecodedEvent, OutboundMessage, decode};
use crate::retry::{ReconnectPolicy, RetryAttempt, RetryReason, classify_read_error, wait_before_retry};
use state::LinkSlot;

type RoverSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Something the link wants the rest of the app to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The connection state changed; carries the status line text.
    StatusChanged(String),
    /// A well-formed inbound frame.
    Event(DecodedEvent),
}

enum ConnectOutcome {
    Open(Box<RoverSocket>),
    Failed(RetryReason, String),
    Cancelled,
}

enum ServeOutcome {
    Dropped(RetryReason),
    Cancelled,
}

pub struct ConnectionManager {
    endpoint: Endpoint,
    policy: ReconnectPolicy,
    slot: watch::Sender<LinkSlot>,
    events: mpsc::UnboundedSender<LinkEvent>,
}

impl ConnectionManager {
    /// Build a manager for `endpoint` along with its handle and event stream.
    pub fn new(
        endpoint: Endpoint,
        policy: ReconnectPolicy,
    ) -> (Self, LinkHandle, mpsc::UnboundedReceiver<LinkEvent>) {
        let (slot, slot_rx) = watch::channel(LinkSlot::default());
        let (events, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            endpoint,
            policy,
            slot,
            events,
        };
        (manager, LinkHandle::new(slot_rx), events_rx)
    }

    /// Spawn the connect/retry loop.
    ///
    /// Consumes the manager, so at most one loop exists per manager. The loop
    /// runs until `cancel` fires.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run(self, cancel: CancellationToken) {
        let url = self.endpoint.url();
        let mut failures: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.transition(ConnectionState::Connecting, None);
            info!(url = %url, attempt = failures + 1, "Connecting to rover");

            let reason = match self.connect(&url, &cancel).await {
                ConnectOutcome::Cancelled => break,
                ConnectOutcome::Failed(reason, error) => {
                    warn!(url = %url, reason = reason.as_str(), %error, "Rover connect failed");
                    reason
                }
                ConnectOutcome::Open(socket) => {
                    failures = 0;
                    info!(url = %url, "Connected to rover");
                    match self.serve(*socket, &cancel).await {
                        ServeOutcome::Cancelled => break,
                        ServeOutcome::Dropped(reason) => {
                            warn!(url = %url, reason = reason.as_str(), "Rover link dropped");
                            reason
                        }
                    }
                }
            };

            self.transition(ConnectionState::Disconnected, None);
            failures = failures.saturating_add(1);

            let retry = RetryAttempt {
                attempt: failures,
                delay: self.policy.backoff_delay(failures),
                reason,
            };
            debug!(
                attempt = retry.attempt,
                delay_ms = retry.delay.as_millis() as u64,
                reason = retry.reason.as_str(),
                "Scheduling reconnect"
            );
            if !wait_before_retry(&self.policy, retry.attempt, &cancel).await {
                break;
            }
        }

        self.transition(ConnectionState::Disconnected, None);
        info!(url = %url, "Rover link stopped");
    }

    async fn connect(&self, url: &str, cancel: &CancellationToken) -> ConnectOutcome {
        let timeout = self.policy.connect_timeout;
        let attempt = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url));

        tokio::select! {
            _ = cancel.cancelled() => ConnectOutcome::Cancelled,
            result = attempt => match result {
                Ok(Ok((socket, _response))) => ConnectOutcome::Open(Box::new(socket)),
                Ok(Err(err)) => ConnectOutcome::Failed(RetryReason::Connect, err.to_string()),
                Err(_) => ConnectOutcome::Failed(
                    RetryReason::Timeout,
                    format!("no handshake within {}ms", timeout.as_millis()),
                ),
            },
        }
    }

    /// Pump one live connection until it drops or `cancel` fires.
    async fn serve(&self, socket: RoverSocket, cancel: &CancellationToken) -> ServeOutcome {
        let (mut sink, mut stream) = socket.split();
        let (writer, mut outbound) = mpsc::unbounded_channel::<OutboundMessage>();
        self.transition(ConnectionState::Connected, Some(writer));

        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break ServeOutcome::Cancelled;
                }
                Some(message) = outbound.recv() => {
                    let json = match message.to_json() {
                        Ok(json) => json,
                        Err(error) => {
                            warn!(%error, "Failed to encode outbound command");
                            continue;
                        }
                    };
                    if let Err(error) = sink.send(Message::text(json)).await {
                        warn!(%error, command = %message.intent(), "Failed to send command");
                        break ServeOutcome::Dropped(RetryReason::Write);
                    }
                    debug!(command = %message.intent(), "Sent command");
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.deliver(text.as_bytes()),
                    Some(Ok(Message::Binary(data))) => self.deliver(&data),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "Rover closed the connection");
                        break ServeOutcome::Dropped(RetryReason::PeerClosed);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        let reason = classify_read_error(&error);
                        debug!(%error, reason = reason.as_str(), "Read failed");
                        break ServeOutcome::Dropped(reason);
                    }
                    None => break ServeOutcome::Dropped(RetryReason::PeerClosed),
                },
            }
        };

        // Retract the writer before draining so no new message can land here.
        self.transition(ConnectionState::Disconnected, None);
        outbound.close();
        while let Ok(message) = outbound.try_recv() {
            warn!(command = %message.intent(), "Dropping command queued on a closed link");
        }

        outcome
    }

    fn deliver(&self, raw: &[u8]) {
        match decode(raw) {
            Ok(event) => {
                let _ = self.events.send(LinkEvent::Event(event));
            }
            Err(error) => {
                warn!(%error, len = raw.len(), "Dropping malformed frame from rover");
            }
        }
    }

    /// Publish a new state and report it if it differs from the previous one.
    fn transition(
        &self,
        state: ConnectionState,
        writer: Option<mpsc::UnboundedSender<OutboundMessage>>,
    ) {
        let previous = self.slot.send_replace(LinkSlot { state, writer }).state;
        if previous != state {
            let _ = self
                .events
                .send(LinkEvent::StatusChanged(state.status_text().to_string()));
        }
    }
}
