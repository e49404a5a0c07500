//! Connection state and the send handle shared with the rest of the app.
//!
//! The connection manager is the only writer. It publishes the current
//! state together with the live connection's outbound sender through a
//! `watch` channel, so a reader always sees a consistent pair.

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::protocol::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Status line text reported on entering this state.
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("not connected to rover")]
    NotConnected,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LinkSlot {
    pub(crate) state: ConnectionState,
    /// Present only while `state` is `Connected`; feeds that connection's writer.
    pub(crate) writer: Option<mpsc::UnboundedSender<OutboundMessage>>,
}

/// Cloneable, read-mostly view of the link.
///
/// Holders can observe the state and submit messages. They never touch the
/// socket.
#[derive(Debug, Clone)]
pub struct LinkHandle {
    slot: watch::Receiver<LinkSlot>,
}

impl LinkHandle {
    pub(crate) fn new(slot: watch::Receiver<LinkSlot>) -> Self {
        Self { slot }
    }

    /// A handle with no connection manager behind it. Every send fails.
    pub fn disconnected() -> Self {
        let (_tx, rx) = watch::channel(LinkSlot::default());
        Self { slot: rx }
    }

    pub fn state(&self) -> ConnectionState {
        self.slot.borrow().state
    }

    /// Hand a message to the live connection's writer.
    ///
    /// Fails fast with `NotConnected` unless the link is `Connected`. Nothing
    /// is queued for later: a message accepted here belongs to the current
    /// connection only and is dropped if that connection ends first.
    pub fn send(&self, message: OutboundMessage) -> Result<(), LinkError> {
        let slot = self.slot.borrow();
        if slot.state != ConnectionState::Connected {
            return Err(LinkError::NotConnected);
        }
        let writer = slot.writer.as_ref().ok_or(LinkError::NotConnected)?;
        writer.send(message).map_err(|_| LinkError::NotConnected)
    }

    /// Wait until the link reports `Connected`.
    ///
    /// Fails if the connection manager has gone away.
    pub async fn wait_connected(&self) -> Result<(), LinkError> {
        let mut slot = self.slot.clone();
        slot.wait_for(|s| s.state == ConnectionState::Connected)
            .await
            .map(|_| ())
            .map_err(|_| LinkError::NotConnected)
    }

    /// Test-only handle whose `Connected` writer feeds the returned receiver.
    #[cfg(test)]
    pub(crate) fn connected_for_test() -> (
        Self,
        watch::Sender<LinkSlot>,
        mpsc::UnboundedReceiver<OutboundMessage>,
    ) {
        let (writer, outbound) = mpsc::unbounded_channel();
        let (tx, rx) = watch::channel(LinkSlot {
            state: ConnectionState::Connected,
            writer: Some(writer),
        });
        (Self { slot: rx }, tx, outbound)
    }
}
