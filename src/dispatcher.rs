//! Entry point for driving intents and sink for link events.
//!
//! Buttons and the voice recognizer both end up in [`Dispatcher::issue`].
//! Link events are consumed on the dispatcher's own task via
//! [`Dispatcher::run`], never on the link's I/O task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::expression::Expression;
use crate::link::{LinkError, LinkEvent, LinkHandle};
use crate::protocol::{DecodedEvent, Intent, encode};
use crate::surface::{ControlSurface, SpeechOutput};

pub const NOT_CONNECTED_STATUS: &str = "Not connected!";
pub const NOT_CONNECTED_SPEECH: &str = "Not connected to rover";
pub const LISTENING_SPEECH: &str = "Listening";

pub struct Dispatcher {
    link: LinkHandle,
    surface: Arc<dyn ControlSurface>,
    speech: Arc<dyn SpeechOutput>,
}

impl Dispatcher {
    pub fn new(
        link: LinkHandle,
        surface: Arc<dyn ControlSurface>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        debug!(speech = speech.name(), "Dispatcher ready");
        Self {
            link,
            surface,
            speech,
        }
    }

    pub fn link(&self) -> &LinkHandle {
        &self.link
    }

    /// Send an intent to the rover.
    ///
    /// On `NotConnected` the user is told on screen and out loud, and the
    /// command is dropped. It is never retried or queued.
    pub fn issue(&self, intent: Intent) -> Result<(), LinkError> {
        if let Some(expression) = Expression::for_intent(intent.as_str()) {
            self.surface.expression_changed(expression);
        }

        let label = intent.to_string();
        match self.link.send(encode(intent)) {
            Ok(()) => {
                info!(command = %label, "Command handed to rover link");
                Ok(())
            }
            Err(err) => {
                info!(command = %label, error = %err, "Command dropped");
                self.surface.status_changed(NOT_CONNECTED_STATUS);
                self.speech.speak(NOT_CONNECTED_SPEECH);
                Err(err)
            }
        }
    }

    /// Issue the recognizer's top result.
    ///
    /// The phrase is trimmed and lowercased first. Returns `None` without
    /// sending anything if nothing is left.
    pub fn issue_phrase(&self, phrase: &str) -> Option<Result<(), LinkError>> {
        let normalized = phrase.trim().to_lowercase();
        match Intent::new(normalized) {
            Ok(intent) => Some(self.issue(intent)),
            Err(_) => {
                debug!("Ignoring empty voice phrase");
                None
            }
        }
    }

    /// Voice button pressed: the face looks attentive and the rover says so.
    pub fn begin_listening(&self) {
        self.surface.expression_changed(Expression::Surprised);
        self.speech.speak(LISTENING_SPEECH);
    }

    /// Route one link event to the collaborators.
    pub fn handle(&self, event: LinkEvent) {
        match event {
            LinkEvent::StatusChanged(text) => self.surface.status_changed(&text),
            LinkEvent::Event(DecodedEvent::CommandResult { message }) => {
                self.speech.speak(&message);
            }
            LinkEvent::Event(DecodedEvent::Ignored { kind }) => {
                debug!(kind = %kind, "Ignoring rover message");
            }
        }
    }

    /// Drain link events until the channel closes or `cancel` fires.
    pub async fn run(
        &self,
        mut events: mpsc::UnboundedReceiver<LinkEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        debug!("Dispatcher stopped");
    }
}
