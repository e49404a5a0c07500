//! Collaborators on the far side of the dispatcher.
//!
//! The control surface shows status text and the face. Speech output reads
//! text aloud. Both are owned by the host platform; this crate ships a
//! terminal rendition and an in-memory one.

mod console;
mod memory;

pub use console::{ConsoleSpeech, ConsoleSurface};
pub use memory::{MemorySurface, SurfaceCall};

use crate::expression::Expression;

/// Status line and face of the driving UI.
pub trait ControlSurface: Send + Sync {
    fn status_changed(&self, text: &str);

    fn expression_changed(&self, expression: Expression);
}

/// Text-to-speech sink.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);

    /// Get the provider name
    fn name(&self) -> &str {
        "unknown"
    }
}
