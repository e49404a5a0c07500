use std::io::Write;

use tracing::debug;

use super::{ControlSurface, SpeechOutput};
use crate::expression::Expression;
use crate::theme as t;

/// Prints status lines and face changes to stdout.
#[derive(Debug, Default, Clone)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    fn face(expression: Expression) -> &'static str {
        match expression {
            Expression::Normal => "(•_•)",
            Expression::Happy => "(^‿^)",
            Expression::Surprised => "(O_O)",
            Expression::Cute => "(◕‿◕)",
            Expression::Angry => "(>_<)",
            Expression::Sad => "(._.)",
        }
    }

    fn styled_status(text: &str) -> String {
        match text {
            "Connected" => t::success(text),
            "Disconnected" | "Not connected!" => t::error(text),
            _ => t::warn(text),
        }
    }
}

impl ControlSurface for ConsoleSurface {
    fn status_changed(&self, text: &str) {
        println!("{} {}", t::muted("Status:"), Self::styled_status(text));
        let _ = std::io::stdout().flush();
    }

    fn expression_changed(&self, expression: Expression) {
        let face = t::rgb(Self::face(expression), expression.eye_rgb());
        println!("{} {}", face, t::muted(expression.as_str()));
        let _ = std::io::stdout().flush();
    }
}

/// Stands in for platform text-to-speech by printing what would be said.
#[derive(Debug, Default, Clone)]
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        debug!(text, "Speaking");
        println!("{} {}", t::accent("»"), t::bold(text));
        let _ = std::io::stdout().flush();
    }

    fn name(&self) -> &str {
        "console"
    }
}
