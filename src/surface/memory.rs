use std::sync::{Arc, Mutex};

use super::{ControlSurface, SpeechOutput};
use crate::expression::Expression;

/// One collaborator call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Status(String),
    Expression(Expression),
    Speak(String),
}

/// Records every surface and speech call in memory.
///
/// Clones share the same log, so one instance can be handed to the
/// dispatcher as both collaborators and inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: SurfaceCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn expressions(&self) -> Vec<Expression> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCall::Expression(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl ControlSurface for MemorySurface {
    fn status_changed(&self, text: &str) {
        self.push(SurfaceCall::Status(text.to_string()));
    }

    fn expression_changed(&self, expression: Expression) {
        self.push(SurfaceCall::Expression(expression));
    }
}

impl SpeechOutput for MemorySurface {
    fn speak(&self, text: &str) {
        self.push(SurfaceCall::Speak(text.to_string()));
    }

    fn name(&self) -> &str {
        "memory"
    }
}
