//! Face expressions shown while driving.

use std::fmt;

/// RGBA eye colour, each channel in `0.0..=1.0`.
pub type EyeColor = (f32, f32, f32, f32);

const GREEN: EyeColor = (0.0, 1.0, 0.0, 1.0);
const RED: EyeColor = (1.0, 0.0, 0.0, 1.0);
const YELLOW: EyeColor = (1.0, 1.0, 0.0, 1.0);
const BLUE: EyeColor = (0.0, 0.5, 1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expression {
    #[default]
    Normal,
    Happy,
    Surprised,
    Cute,
    Angry,
    Sad,
}

impl Expression {
    /// Expression for a driving intent, or `None` to leave the face as is.
    pub fn for_intent(intent: &str) -> Option<Self> {
        match intent {
            "forward" | "go" => Some(Self::Happy),
            "stop" => Some(Self::Normal),
            "backward" | "back" => Some(Self::Surprised),
            "left" | "right" => Some(Self::Cute),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Happy => "happy",
            Self::Surprised => "surprised",
            Self::Cute => "cute",
            Self::Angry => "angry",
            Self::Sad => "sad",
        }
    }

    /// Eye colour for this expression. `cute` has no colour of its own.
    pub fn eye_color(self) -> EyeColor {
        match self {
            Self::Happy | Self::Normal => GREEN,
            Self::Angry => RED,
            Self::Surprised => YELLOW,
            Self::Sad => BLUE,
            Self::Cute => GREEN,
        }
    }

    /// Eye colour scaled to 8-bit RGB for terminal rendering.
    pub fn eye_rgb(self) -> (u8, u8, u8) {
        let (r, g, b, _) = self.eye_color();
        let scale = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (scale(r), scale(g), scale(b))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_table() {
        assert_eq!(Expression::for_intent("forward"), Some(Expression::Happy));
        assert_eq!(Expression::for_intent("go"), Some(Expression::Happy));
        assert_eq!(Expression::for_intent("stop"), Some(Expression::Normal));
        assert_eq!(Expression::for_intent("backward"), Some(Expression::Surprised));
        assert_eq!(Expression::for_intent("back"), Some(Expression::Surprised));
        assert_eq!(Expression::for_intent("left"), Some(Expression::Cute));
        assert_eq!(Expression::for_intent("right"), Some(Expression::Cute));
        assert_eq!(Expression::for_intent("dance"), None);
        assert_eq!(Expression::for_intent("Forward"), None);
    }

    #[test]
    fn eye_palette() {
        assert_eq!(Expression::Happy.eye_color(), (0.0, 1.0, 0.0, 1.0));
        assert_eq!(Expression::Angry.eye_color(), (1.0, 0.0, 0.0, 1.0));
        assert_eq!(Expression::Surprised.eye_color(), (1.0, 1.0, 0.0, 1.0));
        assert_eq!(Expression::Sad.eye_color(), (0.0, 0.5, 1.0, 1.0));
        assert_eq!(Expression::Cute.eye_color(), Expression::Normal.eye_color());
        assert_eq!(Expression::Sad.eye_rgb(), (0, 128, 255));
    }

    #[test]
    fn tags() {
        assert_eq!(Expression::Cute.to_string(), "cute");
        assert_eq!(Expression::default(), Expression::Normal);
    }
}
