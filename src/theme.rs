//! Terminal colours and spinner helpers.
//!
//! Respects the `NO_COLOR` env-var and the `--no-color` CLI flag.
//!
//! | Token   | Hex       | Usage                           |
//! |---------|-----------|---------------------------------|
//! | accent  | `#3DA9FC` | headings, speech prefix         |
//! | success | `#2FBF71` | connected                       |
//! | warn    | `#FFB020` | connecting, attention           |
//! | error   | `#E23D2D` | disconnected, refused commands  |
//! | muted   | `#8B8F99` | labels, metadata                |

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Call once at startup (after CLI parsing) to disable colour globally.
pub fn disable_color() {
    COLOR_DISABLED.store(true, Ordering::Relaxed);
    colored::control::set_override(false);
}

/// Initialise the colour system from `NO_COLOR` and the `--no-color` flag.
pub fn init_color(no_color_flag: bool) {
    if no_color_flag
        || std::env::var("NO_COLOR")
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    {
        disable_color();
    }
}

fn is_color() -> bool {
    !COLOR_DISABLED.load(Ordering::Relaxed)
}

pub mod palette {
    pub const ACCENT: (u8, u8, u8) = (0x3D, 0xA9, 0xFC);
    pub const SUCCESS: (u8, u8, u8) = (0x2F, 0xBF, 0x71);
    pub const WARN: (u8, u8, u8) = (0xFF, 0xB0, 0x20);
    pub const ERROR: (u8, u8, u8) = (0xE2, 0x3D, 0x2D);
    pub const MUTED: (u8, u8, u8) = (0x8B, 0x8F, 0x99);
}

/// Colour `text` with an arbitrary RGB triple.
pub fn rgb(text: &str, color: (u8, u8, u8)) -> String {
    if is_color() {
        text.truecolor(color.0, color.1, color.2).to_string()
    } else {
        text.to_string()
    }
}

pub fn accent(text: &str) -> String {
    rgb(text, palette::ACCENT)
}

pub fn success(text: &str) -> String {
    rgb(text, palette::SUCCESS)
}

pub fn warn(text: &str) -> String {
    rgb(text, palette::WARN)
}

pub fn error(text: &str) -> String {
    rgb(text, palette::ERROR)
}

pub fn muted(text: &str) -> String {
    rgb(text, palette::MUTED)
}

pub fn bold(text: &str) -> String {
    if is_color() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Format "  Label : value" with the label muted and the value in accent.
pub fn label_value(label: &str, value: &str) -> String {
    format!("  {} : {}", muted(label), accent(value))
}

const SPINNER_CHARS: &[&str] = &["◐", "◓", "◑", "◒"];

/// Indeterminate spinner. Finish it with [`spinner_ok`] or [`spinner_fail`].
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = if is_color() {
        "{spinner:.cyan}  {msg}"
    } else {
        "{spinner}  {msg}"
    };
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(SPINNER_CHARS);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spinner_ok(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("{} {}", success("✓"), message));
}

pub fn spinner_fail(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("{} {}", error("✗"), message));
}
