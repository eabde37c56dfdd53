//! ANSI styling for the interactive message sink.

use crate::domain::level::Level;

pub const END: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[91m";
pub const BLUE: &str = "\x1b[94m";
pub const YELLOW: &str = "\x1b[93m";
pub const WHITE: &str = "\x1b[97m";

pub fn level_color(level: Level) -> &'static str {
    match level {
        Level::Info => GREY,
        Level::Summary => BLUE,
        Level::Warning => YELLOW,
        Level::Error => RED,
        Level::System => WHITE,
    }
}

/// Wraps a message header in bold plus the level colour
pub fn styled_header(level: Level, header: &str) -> String {
    format!("{BOLD}{}{header}{END}", level_color(level))
}
