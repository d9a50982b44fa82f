use std::fmt::Display;

use colored::*;
use tracing::info;

use crate::terminal::colors;

pub const PRINT_TARGET: &str = "mscheck::print";
pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 14;

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner() {
    let text = format!("⟦ MSCHECK v{} ⟧", env!("CARGO_PKG_VERSION"));
    let pad = TOTAL_WIDTH.saturating_sub(console::measure_text_width(&text)) / 2;
    let sep = "═".repeat(pad).color(colors::SEPARATOR);
    print(&format!("{}{}{}", sep, text.color(colors::PRIMARY).bold(), sep));
}

pub fn header(msg: &str) {
    let formatted = format!("⟦ {} ⟧", msg);
    let dash_count = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let left = dash_count / 2;
    let right = dash_count - left;

    let line = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right)
    )
    .color(colors::SEPARATOR);

    print(&line.to_string());
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

pub fn aligned_line<V>(key: &str, value: V)
where
    V: Display + WithDefaultColor,
{
    let dots = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let value = value.with_default(colors::TEXT_DEFAULT);
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    ));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}
