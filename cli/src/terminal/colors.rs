use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const TARGET: Color = Color::BrightCyan;
pub const OS_BANNER: Color = Color::BrightBlue;
pub const PIPE_NAME: Color = Color::BrightMagenta;
