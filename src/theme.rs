use ratatui::style::{Color, Modifier, Style};

// Base colors, Color::Reset inherits terminal defaults
pub const FG: Color = Color::Reset;
pub const BORDER: Color = Color::DarkGray;

// UI elements
pub const BAR_BG: Color = Color::Reset;
pub const LINE_NUMBER: Color = Color::DarkGray;
pub const BADGE: Color = Color::Blue;
pub const WHITE: Color = Color::White;

// Markdown syntax
pub const HEADING: Color = Color::Rgb(130, 170, 255);
pub const BOLD: Color = Color::Yellow;
pub const ITALIC: Color = Color::Cyan;
pub const LINK: Color = Color::Cyan;
pub const CODE: Color = Color::Red;
pub const CODE_BG: Color = Color::Rgb(40, 42, 54);
pub const MATH: Color = Color::Rgb(255, 184, 108);
pub const QUOTE_BORDER: Color = Color::Rgb(106, 190, 120);

// Status indicators
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;

// Pre-built styles
pub fn preview_style() -> Style {
    Style::default()
}

pub fn header_style() -> Style {
    Style::default().bg(BAR_BG)
}

pub fn status_style() -> Style {
    Style::default().bg(BAR_BG)
}

pub fn badge_style() -> Style {
    Style::default()
        .fg(WHITE)
        .bg(BADGE)
        .add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default()
        .fg(HEADING)
        .add_modifier(Modifier::BOLD)
}

pub fn bold_style() -> Style {
    Style::default()
        .fg(BOLD)
        .add_modifier(Modifier::BOLD)
}

pub fn italic_style() -> Style {
    Style::default()
        .fg(ITALIC)
        .add_modifier(Modifier::ITALIC)
}

pub fn code_style() -> Style {
    Style::default().fg(CODE)
}

pub fn math_style() -> Style {
    Style::default().fg(MATH)
}

/// Raw HTML shown verbatim or left over after tag stripping.
pub fn html_style() -> Style {
    Style::default().fg(LINE_NUMBER)
}

pub fn link_style() -> Style {
    Style::default()
        .fg(LINK)
        .add_modifier(Modifier::UNDERLINED)
}
