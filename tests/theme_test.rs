use ratatui::style::{Color, Modifier};

use livemark::theme;

// Chrome colors inherit the terminal's own palette.

#[test]
fn test_base_colors() {
    assert_eq!(theme::FG, Color::Reset);
    assert_eq!(theme::BAR_BG, Color::Reset);
    assert_eq!(theme::BORDER, Color::DarkGray);
}

#[test]
fn test_status_indicator_colors() {
    assert_eq!(theme::SUCCESS, Color::Green);
    assert_eq!(theme::WARNING, Color::Yellow);
    assert_eq!(theme::ERROR, Color::Red);
}

#[test]
fn test_links_are_underlined() {
    let style = theme::link_style();
    assert_eq!(style.fg, Some(theme::LINK));
    assert!(style.add_modifier.contains(Modifier::UNDERLINED));
}

#[test]
fn test_emphasis_styles() {
    assert!(theme::heading_style().add_modifier.contains(Modifier::BOLD));
    assert!(theme::bold_style().add_modifier.contains(Modifier::BOLD));
    assert!(theme::italic_style().add_modifier.contains(Modifier::ITALIC));
}

#[test]
fn test_math_and_html_are_distinct_from_text() {
    assert_ne!(theme::math_style().fg, Some(theme::FG));
    assert_ne!(theme::html_style().fg, Some(theme::FG));
}
