use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme;

/// Connection to the editor plugin, as shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Connected => "LIVE",
            ConnectionState::Disconnected => "OFFLINE",
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, title: &str, connection: ConnectionState) {
    let badge = match connection {
        ConnectionState::Connected => Span::styled(format!(" {} ", connection.label()), theme::badge_style()),
        ConnectionState::Connecting => Span::styled(
            format!(" {} ", connection.label()),
            Style::default().fg(theme::WARNING).bg(theme::BAR_BG),
        ),
        ConnectionState::Disconnected => Span::styled(
            format!(" {} ", connection.label()),
            Style::default().fg(theme::ERROR).bg(theme::BAR_BG),
        ),
    };

    let chunks = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(badge.width() as u16),
    ])
    .split(area);

    // Fill background
    let bg = Paragraph::new("").style(theme::header_style());
    frame.render_widget(bg, area);

    let left = Paragraph::new(Line::from(Span::styled(format!("  {title}"), theme::header_style())));
    frame.render_widget(left, chunks[0]);

    let right = Paragraph::new(Line::from(badge));
    frame.render_widget(right, chunks[1]);
}
