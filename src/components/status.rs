use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::scroll::ScrollMode;
use crate::theme;

pub struct StatusInfo<'a> {
    /// 1-based editor cursor line; 0 before the first update.
    pub line: usize,
    pub mode: ScrollMode,
    /// False while the user has paused cursor following.
    pub following: bool,
    pub message: &'a str,
}

pub fn render(frame: &mut Frame, area: Rect, info: StatusInfo) {
    // Fill the entire status bar background
    let bg = Paragraph::new("").style(theme::status_style());
    frame.render_widget(bg, area);

    let chunks = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
    ])
    .split(area);

    let left = Paragraph::new(Line::from(Span::styled(
        format!("  Ln {}", info.line),
        theme::status_style(),
    )));
    frame.render_widget(left, chunks[0]);

    if !info.message.is_empty() {
        let center = Paragraph::new(Line::from(Span::styled(
            info.message.to_string(),
            theme::status_style(),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(center, chunks[1]);
    }

    let sync = if info.following { info.mode.as_str() } else { "paused" };
    let right = Paragraph::new(Line::from(Span::styled(
        format!("sync: {sync}  "),
        theme::status_style(),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(right, chunks[2]);
}
