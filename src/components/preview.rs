use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::markdown::renderer::{render_markdown, RenderSettings, RenderedMarkdown};
use crate::scroll::{scroll_target, CursorSnapshot, LineMarkers, ScrollMode};
use crate::theme;

/// Columns kept free on the right for the scrollbar.
const SCROLLBAR_GUTTER: u16 = 2;

pub struct PreviewState {
    pub scroll_offset: u16,
    pub content_height: u16,
    pub viewport_height: u16,
    /// Rows and markers of the newest render, replaced together.
    document: Option<RenderedMarkdown>,
    /// (content revision, pane width) `document` was rendered for.
    rendered_for: Option<(u64, u16)>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewState {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            content_height: 0,
            viewport_height: 0,
            document: None,
            rendered_for: None,
        }
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.saturating_sub(2).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.saturating_sub(2).max(1));
    }

    pub fn home(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn end(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    /// Moves to `row`, clamped to the scrollable range.
    pub fn scroll_to(&mut self, row: usize) {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        self.scroll_offset = row.min(self.max_scroll());
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn markers(&self) -> Option<&LineMarkers> {
        self.document.as_ref().map(|doc| &doc.markers)
    }

    pub fn document(&self) -> Option<&RenderedMarkdown> {
        self.document.as_ref()
    }

    /// Re-renders `content` unless the cached document already matches this
    /// revision and width. Returns whether a render happened.
    pub fn update(
        &mut self,
        content: &str,
        revision: u64,
        area: Rect,
        settings: &RenderSettings,
    ) -> bool {
        self.viewport_height = area.height;
        let key = (revision, area.width);
        if self.rendered_for == Some(key) {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll());
            return false;
        }

        let width = area.width.saturating_sub(SCROLLBAR_GUTTER).max(1) as usize;
        let rendered = render_markdown(content, width, settings);
        self.content_height = u16::try_from(rendered.height()).unwrap_or(u16::MAX);
        self.document = Some(rendered);
        self.rendered_for = Some(key);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        tracing::debug!(revision, width, rows = self.content_height, "rendered preview");
        true
    }

    /// Scrolls so the cursor's line sits at `mode`'s alignment. Before the
    /// first render there is nothing to align against and the offset stays.
    pub fn sync(&mut self, mode: ScrollMode, cursor: &CursorSnapshot) -> bool {
        let Some(markers) = self.markers() else {
            return false;
        };
        let viewport = self.viewport_height as usize;
        let Some(target) = scroll_target(mode, cursor, markers, viewport, self.content_height as usize) else {
            return false;
        };
        self.scroll_to(target);
        true
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &PreviewState) {
    let Some(document) = state.document() else {
        let waiting = Paragraph::new(Line::styled(
            "waiting for content from the editor",
            Style::default().fg(theme::LINE_NUMBER).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        let middle = Rect {
            y: area.y + area.height / 2,
            height: area.height.min(1),
            ..area
        };
        frame.render_widget(waiting, middle);
        return;
    };

    // Only the visible slice is handed to the widget.
    let visible: Vec<Line<'static>> = document
        .text
        .lines
        .iter()
        .skip(state.scroll_offset as usize)
        .take(area.height as usize)
        .cloned()
        .collect();
    let paragraph = Paragraph::new(Text::from(visible)).style(theme::preview_style());
    frame.render_widget(paragraph, area);

    if state.content_height > area.height {
        let mut scrollbar_state = ScrollbarState::new(state.content_height as usize)
            .position(state.scroll_offset as usize)
            .viewport_content_length(area.height as usize);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(theme::LINE_NUMBER))
            .track_style(Style::default().fg(theme::BORDER));
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}
