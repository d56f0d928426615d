//! Frame layout: header, preview pane, status bar, and the help overlay.

use super::*;

impl App {
    /// Draws one frame and runs the per-frame timers.
    pub fn render_frame<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
    ) -> std::io::Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        self.tick();
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let full = frame.area();

        let bg = Paragraph::new("").style(theme::preview_style());
        frame.render_widget(bg, full);

        // Cap width and center horizontally
        let capped_width = full.width.min(MAX_WIDTH);
        let x_offset = (full.width - capped_width) / 2;
        let usable_area = Rect::new(x_offset, full.y, capped_width, full.height);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Divider
            Constraint::Min(1),    // Preview
            Constraint::Length(1), // Divider
            Constraint::Length(1), // Status
        ])
        .split(usable_area);

        // Render before drawing so a pending sync sees this frame's rows.
        if let Some(settings) = &self.settings {
            self.preview.update(&self.content, self.revision, chunks[2], settings);
        }
        self.sync_scroll();

        header::render(frame, chunks[0], &self.title(), self.connection);

        let divider_style = Style::default().fg(theme::BORDER);
        let top_divider = Paragraph::new("\u{2500}".repeat(chunks[1].width as usize)).style(divider_style);
        frame.render_widget(top_divider, chunks[1]);
        let bottom_divider = Paragraph::new("\u{2500}".repeat(chunks[3].width as usize)).style(divider_style);
        frame.render_widget(bottom_divider, chunks[3]);

        preview::render(frame, chunks[2], &self.preview);

        let line = if self.settings.is_some() {
            self.cursor.cursor_line + 1
        } else {
            0
        };
        status::render(
            frame,
            chunks[4],
            status::StatusInfo {
                line,
                mode: self.scroll_mode,
                following: self.following,
                message: &self.status_message,
            },
        );

        // Help modal overlay, drawn last so it sits on top
        if self.show_help {
            self.render_help(frame);
        }
    }

    /// Centered modal listing the keybindings. Any key dismisses it.
    fn render_help(&self, frame: &mut Frame) {
        let area = frame.area();
        let width = 52u16.min(area.width.saturating_sub(4));
        let height = 14u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let help_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, help_area);

        // Must match the bindings in input.rs
        let bindings = [
            ("q / Esc / Ctrl+C", "Quit"),
            ("j / k / \u{2191} / \u{2193}", "Scroll one row"),
            ("PgUp / PgDn / Space", "Scroll one page"),
            ("g / G / Home / End", "Top / bottom"),
            ("Mouse wheel", "Scroll three rows"),
            ("s", "Pause / resume cursor sync"),
            ("?", "This help"),
        ];

        let key_style = Style::default().fg(theme::HEADING);
        let mut help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().fg(theme::HEADING).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (keys, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {keys:<20}"), key_style),
                Span::raw(action),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  Press any key to close",
            Style::default().fg(theme::LINE_NUMBER),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .title(" Help ");
        frame.render_widget(Paragraph::new(help_text).block(block), help_area);
    }
}
