//! Keyboard and mouse handling. The preview is read-only, so every binding
//! either scrolls, toggles cursor following, or ends the session.

use super::*;

impl App {
    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        // Help modal: any key dismisses it (swallows the keypress)
        if self.show_help {
            self.show_help = false;
            return;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
                return;
            }
            (m, _) if m.contains(KeyModifiers::CONTROL) || m.contains(KeyModifiers::ALT) => return,
            _ => {}
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.preview.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.preview.scroll_down(1),
            KeyCode::PageUp => self.preview.page_up(),
            KeyCode::PageDown | KeyCode::Char(' ') => self.preview.page_down(),
            KeyCode::Home | KeyCode::Char('g') => self.preview.home(),
            KeyCode::End | KeyCode::Char('G') => self.preview.end(),
            KeyCode::Char('s') => self.toggle_following(),
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            _ => {}
        }
    }

    /// Pausing lets the user read elsewhere in the document; resuming jumps
    /// back to the editor's cursor on the next frame.
    fn toggle_following(&mut self) {
        self.following = !self.following;
        if self.following {
            self.pending_sync = true;
            self.set_status("following editor cursor");
        } else {
            self.set_status("cursor sync paused");
        }
    }

    pub(super) fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.preview.scroll_up(SCROLL_LINES),
            MouseEventKind::ScrollDown => self.preview.scroll_down(SCROLL_LINES),
            _ => {}
        }
    }
}
