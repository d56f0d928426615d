//! Newline-delimited JSON messages exchanged with the editor plugin.

use serde::{Deserialize, Serialize};

use crate::config::{flag_off, or_default, PreviewOptions};
use crate::scroll::CursorSnapshot;

/// First line the preview sends after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub bufnr: u64,
}

/// One line from the editor plugin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    RefreshContent(Box<RefreshContent>),
    ClosePage,
    Close,
}

/// Full document snapshot pushed on every buffer or cursor change.
///
/// Line numbers on the wire are 1-based (Neovim convention): `cursor[1]` is
/// the cursor line and `winline` the first visible line of the window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshContent {
    #[serde(deserialize_with = "or_default")]
    pub options: PreviewOptions,
    #[serde(deserialize_with = "flag_off")]
    pub is_active: bool,
    pub winline: usize,
    pub winheight: usize,
    pub cursor: Vec<usize>,
    #[serde(deserialize_with = "or_default")]
    pub page_title: String,
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    pub content: Vec<String>,
}

impl RefreshContent {
    /// Cursor and window geometry, converted to 0-based lines.
    pub fn cursor_snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            cursor_line: self.cursor.get(1).copied().unwrap_or(0).saturating_sub(1),
            window_line: self.winline.saturating_sub(1),
            window_height: self.winheight,
            total_lines: self.content.len(),
        }
    }

    /// File name without directories or extension.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }

    pub fn source(&self) -> String {
        self.content.join("\n")
    }
}

/// `/notes/todo.md` → `todo`. Both separators are accepted since the
/// editor may run on Windows.
pub fn display_name(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    base.split('.').next().unwrap_or(base)
}

/// Substitutes the first `${name}` in `template`.
pub fn resolve_title(template: &str, name: &str) -> String {
    template.replacen("${name}", name, 1)
}
