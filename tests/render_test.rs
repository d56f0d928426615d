use livemark::app::App;
use livemark::channel::{ChannelEvent, RefreshContent};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use serde_json::{json, Value};

// ─── Helpers ─────────────────────────────────────────────────────────────

/// 50 one-row paragraphs; paragraph `i` is on 0-based source line `2 * i`.
fn long_doc() -> Vec<String> {
    (0..50).flat_map(|i| [format!("paragraph {i}"), String::new()]).collect()
}

fn refresh(data: Value) -> ChannelEvent {
    let update: RefreshContent = serde_json::from_value(data).unwrap();
    ChannelEvent::Refresh(Box::new(update))
}

/// Active update with the cursor on 1-based `line` of a 20-line editor
/// window starting at 1-based `winline`.
fn cursor_at(mode: &str, line: usize, winline: usize) -> ChannelEvent {
    refresh(json!({
        "options": { "sync_scroll_type": mode },
        "isActive": true,
        "winline": winline,
        "winheight": 20,
        "cursor": [0, line, 1, 0],
        "pageTitle": "${name}",
        "name": "/notes/todo.md",
        "content": long_doc(),
    }))
}

/// Renders the app into a TestBackend buffer and returns the buffer for inspection.
fn render_app(app: &mut App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    terminal.backend().buffer().clone()
}

/// Extracts the text content of a single row from the buffer (stripping trailing spaces).
fn buffer_line_text(buf: &Buffer, row: u16) -> String {
    let width = buf.area.width;
    let mut text = String::new();
    for col in 0..width {
        if let Some(cell) = buf.cell((col, row)) {
            text.push_str(cell.symbol());
        }
    }
    text.trim_end().to_string()
}

/// Text of a preview row without the scrollbar column.
fn preview_text(buf: &Buffer, row: u16) -> String {
    let mut text = String::new();
    for col in 0..buf.area.width.saturating_sub(1) {
        if let Some(cell) = buf.cell((col, row)) {
            text.push_str(cell.symbol());
        }
    }
    text.trim_end().to_string()
}

/// Searches the entire buffer for a substring and returns true if found.
fn buffer_contains(buf: &Buffer, needle: &str) -> bool {
    (0..buf.area.height).any(|row| buffer_line_text(buf, row).contains(needle))
}

// On an 80x24 terminal the preview occupies rows 2..=21.
const FIRST_ROW: u16 = 2;
const LAST_ROW: u16 = 21;

// ═══════════════════════════════════════════════════════════════════════
// A. Chrome
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn waiting_placeholder_before_first_update() {
    let mut app = App::new("${name}");
    let buf = render_app(&mut app, 80, 24);
    assert!(buffer_contains(&buf, "waiting for content from the editor"));
    assert!(buffer_line_text(&buf, 0).contains("livemark"));
    assert!(buffer_line_text(&buf, 0).contains("CONNECTING"));
}

#[test]
fn header_shows_title_and_live_badge() {
    let mut app = App::new("${name}");
    app.handle_channel_event(ChannelEvent::Connected);
    app.handle_channel_event(cursor_at("middle", 1, 1));
    let buf = render_app(&mut app, 80, 24);
    let header = buffer_line_text(&buf, 0);
    assert!(header.contains("todo"), "header: {header}");
    assert!(header.contains("LIVE"));
}

#[test]
fn disconnect_shows_offline_and_waiting() {
    let mut app = App::new("${name}");
    app.handle_channel_event(ChannelEvent::Connected);
    app.handle_channel_event(ChannelEvent::Disconnected);
    let buf = render_app(&mut app, 80, 24);
    assert!(buffer_line_text(&buf, 0).contains("OFFLINE"));
    assert!(buffer_line_text(&buf, 23).contains("waiting for editor"));
}

#[test]
fn status_bar_shows_line_and_mode() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("top", 81, 71));
    let buf = render_app(&mut app, 80, 24);
    let status = buffer_line_text(&buf, 23);
    assert!(status.contains("Ln 81"), "status: {status}");
    assert!(status.contains("sync: top"));
}

#[test]
fn help_modal_lists_bindings() {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    let mut app = App::new("${name}");
    app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE)));
    let buf = render_app(&mut app, 80, 24);
    assert!(buffer_contains(&buf, "Keybindings"));
    assert!(buffer_contains(&buf, "Pause / resume cursor sync"));
}

#[test]
fn wide_terminal_centers_preview() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("top", 1, 1));
    let buf = render_app(&mut app, 200, 24);
    // 120 columns centered in 200 → 40 columns of margin
    assert_eq!(buf.cell((40, FIRST_ROW)).unwrap().symbol(), "p");
    assert_eq!(buf.cell((39, FIRST_ROW)).unwrap().symbol(), " ");
}

// ═══════════════════════════════════════════════════════════════════════
// B. Cursor-synchronized scrolling
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn top_sync_puts_cursor_block_first() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("top", 81, 71));
    let buf = render_app(&mut app, 80, 24);
    assert_eq!(preview_text(&buf, FIRST_ROW), "paragraph 40");
}

#[test]
fn bottom_sync_puts_cursor_block_last() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("bottom", 81, 71));
    let buf = render_app(&mut app, 80, 24);
    assert_eq!(preview_text(&buf, LAST_ROW), "paragraph 40");
}

#[test]
fn middle_sync_mirrors_editor_window_position() {
    let mut app = App::new("${name}");
    // cursor halfway down the editor window → halfway down the pane
    app.handle_channel_event(cursor_at("middle", 81, 71));
    let buf = render_app(&mut app, 80, 24);
    assert_eq!(preview_text(&buf, FIRST_ROW + 9), "paragraph 40");
}

#[test]
fn blank_source_line_uses_preceding_block() {
    let mut app = App::new("${name}");
    // line 82 (1-based) is the blank line after paragraph 40
    app.handle_channel_event(cursor_at("top", 82, 71));
    let buf = render_app(&mut app, 80, 24);
    assert_eq!(preview_text(&buf, FIRST_ROW), "paragraph 40");
}

#[test]
fn cursor_near_end_clamps_to_last_page() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("top", 99, 80));
    let buf = render_app(&mut app, 80, 24);
    // 100 rows, 20 visible: the last page starts at paragraph 40
    assert_eq!(preview_text(&buf, FIRST_ROW), "paragraph 40");
    assert_eq!(preview_text(&buf, LAST_ROW - 1), "paragraph 49");
}

#[test]
fn edits_above_cursor_resync_against_new_render() {
    let mut app = App::new("${name}");
    app.handle_channel_event(cursor_at("top", 81, 71));
    render_app(&mut app, 80, 24);

    // ten new paragraphs inserted at the top; cursor follows its text
    let mut content: Vec<String> = (0..10).flat_map(|i| [format!("new {i}"), String::new()]).collect();
    content.extend(long_doc());
    app.handle_channel_event(refresh(json!({
        "isActive": true,
        "winline": 91,
        "winheight": 20,
        "cursor": [0, 101, 1, 0],
        "content": content,
    })));
    let buf = render_app(&mut app, 80, 24);
    assert_eq!(preview_text(&buf, FIRST_ROW), "paragraph 40");
}

// ═══════════════════════════════════════════════════════════════════════
// C. Rendered content
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn code_blocks_and_tables_render() {
    let mut app = App::new("${name}");
    app.handle_channel_event(refresh(json!({
        "isActive": true,
        "content": [
            "# Notes",
            "",
            "```rust",
            "fn main() {}",
            "```",
            "",
            "| a | b |",
            "|---|---|",
            "| 1 | 2 |",
        ],
    })));
    let buf = render_app(&mut app, 80, 24);
    assert!(buffer_contains(&buf, "# Notes"));
    assert!(buffer_contains(&buf, "┌─ rust"));
    assert!(buffer_contains(&buf, "fn main() {}"));
    assert!(buffer_contains(&buf, "│ 1"));
}
