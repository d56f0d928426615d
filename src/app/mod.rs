use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::channel::{resolve_title, ChannelEvent, RefreshContent};
use crate::components::header::{self, ConnectionState};
use crate::components::{preview, status};
use crate::markdown::renderer::RenderSettings;
use crate::scroll::{CursorSnapshot, ScrollMode};
use crate::theme;

/// How long a status bar message stays visible.
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Rows moved per mouse wheel notch.
const SCROLL_LINES: u16 = 3;

/// Preview column cap; wider terminals get centered margins.
const MAX_WIDTH: u16 = 120;

/// Window title before the editor has named the document.
pub const DEFAULT_TITLE: &str = "livemark";

/// One preview session: created at startup, dropped when the editor closes
/// the page or the user quits.
pub struct App {
    pub should_quit: bool,
    pub preview: preview::PreviewState,
    pub connection: ConnectionState,

    // --- Status bar ---
    pub status_message: String,
    /// `None` keeps the message until it is replaced.
    pub status_time: Option<Instant>,

    // --- Help modal (?) ---
    pub show_help: bool,

    /// Cleared by `s` to stop following the editor cursor.
    pub following: bool,

    // --- Latest update from the editor ---
    content: String,
    /// Bumped whenever `content` changes; keys the render cache.
    revision: u64,
    cursor: CursorSnapshot,
    is_active: bool,
    page_title: String,
    name: String,

    /// Fixed by the first update.
    settings: Option<RenderSettings>,
    /// Read from every update.
    scroll_mode: ScrollMode,

    /// Used when the editor sends no `pageTitle`.
    title_template: String,
    /// Set by each update; consumed by the next frame once rows exist.
    pending_sync: bool,
}

impl App {
    pub fn new(title_template: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            preview: preview::PreviewState::new(),
            connection: ConnectionState::Connecting,
            status_message: String::new(),
            status_time: None,
            show_help: false,
            following: true,
            content: String::new(),
            revision: 0,
            cursor: CursorSnapshot::default(),
            is_active: false,
            page_title: String::new(),
            name: String::new(),
            settings: None,
            scroll_mode: ScrollMode::default(),
            title_template: title_template.into(),
            pending_sync: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> CursorSnapshot {
        self.cursor
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroll_mode
    }

    pub fn settings(&self) -> Option<&RenderSettings> {
        self.settings.as_ref()
    }

    /// Terminal window title: the page title template with the document's
    /// display name substituted.
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            return DEFAULT_TITLE.to_string();
        }
        let template = if self.page_title.is_empty() {
            &self.title_template
        } else {
            &self.page_title
        };
        resolve_title(template, &self.name)
    }

    // ─── Channel events ──────────────────────────────────────────────────

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.connection = ConnectionState::Connected;
                self.set_status("connected to editor");
            }
            ChannelEvent::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                self.status_message = "waiting for editor".to_string();
                self.status_time = None;
            }
            ChannelEvent::Refresh(update) => self.apply_update(*update),
            ChannelEvent::Close => {
                tracing::info!("editor closed the preview");
                self.should_quit = true;
            }
        }
    }

    fn apply_update(&mut self, update: RefreshContent) {
        if self.settings.is_none() {
            tracing::info!(
                html = update.options.mkit.html,
                breaks = update.options.mkit.breaks,
                "render options fixed by first update"
            );
            self.settings = Some(RenderSettings::from_options(&update.options));
        }
        let mode = update.options.effective_scroll_mode();
        if mode != self.scroll_mode {
            tracing::debug!(from = %self.scroll_mode, to = %mode, "scroll mode changed");
            self.scroll_mode = mode;
        }

        let source = update.source();
        if source != self.content {
            self.content = source;
            self.revision += 1;
        }
        self.cursor = update.cursor_snapshot();
        self.is_active = update.is_active;
        self.page_title = update.page_title.clone();
        self.name = update.display_name().to_string();
        self.pending_sync = true;
        tracing::debug!(
            revision = self.revision,
            line = self.cursor.cursor_line,
            active = self.is_active,
            "update received"
        );
    }

    /// Applies a pending sync against the newest render. Runs after the
    /// preview has been brought up to date for this frame.
    fn sync_scroll(&mut self) {
        if !self.pending_sync || !self.preview.has_document() {
            return;
        }
        self.pending_sync = false;
        if self.is_active && self.following {
            self.preview.sync(self.scroll_mode, &self.cursor);
        }
    }

    // ─── Tick / timers ───────────────────────────────────────────────────

    /// Called every frame from the main loop.
    pub fn tick(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() >= STATUS_DURATION {
                self.status_message.clear();
                self.status_time = None;
            }
        }
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Top-level terminal event handler.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status_message = msg.to_string();
        self.status_time = Some(Instant::now());
    }
}

mod input;
mod render;
