use std::sync::OnceLock;

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::theme;

const SYNTAX_THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

pub fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

pub fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Loads the syntect sets on a background thread so the first code block
/// doesn't stall a frame.
pub fn ensure_loaded() {
    std::thread::spawn(|| {
        syntax_set();
        theme_set();
    });
}

/// Map language aliases editors commonly use onto tokens syntect knows.
fn resolve_lang(lang: &str) -> &str {
    match lang {
        "typescript" | "ts" | "tsx" | "jsx" | "mjs" => "javascript",
        "sh" | "zsh" | "fish" | "shell" | "console" => "bash",
        "yml" => "yaml",
        "jsonc" | "json5" => "json",
        "cxx" | "cc" | "hpp" | "hh" => "cpp",
        "vim" | "viml" => "vimscript",
        "py3" => "python",
        _ => lang,
    }
}

fn find_syntax<'a>(ss: &'a SyntaxSet, lang: &str) -> &'a SyntaxReference {
    if lang.is_empty() {
        return ss.find_syntax_plain_text();
    }
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_token(resolve_lang(lang)))
        .unwrap_or_else(|| ss.find_syntax_plain_text())
}

fn syntax_theme() -> Option<&'static Theme> {
    theme_set().themes.get(SYNTAX_THEME)
}

/// Highlights a fenced block and wraps it in a frame labeled with `lang`.
pub fn highlight_code(code: &str, lang: &str, width: usize) -> Vec<Line<'static>> {
    let body = match syntax_theme() {
        Some(syntax_theme) => highlight_body(code, lang, syntax_theme, width),
        None => plain_body(code, width),
    };
    frame(lang, body, width, Style::default().fg(theme::BORDER).bg(theme::CODE_BG))
}

fn highlight_body(code: &str, lang: &str, syntax_theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let ss = syntax_set();
    let mut highlighter = HighlightLines::new(find_syntax(ss, lang), syntax_theme);
    let mut rows = Vec::new();

    for line in LinesWithEndings::from(code) {
        let Ok(regions) = highlighter.highlight_line(line, ss) else {
            rows.push(body_row(line.trim_end_matches('\n'), width));
            continue;
        };
        let mut spans = vec![Span::styled("  ", code_bg())];
        let mut cols = 2;
        for (style, piece) in regions {
            let piece = piece.trim_end_matches('\n');
            if piece.is_empty() {
                continue;
            }
            cols += piece.chars().count();
            let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
            spans.push(Span::styled(piece.to_string(), Style::default().fg(fg).bg(theme::CODE_BG)));
        }
        pad(&mut spans, cols, width);
        rows.push(Line::from(spans));
    }
    rows
}

fn plain_body(code: &str, width: usize) -> Vec<Line<'static>> {
    code.lines().map(|line| body_row(line, width)).collect()
}

/// One unhighlighted row inside a frame.
pub fn body_row(text: &str, width: usize) -> Line<'static> {
    styled_row(text, Style::default().fg(theme::CODE).bg(theme::CODE_BG), width)
}

pub fn styled_row(text: &str, style: Style, width: usize) -> Line<'static> {
    let text = format!("  {text}");
    let cols = text.chars().count();
    let mut spans = vec![Span::styled(text, style)];
    pad(&mut spans, cols, width);
    Line::from(spans)
}

/// Draws `┌─ label ─┐` above `body` and `└──┘` below it.
pub fn frame(label: &str, body: Vec<Line<'static>>, width: usize, border: Style) -> Vec<Line<'static>> {
    let inner = width.saturating_sub(2);
    let label = if label.is_empty() { String::new() } else { format!(" {label} ") };
    let fill = inner.saturating_sub(1 + label.chars().count());

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(Line::from(Span::styled(format!("┌─{label}{}┐", "─".repeat(fill)), border)));
    lines.extend(body);
    lines.push(Line::from(Span::styled(format!("└{}┘", "─".repeat(inner)), border)));
    lines
}

fn code_bg() -> Style {
    Style::default().bg(theme::CODE_BG)
}

fn pad(spans: &mut Vec<Span<'static>>, cols: usize, width: usize) {
    if cols < width {
        spans.push(Span::styled(" ".repeat(width - cols), code_bg()));
    }
}
