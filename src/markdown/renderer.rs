use std::borrow::Cow;
use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use crate::config::PreviewOptions;
use crate::markdown::code_highlight;
use crate::markdown::diagram::{DiagramKind, DiagramRenderer};
use crate::markdown::{emoji, math};
use crate::scroll::{LineMarker, LineMarkers};
use crate::theme;

/// Rendered rows plus the marker set the scroll synchronizer reads.
pub struct RenderedMarkdown {
    pub text: Text<'static>,
    /// Source line → rendered rows, for every line that starts a block.
    pub markers: LineMarkers,
}

impl RenderedMarkdown {
    pub fn height(&self) -> usize {
        self.text.lines.len()
    }
}

/// Renderer configuration. Built once per session from the first update's
/// options; later option changes don't rebuild it.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub html: bool,
    pub breaks: bool,
    pub linkify: bool,
    pub typographer: bool,
    pub hide_front_matter: bool,
    pub math_error_color: Color,
    /// `None` when diagram setup failed; fences render as code instead.
    pub diagrams: Option<DiagramRenderer>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_options(&PreviewOptions::default())
    }
}

impl RenderSettings {
    pub fn from_options(options: &PreviewOptions) -> Self {
        let diagrams = match DiagramRenderer::init(&options.maid) {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                tracing::warn!("diagram rendering disabled: {err}");
                None
            }
        };
        let math_error_color = parse_hex_color(&options.katex.error_color).unwrap_or_else(|| {
            tracing::warn!(color = %options.katex.error_color, "bad katex errorColor, using default");
            theme::ERROR
        });
        Self {
            html: options.mkit.html,
            breaks: options.mkit.breaks,
            linkify: options.mkit.linkify,
            typographer: options.mkit.typographer,
            hide_front_matter: options.hide_yaml_meta,
            math_error_color,
            diagrams,
        }
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_MATH;
        if self.typographer {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        if self.hide_front_matter {
            options |= Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        }
        options
    }
}

/// `#rrggbb` (surrounding whitespace allowed) to an RGB color.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn render_markdown(content: &str, width: usize, settings: &RenderSettings) -> RenderedMarkdown {
    let source = SourceLines::new(content);
    let mut state = RenderState::new(width, settings);
    for (event, range) in merged_events(content, settings.parser_options()) {
        state.event(event, source.line_of(range.start));
    }
    state.finish()
}

/// Byte offset → 0-based source line.
struct SourceLines {
    starts: Vec<usize>,
}

impl SourceLines {
    fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }
}

/// The parser splits text at every potential delimiter; glue the pieces
/// back together so shortcodes and URLs arrive whole.
fn merged_events(content: &str, options: Options) -> Vec<(Event<'_>, Range<usize>)> {
    let mut events: Vec<(Event<'_>, Range<usize>)> = Vec::new();
    for (event, range) in Parser::new_ext(content, options).into_offset_iter() {
        if let (Event::Text(next), Some((Event::Text(prev), prev_range))) = (&event, events.last_mut()) {
            let mut joined = prev.to_string();
            joined.push_str(next);
            *prev = CowStr::from(joined);
            prev_range.end = range.end;
            continue;
        }
        events.push((event, range));
    }
    events
}

struct CodeBlock {
    lang: String,
    content: String,
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<Vec<Span<'static>>>>,
    cell: Vec<Span<'static>>,
    header_rows: usize,
    alignments: Vec<Alignment>,
}

struct RenderState<'s> {
    width: usize,
    settings: &'s RenderSettings,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    quote_depth: usize,
    /// None = bullet list, Some(n) = ordered list at item n.
    list_stack: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    table: Option<Table>,
    link_url: Option<String>,
    /// (url, alt text) of the image being read.
    image: Option<(String, String)>,
    in_front_matter: bool,
    markers: LineMarkers,
    /// (source line, first row) of blocks still open.
    open_blocks: Vec<(usize, usize)>,
}

impl<'s> RenderState<'s> {
    fn new(width: usize, settings: &'s RenderSettings) -> Self {
        Self {
            width,
            settings,
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![Style::default().fg(theme::FG)],
            quote_depth: 0,
            list_stack: Vec::new(),
            code: None,
            table: None,
            link_url: None,
            image: None,
            in_front_matter: false,
            markers: LineMarkers::new(),
            open_blocks: Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>, line: usize) {
        match event {
            Event::Start(tag) => {
                let block = is_block(&tag);
                self.start(tag);
                if block {
                    self.open_blocks.push((line, self.lines.len()));
                }
            }
            Event::End(tag_end) => {
                let block = is_block_end(&tag_end);
                self.end(tag_end);
                if block {
                    self.close_block();
                }
            }
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let span = Span::styled(format!(" {} ", &*code), theme::code_style());
                self.push_inline(span);
            }
            Event::InlineMath(src) => {
                let span = self.math_span(&src);
                self.push_inline(span);
            }
            Event::DisplayMath(src) => self.display_math(&src),
            Event::Html(raw) => self.html_block_line(&raw),
            Event::InlineHtml(raw) => {
                let shown = self.html_text(&raw);
                if !shown.is_empty() {
                    self.push_inline(Span::styled(shown, theme::html_style()));
                }
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Span::styled(format!("[{}]", &*label), theme::link_style()));
            }
            Event::SoftBreak => {
                if self.settings.breaks && self.table.is_none() {
                    self.flush();
                } else {
                    let style = self.current_style();
                    self.push_inline(Span::styled(" ", style));
                }
            }
            Event::HardBreak => {
                if self.table.is_none() {
                    self.flush();
                }
            }
            Event::Rule => {
                let top = self.lines.len();
                self.rule();
                self.markers.insert(line, LineMarker { top, height: 1 });
                self.push_blank();
            }
            Event::TaskListMarker(checked) => {
                let (marker, style) = if checked {
                    ("[x] ", Style::default().fg(theme::SUCCESS))
                } else {
                    ("[ ] ", Style::default().fg(theme::FG))
                };
                self.spans.push(Span::styled(marker, style));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let level = level as usize;
                let prev_blank = self.lines.last().map_or(true, is_blank_row);
                if level == 1 {
                    if !prev_blank {
                        self.push_blank();
                    }
                    self.push_blank();
                } else if level == 2 && !prev_blank {
                    self.push_blank();
                }
                self.quote_prefix();
                self.spans.push(Span::styled(format!("{} ", "#".repeat(level)), theme::heading_style()));
                self.style_stack.push(theme::heading_style());
            }
            Tag::Strong => self.push_style(theme::bold_style()),
            Tag::Emphasis => self.push_style(theme::italic_style()),
            Tag::Strikethrough => {
                self.push_style(Style::default().fg(theme::FG).add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.push_style(theme::link_style());
                self.link_url = Some(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or_default().to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    content: String::new(),
                });
            }
            Tag::BlockQuote(_) => self.quote_depth += 1,
            Tag::List(start) => {
                if !self.list_stack.is_empty() {
                    self.flush();
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush();
                self.quote_prefix();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let bullet = match self.list_stack.last_mut() {
                    Some(Some(counter)) => {
                        let n = *counter;
                        *counter += 1;
                        format!("{indent}{n}. ")
                    }
                    _ => format!("{indent}• "),
                };
                self.spans.push(Span::styled(bullet, Style::default().fg(theme::FG)));
            }
            Tag::Table(alignments) => {
                self.table = Some(Table {
                    alignments,
                    ..Table::default()
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            Tag::FootnoteDefinition(label) => {
                self.quote_prefix();
                self.spans
                    .push(Span::styled(format!("[{}]: ", &*label), Style::default().fg(theme::BORDER)));
            }
            Tag::MetadataBlock(_) => self.in_front_matter = true,
            _ => {}
        }
    }

    fn end(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Heading(level) => {
                self.style_stack.pop();
                self.flush();
                let rule = match level as usize {
                    1 => Some("━"),
                    2 => Some("─"),
                    _ => None,
                };
                if let Some(ch) = rule {
                    let avail = self.width.saturating_sub(self.quote_depth * 2);
                    self.quote_prefix();
                    self.spans.push(Span::styled(ch.repeat(avail), Style::default().fg(theme::HEADING)));
                    self.flush();
                }
                self.push_blank();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link => {
                self.style_stack.pop();
                if let Some(url) = self.link_url.take().filter(|u| !u.is_empty()) {
                    self.push_inline(Span::styled(format!(" ({url})"), Style::default().fg(theme::LINE_NUMBER)));
                }
            }
            TagEnd::Image => {
                if let Some((url, alt)) = self.image.take() {
                    self.flush();
                    self.image_box(&url, &alt);
                }
            }
            TagEnd::CodeBlock => {
                if let Some(block) = self.code.take() {
                    self.code_block(block);
                }
            }
            TagEnd::BlockQuote(_) => self.quote_depth = self.quote_depth.saturating_sub(1),
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Item | TagEnd::FootnoteDefinition => self.flush(),
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    render_table(&table, self.width, self.quote_depth, &mut self.lines);
                }
                self.push_blank();
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    if let Some(row) = table.rows.last_mut() {
                        row.push(cell);
                    }
                }
            }
            TagEnd::Paragraph => {
                self.flush();
                self.push_blank();
            }
            TagEnd::HtmlBlock => self.push_blank(),
            TagEnd::MetadataBlock(_) => self.in_front_matter = false,
            _ => {}
        }
    }

    /// Records the marker for the block that just ended. Nested blocks end
    /// before their parents, so the innermost block owns a shared line.
    fn close_block(&mut self) {
        let Some((line, top)) = self.open_blocks.pop() else {
            return;
        };
        let mut end = self.lines.len();
        while end > top + 1 && is_blank_row(&self.lines[end - 1]) {
            end -= 1;
        }
        self.markers.insert(
            line,
            LineMarker {
                top,
                height: end.saturating_sub(top).max(1),
            },
        );
    }

    fn text(&mut self, text: &str) {
        if self.in_front_matter {
            return;
        }
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
            return;
        }
        if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
            return;
        }

        let style = self.current_style();
        let text = emoji::replace_shortcodes(text);
        if self.table.is_some() {
            let spans = self.inline_spans(&text, style);
            if let Some(table) = self.table.as_mut() {
                table.cell.extend(spans);
            }
            return;
        }

        self.quote_prefix();
        let chunks = word_wrap(&text, self.width, &self.spans);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            let spans = self.inline_spans(chunk, style);
            self.spans.extend(spans);
            if i < last {
                self.flush();
                self.quote_prefix();
            }
        }
    }

    /// Styles a run of text, turning bare URLs into links when enabled.
    fn inline_spans(&self, text: &str, style: Style) -> Vec<Span<'static>> {
        if !self.settings.linkify || self.link_url.is_some() || !text.contains("://") {
            return vec![Span::styled(text.to_string(), style)];
        }

        let mut spans = Vec::new();
        let mut plain = String::new();
        for word in text.split_inclusive(char::is_whitespace) {
            let bare = word.trim_end();
            let url = bare.trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
            if url.starts_with("http://") || url.starts_with("https://") {
                if !plain.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut plain), style));
                }
                spans.push(Span::styled(url.to_string(), theme::link_style()));
                plain.push_str(&word[url.len()..]);
            } else {
                plain.push_str(word);
            }
        }
        if !plain.is_empty() {
            spans.push(Span::styled(plain, style));
        }
        spans
    }

    fn push_inline(&mut self, span: Span<'static>) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push(span);
            return;
        }
        self.quote_prefix();
        self.spans.push(span);
    }

    fn math_span(&self, src: &str) -> Span<'static> {
        match math::to_unicode(src) {
            Ok(converted) => Span::styled(converted, theme::math_style()),
            Err(err) => {
                tracing::debug!("math left as source: {err}");
                Span::styled(src.to_string(), Style::default().fg(self.settings.math_error_color))
            }
        }
    }

    fn display_math(&mut self, src: &str) {
        self.flush();
        let (converted, style) = match math::to_unicode(src) {
            Ok(converted) => (converted, theme::math_style()),
            Err(err) => {
                tracing::debug!("display math left as source: {err}");
                (src.trim().to_string(), Style::default().fg(self.settings.math_error_color))
            }
        };
        for row in converted.lines() {
            self.quote_prefix();
            self.spans.push(Span::styled(format!("  {row}"), style));
            self.flush();
        }
    }

    fn html_text(&self, raw: &str) -> String {
        if self.settings.html {
            strip_tags(raw)
        } else {
            raw.to_string()
        }
    }

    fn html_block_line(&mut self, raw: &str) {
        let shown = self.html_text(raw);
        for row in shown.lines().filter(|r| !r.trim().is_empty()) {
            self.quote_prefix();
            self.spans.push(Span::styled(row.to_string(), theme::html_style()));
            self.flush();
        }
    }

    fn code_block(&mut self, block: CodeBlock) {
        let width = self.width.saturating_sub(self.quote_depth * 2);
        let diagram = DiagramKind::from_lang(&block.lang).zip(self.settings.diagrams.as_ref());
        let rows = match diagram {
            Some((kind, renderer)) => renderer.render(kind, &block.content, width).unwrap_or_else(|err| {
                tracing::warn!(lang = %block.lang, "diagram fell back to code: {err}");
                code_highlight::highlight_code(&block.content, &block.lang, width)
            }),
            None => code_highlight::highlight_code(&block.content, &block.lang, width),
        };
        for row in rows {
            self.quote_prefix();
            self.spans.extend(row.spans);
            self.flush();
        }
        self.push_blank();
    }

    fn image_box(&mut self, url: &str, alt: &str) {
        let alt = if alt.is_empty() { "Image" } else { alt };
        let filename = url.rsplit('/').next().unwrap_or(url);
        let inner = alt.chars().count().max(filename.chars().count()).max(6) + 2;
        let border = Style::default().fg(theme::BORDER);

        let rows = [
            vec![Span::styled(format!("╭─{}─╮", "─".repeat(inner)), border)],
            boxed_row(alt, inner, Style::default().fg(theme::FG).add_modifier(Modifier::ITALIC)),
            boxed_row(filename, inner, Style::default().fg(theme::LINE_NUMBER)),
            vec![Span::styled(format!("╰─{}─╯", "─".repeat(inner)), border)],
        ];
        for row in rows {
            self.quote_prefix();
            self.spans.extend(row);
            self.flush();
        }
    }

    fn rule(&mut self) {
        let avail = self.width.saturating_sub(self.quote_depth * 2);
        let rule = if avail >= 3 {
            format!("╶{}╴", "─".repeat(avail - 2))
        } else {
            "─".repeat(avail)
        };
        self.quote_prefix();
        self.spans.push(Span::styled(rule, Style::default().fg(theme::BORDER)));
        self.flush();
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_else(|| Style::default().fg(theme::FG))
    }

    fn push_style(&mut self, overlay: Style) {
        let base = self.current_style();
        self.style_stack.push(compose_style(base, overlay));
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    /// Adds the `│ ` quote bars when starting a fresh row inside a quote.
    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 && self.spans.is_empty() {
            self.spans.push(quote_bars(self.quote_depth));
        }
    }

    fn push_blank(&mut self) {
        self.flush();
        if self.quote_depth > 0 {
            self.lines.push(Line::from(quote_bars(self.quote_depth)));
        } else {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> RenderedMarkdown {
        self.flush();
        RenderedMarkdown {
            text: Text::from(self.lines),
            markers: self.markers,
        }
    }
}

fn is_block(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::Item
            | Tag::Table(_)
            | Tag::FootnoteDefinition(_)
    )
}

fn is_block_end(tag_end: &TagEnd) -> bool {
    matches!(
        tag_end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::Item
            | TagEnd::Table
            | TagEnd::FootnoteDefinition
    )
}

fn is_blank_row(line: &Line<'_>) -> bool {
    line.spans
        .iter()
        .all(|s| s.content.trim_matches(|c: char| c.is_whitespace() || c == '│').is_empty())
}

fn quote_bars(depth: usize) -> Span<'static> {
    Span::styled("│ ".repeat(depth), Style::default().fg(theme::QUOTE_BORDER))
}

fn boxed_row(text: &str, inner: usize, style: Style) -> Vec<Span<'static>> {
    let border = Style::default().fg(theme::BORDER);
    let pad = inner.saturating_sub(text.chars().count());
    vec![
        Span::styled("│ ", border),
        Span::styled(text.to_string(), style),
        Span::styled(format!("{} │", " ".repeat(pad)), border),
    ]
}

/// Drops `<...>` tags, keeping the text between them.
fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Compose two styles: overlay's colors win, modifiers accumulate.
fn compose_style(base: Style, overlay: Style) -> Style {
    let mut result = overlay;
    result.add_modifier |= base.add_modifier;
    result
}

/// Splits `text` into row-sized chunks given what's already on the row.
fn word_wrap<'t>(text: &'t str, max_width: usize, existing: &[Span<'_>]) -> Vec<Cow<'t, str>> {
    let start_col: usize = existing.iter().map(|s| s.width()).sum();
    if text.chars().count() <= max_width.saturating_sub(start_col) {
        return vec![Cow::Borrowed(text)];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut col = start_col;
    for word in text.split_inclusive(' ') {
        let len = word.chars().count();
        if col + len > max_width && !current.is_empty() {
            chunks.push(Cow::Owned(std::mem::take(&mut current)));
            col = 0;
        }
        current.push_str(word);
        col += len;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(Cow::Owned(current));
    }
    chunks
}

/// Lays out a table with box-drawing borders, shrinking columns to fit.
fn render_table(table: &Table, width: usize, quote_depth: usize, lines: &mut Vec<Line<'static>>) {
    let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if cols == 0 {
        return;
    }

    let cell_width = |cell: &[Span<'static>]| cell.iter().map(|s| s.width()).sum::<usize>();
    let mut widths = vec![3usize; cols];
    for row in &table.rows {
        for (j, cell) in row.iter().enumerate() {
            widths[j] = widths[j].max(cell_width(cell));
        }
    }

    // │ a │ b │ → cols + 1 bars and a space either side of each cell
    let chrome = cols + 1 + cols * 2;
    let available = width.saturating_sub(quote_depth * 2 + chrome);
    let natural: usize = widths.iter().sum();
    if natural > available && available > 0 {
        for w in widths.iter_mut() {
            *w = (*w * available / natural).max(3);
        }
    }

    let border = Style::default().fg(theme::BORDER);
    let pad = |n: usize| Span::styled(" ".repeat(n), Style::default().fg(theme::FG));

    for (i, row) in table.rows.iter().enumerate() {
        let mut spans = Vec::new();
        if quote_depth > 0 {
            spans.push(quote_bars(quote_depth));
        }
        spans.push(Span::styled("│ ", border));
        for (j, w) in widths.iter().copied().enumerate() {
            let cell = row.get(j).map(Vec::as_slice).unwrap_or_default();
            let shown = truncate_cell(cell, w);
            let slack = w.saturating_sub(cell_width(&shown));
            let (left, right) = match table.alignments.get(j).copied().unwrap_or(Alignment::None) {
                Alignment::Right => (slack, 0),
                Alignment::Center => (slack / 2, slack - slack / 2),
                _ => (0, slack),
            };
            spans.push(pad(left));
            spans.extend(shown);
            spans.push(pad(right));
            spans.push(Span::styled(if j + 1 < cols { " │ " } else { " │" }, border));
        }
        lines.push(Line::from(spans));

        if i + 1 == table.header_rows {
            let mut sep = Vec::new();
            if quote_depth > 0 {
                sep.push(quote_bars(quote_depth));
            }
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            sep.push(Span::styled(format!("├{}┤", segments.join("┼")), border));
            lines.push(Line::from(sep));
        }
    }
}

fn truncate_cell(cell: &[Span<'static>], max: usize) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    let mut remaining = max;
    for span in cell {
        let w = span.width();
        if w <= remaining {
            out.push(span.clone());
            remaining -= w;
        } else {
            if remaining > 0 {
                let cut: String = span.content.chars().take(remaining).collect();
                out.push(Span::styled(cut, span.style));
            }
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::MarkerSource;

    fn render(md: &str, width: usize) -> RenderedMarkdown {
        render_markdown(md, width, &RenderSettings::default())
    }

    fn row_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(rendered: &RenderedMarkdown) -> String {
        rendered.text.lines.iter().map(row_text).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn heading_is_prefixed() {
        let out = render("# Hello", 80);
        assert!(all_text(&out).contains("# Hello"));
    }

    #[test]
    fn bold_and_italic_carry_modifiers() {
        let out = render("**bold** *it*", 80);
        let spans = &out.text.lines[0].spans;
        assert!(spans.iter().any(|s| s.content.contains("bold") && s.style.add_modifier.contains(Modifier::BOLD)));
        assert!(spans.iter().any(|s| s.content.contains("it") && s.style.add_modifier.contains(Modifier::ITALIC)));
    }

    #[test]
    fn lists_use_bullets_and_numbers() {
        assert!(all_text(&render("- one\n- two", 80)).contains("• one"));
        let ordered = all_text(&render("1. first\n2. second", 80));
        assert!(ordered.contains("1. first"));
        assert!(ordered.contains("2. second"));
        assert!(!ordered.contains('•'));
    }

    #[test]
    fn task_list_markers() {
        let text = all_text(&render("- [x] done\n- [ ] todo", 80));
        assert!(text.contains("[x] done"));
        assert!(text.contains("[ ] todo"));
    }

    #[test]
    fn table_fits_narrow_width() {
        let md = "| Long Header One | Long Header Two |\n|---|---|\n| cell content a | cell content b |";
        let out = render(md, 30);
        let text = all_text(&out);
        assert!(text.contains('├'));
        for line in &out.text.lines {
            assert!(line.width() <= 30, "row too wide: {:?}", row_text(line));
        }
    }

    #[test]
    fn rule_fills_width() {
        let out = render("text\n\n---", 50);
        let rule = out.text.lines.iter().map(row_text).find(|t| t.contains('─')).unwrap();
        assert_eq!(rule.chars().count(), 50);
    }

    #[test]
    fn soft_breaks_join_lines_by_default() {
        let out = render("one\ntwo", 80);
        assert_eq!(row_text(&out.text.lines[0]), "one two");
    }

    #[test]
    fn breaks_option_keeps_source_lines() {
        let settings = RenderSettings {
            breaks: true,
            ..RenderSettings::default()
        };
        let out = render_markdown("one\ntwo", 80, &settings);
        assert_eq!(row_text(&out.text.lines[0]), "one");
        assert_eq!(row_text(&out.text.lines[1]), "two");
    }

    #[test]
    fn emoji_shortcodes_render() {
        assert!(all_text(&render("ship it :rocket:", 80)).contains("ship it 🚀"));
    }

    #[test]
    fn bare_urls_become_links() {
        let out = render("see https://example.com/a_b_c. ok", 80);
        let links: Vec<&str> = out.text.lines[0]
            .spans
            .iter()
            .filter(|s| s.style == theme::link_style())
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(links, vec!["https://example.com/a_b_c"]);
    }

    #[test]
    fn linkify_can_be_turned_off() {
        let settings = RenderSettings {
            linkify: false,
            ..RenderSettings::default()
        };
        let out = render_markdown("see https://example.com", 80, &settings);
        assert!(out.text.lines[0].spans.iter().all(|s| s.style != theme::link_style()));
        assert!(all_text(&out).contains("https://example.com"));
    }

    #[test]
    fn front_matter_is_hidden() {
        let out = render("---\ntitle: secret\n---\n\n# Body", 80);
        let text = all_text(&out);
        assert!(!text.contains("secret"));
        assert!(text.contains("# Body"));
    }

    #[test]
    fn math_converts_and_errors_show_source() {
        let out = render("$x^2$ and $\\frac{1}$", 80);
        let spans = &out.text.lines[0].spans;
        assert!(spans.iter().any(|s| s.content == "x²"));
        let broken = spans.iter().find(|s| s.content.contains("frac")).unwrap();
        assert_eq!(broken.style.fg, Some(Color::Rgb(0xcc, 0, 0)));
    }

    #[test]
    fn html_tags_are_stripped_or_shown() {
        let md = "<div>\nhello\n</div>";
        assert!(!all_text(&render(md, 80)).contains("<div>"));
        let verbatim = RenderSettings {
            html: false,
            ..RenderSettings::default()
        };
        assert!(all_text(&render_markdown(md, 80, &verbatim)).contains("<div>"));
    }

    #[test]
    fn broken_chart_falls_back_to_code() {
        let out = render("```chart\n{not json\n```\n\nafter", 60);
        let text = all_text(&out);
        assert!(text.contains("┌─ chart "));
        assert!(text.contains("{not json"));
        assert!(text.contains("after"));
    }

    #[test]
    fn bad_mermaid_config_disables_diagrams_only() {
        let options: PreviewOptions =
            serde_json::from_value(serde_json::json!({ "maid": { "theme": "neon" } })).unwrap();
        let settings = RenderSettings::from_options(&options);
        assert!(settings.diagrams.is_none());
        let out = render_markdown("```mermaid\ngraph TD\n```\n\ntext", 60, &settings);
        let text = all_text(&out);
        assert!(text.contains("┌─ mermaid "));
        assert!(!text.contains("mermaid diagram"));
        assert!(text.contains("text"));
    }

    #[test]
    fn markers_point_at_block_first_rows() {
        let md = "# Title\n\nfirst paragraph\n\nsecond paragraph\n";
        let out = render(md, 80);
        for (line, marker) in out.markers.iter() {
            let row = row_text(&out.text.lines[marker.top]);
            let src = md.lines().nth(line).unwrap();
            let word = src.trim_start_matches("# ").split(' ').next().unwrap();
            assert!(row.contains(word), "line {line} → row {:?}", row);
        }
        assert!(out.markers.marker_for_line(0).is_some());
        assert!(out.markers.marker_for_line(2).is_some());
        assert!(out.markers.marker_for_line(4).is_some());
        assert!(out.markers.marker_for_line(1).is_none());
    }

    #[test]
    fn marker_tops_increase_with_source_line() {
        let md = "# A\n\ntext\n\n- one\n- two\n\n> quote\n\n```rust\nfn x() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n---\n";
        let out = render(md, 60);
        let tops: Vec<usize> = out.markers.iter().map(|(_, m)| m.top).collect();
        assert!(tops.windows(2).all(|w| w[0] < w[1]), "tops {tops:?}");
        assert!(out.markers.iter().count() >= 8);
    }

    #[test]
    fn marker_height_excludes_trailing_blank() {
        let out = render("para one\nstill one\n\nnext", 80);
        let marker = out.markers.marker_for_line(0).unwrap();
        assert_eq!(marker.height, 1);
        let code = render("```\na\nb\n```\n", 40);
        assert_eq!(code.markers.marker_for_line(0).unwrap().height, 4);
    }

    #[test]
    fn list_items_get_their_own_markers() {
        let out = render("- item one\n- item two\n", 80);
        let first = out.markers.marker_for_line(0).unwrap();
        let second = out.markers.marker_for_line(1).unwrap();
        assert_eq!(first.height, 1);
        assert_eq!(second.top, first.top + 1);
    }

    #[test]
    fn outer_item_spans_nested_list() {
        let out = render("- outer\n  - inner\n", 80);
        assert_eq!(out.markers.marker_for_line(0), Some(LineMarker { top: 0, height: 2 }));
        assert_eq!(out.markers.marker_for_line(1), Some(LineMarker { top: 1, height: 1 }));
    }

    #[test]
    fn innermost_block_owns_a_shared_line() {
        // quote and its first paragraph both start on line 0
        let out = render("> a\n>\n> b\n", 80);
        assert_eq!(out.markers.marker_for_line(0), Some(LineMarker { top: 0, height: 1 }));
        assert_eq!(out.markers.marker_for_line(2), Some(LineMarker { top: 2, height: 1 }));
    }

    #[test]
    fn images_render_as_boxes() {
        let out = render("![diagram](img/flow.png)", 80);
        let text = all_text(&out);
        assert!(text.contains("diagram"));
        assert!(text.contains("flow.png"));
        assert_eq!(out.markers.marker_for_line(0), Some(LineMarker { top: 0, height: 4 }));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color(" #cc0000"), Some(Color::Rgb(0xcc, 0, 0)));
        assert_eq!(parse_hex_color("#12ab3F"), Some(Color::Rgb(0x12, 0xab, 0x3f)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn source_lines_map_offsets() {
        let lines = SourceLines::new("ab\ncd\n\nef");
        assert_eq!(lines.line_of(0), 0);
        assert_eq!(lines.line_of(2), 0);
        assert_eq!(lines.line_of(3), 1);
        assert_eq!(lines.line_of(6), 2);
        assert_eq!(lines.line_of(7), 3);
    }
}
