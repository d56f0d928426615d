//! Diagram fences: `mermaid`, `plantuml`, and `chart`.
//!
//! Charts (Chart.js-style JSON) are drawn as horizontal bars. Mermaid and
//! PlantUML have no terminal layout engine, so their source is shown in a
//! labeled frame. Every failure here is reported as a [`DiagramError`]; the
//! renderer falls back to a plain code block and keeps going.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::markdown::code_highlight;
use crate::theme;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("invalid mermaid option {key}: {reason}")]
    Config { key: String, reason: String },
    #[error("invalid chart: {0}")]
    Chart(#[from] serde_json::Error),
    #[error("chart has no data")]
    EmptyChart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Mermaid,
    PlantUml,
    Chart,
}

impl DiagramKind {
    /// Matches the first word of a fence's info string.
    pub fn from_lang(lang: &str) -> Option<Self> {
        match lang.to_ascii_lowercase().as_str() {
            "mermaid" => Some(DiagramKind::Mermaid),
            "plantuml" | "puml" | "uml" => Some(DiagramKind::PlantUml),
            "chart" => Some(DiagramKind::Chart),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DiagramKind::Mermaid => "mermaid diagram",
            DiagramKind::PlantUml => "plantuml diagram",
            DiagramKind::Chart => "chart",
        }
    }
}

const MERMAID_THEMES: &[&str] = &["default", "base", "dark", "forest", "neutral"];

/// Built once per session from the `maid` options.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramRenderer {
    accent: Color,
}

impl DiagramRenderer {
    pub fn init(maid: &Map<String, Value>) -> Result<Self, DiagramError> {
        let theme_name = match maid.get("theme") {
            None => "default",
            Some(Value::String(name)) if MERMAID_THEMES.contains(&name.as_str()) => name.as_str(),
            Some(other) => {
                return Err(DiagramError::Config {
                    key: "theme".into(),
                    reason: format!("expected one of {MERMAID_THEMES:?}, got {other}"),
                })
            }
        };
        if let Some(value) = maid.get("startOnLoad").filter(|v| !v.is_boolean()) {
            return Err(DiagramError::Config {
                key: "startOnLoad".into(),
                reason: format!("expected a boolean, got {value}"),
            });
        }

        let accent = match theme_name {
            "dark" => Color::Rgb(187, 154, 247),
            "forest" => theme::SUCCESS,
            "neutral" => Color::Gray,
            _ => theme::HEADING,
        };
        Ok(Self { accent })
    }

    pub fn render(&self, kind: DiagramKind, source: &str, width: usize) -> Result<Vec<Line<'static>>, DiagramError> {
        let body = match kind {
            DiagramKind::Chart => chart_rows(source, width)?,
            DiagramKind::Mermaid | DiagramKind::PlantUml => {
                let style = Style::default().fg(self.accent).bg(theme::CODE_BG);
                source
                    .lines()
                    .filter(|l| !matches!(l.trim(), "@startuml" | "@enduml"))
                    .map(|l| code_highlight::styled_row(l, style, width))
                    .collect()
            }
        };
        let border = Style::default().fg(self.accent).add_modifier(Modifier::BOLD);
        Ok(code_highlight::frame(kind.label(), body, width, border))
    }
}

#[derive(Debug, Deserialize)]
struct ChartSpec {
    #[serde(default)]
    data: ChartData,
}

#[derive(Debug, Default, Deserialize)]
struct ChartData {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    label: String,
    #[serde(default)]
    data: Vec<f64>,
}

const BAR_COLORS: &[Color] = &[Color::Cyan, Color::Yellow, Color::Magenta, Color::Green, Color::Blue];

fn chart_rows(source: &str, width: usize) -> Result<Vec<Line<'static>>, DiagramError> {
    let spec: ChartSpec = serde_json::from_str(source)?;
    let datasets: Vec<&Dataset> = spec.data.datasets.iter().filter(|d| !d.data.is_empty()).collect();
    if datasets.is_empty() {
        return Err(DiagramError::EmptyChart);
    }

    let peak = datasets
        .iter()
        .flat_map(|d| d.data.iter())
        .fold(0.0_f64, |acc, v| acc.max(*v));
    let label_w = spec.data.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    let value_w = 10;
    let bar_w = width.saturating_sub(label_w + value_w + 6).max(1);

    let bg = Style::default().bg(theme::CODE_BG);
    let mut rows = Vec::new();
    for (i, dataset) in datasets.iter().enumerate() {
        let color = BAR_COLORS[i % BAR_COLORS.len()];
        if !dataset.label.is_empty() {
            rows.push(code_highlight::styled_row(
                &dataset.label,
                bg.fg(color).add_modifier(Modifier::BOLD),
                width,
            ));
        }
        for (j, value) in dataset.data.iter().enumerate() {
            let label = spec.data.labels.get(j).cloned().unwrap_or_else(|| (j + 1).to_string());
            let filled = if peak > 0.0 && *value > 0.0 {
                ((value / peak) * bar_w as f64).round().max(1.0) as usize
            } else {
                0
            };
            let mut spans = vec![
                Span::styled(format!("  {label:>label_w$} │"), bg.fg(theme::FG)),
                Span::styled("█".repeat(filled), bg.fg(color)),
                Span::styled(format!("{} {value}", " ".repeat(bar_w.saturating_sub(filled))), bg.fg(theme::FG)),
            ];
            let cols: usize = spans.iter().map(|s| s.content.chars().count()).sum();
            if cols < width {
                spans.push(Span::styled(" ".repeat(width - cols), bg));
            }
            rows.push(Line::from(spans));
        }
    }
    Ok(rows)
}
