//! Per-update preview options sent by the editor plugin.
//!
//! Every field is optional on the wire; defaults are applied by serde.
//! Vim plugins send booleans as `0`/`1`, so flags accept either form. A
//! field of the wrong type is logged and replaced by its default instead of
//! failing the whole update.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::scroll::ScrollMode;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Alignment used when syncing to the cursor (default `middle`).
    #[serde(deserialize_with = "lenient_scroll_mode")]
    pub sync_scroll_type: ScrollMode,
    /// Turns cursor sync off entirely (default off).
    #[serde(deserialize_with = "flag_off")]
    pub disable_sync_scroll: bool,
    /// Hide YAML front matter (default on). Any truthy value counts, not
    /// only `1`.
    #[serde(deserialize_with = "flag_on")]
    pub hide_yaml_meta: bool,
    #[serde(deserialize_with = "or_default")]
    pub mkit: MarkdownOptions,
    #[serde(deserialize_with = "or_default")]
    pub katex: KatexOptions,
    /// Mermaid configuration, checked once when the renderer is built.
    #[serde(deserialize_with = "or_default")]
    pub maid: Map<String, Value>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            sync_scroll_type: ScrollMode::Middle,
            disable_sync_scroll: false,
            hide_yaml_meta: true,
            mkit: MarkdownOptions::default(),
            katex: KatexOptions::default(),
            maid: Map::new(),
        }
    }
}

impl PreviewOptions {
    /// The mode to sync with, folding `disable_sync_scroll` into `None`.
    pub fn effective_scroll_mode(&self) -> ScrollMode {
        if self.disable_sync_scroll {
            ScrollMode::None
        } else {
            self.sync_scroll_type
        }
    }
}

/// Markdown parser switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Interpret raw HTML: tags are dropped and their text kept. When off,
    /// HTML is shown verbatim.
    #[serde(deserialize_with = "flag_on")]
    pub html: bool,
    /// Treat soft line breaks as hard breaks.
    #[serde(deserialize_with = "flag_off")]
    pub breaks: bool,
    /// Turn bare `http(s)://` URLs into links.
    #[serde(deserialize_with = "flag_on")]
    pub linkify: bool,
    /// Smart quotes and dashes.
    #[serde(deserialize_with = "flag_on")]
    pub typographer: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            html: true,
            breaks: false,
            linkify: true,
            typographer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KatexOptions {
    /// Color for math that fails to convert, as `#rrggbb`.
    #[serde(deserialize_with = "or_default")]
    pub error_color: String,
}

impl Default for KatexOptions {
    fn default() -> Self {
        Self {
            error_color: "#cc0000".to_string(),
        }
    }
}

/// Reads a Vim-style flag. `null` and values that are neither booleans,
/// numbers nor strings give `default`.
fn flag(value: Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false" | "v:false"),
        Value::Null => default,
        other => {
            tracing::warn!(%other, "ignoring non-flag option value");
            default
        }
    }
}

fn flag_on<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(flag(Value::deserialize(deserializer)?, true))
}

pub(crate) fn flag_off<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(flag(Value::deserialize(deserializer)?, false))
}

/// Decodes any JSON value into `T`, falling back to `T::default()` when the
/// value has the wrong shape.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!("{err}, using default");
        T::default()
    }))
}

fn lenient_scroll_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ScrollMode, D::Error> {
    let mode = match Value::deserialize(deserializer)? {
        Value::Null => ScrollMode::Middle,
        Value::String(raw) => raw.parse().unwrap_or_else(|err| {
            tracing::warn!("{err}, using middle");
            ScrollMode::Middle
        }),
        other => {
            tracing::warn!(%other, "scroll mode is not a string, using middle");
            ScrollMode::Middle
        }
    };
    Ok(mode)
}
