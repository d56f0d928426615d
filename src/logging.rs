//! Logging setup for livemark.
//!
//! The preview owns the terminal, so logs only ever go to a file.
//!
//! ## Environment Variables
//!
//! 1. **`LIVEMARK_LOG`** (highest priority) - livemark-specific filter
//! 2. **`RUST_LOG`** - standard tracing filter
//! 3. **Default** - `warn` globally, `info` for livemark
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/livemark/logs/livemark-<pid>.log`
//! - macOS: `~/Library/Application Support/livemark/logs/livemark-12345.log`
//! - Linux: `~/.local/share/livemark/logs/livemark-12345.log`
//!
//! Override with `--log-file <path>`. A path with an extension is used as the
//! file itself; anything else is treated as a directory.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::error::{Error, Result};

const DEFAULT_FILTER: &str = "warn,livemark=info";

/// Returned from [`init`]; must be held alive so the file writer flushes.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Initialize file logging.
///
/// Dropping the returned [`LogGuard`] flushes and stops the background writer.
pub fn init(log_file: Option<PathBuf>) -> Result<LogGuard> {
    let (log_dir, filename) = resolve_log_path(log_file);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter()?);

    Registry::default()
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Stdout logging for tests. Safe to call from every test.
pub fn test() {
    if let Ok(filter) = create_filter() {
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    }
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("livemark-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("livemark")
        .join("logs");
    (dir, filename)
}

/// `LIVEMARK_LOG` > `RUST_LOG` > [`DEFAULT_FILTER`].
fn create_filter() -> Result<EnvFilter> {
    let directives = env::var("LIVEMARK_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directives).map_err(|e| Error::Logging(format!("bad filter {directives:?}: {e}")))
}
