//! Socket connection to the editor plugin.
//!
//! A worker thread owns the TCP stream, decodes each line, and forwards
//! [`ChannelEvent`]s to the UI thread. When the editor goes away the worker
//! reports [`ChannelEvent::Disconnected`] and keeps reconnecting until the
//! receiving side is dropped.

pub mod wire;

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub use wire::{display_name, resolve_title, Hello, RefreshContent, ServerMessage};

use crate::error::Result;

/// Delay between connection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Refresh(Box<RefreshContent>),
    /// The editor asked for the preview to close.
    Close,
}

impl From<ServerMessage> for ChannelEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::RefreshContent(update) => ChannelEvent::Refresh(update),
            ServerMessage::ClosePage | ServerMessage::Close => ChannelEvent::Close,
        }
    }
}

/// Decodes one wire line. Blank lines yield `None`.
pub fn decode_line(line: &str) -> Result<Option<ChannelEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let msg: ServerMessage = serde_json::from_str(line)?;
    Ok(Some(msg.into()))
}

/// Receiving end of the connection, owned by the session.
pub struct Channel {
    events: mpsc::Receiver<ChannelEvent>,
    _worker: JoinHandle<()>,
}

impl Channel {
    /// Starts the worker. Returns immediately; the first connection attempt
    /// happens in the background.
    pub fn connect(addr: SocketAddr, bufnr: u64) -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("livemark-channel".into())
            .spawn(move || run_worker(addr, bufnr, tx))?;
        Ok(Self {
            events,
            _worker: worker,
        })
    }

    /// Events that arrived since the last call, without blocking.
    pub fn drain(&self) -> Vec<ChannelEvent> {
        self.events.try_iter().collect()
    }

    /// Blocks up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ChannelEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

fn run_worker(addr: SocketAddr, bufnr: u64, tx: mpsc::Sender<ChannelEvent>) {
    let mut attempts: u64 = 0;
    loop {
        match TcpStream::connect_timeout(&addr, Duration::from_secs(2)) {
            Ok(stream) => {
                attempts = 0;
                tracing::info!(%addr, bufnr, "connected to editor");
                if tx.send(ChannelEvent::Connected).is_err() {
                    return;
                }
                let keep_going = match serve(stream, bufnr, &tx) {
                    Ok(keep_going) => keep_going,
                    Err(err) => {
                        tracing::warn!("connection to editor failed: {err}");
                        true
                    }
                };
                if !keep_going {
                    return;
                }
                tracing::info!("editor disconnected");
                if tx.send(ChannelEvent::Disconnected).is_err() {
                    return;
                }
            }
            Err(err) => {
                attempts += 1;
                // first failure is worth seeing; the rest is retry noise
                if attempts == 1 {
                    tracing::info!(%addr, "waiting for editor: {err}");
                } else {
                    tracing::debug!(%addr, attempts, "connect failed: {err}");
                }
            }
        }
        thread::sleep(RECONNECT_DELAY);
    }
}

/// Reads lines until EOF. Returns `Ok(false)` once the session has hung up.
fn serve(mut stream: TcpStream, bufnr: u64, tx: &mpsc::Sender<ChannelEvent>) -> Result<bool> {
    let mut hello = serde_json::to_string(&Hello { bufnr })?;
    hello.push('\n');
    stream.write_all(hello.as_bytes())?;
    stream.flush()?;

    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = line?;
        match decode_line(&line) {
            Ok(Some(event)) => {
                if let ChannelEvent::Refresh(update) = &event {
                    tracing::debug!(lines = update.content.len(), active = update.is_active, "refresh");
                }
                if tx.send(event).is_err() {
                    return Ok(false);
                }
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("skipping message: {err}"),
        }
    }
    Ok(true)
}
