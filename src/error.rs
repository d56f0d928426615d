use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed channel message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not resolve editor address {0}")]
    Resolve(String),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
