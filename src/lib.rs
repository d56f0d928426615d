pub mod app;
pub mod channel;
pub mod components;
pub mod config;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod scroll;
pub mod theme;

pub use error::{Error, Result};
