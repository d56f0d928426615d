pub mod header;
pub mod preview;
pub mod status;
