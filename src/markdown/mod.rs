pub mod code_highlight;
pub mod diagram;
pub mod emoji;
pub mod math;
pub mod renderer;
