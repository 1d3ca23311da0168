pub mod compile;
pub mod format;

pub use compile::{Compiled, Render, compile, setup_directives};
pub use format::{auto_title, tick_format};
