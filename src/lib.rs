//! Public-facing crate root: an interactive command interpreter that drives
//! gnuplot over one or more time-series CSV files.

pub mod cli;
pub mod command;
pub mod core;
pub mod render;

pub use command::{Line, Mutation, Notice, apply, parse_line};
pub use core::{
    config::{PlotConfig, PlotConfigBuilder},
    data::{SourceSet, load_sources},
    error::{ConfigError, IgpError, SourceError, TimeError},
};
pub use render::{Compiled, Render, compile};
