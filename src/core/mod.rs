//! Domain types: time arithmetic, axis ranges, sources and plot state.

pub mod bounds;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod timecalc;

// re-export frequently-used items for convenience
pub use bounds::{Window, YRange};
pub use config::{MissingSentinel, PlotConfig, PlotConfigBuilder, PlotStyle, Selection, TextMode};
pub use data::{Source, SourceSet, load_sources};
pub use error::{ConfigError, IgpError, SourceError, TimeError};
