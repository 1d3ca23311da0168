pub mod backend;
mod handlers;
pub mod parse;
pub mod session;

use std::io;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

pub use parse::Cli;

use crate::core::error::IgpError;

/// Filter override, e.g. `IGPLOT_LOG=igplot::command=debug`.
const LOG_ENV: &str = "IGPLOT_LOG";

pub fn run() -> Result<(), IgpError> {
    let cli = parse::Cli::parse();
    if cli.files.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }
    init_logging(cli.debug);
    handlers::interactive(&cli)
}

fn init_logging(debug: bool) {
    let default_level = if debug { "igplot=debug" } else { "igplot=warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
