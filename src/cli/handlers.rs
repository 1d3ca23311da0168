use std::io::{self, BufRead};

use crate::{
    cli::{
        backend::Gnuplot,
        session::{Flow, Session},
    },
    core::{
        config::{PlotConfig, PlotStyle},
        data::load_sources,
        error::IgpError,
    },
};

use super::parse::Cli;

/// Load the files, start gnuplot and feed it stdin until `q` or EOF.
pub fn interactive(cli: &Cli) -> Result<(), IgpError> {
    let sources = load_sources(&cli.files)?;
    let config = PlotConfig::builder(sources.initial_window())
        .style(PlotStyle::from_name(&cli.style))
        .line_width(cli.linewidth)
        .show_commands(cli.show)
        .build()?;
    let backend = Gnuplot::spawn(&cli.gnuplot)?;

    let mut session = Session::new(sources, config, backend, io::stdout().lock());
    session.start()?;
    for line in io::stdin().lock().lines() {
        if session.handle(&line?)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
