//! One interactive session: the current plot state, the line history needed
//! for repeat-on-enter, and the two output channels (user and backend).

use std::io::{self, Write};

use crate::{
    cli::backend::Backend,
    command::{
        mutate::{Mutation, Notice, apply},
        parse::{IntentBundle, Line, parse_line},
    },
    core::{config::PlotConfig, data::SourceSet, error::IgpError},
    render::{Compiled, compile, setup_directives},
};

/// What the driver loop should do after a line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<B: Backend, W: Write> {
    sources: SourceSet,
    config: PlotConfig,
    /// Replayed when the user enters a blank line.
    previous: String,
    /// Preamble flags of renders that produced no plot, still owed.
    unsent: Unsent,
    backend: B,
    out: W,
}

#[derive(Clone, Copy, Debug, Default)]
struct Unsent {
    title: bool,
    format_x: bool,
}

impl<B: Backend, W: Write> Session<B, W> {
    pub fn new(sources: SourceSet, config: PlotConfig, backend: B, out: W) -> Self {
        Self {
            sources,
            config,
            previous: "i".to_owned(),
            unsent: Unsent::default(),
            backend,
            out,
        }
    }

    #[inline]
    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Everything written for the user so far.
    #[inline]
    pub fn out(&self) -> &W {
        &self.out
    }

    /// Print the summary, prime the backend and draw the first plot.
    pub fn start(&mut self) -> Result<(), IgpError> {
        write!(self.out, "{}", self.sources)?;
        for d in setup_directives() {
            writeln!(self.out, "{d}")?;
            self.send(&d)?;
        }
        writeln!(self.out, "{}", self.config)?;
        self.render()
    }

    pub fn handle(&mut self, input: &str) -> Result<Flow, IgpError> {
        let line = if input.trim().is_empty() {
            self.previous.clone()
        } else {
            input.to_owned()
        };
        match parse_line(&line) {
            Line::Quit => return Ok(Flow::Quit),
            Line::Empty => {}
            Line::Passthrough(raw) => {
                writeln!(self.out, "attempting to run command in gnuplot...")?;
                self.send(&raw)?;
            }
            Line::Command(bundle) => self.command(&bundle)?,
        }
        self.previous = line;
        Ok(Flow::Continue)
    }

    fn command(&mut self, bundle: &IntentBundle) -> Result<(), IgpError> {
        if bundle.info {
            write!(self.out, "{}", self.sources)?;
        }
        let Mutation { config, notices } = apply(&self.config, bundle, &self.sources);
        for n in &notices {
            writeln!(self.out, "{n}")?;
        }
        if !bundle.has_changes() {
            return Ok(());
        }
        self.config = config;
        writeln!(self.out, "{}", self.config)?;
        self.render()
    }

    fn render(&mut self) -> Result<(), IgpError> {
        self.config.title_dirty |= self.unsent.title;
        self.config.format_x_dirty |= self.unsent.format_x;
        match compile(&self.config, &self.sources) {
            Compiled::Plot(r) => {
                self.unsent = Unsent::default();
                if self.config.show_commands {
                    for d in &r.preamble {
                        writeln!(self.out, "{d}")?;
                    }
                    writeln!(self.out, "{}", r.plot)?;
                }
                self.send(&r.to_line())
            }
            Compiled::NoSeries => {
                self.unsent = Unsent {
                    title: self.config.title_dirty,
                    format_x: self.config.format_x_dirty,
                };
                writeln!(self.out, "{}", Notice::NoFileExists)?;
                self.send("")
            }
        }
    }

    fn send(&mut self, line: &str) -> Result<(), IgpError> {
        tracing::debug!(line, "to backend");
        self.backend.send(line).map_err(|e| match e.kind() {
            io::ErrorKind::BrokenPipe => IgpError::BackendClosed,
            _ => IgpError::Io(e),
        })
    }
}
