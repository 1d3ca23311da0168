//! Line-oriented channel to the plotting process.

use std::{
    io::{self, Write},
    path::Path,
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::core::error::IgpError;

/// Receives directives, one per call. Replies are never read back.
pub trait Backend {
    fn send(&mut self, line: &str) -> io::Result<()>;
}

/// A running gnuplot process. Its output goes straight to the terminal.
pub struct Gnuplot {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl Gnuplot {
    pub fn spawn(path: &Path) -> Result<Self, IgpError> {
        let spawn_err = |source| IgpError::Spawn {
            path: path.to_path_buf(),
            source,
        };
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_err)?;
        let stdin = child.stdin.take().ok_or_else(|| {
            spawn_err(io::Error::new(io::ErrorKind::BrokenPipe, "no stdin"))
        })?;
        tracing::info!(path = %path.display(), pid = child.id(), "backend started");
        Ok(Self {
            child,
            stdin: Some(stdin),
        })
    }
}

impl Backend for Gnuplot {
    fn send(&mut self, line: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::BrokenPipe))?;
        writeln!(stdin, "{line}")?;
        stdin.flush()
    }
}

impl Drop for Gnuplot {
    fn drop(&mut self) {
        // closing stdin makes gnuplot exit
        drop(self.stdin.take());
        if let Err(e) = self.child.wait() {
            tracing::warn!(%e, "waiting for backend");
        }
    }
}

/// In-memory backend that records every line instead of plotting.
///
/// Public so a [`Session`](crate::cli::session::Session) can be driven
/// without gnuplot, e.g. to preview the directives a command produces.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Backend for Transcript {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}
