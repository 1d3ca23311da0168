use std::path::PathBuf;

use clap::Parser;

use crate::core::constants::{DEFAULT_LINE_WIDTH, DEFAULT_STYLE};

const COMMANDS: &str = "\
Interactive commands (space separated, combinable on one line):
  i                       info: files, columns, time ranges
  q | quit | exit         leave
  <enter>                 repeat the previous line
  a2  3  b  a2,b3  vn vp  select variables (file letter + column)
  y[lo][,hi]              y range, empty side = auto
  -opt[=val][,opt...]     style|ls, lw, mis, title, formatx, show|s
  t  tv  ta..ts           whole range, overlap, one file
  s<time> e<time> c<time> set start, end, centre (e.g. s2013-04-05T06)
  >  <  >>2d  <3h         move later / earlier
  <>  ><  <>0.5  ><2h     expand / contract
  2d  |2d  2d|  |>1w      resize, '|' pins the start or end
  anything else           sent to gnuplot as typed";

/// Top-level CLI structure.
#[derive(Parser, Debug)]
#[command(
    name = "igplot",
    version,
    about = "Interactive gnuplot driver for 2D time-series CSV files",
    after_help = COMMANDS
)]
pub struct Cli {
    /// CSV files; the first column is a `YYYY-MM-DD HH:MM:SS` timestamp
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// gnuplot executable
    #[arg(long, value_name = "PATH", default_value = "gnuplot")]
    pub gnuplot: PathBuf,

    /// Plot style, restored by a bare `-style`
    #[arg(long, default_value = DEFAULT_STYLE)]
    pub style: String,

    /// Line width, restored by a bare `-lw`
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub linewidth: f64,

    /// Echo every directive before sending it
    #[arg(long)]
    pub show: bool,

    /// Emit debug diagnostics on stderr
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["igplot", "a.csv", "b.csv"]).unwrap();
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.gnuplot, PathBuf::from("gnuplot"));
        assert_eq!(cli.style, "lines");
        assert_eq!(cli.linewidth, 1.0);
        assert!(!cli.show && !cli.debug);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "igplot", "--style", "points", "--linewidth", "2.5", "--show", "x.csv",
        ])
        .unwrap();
        assert_eq!(cli.style, "points");
        assert_eq!(cli.linewidth, 2.5);
        assert!(cli.show);
    }

    #[test]
    fn no_files_parses() {
        let cli = Cli::try_parse_from(["igplot"]).unwrap();
        assert!(cli.files.is_empty());
    }
}
