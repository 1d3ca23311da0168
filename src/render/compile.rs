//! Turns the plot state into backend directives.
//!
//! Preamble directives (title, tick format) are only produced when their
//! dirty flag is set; the plot directive is produced every time.

use crate::{
    core::{
        config::{PlotConfig, SelectionItem, TextMode},
        constants::{FIRST_DATA_COL, SKIP_CSV_HEADER, TF_INFILE, TF_PLOT, X_AXIS_COL},
        data::{Source, SourceSet},
    },
    render::format::{active_sources, auto_title, tick_format},
};

/// Directives sent once before the first plot.
#[must_use]
pub fn setup_directives() -> Vec<String> {
    vec![
        "set xdata time".to_owned(),
        format!("set timefmt '{TF_INFILE}'"),
        r#"set datafile separator ",""#.to_owned(),
        "set grid front".to_owned(),
        r##"set style line 80 lt rgb "#808080""##.to_owned(),
        "set style line 81 lt 0".to_owned(),
        r##"set style line 81 lt rgb "#808080""##.to_owned(),
        "set border 15 back linestyle 80".to_owned(),
        "set grid front linestyle 81".to_owned(),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Render {
    pub preamble: Vec<String>,
    pub plot: String,
}

impl Render {
    /// Everything on one backend line, `;`-separated.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut line = self.preamble.join("; ");
        if !line.is_empty() {
            line.push_str("; ");
        }
        line.push_str(&self.plot);
        line
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Compiled {
    Plot(Render),
    /// Nothing selected resolves to an existing column.
    NoSeries,
}

#[must_use]
pub fn compile(cfg: &PlotConfig, sources: &SourceSet) -> Compiled {
    let mut preamble = Vec::new();

    if cfg.title_dirty {
        match &cfg.title {
            TextMode::Off => preamble.push("set title".to_owned()),
            TextMode::Auto => match auto_title(&cfg.selection, sources) {
                Some(t) => preamble.push(format!("set title \"{t}\"")),
                None => return Compiled::NoSeries,
            },
            TextMode::Literal(t) => preamble.push(format!("set title {t}")),
        }
    }
    if cfg.format_x_dirty {
        preamble.push(match &cfg.format_x {
            TextMode::Off => "set format x".to_owned(),
            TextMode::Auto => format!("set format x {}", tick_format(&cfg.window)),
            TextMode::Literal(t) => format!("set format x {t}"),
        });
    }

    let tag_source = active_sources(&cfg.selection, sources).len() > 1;
    let clauses: Vec<String> = series(cfg.selection.items(), sources)
        .into_iter()
        .map(|(src, col)| series_clause(cfg, src, col, tag_source))
        .collect();
    if clauses.is_empty() {
        return Compiled::NoSeries;
    }

    let plot = format!(
        "plot ['{}':'{}'][{}] {}",
        cfg.window.start().format(TF_PLOT),
        cfg.window.end().format(TF_PLOT),
        cfg.y_range,
        clauses.join(", ")
    );
    Compiled::Plot(Render { preamble, plot })
}

/// Expand the selection into concrete `(source, column)` pairs.
fn series<'a>(items: &[SelectionItem], sources: &'a SourceSet) -> Vec<(&'a Source, u16)> {
    let mut out: Vec<(&Source, u16)> = Vec::new();
    let mut push = |src: &'a Source, col: u16| {
        if col < FIRST_DATA_COL {
            return;
        }
        if !src.vars.is_empty() && col > src.last_col() {
            tracing::warn!(source = %src.id, col, "column not in source, skipped");
            return;
        }
        if !out.iter().any(|(s, c)| s.id == src.id && *c == col) {
            out.push((src, col));
        }
    };

    for item in items {
        match (item.source, item.column) {
            (Some(id), col) => {
                let Some(src) = sources.get(id) else {
                    tracing::warn!(source = %id, "no such source, skipped");
                    continue;
                };
                match col {
                    Some(c) => push(src, c),
                    None => (FIRST_DATA_COL..=src.last_col()).for_each(|c| push(src, c)),
                }
            }
            (None, Some(col)) => sources.iter().for_each(|src| push(src, col)),
            (None, None) => {}
        }
    }
    out
}

fn series_clause(cfg: &PlotConfig, src: &Source, col: u16, tag_source: bool) -> String {
    let using = match &cfg.missing {
        Some(m) => format!("{X_AXIS_COL}:(${col}{}?1/0:${col})", m.as_str()),
        None => format!("{X_AXIS_COL}:(${col})"),
    };
    let mut legend = src
        .var_name(col)
        .map_or_else(|| format!("{}{col}", src.id), str::to_owned);
    if tag_source {
        legend.push_str(&format!(" ({})", src.id.to_ascii_uppercase()));
    }
    format!(
        "'{SKIP_CSV_HEADER}{}' u {using} t '{legend}' w {} lw {}",
        src.label(),
        cfg.style,
        cfg.line_width
    )
}
