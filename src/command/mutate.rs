//! Applies a classified line to the plot state.
//!
//! [`apply`] never touches its input: it returns a fresh [`PlotConfig`]
//! plus the messages the user should see. Time tokens fold left over the
//! window as it evolves; only the folded result is validated, and if it is
//! empty or reversed the previous window is kept in full.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use crate::{
    command::{
        parse::{IntentBundle, OptionChange, VarChange},
        time::{Direction, Pin, RelativeShift, TimeToken},
    },
    core::{
        bounds::Window,
        config::{PlotConfig, Selection, SelectionItem, TextMode},
        constants::{
            CONTRACT_DEFAULT_RATIO, CONTRACT_LIMIT_RATIO, EXPAND_DEFAULT_RATIO,
            EXPLICIT_RATIO_SCALE, FIRST_DATA_COL,
        },
        data::SourceSet,
        error::TimeError,
        timecalc::{
            SpanUnit, add_months, add_years, month_start, offset, seconds_between, span_seconds,
            sub_months, sub_years, year_start,
        },
    },
};

/// Something the user should be told about; none of these stop a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    UnknownWord(String),
    InvalidWord { token: String, reason: String },
    UnsupportedOption(String),
    InvalidOptionValue { name: String, value: String },
    /// A time token that was skipped; the rest of the line still applies.
    TimeTokenSkipped { token: String, reason: SkipReason },
    NoSuchSource(char),
    /// The folded window was empty or reversed; the old one is kept.
    WindowRejected,
    NoFileExists,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// Contracting by 100% or more.
    ShrinkTooFar,
    /// Explicit zero magnitude on `<>`/`><`.
    ZeroChange,
    /// `|` at both ends leaves nothing to move.
    BothEdgesPinned,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWord(w) => write!(f, "change unsupported: {w}"),
            Self::InvalidWord { token, reason } => write!(f, "ignoring {token}: {reason}"),
            Self::UnsupportedOption(name) => {
                write!(f, "change to plot options unsupported: {name}")
            }
            Self::InvalidOptionValue { name, value } => {
                write!(f, "invalid value for plot option {name}: '{value}'")
            }
            Self::TimeTokenSkipped { token, reason } => match reason {
                SkipReason::ShrinkTooFar => {
                    write!(f, "cannot shrink time axis by 100% or more: {token}")
                }
                SkipReason::ZeroChange => write!(f, "time axis change of 0% ignored: {token}"),
                SkipReason::BothEdgesPinned => {
                    write!(f, "both ends of the time axis are pinned: {token}")
                }
            },
            Self::NoSuchSource(id) => write!(f, "no file {id}"),
            Self::WindowRejected => f.write_str("time axis start must be before its end; kept"),
            Self::NoFileExists => f.write_str("no file exists"),
        }
    }
}

/// Result of applying one line.
#[derive(Clone, Debug)]
pub struct Mutation {
    pub config: PlotConfig,
    pub notices: Vec<Notice>,
}

/// Produce the state that follows `prev` after `bundle`.
#[must_use]
pub fn apply(prev: &PlotConfig, bundle: &IntentBundle, sources: &SourceSet) -> Mutation {
    let mut next = prev.clone();
    let mut notices: Vec<Notice> = bundle
        .unknown
        .iter()
        .map(|w| Notice::UnknownWord(w.clone()))
        .chain(bundle.invalid.iter().map(|(token, reason)| Notice::InvalidWord {
            token: token.clone(),
            reason: reason.clone(),
        }))
        .collect();

    if let Some(change) = &bundle.variables {
        apply_variables(&mut next, change, sources, &mut notices);
    }
    if !bundle.times.is_empty() {
        match fold_window(prev.window, &bundle.times, sources, &mut notices) {
            Some(w) => next.window = w,
            None => notices.push(Notice::WindowRejected),
        }
    }
    if let Some(y) = bundle.y_axis {
        next.y_range = y;
    }
    for opt in &bundle.options {
        apply_option(&mut next, opt, &mut notices);
    }
    refresh_dirty(prev, &mut next);

    Mutation {
        config: next,
        notices,
    }
}

// --- Variables ---

fn apply_variables(
    cfg: &mut PlotConfig,
    change: &VarChange,
    sources: &SourceSet,
    notices: &mut Vec<Notice>,
) {
    let step_up = match change {
        VarChange::Select(sel) => {
            cfg.selection = sel.clone();
            return;
        }
        VarChange::Next => true,
        VarChange::Prev => false,
    };

    let letters = cfg.selection.letters();
    let active: Vec<char> = if letters.is_empty() {
        sources.iter().map(|s| s.id).collect()
    } else {
        letters
    };
    let mut found = false;
    // headerless sources have an unknown column count and do not limit the range
    let mut max_col = u16::MAX;
    for id in &active {
        match sources.get(*id) {
            Some(s) => {
                found = true;
                if !s.vars.is_empty() {
                    max_col = max_col.min(s.last_col());
                }
            }
            None => notices.push(Notice::NoSuchSource(*id)),
        }
    }
    if !found {
        notices.push(Notice::NoFileExists);
        return;
    }

    let col = cfg.selection.first_column().unwrap_or(FIRST_DATA_COL);
    let stepped = if step_up {
        col.saturating_add(1)
    } else {
        col.saturating_sub(1)
    };
    let col = stepped.clamp(FIRST_DATA_COL, max_col);

    cfg.selection = if cfg.selection.letters().is_empty() {
        Selection::new(vec![SelectionItem {
            source: None,
            column: Some(col),
        }])
    } else {
        Selection::new(
            active
                .iter()
                .map(|&id| SelectionItem {
                    source: Some(id),
                    column: Some(col),
                })
                .collect(),
        )
    };
}

// --- Time window ---

type Edges = (DateTime<Utc>, DateTime<Utc>);

/// Fold every token over `start`. `None` if the result is not a valid
/// window.
fn fold_window(
    start: Window,
    tokens: &[TimeToken],
    sources: &SourceSet,
    notices: &mut Vec<Notice>,
) -> Option<Window> {
    let mut edges = (start.start(), start.end());
    for tok in tokens {
        match step(edges, tok, sources, notices) {
            Ok(e) => {
                tracing::debug!(?tok, start = %e.0, end = %e.1, "time token applied");
                edges = e;
            }
            Err(err) => {
                tracing::debug!(?tok, %err, "time change abandoned");
                return None;
            }
        }
    }
    Window::new(edges.0, edges.1).ok()
}

fn step(
    edges: Edges,
    tok: &TimeToken,
    sources: &SourceSet,
    notices: &mut Vec<Notice>,
) -> Result<Edges, TimeError> {
    let (x1, x2) = edges;
    let span = seconds_between(x1, x2);
    Ok(match tok {
        TimeToken::Start(t) => (*t, x2),
        TimeToken::End(t) => (x1, *t),
        TimeToken::Center(c) => (offset(*c, -span / 2.0)?, offset(*c, span / 2.0)?),
        TimeToken::Full => {
            let u = sources.union();
            (u.start(), u.end())
        }
        TimeToken::Overlap => sources.overlap().map_or(edges, |w| (w.start(), w.end())),
        TimeToken::Source(id) => match sources.get(*id) {
            Some(s) => (s.start, s.end),
            None => {
                notices.push(Notice::NoSuchSource(*id));
                edges
            }
        },
        TimeToken::Relative(r) => shift(edges, r, notices)?,
    })
}

fn shift(edges: Edges, r: &RelativeShift, notices: &mut Vec<Notice>) -> Result<Edges, TimeError> {
    let skip = |reason| Notice::TimeTokenSkipped {
        token: r.raw.clone(),
        reason,
    };
    if r.pin == Pin::Both {
        notices.push(skip(SkipReason::BothEdgesPinned));
        return Ok(edges);
    }
    if r.end_anchored {
        tracing::debug!(token = %r.raw, "span follows an end anchor");
    }

    let (x1, x2) = edges;
    let span = seconds_between(x1, x2);
    let length = r.length();
    // seconds covered by `length` units, calendar units measured from the start edge
    let amount = match r.unit {
        Some(u) => span_seconds(length, u, x1),
        None => length * span,
    };

    Ok(match (r.direction, r.pin) {
        (Direction::Resize, Pin::Start) => (x1, offset(x1, amount)?),
        (Direction::Resize, Pin::End) => (offset(x2, -amount)?, x2),
        (Direction::Resize, _) => {
            let mid = offset(x1, span / 2.0)?;
            (offset(mid, -amount / 2.0)?, offset(mid, amount / 2.0)?)
        }

        (Direction::Forward, Pin::Free) => match r.unit {
            Some(SpanUnit::Month) => {
                let n = whole_units(length);
                let a = month_start(add_months(x1, n).ok_or(TimeError::OutOfRange)?);
                (a, month_start(add_months(a, n).ok_or(TimeError::OutOfRange)?))
            }
            Some(SpanUnit::Year) => {
                let n = whole_units(length);
                let a = year_start(add_years(x1, n).ok_or(TimeError::OutOfRange)?.year())?;
                (a, year_start(add_years(a, n).ok_or(TimeError::OutOfRange)?.year())?)
            }
            _ => (offset(x1, amount)?, offset(x2, amount)?),
        },
        (Direction::Forward, Pin::Start) => (x1, offset(x2, amount)?),
        (Direction::Forward, _) => (offset(x1, amount)?, x2),

        (Direction::Backward, Pin::Free) => match r.unit {
            Some(SpanUnit::Month) => {
                let n = whole_units(length);
                let a = month_start(sub_months(x1, n).ok_or(TimeError::OutOfRange)?);
                (a, month_start(add_months(a, n).ok_or(TimeError::OutOfRange)?))
            }
            Some(SpanUnit::Year) => {
                let n = whole_units(length);
                let a = year_start(sub_years(x1, n).ok_or(TimeError::OutOfRange)?.year())?;
                (a, year_start(add_years(a, n).ok_or(TimeError::OutOfRange)?.year())?)
            }
            _ => (offset(x1, -amount)?, offset(x2, -amount)?),
        },
        (Direction::Backward, Pin::Start) => (x1, offset(x2, -amount)?),
        (Direction::Backward, _) => (offset(x1, -amount)?, x2),

        (Direction::Expand | Direction::Contract, _) => {
            let expand = r.direction == Direction::Expand;
            let ratio = match r.magnitude {
                None if expand => EXPAND_DEFAULT_RATIO,
                None => CONTRACT_DEFAULT_RATIO,
                Some(v) if v.abs() < f64::EPSILON => {
                    notices.push(skip(SkipReason::ZeroChange));
                    return Ok(edges);
                }
                Some(v) => v * EXPLICIT_RATIO_SCALE,
            };
            let ratio = if expand { ratio } else { -ratio };
            if ratio <= CONTRACT_LIMIT_RATIO && r.unit.is_none() {
                notices.push(skip(SkipReason::ShrinkTooFar));
                return Ok(edges);
            }
            let delta = match r.unit {
                None => ratio * span,
                Some(u) => span_seconds(ratio.abs(), u, x1).copysign(ratio),
            };
            (offset(x1, -delta)?, offset(x2, delta)?)
        }
    })
}

/// Calendar jumps move by at least one whole unit.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_units(length: f64) -> u32 {
    length.trunc().clamp(1.0, f64::from(u32::MAX)) as u32
}

// --- Options ---

fn apply_option(cfg: &mut PlotConfig, opt: &OptionChange, notices: &mut Vec<Notice>) {
    match opt {
        OptionChange::Style(s) => cfg.style = s.clone(),
        OptionChange::ResetStyle => cfg.style = cfg.defaults.style.clone(),
        OptionChange::LineWidth(w) => cfg.line_width = *w,
        OptionChange::ResetLineWidth => cfg.line_width = cfg.defaults.line_width,
        OptionChange::Missing(m) => cfg.missing = Some(m.clone()),
        OptionChange::ResetMissing => cfg.missing = cfg.defaults.missing.clone(),
        OptionChange::FormatX(s) => cfg.format_x = TextMode::Literal(s.clone()),
        OptionChange::ToggleFormatX => cfg.format_x = cfg.format_x.toggled(),
        OptionChange::Title(s) => cfg.title = TextMode::Literal(s.clone()),
        OptionChange::ToggleTitle => cfg.title = cfg.title.toggled(),
        OptionChange::ToggleShow => cfg.show_commands = !cfg.show_commands,
        OptionChange::Unsupported(name) => notices.push(Notice::UnsupportedOption(name.clone())),
        OptionChange::InvalidValue { name, value } => notices.push(Notice::InvalidOptionValue {
            name: name.clone(),
            value: value.clone(),
        }),
    }
}

// --- Dirty flags ---

fn refresh_dirty(prev: &PlotConfig, next: &mut PlotConfig) {
    next.title_dirty = prev.title != next.title
        || (next.title == TextMode::Auto && prev.selection != next.selection);
    next.format_x_dirty = prev.format_x != next.format_x
        || (next.format_x == TextMode::Auto && prev.window.width() != next.window.width());
}
