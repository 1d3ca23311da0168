//! Line classifier: splits a user line into words and tags every word with
//! the kind of change it asks for.
//!
//! Precedence, first match wins:
//! 1. `i` (info, ends the line)
//! 2. `y...` y-axis range
//! 3. `-...` plot options
//! 4. `vn` / `vp`, then `a2`, `2`, `a`, `a2,b3` variable selectors
//! 5. time tokens (see [`crate::command::time`])
//!
//! A line where no word matches is handed to the backend untouched.

use crate::{
    command::time::{Direction, TimeToken, parse_time_token},
    core::{
        bounds::YRange,
        config::{MissingSentinel, PlotStyle, Selection, SelectionItem},
    },
};

/// What a whole line asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// Blank input.
    Empty,
    Quit,
    /// Nothing recognised: send to the backend verbatim.
    Passthrough(String),
    Command(IntentBundle),
}

/// A variable-selection change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarChange {
    Select(Selection),
    /// `vn`
    Next,
    /// `vp`
    Prev,
}

/// One item of a `-opt,opt=value` list.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionChange {
    Style(PlotStyle),
    ResetStyle,
    LineWidth(f64),
    ResetLineWidth,
    Missing(MissingSentinel),
    ResetMissing,
    FormatX(String),
    ToggleFormatX,
    Title(String),
    ToggleTitle,
    ToggleShow,
    /// Name as typed, with a trailing `=` for assignments.
    Unsupported(String),
    InvalidValue { name: String, value: String },
}

/// Classification of one word.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Info,
    YAxis(YRange),
    Options(Vec<OptionChange>),
    Variables(VarChange),
    Time(TimeToken),
    /// Has the shape of a known token but a bad payload.
    Invalid { token: String, reason: String },
    Unknown(String),
}

/// Everything one line changes, in the order it will be applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntentBundle {
    pub info: bool,
    /// Last selector on the line.
    pub variables: Option<VarChange>,
    /// All time tokens in the order typed.
    pub times: Vec<TimeToken>,
    /// Last y-range on the line.
    pub y_axis: Option<YRange>,
    pub options: Vec<OptionChange>,
    /// `(token, reason)` for words of a known shape that could not be used.
    pub invalid: Vec<(String, String)>,
    pub unknown: Vec<String>,
}

impl IntentBundle {
    /// True if the line mutates the plot state.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.variables.is_some()
            || !self.times.is_empty()
            || self.y_axis.is_some()
            || !self.options.is_empty()
    }

    /// True if no word was recognised at all.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        !self.info && !self.has_changes() && self.invalid.is_empty()
    }

    fn push(&mut self, intent: Intent) {
        match intent {
            Intent::Info => self.info = true,
            Intent::YAxis(r) => self.y_axis = Some(r),
            Intent::Options(v) => self.options.extend(v),
            Intent::Variables(v) => self.variables = Some(v),
            Intent::Time(t) => self.times.push(t),
            Intent::Invalid { token, reason } => self.invalid.push((token, reason)),
            Intent::Unknown(t) => self.unknown.push(t),
        }
    }

    /// Flag direction-less span tokens on a line that also sets the end edge.
    fn mark_end_anchored(&mut self) {
        if !self.times.iter().any(|t| matches!(t, TimeToken::End(_))) {
            return;
        }
        for t in &mut self.times {
            if let TimeToken::Relative(r) = t {
                r.end_anchored |= r.direction == Direction::Resize;
            }
        }
    }
}

/// Classify a full input line.
#[must_use]
pub fn parse_line(line: &str) -> Line {
    let line = line.trim();
    match line {
        "" => return Line::Empty,
        "q" | "quit" | "exit" => return Line::Quit,
        _ => {}
    }
    let mut bundle = IntentBundle::default();
    for word in line.split_whitespace() {
        let intent = classify(word);
        tracing::debug!(word, ?intent, "classified");
        // an unknown leading word makes the whole line a backend command
        if matches!(intent, Intent::Unknown(_)) && bundle == IntentBundle::default() {
            return Line::Passthrough(line.to_owned());
        }
        let stop = intent == Intent::Info;
        bundle.push(intent);
        if stop {
            break;
        }
    }
    if bundle.is_unclassified() {
        return Line::Passthrough(line.to_owned());
    }
    bundle.mark_end_anchored();
    Line::Command(bundle)
}

/// Classify a single word.
#[must_use]
pub fn classify(word: &str) -> Intent {
    if word == "i" {
        return Intent::Info;
    }
    if let Some(rest) = word.strip_prefix('y') {
        return parse_y_range(word, rest);
    }
    if let Some(rest) = word.strip_prefix('-') {
        return Intent::Options(parse_options(rest));
    }
    match word {
        "vn" => return Intent::Variables(VarChange::Next),
        "vp" => return Intent::Variables(VarChange::Prev),
        _ => {}
    }
    if let Some(sel) = parse_selection(word) {
        return Intent::Variables(VarChange::Select(sel));
    }
    match parse_time_token(word) {
        Some(Ok(t)) => Intent::Time(t),
        Some(Err(e)) => Intent::Invalid {
            token: word.to_owned(),
            reason: e.to_string(),
        },
        None => Intent::Unknown(word.to_owned()),
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '.')
}

/// `y[low][sep high]` where `sep` is one punctuation character; an empty
/// side clears that bound.
fn parse_y_range(word: &str, rest: &str) -> Intent {
    let low_end = rest.find(|c: char| !is_number_char(c)).unwrap_or(rest.len());
    let (low, tail) = rest.split_at(low_end);
    let mut tail = tail.chars();
    let high = match tail.next() {
        None => "",
        Some(sep) if sep.is_ascii_punctuation() => tail.as_str(),
        Some(_) => return Intent::Unknown(word.to_owned()),
    };
    if !high.chars().all(is_number_char) {
        return Intent::Unknown(word.to_owned());
    }

    let bound = |s: &str| -> Result<Option<f64>, Intent> {
        if s.is_empty() {
            return Ok(None);
        }
        lexical_core::parse::<f64>(s.as_bytes())
            .map(Some)
            .map_err(|_| Intent::Invalid {
                token: word.to_owned(),
                reason: format!("'{s}' is not a number"),
            })
    };
    match (bound(low), bound(high)) {
        (Ok(low), Ok(high)) => Intent::YAxis(YRange { low, high }),
        (Err(e), _) | (_, Err(e)) => e,
    }
}

fn parse_options(list: &str) -> Vec<OptionChange> {
    list.split(',')
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((name, value)) => assign_option(name, value),
            None => bare_option(item),
        })
        .collect()
}

fn assign_option(name: &str, value: &str) -> OptionChange {
    let invalid = || OptionChange::InvalidValue {
        name: name.to_owned(),
        value: value.to_owned(),
    };
    match name {
        "style" | "linestyle" | "ls" if value.trim().is_empty() => invalid(),
        "style" | "linestyle" | "ls" => OptionChange::Style(PlotStyle::from_name(value)),
        "linewidth" | "lw" => match lexical_core::parse::<f64>(value.trim().as_bytes()) {
            Ok(w) if w.is_finite() && w > 0.0 => OptionChange::LineWidth(w),
            _ => invalid(),
        },
        "mis" | "miss" => MissingSentinel::parse(value).map_or_else(invalid, OptionChange::Missing),
        "formatx" => OptionChange::FormatX(value.to_owned()),
        "title" => OptionChange::Title(value.to_owned()),
        _ => OptionChange::Unsupported(format!("{name}=")),
    }
}

fn bare_option(name: &str) -> OptionChange {
    match name {
        "show" | "s" => OptionChange::ToggleShow,
        "style" | "linestyle" | "ls" => OptionChange::ResetStyle,
        "linewidth" | "lw" => OptionChange::ResetLineWidth,
        "mis" | "miss" => OptionChange::ResetMissing,
        "formatx" => OptionChange::ToggleFormatX,
        "title" => OptionChange::ToggleTitle,
        _ => OptionChange::Unsupported(name.to_owned()),
    }
}

/// `a2`, `12`, `b`, or a comma list of those.
fn parse_selection(word: &str) -> Option<Selection> {
    let items = word
        .split(',')
        .filter(|s| !s.is_empty())
        .map(parse_selection_item)
        .collect::<Option<Vec<_>>>()?;
    (!items.is_empty()).then(|| Selection::new(items))
}

fn parse_selection_item(item: &str) -> Option<SelectionItem> {
    let (source, digits) = match item.chars().next()? {
        c @ 'a'..='s' => (Some(c), &item[1..]),
        _ => (None, item),
    };
    if digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let column = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<u16>().ok()?)
    };
    (source.is_some() || column.is_some()).then_some(SelectionItem { source, column })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::time::Pin;

    fn bundle(line: &str) -> IntentBundle {
        match parse_line(line) {
            Line::Command(b) => b,
            other => panic!("{line}: {other:?}"),
        }
    }

    fn item(source: Option<char>, column: Option<u16>) -> SelectionItem {
        SelectionItem { source, column }
    }

    #[test]
    fn quit_and_blank_lines() {
        assert_eq!(parse_line("  "), Line::Empty);
        for q in ["q", "quit", "exit", " q "] {
            assert_eq!(parse_line(q), Line::Quit);
        }
    }

    #[test]
    fn unrecognised_line_passes_through() {
        assert_eq!(
            parse_line("set key left"),
            Line::Passthrough("set key left".into())
        );
    }

    #[test]
    fn unknown_word_beside_known_is_reported() {
        let b = bundle("2d foo");
        assert_eq!(b.unknown, ["foo"]);
        assert_eq!(b.times.len(), 1);
    }

    #[test]
    fn leading_unknown_word_passes_line_through() {
        for line in ["set size 1,1", "set xtics 3600", "foo 2d", "set ylabel 'y10,'"] {
            assert_eq!(parse_line(line), Line::Passthrough(line.into()));
        }
    }

    #[test]
    fn info_ends_the_line() {
        let b = bundle("2d i 3d");
        assert!(b.info);
        assert_eq!(b.times.len(), 1);
        assert!(!bundle("i").has_changes());
    }

    #[test]
    fn y_ranges() {
        let y = |w| match classify(w) {
            Intent::YAxis(r) => (r.low, r.high),
            other => panic!("{w}: {other:?}"),
        };
        assert_eq!(y("y10,50"), (Some(10.0), Some(50.0)));
        assert_eq!(y("y,50"), (None, Some(50.0)));
        assert_eq!(y("y-5,"), (Some(-5.0), None));
        assert_eq!(y("y10,"), (Some(10.0), None));
        assert_eq!(y("y,"), (None, None));
        assert_eq!(y("y"), (None, None));
        assert_eq!(y("y-1.5:2"), (Some(-1.5), Some(2.0)));
        assert!(matches!(classify("y1-"), Intent::Invalid { .. }));
        assert!(matches!(classify("y1:2e"), Intent::Unknown(_)));
        for w in ["ylabel", "yes", "ytics", "y1,,2", "yl"] {
            assert!(matches!(classify(w), Intent::Unknown(_)), "{w}");
        }
    }

    #[test]
    fn option_lists() {
        assert_eq!(
            classify("-style=points,lw=3"),
            Intent::Options(vec![
                OptionChange::Style(PlotStyle::Points),
                OptionChange::LineWidth(3.0)
            ])
        );
        assert_eq!(
            classify("-lw,s,title,formatx,mis,ls"),
            Intent::Options(vec![
                OptionChange::ResetLineWidth,
                OptionChange::ToggleShow,
                OptionChange::ToggleTitle,
                OptionChange::ToggleFormatX,
                OptionChange::ResetMissing,
                OptionChange::ResetStyle,
            ])
        );
        assert_eq!(
            classify("-lw=0,color=red,bogus"),
            Intent::Options(vec![
                OptionChange::InvalidValue {
                    name: "lw".into(),
                    value: "0".into()
                },
                OptionChange::Unsupported("color=".into()),
                OptionChange::Unsupported("bogus".into()),
            ])
        );
    }

    #[test]
    fn selectors() {
        let sel = |w| match classify(w) {
            Intent::Variables(VarChange::Select(s)) => s.items().to_vec(),
            other => panic!("{w}: {other:?}"),
        };
        assert_eq!(sel("a2"), [item(Some('a'), Some(2))]);
        assert_eq!(sel("3"), [item(None, Some(3))]);
        assert_eq!(sel("b"), [item(Some('b'), None)]);
        assert_eq!(
            sel("a2,b12,"),
            [item(Some('a'), Some(2)), item(Some('b'), Some(12))]
        );
        assert_eq!(classify("vn"), Intent::Variables(VarChange::Next));
        assert_eq!(classify("vp"), Intent::Variables(VarChange::Prev));
        // four digits is a span, not a column
        assert!(matches!(classify("1234"), Intent::Time(_)));
        assert!(matches!(classify("z2"), Intent::Unknown(_)));
    }

    #[test]
    fn last_selector_wins() {
        let b = bundle("a2 b3");
        assert_eq!(
            b.variables,
            Some(VarChange::Select(Selection::single('b', 3)))
        );
    }

    #[test]
    fn time_tokens_accumulate_in_order() {
        let b = bundle("t >2d |<>");
        assert_eq!(b.times.len(), 3);
        assert_eq!(b.times[0], TimeToken::Full);
        match &b.times[2] {
            TimeToken::Relative(r) => assert_eq!(r.pin, Pin::Start),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn bad_anchor_is_invalid_not_passthrough() {
        let b = bundle("s2013-02-30");
        assert_eq!(b.invalid.len(), 1);
        assert!(!b.has_changes());
    }

    #[test]
    fn end_anchor_marks_spans() {
        let b = bundle("e2013-05-01 2d >1d");
        let marks: Vec<bool> = b
            .times
            .iter()
            .filter_map(|t| match t {
                TimeToken::Relative(r) => Some(r.end_anchored),
                _ => None,
            })
            .collect();
        assert_eq!(marks, [true, false]);
    }
}
