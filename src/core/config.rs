//! Session plot state + fluent builder.
//!
//! A `PlotConfig` is never edited in place by the interpreter: every command
//! clones the current value, mutates the clone and swaps it in, so the
//! previous value is always available for reverting and for deciding what
//! has to be re-emitted.

use std::fmt;

use crate::core::{
    bounds::{Window, YRange},
    constants::{DEFAULT_LINE_WIDTH, DEFAULT_STYLE, FIRST_DATA_COL},
    error::ConfigError,
};

/// Backend `with` style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotStyle {
    Lines,
    Points,
    LinesPoints,
    Dots,
    Impulses,
    Steps,
    Boxes,
    /// Anything else the backend may understand, passed verbatim.
    Other(String),
}

impl PlotStyle {
    #[must_use]
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "l" => Self::Lines,
            "points" | "p" => Self::Points,
            "linespoints" | "lp" => Self::LinesPoints,
            "dots" | "d" => Self::Dots,
            "impulses" | "i" => Self::Impulses,
            "steps" => Self::Steps,
            "boxes" => Self::Boxes,
            _ => Self::Other(s.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lines => "lines",
            Self::Points => "points",
            Self::LinesPoints => "linespoints",
            Self::Dots => "dots",
            Self::Impulses => "impulses",
            Self::Steps => "steps",
            Self::Boxes => "boxes",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for PlotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the title and the x tick format are produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextMode {
    /// Backend default.
    Off,
    /// Derived from the plot state.
    Auto,
    /// Used verbatim.
    Literal(String),
}

impl TextMode {
    /// Bare-flag behaviour: `Auto` turns off, anything else turns `Auto` on.
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            Self::Auto => Self::Off,
            _ => Self::Auto,
        }
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("none"),
            Self::Auto => f.write_str("auto"),
            Self::Literal(s) => f.write_str(s),
        }
    }
}

/// Predicate marking a y value as missing, e.g. `==-999`.
///
/// A bare number is read as an equality test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingSentinel(String);

impl MissingSentinel {
    /// `None` if `expr` is neither a comparison nor a number.
    #[must_use]
    pub fn parse(expr: &str) -> Option<Self> {
        const OPS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];
        let expr = expr.trim();
        if let Some(op) = OPS.iter().find(|op| expr.starts_with(**op)) {
            let rest = expr[op.len()..].trim();
            return (!rest.is_empty()).then(|| Self(format!("{op}{rest}")));
        }
        lexical_core::parse::<f64>(expr.as_bytes())
            .ok()
            .map(|_| Self(format!("=={expr}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One entry of the variable selection.
///
/// `a2` is column 2 of source `a`; `2` is column 2 of every source; `a` is
/// every data column of source `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionItem {
    pub source: Option<char>,
    pub column: Option<u16>,
}

impl fmt::Display for SelectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.source {
            write!(f, "{s}")?;
        }
        if let Some(c) = self.column {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Ordered set of selected series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection(Vec<SelectionItem>);

impl Selection {
    #[must_use]
    pub fn new(items: Vec<SelectionItem>) -> Self {
        let mut out: Vec<SelectionItem> = Vec::with_capacity(items.len());
        for it in items {
            if !out.contains(&it) {
                out.push(it);
            }
        }
        Self(out)
    }

    #[must_use]
    pub fn single(source: char, column: u16) -> Self {
        Self(vec![SelectionItem {
            source: Some(source),
            column: Some(column),
        }])
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[SelectionItem] {
        &self.0
    }

    /// Distinct source letters in order of appearance; empty if every entry
    /// is a bare column.
    #[must_use]
    pub fn letters(&self) -> Vec<char> {
        let mut v: Vec<char> = Vec::new();
        for c in self.0.iter().filter_map(|i| i.source) {
            if !v.contains(&c) {
                v.push(c);
            }
        }
        v
    }

    /// True if some entry names a column across all sources.
    #[must_use]
    pub fn spans_all_sources(&self) -> bool {
        self.0.iter().any(|i| i.source.is_none())
    }

    /// First explicit column number.
    #[must_use]
    pub fn first_column(&self) -> Option<u16> {
        self.0.iter().find_map(|i| i.column)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::single('a', FIRST_DATA_COL)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, it) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{it}")?;
        }
        Ok(())
    }
}

/// Values the bare option flags reset to.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotDefaults {
    pub style: PlotStyle,
    pub line_width: f64,
    pub missing: Option<MissingSentinel>,
}

/// The whole mutable plot state of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotConfig {
    pub window: Window,
    pub y_range: YRange,
    pub selection: Selection,
    pub style: PlotStyle,
    pub line_width: f64,
    pub missing: Option<MissingSentinel>,
    pub title: TextMode,
    pub format_x: TextMode,
    /// Echo directives to the user before sending them.
    pub show_commands: bool,
    /// Title directive must be re-emitted.
    pub title_dirty: bool,
    /// Tick-format directive must be re-emitted.
    pub format_x_dirty: bool,
    pub defaults: PlotDefaults,
}

impl PlotConfig {
    #[inline]
    pub fn builder(window: Window) -> PlotConfigBuilder {
        PlotConfigBuilder::new(window)
    }
}

impl fmt::Display for PlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{show: {}, x: {}, y: [{}], vars: {}, style: {}, lw: {}, mis: {}, title: {}, formatx: {}}}",
            self.show_commands,
            self.window,
            self.y_range,
            self.selection,
            self.style,
            self.line_width,
            self.missing.as_ref().map_or("none", MissingSentinel::as_str),
            self.title,
            self.format_x,
        )
    }
}

/// Fluent builder; whatever is set here also becomes the reset default.
#[derive(Debug)]
pub struct PlotConfigBuilder {
    window: Window,
    selection: Option<Selection>,
    style: Option<PlotStyle>,
    line_width: Option<f64>,
    missing: Option<MissingSentinel>,
    title: Option<TextMode>,
    format_x: Option<TextMode>,
    show_commands: bool,
}

impl PlotConfigBuilder {
    pub(crate) fn new(window: Window) -> Self {
        Self {
            window,
            selection: None,
            style: None,
            line_width: None,
            missing: None,
            title: None,
            format_x: None,
            show_commands: false,
        }
    }

    #[inline]
    pub fn selection(mut self, s: Selection) -> Self {
        self.selection = Some(s);
        self
    }
    #[inline]
    pub fn style(mut self, s: PlotStyle) -> Self {
        self.style = Some(s);
        self
    }
    #[inline]
    pub fn line_width(mut self, w: f64) -> Self {
        self.line_width = Some(w);
        self
    }
    #[inline]
    pub fn missing(mut self, m: MissingSentinel) -> Self {
        self.missing = Some(m);
        self
    }
    #[inline]
    pub fn title(mut self, t: TextMode) -> Self {
        self.title = Some(t);
        self
    }
    #[inline]
    pub fn format_x(mut self, t: TextMode) -> Self {
        self.format_x = Some(t);
        self
    }
    #[inline]
    pub fn show_commands(mut self, on: bool) -> Self {
        self.show_commands = on;
        self
    }

    pub fn build(self) -> Result<PlotConfig, ConfigError> {
        let line_width = self.line_width.unwrap_or(DEFAULT_LINE_WIDTH);
        if !(line_width.is_finite() && line_width > 0.0) {
            return Err(ConfigError::InvalidLineWidth(line_width));
        }
        let defaults = PlotDefaults {
            style: self
                .style
                .unwrap_or_else(|| PlotStyle::from_name(DEFAULT_STYLE)),
            line_width,
            missing: self.missing,
        };
        Ok(PlotConfig {
            window: self.window,
            y_range: YRange::AUTO,
            selection: self.selection.unwrap_or_default(),
            style: defaults.style.clone(),
            line_width,
            missing: defaults.missing.clone(),
            title: self.title.unwrap_or(TextMode::Auto),
            format_x: self.format_x.unwrap_or(TextMode::Auto),
            show_commands: self.show_commands,
            title_dirty: true,
            format_x_dirty: true,
            defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn window() -> Window {
        Window::new(
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2013, 1, 2, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let cfg = PlotConfig::builder(window()).build().unwrap();
        assert_eq!(cfg.selection.to_string(), "a2");
        assert_eq!(cfg.style, PlotStyle::Lines);
        assert_eq!(cfg.line_width, 1.0);
        assert_eq!(cfg.missing, None);
        assert_eq!(cfg.title, TextMode::Auto);
        assert_eq!(cfg.format_x, TextMode::Auto);
        assert!(cfg.y_range.is_auto());
        assert!(cfg.title_dirty && cfg.format_x_dirty);
        assert!(!cfg.show_commands);
    }

    #[test]
    fn builder_values_become_defaults() {
        let cfg = PlotConfig::builder(window())
            .style(PlotStyle::Points)
            .line_width(2.5)
            .build()
            .unwrap();
        assert_eq!(cfg.defaults.style, PlotStyle::Points);
        assert_eq!(cfg.defaults.line_width, 2.5);
    }

    #[test]
    fn builder_rejects_bad_line_width() {
        let err = PlotConfig::builder(window()).line_width(0.0).build();
        assert_eq!(err, Err(ConfigError::InvalidLineWidth(0.0)));
    }

    #[test]
    fn sentinel_forms() {
        assert_eq!(MissingSentinel::parse("-999").unwrap().as_str(), "==-999");
        assert_eq!(MissingSentinel::parse("<= -50").unwrap().as_str(), "<=-50");
        assert_eq!(MissingSentinel::parse("!=0").unwrap().as_str(), "!=0");
        assert_eq!(MissingSentinel::parse("abc"), None);
        assert_eq!(MissingSentinel::parse("=="), None);
    }

    #[test]
    fn style_names() {
        assert_eq!(PlotStyle::from_name("LP"), PlotStyle::LinesPoints);
        assert_eq!(PlotStyle::from_name("fsteps").as_str(), "fsteps");
    }

    #[test]
    fn text_mode_toggle() {
        assert_eq!(TextMode::Auto.toggled(), TextMode::Off);
        assert_eq!(TextMode::Off.toggled(), TextMode::Auto);
        assert_eq!(TextMode::Literal("x".into()).toggled(), TextMode::Auto);
    }

    #[test]
    fn selection_helpers() {
        let sel = Selection::new(vec![
            SelectionItem { source: Some('b'), column: Some(3) },
            SelectionItem { source: Some('a'), column: Some(3) },
            SelectionItem { source: Some('b'), column: Some(3) },
        ]);
        assert_eq!(sel.to_string(), "b3,a3");
        assert_eq!(sel.letters(), ['b', 'a']);
        assert_eq!(sel.first_column(), Some(3));
        assert!(!sel.spans_all_sources());
    }
}
