//! Derived text: the automatic title and the x tick-label template.

use crate::core::{
    bounds::Window,
    config::Selection,
    data::{Source, SourceSet},
    timecalc::{SpanUnit, span_seconds},
};

// Quoted so the backend expands `\n` into a line break.
pub const TICKS_MINUTES: &str = r#""%H:%M\n%d %b\n%Y""#;
pub const TICKS_HOURS: &str = r#""%H:00\n%d %b\n%Y""#;
pub const TICKS_DAYS: &str = r#""%d %b\n%Y""#;
pub const TICKS_MONTHS: &str = r#""%b\n%Y""#;
pub const TICKS_YEARS: &str = r#""%Y""#;

/// Upper bounds (inclusive) of each template, shortest first.
const TICK_BREAKPOINTS: [(f64, SpanUnit, &str); 4] = [
    (8.0, SpanUnit::Hour, TICKS_MINUTES),
    (5.99, SpanUnit::Day, TICKS_HOURS),
    (4.516, SpanUnit::Month, TICKS_DAYS),
    (6.0, SpanUnit::Year, TICKS_MONTHS),
];

/// Template for a window, keyed on its width in whole seconds.
#[must_use]
pub fn tick_format(window: &Window) -> &'static str {
    let secs = window.span_seconds().trunc();
    TICK_BREAKPOINTS
        .iter()
        .find(|(n, unit, _)| secs <= span_seconds(*n, *unit, window.start()))
        .map_or(TICKS_YEARS, |&(_, _, fmt)| fmt)
}

/// Sources with at least one selected column, in letter order.
#[must_use]
pub fn active_sources<'a>(selection: &Selection, sources: &'a SourceSet) -> Vec<&'a Source> {
    let letters = selection.letters();
    let every = selection.spans_all_sources();
    sources
        .iter()
        .filter(|s| every || letters.contains(&s.id))
        .collect()
}

/// `label` for one source, `label (A), label (B)` for several. `None` if
/// nothing is selected.
#[must_use]
pub fn auto_title(selection: &Selection, sources: &SourceSet) -> Option<String> {
    match active_sources(selection, sources).as_slice() {
        [] => None,
        [only] => Some(only.label()),
        many => Some(
            many.iter()
                .map(|s| format!("{} ({})", s.label(), s.id.to_ascii_uppercase()))
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::core::config::SelectionItem;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 6, 1, 0, 0, 0).unwrap()
    }

    fn wide(delta: TimeDelta) -> Window {
        Window::new(t0(), t0() + delta).unwrap()
    }

    fn sources(names: &[&str]) -> SourceSet {
        SourceSet::new(
            names
                .iter()
                .map(|n| Source {
                    id: '?',
                    start: t0(),
                    end: t0() + TimeDelta::days(1),
                    vars: vec!["v".into()],
                    file: PathBuf::from(n),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn eight_hours_is_inclusive() {
        assert_eq!(tick_format(&wide(TimeDelta::hours(8))), TICKS_MINUTES);
        assert_eq!(
            tick_format(&wide(TimeDelta::hours(8) + TimeDelta::seconds(1))),
            TICKS_HOURS
        );
    }

    #[test]
    fn longer_windows_coarsen() {
        assert_eq!(tick_format(&wide(TimeDelta::days(5))), TICKS_HOURS);
        assert_eq!(tick_format(&wide(TimeDelta::days(6))), TICKS_DAYS);
        assert_eq!(tick_format(&wide(TimeDelta::days(400))), TICKS_MONTHS);
        assert_eq!(tick_format(&wide(TimeDelta::days(365 * 7))), TICKS_YEARS);
        assert_eq!(tick_format(&wide(TimeDelta::days(365 * 300))), TICKS_YEARS);
    }

    #[test]
    fn title_from_selection() {
        let s = sources(&["x.csv", "y.csv"]);
        assert_eq!(auto_title(&Selection::single('b', 2), &s).as_deref(), Some("y.csv"));

        let both = Selection::new(vec![SelectionItem { source: None, column: Some(2) }]);
        assert_eq!(
            auto_title(&both, &s).as_deref(),
            Some("x.csv (A), y.csv (B)")
        );
        assert_eq!(auto_title(&Selection::single('k', 2), &s), None);
    }
}
