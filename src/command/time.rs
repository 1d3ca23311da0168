//! Grammar of the tokens that move the time window.
//!
//! ```text
//! t  tv  ta..ts             exact windows (union, overlap, one source)
//! s<time> e<time> c<time>   set start / end / centre
//! [|][<>...][n][unit][|]    relative change, unit one of y m w d h
//! n[unit]                   resize to n units (bare n = n window widths)
//! ```

use chrono::{DateTime, Utc};

use crate::core::{
    error::TimeError,
    timecalc::{SpanUnit, parse_utc},
};

const DIRECTION_CHARS: [char; 2] = ['<', '>'];
const PIN: char = '|';

/// What a relative token does to the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// No arrows: set the width, keeping the centre (or a pinned edge).
    Resize,
    /// `>`: move later.
    Forward,
    /// `<`: move earlier.
    Backward,
    /// `<>`: push both edges outwards.
    Expand,
    /// `><`: pull both edges inwards.
    Contract,
}

/// Edges held in place by `|` markers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pin {
    Free,
    Start,
    End,
    Both,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelativeShift {
    /// The token as typed, for messages.
    pub raw: String,
    pub direction: Direction,
    /// Repeated arrows multiply the length (`>>` = 2).
    pub intensity: u32,
    /// Explicit number, if any.
    pub magnitude: Option<f64>,
    /// `None` means the unit is the current window width.
    pub unit: Option<SpanUnit>,
    pub pin: Pin,
    /// Set when the same line also moves the end edge to a fixed time.
    pub end_anchored: bool,
}

impl RelativeShift {
    /// Number of units to move by.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.magnitude.unwrap_or(1.0) * f64::from(self.intensity)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimeToken {
    Start(DateTime<Utc>),
    End(DateTime<Utc>),
    Center(DateTime<Utc>),
    /// `t`
    Full,
    /// `tv`
    Overlap,
    /// `t<letter>`
    Source(char),
    Relative(RelativeShift),
}

/// `None` if `tok` is not a time token at all; `Some(Err)` if it has the
/// shape of an anchor but the time does not parse.
#[must_use]
pub fn parse_time_token(tok: &str) -> Option<Result<TimeToken, TimeError>> {
    match tok {
        "t" => return Some(Ok(TimeToken::Full)),
        "tv" => return Some(Ok(TimeToken::Overlap)),
        _ => {}
    }
    let mut chars = tok.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    if first == 't' && rest.len() == 1 {
        let id = rest.chars().next()?;
        return ('a'..='s')
            .contains(&id)
            .then_some(Ok(TimeToken::Source(id)));
    }
    if matches!(first, 's' | 'e' | 'c') && rest.bytes().take(4).filter(u8::is_ascii_digit).count() == 4
    {
        return Some(parse_utc(rest).map(|t| match first {
            's' => TimeToken::Start(t),
            'e' => TimeToken::End(t),
            _ => TimeToken::Center(t),
        }));
    }
    let marked = tok.contains(DIRECTION_CHARS) || tok.contains(PIN);
    if marked || is_plain_span(tok) {
        return parse_relative(tok).map(|r| Ok(TimeToken::Relative(r)));
    }
    None
}

/// `n[unit]` with no markers, e.g. `3`, `1.5d`, `2000`.
fn is_plain_span(tok: &str) -> bool {
    let body = tok.strip_suffix(|c: char| SpanUnit::from_letter(c).is_some()).unwrap_or(tok);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn parse_relative(tok: &str) -> Option<RelativeShift> {
    let allowed = |c: char| {
        DIRECTION_CHARS.contains(&c)
            || c == PIN
            || c.is_ascii_digit()
            || matches!(c, '.' | '-')
            || SpanUnit::from_letter(c).is_some()
    };
    if tok.is_empty() || !tok.chars().all(allowed) {
        return None;
    }

    let forward = tok.find('>');
    let backward = tok.find('<');
    let direction = match (forward, backward) {
        (Some(f), Some(b)) if f < b => Direction::Contract,
        (Some(_), Some(_)) => Direction::Expand,
        (Some(_), None) => Direction::Forward,
        (None, Some(_)) => Direction::Backward,
        (None, None) => Direction::Resize,
    };
    // length of the first run of arrows
    let run = tok
        .trim_start_matches(|c: char| !DIRECTION_CHARS.contains(&c))
        .chars()
        .take_while(|c| DIRECTION_CHARS.contains(c))
        .count();
    let intensity = match direction {
        Direction::Forward | Direction::Backward => u32::try_from(run).unwrap_or(u32::MAX),
        _ => 1,
    };

    let number = tok
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-')))
        .split(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-')))
        .next()
        .filter(|n| !n.is_empty());
    let magnitude = number.map(|n| {
        lexical_core::parse_partial::<f64>(n.as_bytes()).map_or(0.0, |(v, _)| v)
    });
    let unit = tok.chars().find_map(SpanUnit::from_letter);

    let pin = match (tok.starts_with(PIN), tok.ends_with(PIN)) {
        (true, true) => Pin::Both,
        (true, false) => Pin::Start,
        (false, true) => Pin::End,
        (false, false) => Pin::Free,
    };

    Some(RelativeShift {
        raw: tok.to_owned(),
        direction,
        intensity,
        magnitude,
        unit,
        pin,
        end_anchored: false,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn rel(tok: &str) -> RelativeShift {
        match parse_time_token(tok) {
            Some(Ok(TimeToken::Relative(r))) => r,
            other => panic!("{tok}: {other:?}"),
        }
    }

    #[test]
    fn exact_windows() {
        assert_eq!(parse_time_token("t"), Some(Ok(TimeToken::Full)));
        assert_eq!(parse_time_token("tv"), Some(Ok(TimeToken::Overlap)));
        assert_eq!(parse_time_token("tb"), Some(Ok(TimeToken::Source('b'))));
        assert_eq!(parse_time_token("tz"), None);
    }

    #[test]
    fn anchors() {
        let t = Utc.with_ymd_and_hms(2013, 4, 5, 6, 0, 0).unwrap();
        assert_eq!(parse_time_token("s2013-04-05T06"), Some(Ok(TimeToken::Start(t))));
        assert_eq!(parse_time_token("e2013040506"), Some(Ok(TimeToken::End(t))));
        assert_eq!(parse_time_token("c2013/4/5/6"), Some(Ok(TimeToken::Center(t))));
        assert!(matches!(parse_time_token("s2013-02-30"), Some(Err(_))));
        assert_eq!(parse_time_token("s12"), None);
    }

    #[test]
    fn plain_spans_resize() {
        let r = rel("2d");
        assert_eq!(r.direction, Direction::Resize);
        assert_eq!(r.magnitude, Some(2.0));
        assert_eq!(r.unit, Some(SpanUnit::Day));
        assert_eq!(r.pin, Pin::Free);

        let r = rel("1.5");
        assert_eq!(r.unit, None);
        assert_eq!(r.length(), 1.5);
        assert_eq!(parse_time_token("2x"), None);
    }

    #[test]
    fn arrows_and_intensity() {
        let r = rel(">");
        assert_eq!((r.direction, r.intensity, r.magnitude), (Direction::Forward, 1, None));
        assert_eq!(r.length(), 1.0);

        let r = rel("<<<2h");
        assert_eq!((r.direction, r.intensity), (Direction::Backward, 3));
        assert_eq!(r.length(), 6.0);

        assert_eq!(rel("<>").direction, Direction::Expand);
        assert_eq!(rel("><").direction, Direction::Contract);
        assert_eq!(rel("><").intensity, 1);
        assert_eq!(rel("<>0").magnitude, Some(0.0));
    }

    #[test]
    fn pins() {
        assert_eq!(rel("|>2d").pin, Pin::Start);
        assert_eq!(rel(">2d|").pin, Pin::End);
        assert_eq!(rel("|3h").pin, Pin::Start);
        assert_eq!(rel("|").pin, Pin::Both);
        assert_eq!(rel("|>|").pin, Pin::Both);
    }

    #[test]
    fn foreign_characters_are_not_time() {
        assert_eq!(parse_time_token("a>b"), None);
        assert_eq!(parse_time_token("plot"), None);
    }
}
