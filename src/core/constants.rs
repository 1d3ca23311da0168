//! A collection of constants.

/// Time format of the first column in every input file (backend `timefmt`).
pub const TF_INFILE: &str = "%Y-%m-%d %H:%M:%S";
/// Time format used for x-range literals and the info summary.
pub const TF_PLOT: &str = "%Y-%m-%d %H:%M";

/// The time column. Columns are numbered from 1, like the backend does.
pub const X_AXIS_COL: u16 = 1;
/// First column holding data.
pub const FIRST_DATA_COL: u16 = X_AXIS_COL + 1;

/// Source letters in assignment order.
pub const SOURCE_LETTERS: [char; 19] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
];

/// How many lines from either end of a file are scanned for metadata.
pub const SCAN_LINES: usize = 100;

/// Filters header rows out before the backend reads a file.
pub const SKIP_CSV_HEADER: &str = r#"<sed -n "s/^[0-9]/&/p" "#;

/// Default `<>` ratio: each edge moves out by a third of the span.
pub const EXPAND_DEFAULT_RATIO: f64 = 1.0 / 3.0;
/// Default `><` ratio: each edge moves in by a fifth of the span.
pub const CONTRACT_DEFAULT_RATIO: f64 = 0.2;
/// An explicit magnitude is split evenly between both edges.
pub const EXPLICIT_RATIO_SCALE: f64 = 0.5;
/// Contracting by this ratio per edge (or more) would collapse the window.
pub const CONTRACT_LIMIT_RATIO: f64 = -0.5;

/// Style used when nothing else is configured.
pub const DEFAULT_STYLE: &str = "lines";
/// Line width used when nothing else is configured.
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// Seconds in the fixed-length units.
pub const SECS_PER_HOUR: f64 = 3_600.0;
pub const SECS_PER_DAY: f64 = 24.0 * SECS_PER_HOUR;
pub const SECS_PER_WEEK: f64 = 7.0 * SECS_PER_DAY;
