//! Input series metadata: one `Source` per file plus the time landmarks
//! derived from all of them.
//!
//! Only the head and tail of each file are inspected. The samples
//! themselves are read by the backend.

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::core::{
    bounds::Window,
    constants::{FIRST_DATA_COL, SCAN_LINES, SOURCE_LETTERS, TF_PLOT},
    error::SourceError,
    timecalc::parse_utc,
};

/// One time-series input. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub id: char,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Names of the data columns, starting at column [`FIRST_DATA_COL`].
    pub vars: Vec<String>,
    pub file: PathBuf,
}

impl Source {
    /// Highest usable column number (the time column if there are no data
    /// columns).
    #[must_use]
    pub fn last_col(&self) -> u16 {
        let n = u16::try_from(self.vars.len()).unwrap_or(u16::MAX - FIRST_DATA_COL);
        FIRST_DATA_COL - 1 + n
    }

    /// Name of column `col`, if the source has it.
    #[must_use]
    pub fn var_name(&self, col: u16) -> Option<&str> {
        let idx = col.checked_sub(FIRST_DATA_COL)?;
        self.vars.get(usize::from(idx)).map(String::as_str)
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.file.display().to_string()
    }
}

/// All sources of a session and their shared landmarks.
#[derive(Clone, Debug)]
pub struct SourceSet {
    sources: Vec<Source>,
    union: Window,
    overlap: Option<Window>,
}

impl SourceSet {
    /// Assign letters in order and compute the union/overlap windows.
    pub fn new(sources: Vec<Source>) -> Result<Self, SourceError> {
        if sources.is_empty() {
            return Err(SourceError::Empty);
        }
        if sources.len() > SOURCE_LETTERS.len() {
            return Err(SourceError::TooMany(sources.len()));
        }
        let sources: Vec<Source> = sources
            .into_iter()
            .zip(SOURCE_LETTERS)
            .map(|(s, id)| Source { id, ..s })
            .collect();

        let starts = sources.iter().map(|s| s.start);
        let ends = sources.iter().map(|s| s.end);
        let (Some(first), Some(last)) = (starts.clone().min(), ends.clone().max()) else {
            return Err(SourceError::Empty);
        };
        let union = Window::new(first, last).map_err(|_| SourceError::EmptySpan)?;

        let overlap = match (starts.max(), ends.min()) {
            (Some(s), Some(e)) => Window::new(s, e).ok(),
            _ => None,
        };

        Ok(Self {
            sources,
            union,
            overlap,
        })
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: char) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Earliest start to latest end.
    #[inline]
    #[must_use]
    pub fn union(&self) -> Window {
        self.union
    }

    /// Range covered by every source, if there is one.
    #[inline]
    #[must_use]
    pub fn overlap(&self) -> Option<Window> {
        self.overlap
    }

    /// Window a fresh session starts with.
    #[must_use]
    pub fn initial_window(&self) -> Window {
        self.overlap.unwrap_or(self.union)
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

/// The `i` summary.
impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for s in &self.sources {
            writeln!(f, "{} = {}", s.id, s.label())?;
            for (col, name) in (FIRST_DATA_COL..).zip(&s.vars) {
                writeln!(f, "  {}{col:<2} = {name}", s.id)?;
            }
            writeln!(f)?;
        }
        for s in &self.sources {
            writeln!(
                f,
                "t{} = {} -> {}",
                s.id,
                s.start.format(TF_PLOT),
                s.end.format(TF_PLOT)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "t  = {}", self.union)?;
        match self.overlap {
            Some(w) => writeln!(f, "tv = {w}")?,
            None => writeln!(f, "tv = nil")?,
        }
        Ok(())
    }
}

// --- SourceLoader ---

const BUF_CAP: usize = 1 << 16; // 64 KiB

/// Read the metadata of every file, assigning letters in argument order.
pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Result<SourceSet, SourceError> {
    if paths.len() > SOURCE_LETTERS.len() {
        return Err(SourceError::TooMany(paths.len()));
    }
    let sources = paths
        .iter()
        .zip(SOURCE_LETTERS)
        .map(|(p, id)| {
            let path = p.as_ref();
            let file = File::open(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let src = read_source(id, path, file)?;
            tracing::info!(
                id = %src.id,
                file = %path.display(),
                columns = src.vars.len(),
                "loaded source"
            );
            Ok(src)
        })
        .collect::<Result<Vec<_>, SourceError>>()?;
    SourceSet::new(sources)
}

/// Scan one file: header names and first timestamp from the head, last
/// timestamp from the tail.
pub fn read_source<R: Read>(id: char, path: &Path, src: R) -> Result<Source, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = BufReader::with_capacity(BUF_CAP, src);
    let mut buf = Vec::<u8>::with_capacity(256);

    let mut first_sample: Option<String> = None;
    let mut header: Option<String> = None;
    let mut last_sample: Option<(usize, String)> = None;
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = rdr.read_until(b'\n', &mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        if buf.ends_with(b"\n") {
            buf.pop();
        }
        if buf.ends_with(b"\r") {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf);
        let is_sample = buf.first().is_some_and(u8::is_ascii_digit);

        if line_no <= SCAN_LINES {
            if first_sample.is_none() && is_sample {
                first_sample = Some(line.to_string());
            }
            if header.is_none() && line.to_ascii_lowercase().contains("fields") {
                header = Some(line.to_string());
            }
        }
        if is_sample {
            last_sample = Some((line_no, line.into_owned()));
        }
    }

    // the last sample only counts if it sits within the tail
    let last = last_sample.filter(|(n, _)| n + SCAN_LINES > line_no);
    let (Some(first), Some((_, last))) = (first_sample, last) else {
        return Err(SourceError::NoSamples(path.to_path_buf()));
    };
    let stamp = |line: &str| {
        let field = line.split(',').next().unwrap_or_default();
        parse_utc(field).map_err(|source| SourceError::BadTimestamp {
            path: path.to_path_buf(),
            source,
        })
    };
    let vars: Vec<String> = header
        .map(|h| h.trim().split(',').skip(1).map(|v| v.trim().to_owned()).collect())
        .unwrap_or_default();

    Ok(Source {
        id,
        start: stamp(&first)?,
        end: stamp(&last)?,
        vars,
        file: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 6, 1, h, 0, 0).unwrap()
    }

    fn source(start: u32, end: u32, vars: &[&str]) -> Source {
        Source {
            id: '?',
            start: at(start),
            end: at(end),
            vars: vars.iter().map(|v| (*v).to_owned()).collect(),
            file: PathBuf::from("x.csv"),
        }
    }

    #[test]
    fn reads_head_and_tail() {
        let csv = "# Fields: time, temp, rh\n\
                   2013-06-01 00:00:00,1,2\n\
                   2013-06-01 01:00:00,1,2\n\
                   2013-06-01 02:30:00,1,2\n";
        let s = read_source('a', Path::new("met.csv"), csv.as_bytes()).unwrap();
        assert_eq!(s.start, at(0));
        assert_eq!(s.end, Utc.with_ymd_and_hms(2013, 6, 1, 2, 30, 0).unwrap());
        assert_eq!(s.vars, ["temp", "rh"]);
        assert_eq!(s.last_col(), 3);
        assert_eq!(s.var_name(2), Some("temp"));
        assert_eq!(s.var_name(4), None);
        assert_eq!(s.var_name(1), None);
    }

    #[test]
    fn tail_ignores_trailing_text() {
        let csv = "fields,v\n2013-06-01 00:00:00,1\n2013-06-01 05:00:00,1\nend of data\n";
        let s = read_source('a', Path::new("t.csv"), csv.as_bytes()).unwrap();
        assert_eq!(s.end, at(5));
    }

    #[test]
    fn file_without_samples_is_rejected() {
        let err = read_source('a', Path::new("e.csv"), "fields,a\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::NoSamples(_)));
    }

    #[test]
    fn landmarks_for_overlapping_sources() {
        let set = SourceSet::new(vec![source(0, 10, &["x"]), source(5, 15, &["y"])]).unwrap();
        assert_eq!(set.union(), Window::new(at(0), at(15)).unwrap());
        assert_eq!(set.overlap(), Some(Window::new(at(5), at(10)).unwrap()));
        assert_eq!(set.initial_window(), set.overlap().unwrap());
        let ids: Vec<char> = set.iter().map(|s| s.id).collect();
        assert_eq!(ids, ['a', 'b']);
    }

    #[test]
    fn disjoint_sources_have_no_overlap() {
        let set = SourceSet::new(vec![source(0, 2, &[]), source(3, 4, &[])]).unwrap();
        assert_eq!(set.overlap(), None);
        assert_eq!(set.initial_window(), set.union());
        assert!(set.to_string().contains("tv = nil"));
    }

    #[test]
    fn too_many_sources() {
        let many = vec![source(0, 1, &[]); 20];
        assert!(matches!(SourceSet::new(many), Err(SourceError::TooMany(20))));
    }
}
