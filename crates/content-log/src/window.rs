//! Bounded tail reader for append-only log files.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Number of trailing lines kept per read.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// The trailing lines of a log file, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineWindow {
    lines: Vec<String>,
}

impl LineWindow {
    /// Builds a window from in-memory lines, keeping the last `capacity`.
    pub fn from_lines<I, S>(lines: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = Ring::new(capacity);
        for line in lines {
            ring.push(line.into());
        }
        ring.into_window()
    }

    /// Number of lines in the window.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the window holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in file order (oldest first).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines from the newest back to the oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().rev().map(String::as_str)
    }
}

/// Upper bound on up-front allocation for very large windows.
const PREALLOC_LIMIT: usize = 1024;

/// Fixed-capacity line buffer that drops the oldest entry when full.
struct Ring {
    capacity: usize,
    lines: VecDeque<String>,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity.min(PREALLOC_LIMIT)),
        }
    }

    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn into_window(self) -> LineWindow {
        LineWindow {
            lines: self.lines.into(),
        }
    }
}

/// Reads the last `capacity` lines of the file at `path`.
///
/// Returns `None` when the file is missing or cannot be read; callers treat
/// that as "no data this cycle". Invalid UTF-8 is replaced, never rejected.
pub fn read_window(path: &Path, capacity: usize) -> Option<LineWindow> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "log file unavailable");
            return None;
        }
    };

    let mut reader = BufReader::new(file);
    let mut ring = Ring::new(capacity);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                ring.push(text.trim_end_matches(['\r', '\n']).to_string());
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "error reading log file");
                return None;
            }
        }
    }

    let window = ring.into_window();
    tracing::trace!(path = %path.display(), lines = window.len(), "read log window");
    Some(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(count: usize) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        for i in 0..count {
            writeln!(tmp, "line {i}").unwrap();
        }
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn missing_file_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_window(&tmp.path().join("content_log.txt"), 100).is_none());
    }

    #[test]
    fn directory_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_window(tmp.path(), 100).is_none());
    }

    #[test]
    fn keeps_only_trailing_lines() {
        let tmp = write_lines(250);
        let window = read_window(tmp.path(), 100).unwrap();

        assert_eq!(window.len(), 100);
        assert_eq!(window.lines()[0], "line 150");
        assert_eq!(window.lines()[99], "line 249");
    }

    #[test]
    fn short_file_kept_whole() {
        let tmp = write_lines(3);
        let window = read_window(tmp.path(), 100).unwrap();
        assert_eq!(window.lines(), ["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn empty_file_gives_empty_window() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let window = read_window(tmp.path(), 100).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn zero_capacity_gives_empty_window() {
        let tmp = write_lines(5);
        let window = read_window(tmp.path(), 0).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"good line\n\xff\xfebad \xc3 bytes\nlast\n")
            .unwrap();
        tmp.flush().unwrap();

        let window = read_window(tmp.path(), 100).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.lines()[0], "good line");
        assert!(window.lines()[1].contains("bad"));
        assert!(window.lines()[1].contains('\u{FFFD}'));
        assert_eq!(window.lines()[2], "last");
    }

    #[test]
    fn strips_crlf_and_keeps_unterminated_last_line() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"first\r\nsecond").unwrap();
        tmp.flush().unwrap();

        let window = read_window(tmp.path(), 10).unwrap();
        assert_eq!(window.lines(), ["first", "second"]);
    }

    #[test]
    fn newest_first_reverses_order() {
        let window = LineWindow::from_lines(["a", "b", "c"], 10);
        let reversed: Vec<&str> = window.newest_first().collect();
        assert_eq!(reversed, ["c", "b", "a"]);
    }

    #[test]
    fn from_lines_respects_capacity() {
        let window = LineWindow::from_lines(["a", "b", "c", "d"], 2);
        assert_eq!(window.lines(), ["c", "d"]);
    }
}
