// Global logging system for boot orchestration
//
// Everything in this crate logs through the `log` macros. The sink is a
// fixed ring of recent lines so the splash console and the serial dump can
// replay what happened before the display came up.

use core::fmt::{self, Write};

use heapless::{Deque, String};
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub const MAX_LOG_ENTRIES: usize = 64;
pub const LOG_LINE_LEN: usize = 96;

pub type LogLine = String<LOG_LINE_LEN>;

/// Ring of the most recent log lines. Oldest lines are overwritten.
pub struct LogRing {
    lines: Deque<LogLine, MAX_LOG_ENTRIES>,
    total: usize,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            lines: Deque::new(),
            total: 0,
        }
    }

    /// Append one formatted line, truncating it to the slot size.
    pub fn push(&mut self, args: fmt::Arguments<'_>) {
        let mut line = LogLine::new();
        let _ = Truncating::new(&mut line).write_fmt(args);

        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(line);
        self.total += 1;
    }

    /// Lines currently held (at most MAX_LOG_ENTRIES)
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines ever written, including overwritten ones
    pub fn total(&self) -> usize {
        self.total
    }

    /// The last `n` lines, oldest first
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(|line| line.as_str())
    }
}

/// fmt sink that silently stops at the slot boundary (always on a char boundary)
struct Truncating<'a> {
    line: &'a mut LogLine,
    full: bool,
}

impl<'a> Truncating<'a> {
    fn new(line: &'a mut LogLine) -> Self {
        Self { line, full: false }
    }
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.full {
                break;
            }
            if self.line.push(ch).is_err() {
                self.full = true;
            }
        }
        Ok(())
    }
}

/// `log` sink backed by the global ring
pub struct BootLogger {
    ring: Mutex<LogRing>,
}

static LOGGER: BootLogger = BootLogger {
    ring: Mutex::new(LogRing::new()),
};

impl Log for BootLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.ring.lock().push(*record.args());
    }

    fn flush(&self) {}
}

/// Install the ring logger. Returns false if another logger was already set.
pub fn init(level: LevelFilter) -> bool {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(level);
            true
        }
        Err(_) => false,
    }
}

pub fn log_count() -> usize {
    LOGGER.ring.lock().len()
}

pub fn total_log_count() -> usize {
    LOGGER.ring.lock().total()
}

/// Hand the last `n` lines to `f`, oldest first.
pub fn last_n<F: FnMut(&str)>(n: usize, mut f: F) {
    let ring = LOGGER.ring.lock();
    for line in ring.last_n(n) {
        f(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_ring_keeps_order() {
        let mut ring = LogRing::new();
        ring.push(format_args!("first"));
        ring.push(format_args!("second {}", 2));

        let lines: Vec<&str> = ring.last_n(10).collect();
        assert_eq!(lines, ["first", "second 2"]);
        assert_eq!(ring.total(), 2);
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut ring = LogRing::new();
        for i in 0..MAX_LOG_ENTRIES + 3 {
            ring.push(format_args!("line {}", i));
        }

        assert_eq!(ring.len(), MAX_LOG_ENTRIES);
        assert_eq!(ring.total(), MAX_LOG_ENTRIES + 3);
        assert_eq!(ring.last_n(MAX_LOG_ENTRIES).next(), Some("line 3"));

        let tail: Vec<&str> = ring.last_n(2).collect();
        assert_eq!(tail, ["line 65", "line 66"]);
    }

    #[test]
    fn test_long_line_truncated() {
        let mut ring = LogRing::new();
        let long = "x".repeat(LOG_LINE_LEN * 2);
        ring.push(format_args!("{}", long));

        let line = ring.last_n(1).next().unwrap();
        assert_eq!(line.len(), LOG_LINE_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        let mut ring = LogRing::new();
        let text = "é".repeat(LOG_LINE_LEN);
        ring.push(format_args!("{}", text));

        let line = ring.last_n(1).next().unwrap();
        assert_eq!(line.len(), LOG_LINE_LEN);
        assert!(line.chars().all(|c| c == 'é'));
    }
}
