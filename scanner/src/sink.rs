//! Destinations for the scanner's user-visible log lines.

use std::{
    collections::VecDeque,
    fmt,
    io::{self, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

use dexscan_config::constants::DEFAULT_PANEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Receives every line the scanner reports. Implementations must not panic.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry);

    fn info(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.record(LogEntry::info(message));
    }

    fn error(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.record(LogEntry::error(message));
    }
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry)
    }
}

impl<T: LogSink + ?Sized> LogSink for std::sync::Arc<T> {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry)
    }
}

impl<T: LogSink + ?Sized> LogSink for Box<T> {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry)
    }
}

/// Forwards entries to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn record(&self, _entry: LogEntry) {}
}

/// Sends every entry to both sinks, `first` then `second`.
#[derive(Debug, Clone)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: LogSink, B: LogSink> LogSink for Tee<A, B> {
    fn record(&self, entry: LogEntry) {
        self.first.record(entry.clone());
        self.second.record(entry);
    }
}

/// Writes one `[LEVEL] message` line per entry. Write failures are dropped.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn record(&self, entry: LogEntry) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{entry}");
        let _ = writer.flush();
    }
}

/// Bounded in-memory log, newest entry first. Once `capacity` entries are held
/// the oldest one is dropped for each new entry.
#[derive(Debug)]
pub struct LogPanel {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl LogPanel {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the panel, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// One `[LEVEL] message` line per entry. Newlines inside a message are kept.
    pub fn render_text(&self) -> String {
        self.lock()
            .iter()
            .map(LogEntry::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Same content as [`LogPanel::render_text`] with markup escaped and every
    /// line break rendered as `<br />`.
    pub fn render_html(&self) -> String {
        self.lock()
            .iter()
            .map(|entry| escape_html(&entry.to_string()).replace('\n', "<br />"))
            .collect::<Vec<_>>()
            .join("<br />")
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock cannot leave the deque inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_CAPACITY)
    }
}

impl LogSink for LogPanel {
    fn record(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
