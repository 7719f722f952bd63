//! Where complaints about malformed archives go.
//!
//! Nothing in this crate prints.  Every warning about a bad lump, a stray marker, or a skin wad
//! with maps in it is handed to a `MessageSink` supplied by whoever opened the archive, tagged
//! with how much it matters.
use std::fmt;

use log::Level;


/// Severity of a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageLevel {
    /// The archive could not be opened.
    Error,
    /// Something was wrong with the archive, but it was recovered from.
    Warning,
    /// Not wrong as such, but the user should know about it.
    Attention,
    /// Suspicious content only interesting when debugging a mod.
    DebugWarn,
    /// Chatter about what was found.
    DebugNotify,
}

impl MessageLevel {
    fn log_level(self) -> Level {
        match self {
            MessageLevel::Error => Level::Error,
            MessageLevel::Warning | MessageLevel::Attention => Level::Warn,
            MessageLevel::DebugWarn => Level::Debug,
            MessageLevel::DebugNotify => Level::Trace,
        }
    }
}

pub trait MessageSink {
    fn message(&mut self, level: MessageLevel, args: fmt::Arguments);
}

impl<'a, S: MessageSink + ?Sized> MessageSink for &'a mut S {
    fn message(&mut self, level: MessageLevel, args: fmt::Arguments) {
        (**self).message(level, args)
    }
}

/// Forwards everything to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn message(&mut self, level: MessageLevel, args: fmt::Arguments) {
        log!(target: "lumpfs", level.log_level(), "{}", args);
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn message(&mut self, _level: MessageLevel, _args: fmt::Arguments) {}
}

/// Keeps every message around, for callers that want to present them later (or tests that want
/// to check what was said).
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Vec<(MessageLevel, String)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn messages(&self) -> &[(MessageLevel, String)] {
        &self.messages
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.messages.iter().filter(|&&(l, _)| l == level).count()
    }

    /// True if any message of the given level contains `needle`.
    pub fn contains(&self, level: MessageLevel, needle: &str) -> bool {
        self.messages.iter().any(|&(l, ref text)| l == level && text.contains(needle))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for CollectingSink {
    fn message(&mut self, level: MessageLevel, args: fmt::Arguments) {
        self.messages.push((level, fmt::format(args)));
    }
}
