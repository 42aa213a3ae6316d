//! Per-category loggers

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Weak;

use crate::category::Category;
use crate::level::Level;
use crate::message::{Message, SourceLocation};
use crate::service::Dispatcher;

/// Gate for the messages of one category
///
/// A logger holds an enabled flag and a minimum level. Messages that do not
/// pass the gate are dropped before their text is produced. Loggers are owned
/// by a [`LoggingService`](crate::LoggingService) and only keep a weak
/// reference back to it.
pub struct Logger<C: Category> {
    category: C,
    enabled: AtomicBool,
    minimum_level: AtomicU8,
    dispatcher: Weak<Dispatcher<C>>,
}

impl<C: Category> Logger<C> {
    pub(crate) fn new(category: C, dispatcher: Weak<Dispatcher<C>>) -> Self {
        Self {
            category,
            enabled: AtomicBool::new(true),
            minimum_level: AtomicU8::new(Level::Verbose.as_u8()),
            dispatcher,
        }
    }

    pub fn category(&self) -> C {
        self.category
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn minimum_level(&self) -> Level {
        Level::from_u8(self.minimum_level.load(Ordering::Relaxed))
    }

    pub fn set_minimum_level(&self, level: Level) {
        self.minimum_level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Check whether a message at `level` would be forwarded
    pub fn would_log(&self, level: Level) -> bool {
        self.is_enabled() && level >= self.minimum_level()
    }

    /// Log a message whose text is produced lazily
    ///
    /// `text` is only called when the message passes the filter.
    pub fn log<F, S>(&self, level: Level, location: SourceLocation, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        if !self.would_log(level) {
            return;
        }

        let Some(dispatcher) = self.dispatcher.upgrade() else {
            return;
        };

        let message = Message::new(level, self.category, text(), location);
        dispatcher.log(&message);
    }

    /// Log at [`Level::Verbose`]
    ///
    /// The convenience methods record the caller's file and line but leave
    /// [`SourceLocation::function`] empty. Use the [`verbose!`](crate::verbose)
    /// family of macros to record the module path as well.
    #[track_caller]
    pub fn verbose<F, S>(&self, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.log(Level::Verbose, SourceLocation::caller(), text)
    }

    /// Log at [`Level::Debug`]; see [`Logger::verbose`] for the recorded location
    #[track_caller]
    pub fn debug<F, S>(&self, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.log(Level::Debug, SourceLocation::caller(), text)
    }

    /// Log at [`Level::Info`]; see [`Logger::verbose`] for the recorded location
    #[track_caller]
    pub fn info<F, S>(&self, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.log(Level::Info, SourceLocation::caller(), text)
    }

    /// Log at [`Level::Warning`]; see [`Logger::verbose`] for the recorded location
    #[track_caller]
    pub fn warn<F, S>(&self, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.log(Level::Warning, SourceLocation::caller(), text)
    }

    /// Log at [`Level::Error`]; see [`Logger::verbose`] for the recorded location
    #[track_caller]
    pub fn error<F, S>(&self, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.log(Level::Error, SourceLocation::caller(), text)
    }
}

impl<C: Category> std::fmt::Debug for Logger<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("enabled", &self.is_enabled())
            .field("minimum_level", &self.minimum_level())
            .finish()
    }
}
