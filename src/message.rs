//! Log messages

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::level::Level;

/// Where a log call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }

    /// Location of the caller of a `#[track_caller]` function
    ///
    /// The function name is not available this way; use the
    /// [`location!`](crate::location) macro to record the module path instead.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            function: "",
            line: location.line(),
        }
    }

    /// Last path component of the file
    pub fn file_name(&self) -> &str {
        Path::new(self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file)
    }
}

/// A single log message
///
/// Built once per accepted log call and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Message<C> {
    timestamp: DateTime<Utc>,
    text: String,
    level: Level,
    category: C,
    location: SourceLocation,
}

impl<C: Copy> Message<C> {
    /// Create a message stamped with the current time
    pub fn new(level: Level, category: C, text: impl Into<String>, location: SourceLocation) -> Self {
        Self::with_timestamp(Utc::now(), level, category, text, location)
    }

    /// Create a message with an explicit timestamp
    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        level: Level,
        category: C,
        text: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            timestamp,
            text: text.into(),
            level,
            category,
            location,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn category(&self) -> C {
        self.category
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn file(&self) -> &'static str {
        self.location.file
    }

    pub fn function(&self) -> &'static str {
        self.location.function
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }
}
