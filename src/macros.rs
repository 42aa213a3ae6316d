//! Logging macros
//!
//! The macros capture the call site with `file!()`, `module_path!()` and
//! `line!()` and only format their arguments when the logger accepts the
//! message.

/// Source location of the macro invocation
#[macro_export]
macro_rules! location {
    () => {
        $crate::SourceLocation::new(file!(), module_path!(), line!())
    };
}

/// Log a formatted message at an explicit level
///
/// ```
/// use catlog::{Level, LoggingService, MemoryDestination};
/// use std::sync::Arc;
///
/// catlog::categories! {
///     enum Channel {
///         Net => "net",
///     }
/// }
///
/// let memory = Arc::new(MemoryDestination::new(10, 10));
/// let service = LoggingService::builder().destination(memory.clone()).build().unwrap();
/// catlog::log!(service.logger(Channel::Net), Level::Info, "connected to {}", "example.org");
///
/// assert_eq!(memory.len(), 1);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, $crate::location!(), || format!($($arg)+))
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::category::tests::TestCategory;
    use crate::destination::{Destination, MemoryDestination};
    use crate::error::Result;
    use crate::format::PlainFormatter;
    use crate::message::{Message, SourceLocation};
    use crate::service::LoggingService;
    use crate::Level;
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};

    fn service() -> (LoggingService<TestCategory>, Arc<MemoryDestination<TestCategory>>) {
        let memory = Arc::new(MemoryDestination::with_formatter(10, 10, PlainFormatter));
        let service = LoggingService::builder()
            .destination(memory.clone())
            .build()
            .unwrap();
        (service, memory)
    }

    #[test]
    fn test_location_points_at_call_site() {
        let location = crate::location!();
        assert_eq!(location.file_name(), "macros.rs");
        assert_eq!(location.function, module_path!());
        assert!(location.line > 0);
    }

    #[test]
    fn test_level_macros() {
        let (service, memory) = service();
        let logger = service.logger(TestCategory::App);

        crate::verbose!(logger, "v{}", 1);
        crate::debug!(logger, "d");
        crate::info!(logger, "i");
        crate::warn!(logger, "w");
        crate::error!(logger, "e{}", "!");

        let entries = memory.all_entries();
        let levels: Vec<Level> = entries.iter().map(|e| e.level).collect();
        assert_eq!(levels, Level::ALL.to_vec());
        assert_eq!(entries[0].text, "v1");
        assert_eq!(entries[4].text, "e!");
    }

    #[derive(Default)]
    struct LocationSink {
        locations: Mutex<Vec<SourceLocation>>,
    }

    impl Destination<TestCategory> for LocationSink {
        fn log(&self, message: &Message<TestCategory>) -> Result<()> {
            self.locations.lock().unwrap().push(message.location());
            Ok(())
        }
    }

    #[test]
    fn test_macros_record_function_and_methods_do_not() {
        let sink = Arc::new(LocationSink::default());
        let service = LoggingService::builder()
            .destination(sink.clone())
            .build()
            .unwrap();
        let logger = service.logger(TestCategory::App);

        crate::info!(logger, "from macro");
        logger.info(|| "from method");

        let locations = sink.locations.lock().unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].function, module_path!());
        assert_eq!(locations[1].function, "");
        assert_eq!(locations[1].file_name(), "macros.rs");
    }

    #[test]
    fn test_arguments_not_evaluated_when_filtered() {
        let (service, memory) = service();
        let logger = service.logger(TestCategory::Net);
        logger.set_minimum_level(Level::Error);
        let calls = Cell::new(0);
        let expensive = || {
            calls.set(calls.get() + 1);
            "value"
        };

        crate::info!(logger, "{}", expensive());

        assert_eq!(calls.get(), 0);
        assert!(memory.is_empty());
    }
}
