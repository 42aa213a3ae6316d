//! Logging service
//!
//! The service owns one [`Logger`] per category and the list of
//! destinations. Every message accepted by a logger is delivered to each
//! destination in the order the destinations were added.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::category::Category;
use crate::destination::{Completion, Destination, RotatingFileDestination};
use crate::error::{Error, Result};
use crate::level::Level;
use crate::logger::Logger;
use crate::message::Message;

/// Destination list shared between the service and its loggers
pub(crate) struct Dispatcher<C: Category> {
    destinations: RwLock<Vec<Arc<dyn Destination<C>>>>,
    file_destinations: RwLock<Vec<Arc<dyn RotatingFileDestination<C>>>>,
}

impl<C: Category> Dispatcher<C> {
    fn new() -> Self {
        Self {
            destinations: RwLock::new(Vec::new()),
            file_destinations: RwLock::new(Vec::new()),
        }
    }

    /// Deliver to every destination; one failing destination does not stop the rest
    pub(crate) fn log(&self, message: &Message<C>) {
        let destinations = self.destinations.read().unwrap_or_else(PoisonError::into_inner);
        for (index, destination) in destinations.iter().enumerate() {
            if let Err(e) = destination.log(message) {
                tracing::warn!(
                    destination = index,
                    category = message.category().name(),
                    error = %e,
                    "Failed to deliver log message"
                );
            }
        }
    }

    fn add(&self, destination: Arc<dyn Destination<C>>) {
        self.destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination);
    }

    fn add_file(&self, destination: Arc<dyn RotatingFileDestination<C>>) {
        self.file_destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination);
    }

    fn destinations(&self) -> Vec<Arc<dyn Destination<C>>> {
        self.destinations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn file_destinations(&self) -> Vec<Arc<dyn RotatingFileDestination<C>>> {
        self.file_destinations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Builder for [`LoggingService`]
pub struct LoggingServiceBuilder<C: Category> {
    destinations: Vec<Arc<dyn Destination<C>>>,
    file_destinations: Vec<Arc<dyn RotatingFileDestination<C>>>,
    minimum_level: Level,
}

impl<C: Category> LoggingServiceBuilder<C> {
    /// Add a destination
    pub fn destination<D: Destination<C> + 'static>(mut self, destination: Arc<D>) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Add a destination that also exposes rotation controls
    pub fn file_destination<D: RotatingFileDestination<C> + 'static>(
        mut self,
        destination: Arc<D>,
    ) -> Self {
        self.destinations.push(destination.clone());
        self.file_destinations.push(destination);
        self
    }

    /// Minimum level applied to every logger
    pub fn minimum_level(mut self, level: Level) -> Self {
        self.minimum_level = level;
        self
    }

    /// Build the service
    ///
    /// Fails with [`Error::NoDestinations`] when no destination was added.
    pub fn build(self) -> Result<LoggingService<C>> {
        if self.destinations.is_empty() {
            return Err(Error::NoDestinations);
        }

        let service = LoggingService::with_dispatcher(Dispatcher::new());
        for destination in self.destinations {
            service.dispatcher.add(destination);
        }
        for destination in self.file_destinations {
            service.dispatcher.add_file(destination);
        }
        service.set_minimum_level(self.minimum_level);

        Ok(service)
    }
}

/// Category registry and message dispatcher
///
/// Construction and wiring of destinations is an explicit step performed by
/// the host application; there is no process-wide instance. Share the
/// service through an `Arc` or a `static` `OnceLock` when loggers are needed
/// across threads.
pub struct LoggingService<C: Category> {
    loggers: HashMap<C, Logger<C>>,
    dispatcher: Arc<Dispatcher<C>>,
}

impl<C: Category> LoggingService<C> {
    pub fn builder() -> LoggingServiceBuilder<C> {
        LoggingServiceBuilder {
            destinations: Vec::new(),
            file_destinations: Vec::new(),
            minimum_level: Level::Verbose,
        }
    }

    fn with_dispatcher(dispatcher: Dispatcher<C>) -> Self {
        let dispatcher = Arc::new(dispatcher);
        let loggers = C::all()
            .iter()
            .map(|&category| (category, Logger::new(category, Arc::downgrade(&dispatcher))))
            .collect();

        Self { loggers, dispatcher }
    }

    /// The logger for `category`
    ///
    /// # Panics
    /// If `category` is not part of `C::all()`, which means the [`Category`]
    /// implementation is inconsistent.
    pub fn logger(&self, category: C) -> &Logger<C> {
        match self.loggers.get(&category) {
            Some(logger) => logger,
            None => panic!("no logger registered for category {:?}", category),
        }
    }

    /// All loggers, in no particular order
    pub fn loggers(&self) -> impl Iterator<Item = &Logger<C>> {
        self.loggers.values()
    }

    /// Set the minimum level of every logger
    ///
    /// Individual loggers can be overridden afterwards.
    pub fn set_minimum_level(&self, level: Level) {
        for logger in self.loggers.values() {
            logger.set_minimum_level(level);
        }
    }

    /// Append a destination
    ///
    /// Messages logged before this call are not delivered to it.
    pub fn add<D: Destination<C> + 'static>(&self, destination: Arc<D>) {
        self.dispatcher.add(destination);
    }

    /// Append a destination with rotation controls
    pub fn add_file<D: RotatingFileDestination<C> + 'static>(&self, destination: Arc<D>) {
        self.dispatcher.add(destination.clone());
        self.dispatcher.add_file(destination);
    }

    pub fn destination_count(&self) -> usize {
        self.dispatcher.destinations().len()
    }

    /// Destinations that expose rotation controls
    pub fn file_destinations(&self) -> Vec<Arc<dyn RotatingFileDestination<C>>> {
        self.dispatcher.file_destinations()
    }

    /// Roll every file destination
    ///
    /// `completion` runs once, after the last rollover has finished (or
    /// immediately when there is nothing to roll).
    pub fn roll_log_files(&self, completion: Option<Completion>) {
        let targets = self.file_destinations();
        let barrier = Arc::new(RollBarrier {
            remaining: AtomicUsize::new(targets.len()),
            completion: Mutex::new(completion),
        });

        if targets.is_empty() {
            barrier.finish();
            return;
        }

        for target in targets {
            let done = Arc::clone(&barrier);
            let requested = target.roll_log_file(Some(Box::new(move || done.arrive())));
            if let Err(e) = requested {
                tracing::warn!(
                    path = %target.logs_directory().display(),
                    error = %e,
                    "Failed to request log file rollover"
                );
                barrier.arrive();
            }
        }
    }

    /// Wait until every destination has written what it was given
    pub fn flush(&self) {
        for destination in self.dispatcher.destinations() {
            destination.flush();
        }
    }
}

struct RollBarrier {
    remaining: AtomicUsize,
    completion: Mutex<Option<Completion>>,
}

impl RollBarrier {
    fn arrive(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.finish();
        }
    }

    fn finish(&self) {
        let completion = self
            .completion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(completion) = completion {
            completion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::tests::TestCategory;
    use crate::destination::{FileDestination, MemoryDestination};
    use crate::format::PlainFormatter;
    use crate::message::SourceLocation;
    use crate::rotation::RotationConfig;
    use tempfile::TempDir;

    struct FailingDestination;

    impl Destination<TestCategory> for FailingDestination {
        fn log(&self, _message: &Message<TestCategory>) -> Result<()> {
            Err(Error::WriterStopped)
        }
    }

    fn memory() -> Arc<MemoryDestination<TestCategory>> {
        Arc::new(MemoryDestination::with_formatter(100, 10, PlainFormatter))
    }

    fn texts(memory: &MemoryDestination<TestCategory>) -> Vec<String> {
        memory.all_entries().into_iter().map(|e| e.text).collect()
    }

    #[test]
    fn test_build_without_destinations_fails() {
        let result = LoggingService::<TestCategory>::builder().build();
        assert!(matches!(result, Err(Error::NoDestinations)));
    }

    #[test]
    fn test_one_logger_per_category() {
        let service = LoggingService::builder().destination(memory()).build().unwrap();

        assert_eq!(service.loggers().count(), 2);
        assert_eq!(service.logger(TestCategory::App).category(), TestCategory::App);
        assert!(std::ptr::eq(
            service.logger(TestCategory::Net),
            service.logger(TestCategory::Net)
        ));
    }

    #[test]
    fn test_global_level_with_override() {
        let sink = memory();
        let service = LoggingService::builder()
            .destination(sink.clone())
            .build()
            .unwrap();

        service.set_minimum_level(Level::Warning);
        service.logger(TestCategory::Net).set_minimum_level(Level::Info);

        service.logger(TestCategory::App).info(|| "x");
        service.logger(TestCategory::Net).info(|| "y");
        service.logger(TestCategory::App).error(|| "z");

        assert_eq!(texts(&sink), vec!["y", "z"]);
    }

    #[test]
    fn test_builder_minimum_level() {
        let sink = memory();
        let service = LoggingService::builder()
            .destination(sink.clone())
            .minimum_level(Level::Error)
            .build()
            .unwrap();

        service.logger(TestCategory::App).warn(|| "dropped");
        service.logger(TestCategory::App).error(|| "kept");

        assert_eq!(texts(&sink), vec!["kept"]);
    }

    #[test]
    fn test_disabled_logger_drops_everything() {
        let sink = memory();
        let service = LoggingService::builder()
            .destination(sink.clone())
            .build()
            .unwrap();

        service.logger(TestCategory::App).set_enabled(false);
        service.logger(TestCategory::App).error(|| "silenced");
        service.logger(TestCategory::Net).verbose(|| "heard");

        assert_eq!(texts(&sink), vec!["heard"]);
    }

    #[test]
    fn test_fan_out_in_order_and_not_retroactive() {
        let first = memory();
        let second = memory();
        let service = LoggingService::builder()
            .destination(first.clone())
            .build()
            .unwrap();

        service.logger(TestCategory::App).info(|| "before");
        service.add(second.clone());
        service.logger(TestCategory::App).info(|| "after");

        assert_eq!(texts(&first), vec!["before", "after"]);
        assert_eq!(texts(&second), vec!["after"]);
        assert_eq!(service.destination_count(), 2);
    }

    #[test]
    fn test_failing_destination_is_isolated() {
        let sink = memory();
        let service = LoggingService::builder()
            .destination(Arc::new(FailingDestination))
            .destination(sink.clone())
            .build()
            .unwrap();

        service.logger(TestCategory::App).info(|| "still delivered");

        assert_eq!(texts(&sink), vec!["still delivered"]);
    }

    #[test]
    fn test_sequential_messages_keep_order() {
        let sink = memory();
        let service = LoggingService::builder()
            .destination(sink.clone())
            .build()
            .unwrap();
        let logger = service.logger(TestCategory::Net);

        for i in 0..20 {
            logger.debug(|| format!("m{}", i));
        }

        let expected: Vec<String> = (0..20).map(|i| format!("m{}", i)).collect();
        assert_eq!(texts(&sink), expected);
    }

    #[test]
    fn test_explicit_location_is_recorded() {
        let sink: Arc<MemoryDestination<TestCategory>> = Arc::new(MemoryDestination::new(10, 10));
        let service = LoggingService::builder()
            .destination(sink.clone())
            .build()
            .unwrap();

        service.logger(TestCategory::Net).log(
            Level::Info,
            SourceLocation::new("src/net/file.rs", "net::file", 88),
            || "y",
        );

        assert_eq!(texts(&sink), vec!["[info] [net] (file.rs:88) y"]);
    }

    #[test]
    fn test_roll_log_files_without_file_destinations_completes() {
        let service = LoggingService::builder().destination(memory()).build().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        service.roll_log_files(Some(Box::new(move || {
            let _ = tx.send(());
        })));

        rx.recv().unwrap();
    }

    #[test]
    fn test_roll_log_files_waits_for_every_destination() {
        let first_dir = TempDir::new().unwrap();
        let second_dir = TempDir::new().unwrap();
        let first: Arc<FileDestination<TestCategory>> = Arc::new(
            FileDestination::builder(first_dir.path())
                .config(RotationConfig::unlimited())
                .build()
                .unwrap(),
        );
        let second: Arc<FileDestination<TestCategory>> = Arc::new(
            FileDestination::builder(second_dir.path())
                .config(RotationConfig::unlimited())
                .build()
                .unwrap(),
        );
        let service = LoggingService::builder()
            .file_destination(first.clone())
            .build()
            .unwrap();
        service.add_file(second.clone());

        service.logger(TestCategory::App).info(|| "hello");
        let (tx, rx) = std::sync::mpsc::channel();
        service.roll_log_files(Some(Box::new(move || {
            let _ = tx.send(());
        })));
        rx.recv().unwrap();

        assert_eq!(first.sorted_log_file_paths().len(), 2);
        assert_eq!(second.sorted_log_file_paths().len(), 2);
        assert_eq!(service.file_destinations().len(), 2);
    }
}
