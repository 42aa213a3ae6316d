//! Rotating file destination
//!
//! Messages are formatted on the calling thread and queued to a dedicated
//! writer thread, which owns all appends, rollovers and retention sweeps.
//! The rotation engine sits behind a mutex so listing and deletion requests
//! from other threads observe a consistent file set.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};

use crate::category::Category;
use crate::error::{Error, Result};
use crate::format::{DefaultFormatter, MessageFormatter};
use crate::message::Message;
use crate::rotation::fs::{LogFileSystem, StdFileSystem};
use crate::rotation::{RotationConfig, RotationEngine};

use super::{Completion, Destination, RotatingFileDestination};

/// Default file name prefix
pub const DEFAULT_PREFIX: &str = "catlog";

enum Command {
    Write(String),
    Roll(Option<Completion>),
    Flush(Completion),
    Shutdown,
}

/// Builder for [`FileDestination`]
pub struct FileDestinationBuilder<C: Category> {
    directory: PathBuf,
    prefix: String,
    config: RotationConfig,
    formatter: Box<dyn MessageFormatter<C>>,
    fs: Arc<dyn LogFileSystem>,
}

impl<C: Category> FileDestinationBuilder<C> {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn config(mut self, config: RotationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn formatter(mut self, formatter: impl MessageFormatter<C> + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn LogFileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Pick up existing log files and start the writer thread
    ///
    /// Files left by earlier runs are listed and deletable right away. No
    /// new file is created until the first message arrives or
    /// [`FileDestination::open`] is called.
    pub fn build(self) -> Result<FileDestination<C>> {
        let mut engine = RotationEngine::new(
            self.directory.clone(),
            self.prefix,
            self.config.clone(),
            self.fs,
        );
        engine.discover();
        let engine = Arc::new(Mutex::new(engine));

        let (sender, receiver) = mpsc::unbounded_channel();
        let worker_engine = Arc::clone(&engine);
        let worker = std::thread::Builder::new()
            .name("catlog-file-writer".to_string())
            .spawn(move || run_writer(worker_engine, receiver))
            .map_err(|e| Error::io("Failed to start log writer thread", e))?;

        Ok(FileDestination {
            formatter: self.formatter,
            directory: self.directory,
            config: self.config,
            engine,
            sender,
            worker: Mutex::new(Some(worker)),
        })
    }
}

/// Destination writing formatted messages to rotating log files
pub struct FileDestination<C: Category> {
    formatter: Box<dyn MessageFormatter<C>>,
    directory: PathBuf,
    config: RotationConfig,
    engine: Arc<Mutex<RotationEngine>>,
    sender: mpsc::UnboundedSender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Category> FileDestination<C> {
    /// Start building a destination writing into `directory`
    pub fn builder(directory: impl Into<PathBuf>) -> FileDestinationBuilder<C> {
        FileDestinationBuilder {
            directory: directory.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            config: RotationConfig::default(),
            formatter: Box::new(DefaultFormatter::default()),
            fs: Arc::new(StdFileSystem::new()),
        }
    }

    /// Destination with the default policy, prefix and formatter
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(directory).build()
    }

    /// Open the active log file now instead of on the first write
    pub fn open(&self) -> Result<()> {
        self.engine().open()
    }

    /// Roll over and wait for the new file to be ready
    pub async fn roll_log_file_async(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.roll_log_file(Some(Box::new(move || {
            let _ = tx.send(());
        })))?;
        rx.await.map_err(|_| Error::WriterStopped)
    }

    fn engine(&self) -> MutexGuard<'_, RotationEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.sender.send(command).map_err(|_| Error::WriterStopped)
    }
}

impl<C: Category> Destination<C> for FileDestination<C> {
    fn log(&self, message: &Message<C>) -> Result<()> {
        let mut line = self.formatter.format(message);
        line.push('\n');
        self.send(Command::Write(line))
    }

    /// Blocks the calling thread until every queued record has been written
    ///
    /// From async code, call it through `tokio::task::spawn_blocking`.
    fn flush(&self) {
        let (tx, rx) = std::sync::mpsc::channel();
        let queued = self.send(Command::Flush(Box::new(move || {
            let _ = tx.send(());
        })));
        if queued.is_ok() {
            let _ = rx.recv();
        }
    }
}

impl<C: Category> RotatingFileDestination<C> for FileDestination<C> {
    fn rotation_config(&self) -> &RotationConfig {
        &self.config
    }

    fn logs_directory(&self) -> &Path {
        &self.directory
    }

    fn current_log_file_path(&self) -> Option<PathBuf> {
        self.engine().current_log_file_path()
    }

    fn sorted_log_file_paths(&self) -> Vec<PathBuf> {
        self.engine().sorted_log_file_paths()
    }

    fn roll_log_file(&self, completion: Option<Completion>) -> Result<()> {
        self.send(Command::Roll(completion))
    }

    fn delete_log_file(&self, path: &Path) -> Result<()> {
        self.engine().delete(path)
    }
}

impl<C: Category> Drop for FileDestination<C> {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::error!("Log writer thread panicked");
            }
        }
    }
}

fn run_writer(engine: Arc<Mutex<RotationEngine>>, mut receiver: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = receiver.blocking_recv() {
        match command {
            Command::Write(line) => {
                let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                // Failures are already reported by the engine
                let _ = engine.write(line.as_bytes());
            }
            Command::Roll(completion) => {
                {
                    let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                    let _ = engine.roll();
                }
                if let Some(completion) = completion {
                    completion();
                }
            }
            Command::Flush(ack) => ack(),
            Command::Shutdown => break,
        }
    }
}
