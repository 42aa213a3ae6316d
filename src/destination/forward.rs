//! Destination that re-emits messages as `tracing` events
//!
//! This is the counterpart of an OS log sink: the host application decides
//! where events go by installing a subscriber.

use crate::category::Category;
use crate::error::Result;
use crate::format::{DefaultFormatter, MessageFormatter};
use crate::level::Level;
use crate::message::Message;

use super::Destination;

/// Forwards messages into the `tracing` ecosystem
///
/// Events use the target `catlog::forward` and carry the category name as
/// the `category` field.
pub struct TracingDestination<C: Category> {
    formatter: Box<dyn MessageFormatter<C>>,
}

impl<C: Category> TracingDestination<C> {
    pub fn new() -> Self {
        Self::with_formatter(DefaultFormatter::new(false, false))
    }

    pub fn with_formatter(formatter: impl MessageFormatter<C> + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
        }
    }
}

impl<C: Category> Default for TracingDestination<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> Destination<C> for TracingDestination<C> {
    fn log(&self, message: &Message<C>) -> Result<()> {
        let text = self.formatter.format(message);
        let category = message.category().name();

        match message.level() {
            Level::Error => tracing::error!(target: "catlog::forward", category, "{}", text),
            Level::Warning => tracing::warn!(target: "catlog::forward", category, "{}", text),
            Level::Info => tracing::info!(target: "catlog::forward", category, "{}", text),
            Level::Debug => tracing::debug!(target: "catlog::forward", category, "{}", text),
            Level::Verbose => tracing::trace!(target: "catlog::forward", category, "{}", text),
        }

        Ok(())
    }
}
