mod checker;
mod file;

use crate::core::models::Item;
use anyhow::Result;
use async_trait::async_trait;

pub use checker::LoggingStatusChecker;
pub use file::FileItemSource;

/// Supplies the current items. Evaluated fresh on every call.
pub trait ItemSource: Send + Sync {
    fn snapshot(&self) -> Result<Vec<Item>>;
}

/// One round of status reconciliation, run once per poller tick.
#[async_trait]
pub trait StatusChecker: Send + Sync {
    async fn check(&self) -> Result<()>;
}

pub struct StaticItemSource {
    items: Vec<Item>,
}

impl StaticItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl ItemSource for StaticItemSource {
    fn snapshot(&self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }
}
