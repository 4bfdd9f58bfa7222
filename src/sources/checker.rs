use crate::core::models::active_count;
use crate::sources::{ItemSource, StatusChecker};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Reports how many items are still active. Issues no requests of its own.
pub struct LoggingStatusChecker {
    source: Arc<dyn ItemSource>,
}

impl LoggingStatusChecker {
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self { source }
    }

    /// Returns the number of active items seen by this round.
    pub fn check_once(&self) -> Result<usize> {
        let items = self.source.snapshot()?;
        let active = active_count(&items);

        if active > 0 {
            tracing::info!(active, "Checking status updates");
        } else {
            tracing::debug!("No active items left to check");
        }

        Ok(active)
    }
}

#[async_trait]
impl StatusChecker for LoggingStatusChecker {
    async fn check(&self) -> Result<()> {
        self.check_once().map(|_| ())
    }
}
