use crate::core::error::PollerError;
use crate::core::settings::Settings;
use crate::daemon::poller::Poller;
use crate::daemon::reload::ItemsWatcher;
use crate::sources::{FileItemSource, ItemSource, LoggingStatusChecker, StatusChecker};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(settings: Settings, items_path: PathBuf) -> Result<()> {
    let interval_ms = settings.poller.interval_ms;
    tracing::info!(?items_path, interval_ms, "Starting request poller");

    let source: Arc<dyn ItemSource> = Arc::new(FileItemSource::new(&items_path));
    let checker: Arc<dyn StatusChecker> =
        Arc::new(LoggingStatusChecker::new(Arc::clone(&source)));

    let mut poller = Some(
        arm_poller(interval_ms, source.as_ref(), &checker)
            .context("Failed to initialize poller")?,
    );

    let (_watcher, mut change_rx) = ItemsWatcher::start(&items_path)?;

    loop {
        tokio::select! {
            Some(()) = change_rx.recv() => {
                handle_items_change(&mut poller, interval_ms, source.as_ref(), &checker);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    if let Some(mut poller) = poller.take() {
        poller.shutdown();
    }

    Ok(())
}

/// Equivalent of a page reload: stop the old poller and decide afresh from a
/// new snapshot. A failed snapshot leaves no poller until the next change.
fn handle_items_change(
    poller: &mut Option<Poller>,
    interval_ms: u64,
    source: &dyn ItemSource,
    checker: &Arc<dyn StatusChecker>,
) {
    if let Some(mut old) = poller.take() {
        old.shutdown();
    }

    match arm_poller(interval_ms, source, checker) {
        Ok(new) => *poller = Some(new),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to re-arm poller, waiting for next change");
        }
    }
}

fn arm_poller(
    interval_ms: u64,
    source: &dyn ItemSource,
    checker: &Arc<dyn StatusChecker>,
) -> Result<Poller, PollerError> {
    let mut poller = Poller::with_interval_ms(interval_ms);
    let state = poller.initialize(source, Arc::clone(checker))?;
    tracing::debug!(%state, interval = ?poller.interval(), "Arming decision made");
    Ok(poller)
}
