use crate::core::error::PollerError;
use crate::core::models::active_count;
use crate::sources::{ItemSource, StatusChecker};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    NotArmed,
    Armed,
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PollerState::NotArmed => "not armed",
            PollerState::Armed => "armed",
            PollerState::Stopped => "stopped",
        })
    }
}

/// Invokes a [`StatusChecker`] on a fixed interval while the snapshot taken at
/// [`Poller::initialize`] contained at least one active item.
///
/// The arming decision is made once. Dropping the poller shuts it down.
pub struct Poller {
    interval: Duration,
    state: PollerState,
    decided: bool,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: PollerState::NotArmed,
            decided: false,
            cancel: CancellationToken::new(),
            task: None,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PollerState::Armed
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks that have invoked the checker so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Takes one snapshot from `source` and starts the timer if any item is
    /// active. Must be called from within a tokio runtime.
    ///
    /// A failing `source` leaves the poller `NotArmed` and may be retried.
    pub fn initialize(
        &mut self,
        source: &dyn ItemSource,
        checker: Arc<dyn StatusChecker>,
    ) -> Result<PollerState, PollerError> {
        if self.decided {
            return Err(PollerError::AlreadyInitialized { state: self.state });
        }

        if self.interval.is_zero() {
            return Err(PollerError::InvalidInterval);
        }

        let items = source.snapshot().map_err(PollerError::ItemSource)?;
        let active = active_count(&items);
        self.decided = true;

        if active == 0 {
            tracing::info!(items = items.len(), "No active items, poller not armed");
            return Ok(self.state);
        }

        self.task = Some(tokio::spawn(run_ticks(
            self.interval,
            checker,
            self.cancel.clone(),
            Arc::clone(&self.ticks),
        )));
        self.state = PollerState::Armed;

        tracing::info!(
            active,
            interval_ms = self.interval.as_millis() as u64,
            "Poller armed"
        );
        Ok(self.state)
    }

    /// Cancels the timer and any status check still in flight. Idempotent.
    ///
    /// Each tick re-checks the cancellation token immediately before calling
    /// the checker. On a current-thread runtime no check starts after this
    /// returns; on a multi-thread runtime a tick already past that re-check on
    /// another worker may still start its check, which is then cancelled at
    /// its next await point.
    pub fn shutdown(&mut self) {
        self.decided = true;
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(ticks = self.ticks(), "Poller stopped");
        }

        if self.state == PollerState::Armed {
            self.state = PollerState::Stopped;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type TickOutcome = Option<(u64, anyhow::Result<()>)>;

async fn run_ticks(
    period: Duration,
    checker: Arc<dyn StatusChecker>,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    // Late ticks are replayed, never merged.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    // Dropping the set on exit aborts checks still in flight.
    let mut in_flight: JoinSet<TickOutcome> = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                in_flight.spawn(run_check(
                    Arc::clone(&checker),
                    cancel.clone(),
                    Arc::clone(&ticks),
                ));
            }
            Some(outcome) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_outcome(outcome);
            }
        }
    }
}

/// One tick: never awaited by the timer loop, so a slow check cannot delay
/// the next one.
async fn run_check(
    checker: Arc<dyn StatusChecker>,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
) -> TickOutcome {
    if cancel.is_cancelled() {
        return None;
    }

    let tick = ticks.fetch_add(1, Ordering::Relaxed) + 1;
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(tick, "Status check cancelled");
            None
        }
        result = checker.check() => Some((tick, result)),
    }
}

fn log_outcome(outcome: Result<TickOutcome, JoinError>) {
    match outcome {
        Ok(Some((tick, Ok(())))) => tracing::debug!(tick, "Status check finished"),
        Ok(Some((tick, Err(e)))) => tracing::warn!(tick, error = %e, "Status check failed"),
        Ok(None) => {}
        Err(e) if e.is_panic() => tracing::error!(error = %e, "Status check panicked"),
        Err(_) => {}
    }
}
