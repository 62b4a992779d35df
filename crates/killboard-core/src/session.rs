//! The aggregation session loop.
//!
//! One task owns the [`Aggregator`], the in-memory world, and the snapshot
//! writer. Each iteration of the loop handles exactly one of:
//!
//! 1. the shutdown signal, which ends the loop,
//! 2. a persistence tick, which writes a snapshot,
//! 3. the next feed input, which updates the world or the counters.
//!
//! Every branch runs to completion before the next is polled, so a snapshot
//! never observes a half-applied event.
//!
//! When the loop ends, either on shutdown or because the feed ran dry, one
//! final snapshot is written and the timer is dropped.

use std::future::Future;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use killboard_identity::{ActorDatabase, EntityInfo, InMemoryWorld, WeaponInfo};
use killboard_types::{EventEnvelope, RawActorId};

use crate::config::PersistenceConfig;
use crate::dispatch::{Aggregator, DispatchOutcome};
use crate::persist::SnapshotWriter;

/// Shortest allowed flush period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// When snapshots are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceTiming {
    initial_delay: Duration,
    interval: Duration,
}

impl PersistenceTiming {
    /// First flush after `initial_delay`, then every `interval`.
    ///
    /// An interval under one second is raised to one second.
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Delay before the first flush.
    pub const fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Period between flushes.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl From<&PersistenceConfig> for PersistenceTiming {
    fn from(config: &PersistenceConfig) -> Self {
        Self::new(config.initial_delay(), config.interval())
    }
}

/// One item of the session's input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// An entity appeared in the world.
    Spawn(EntityInfo),
    /// An entity left the world. Later references to it no longer resolve,
    /// and an entity spawned later on the same handle is keyed afresh.
    Despawn(RawActorId),
    /// A weapon object became inspectable.
    Weapon(WeaponInfo),
    /// A combat event.
    Event(EventEnvelope),
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Combat events handed to the dispatcher.
    pub events_processed: u64,
    /// Combat events that changed no counter.
    pub events_skipped: u64,
    /// Snapshots written successfully, including the final one.
    pub flushes_succeeded: u64,
    /// Snapshot writes that failed.
    pub flushes_failed: u64,
}

/// A running aggregation session.
#[derive(Debug)]
pub struct Session<D> {
    aggregator: Aggregator<D>,
    world: InMemoryWorld,
    writer: SnapshotWriter,
    timing: PersistenceTiming,
    summary: SessionSummary,
}

impl<D: ActorDatabase> Session<D> {
    /// Create a session with an empty world.
    pub const fn new(
        aggregator: Aggregator<D>,
        writer: SnapshotWriter,
        timing: PersistenceTiming,
    ) -> Self {
        Self {
            aggregator,
            world: InMemoryWorld::new(),
            writer,
            timing,
            summary: SessionSummary {
                events_processed: 0,
                events_skipped: 0,
                flushes_succeeded: 0,
                flushes_failed: 0,
            },
        }
    }

    /// The aggregator.
    pub const fn aggregator(&self) -> &Aggregator<D> {
        &self.aggregator
    }

    /// The world as last reported by the feed.
    pub const fn world(&self) -> &InMemoryWorld {
        &self.world
    }

    /// Totals so far.
    pub const fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Run until `shutdown` resolves or `input` ends, then write the final
    /// snapshot.
    pub async fn run<S, F>(&mut self, input: S, shutdown: F) -> SessionSummary
    where
        S: Stream<Item = SessionInput>,
        F: Future<Output = ()>,
    {
        info!(
            session_id = %self.aggregator.store().session_id(),
            output = %self.writer.path().display(),
            initial_delay_secs = self.timing.initial_delay().as_secs(),
            interval_secs = self.timing.interval().as_secs(),
            "Session starting"
        );

        let now = Instant::now();
        let first_tick = now.checked_add(self.timing.initial_delay()).unwrap_or(now);
        let mut ticker = tokio::time::interval_at(first_tick, self.timing.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut input = std::pin::pin!(input);
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.flush();
                }
                next = input.next() => {
                    let Some(item) = next else {
                        info!("Event feed ended");
                        break;
                    };
                    self.apply(item);
                }
            }
        }

        drop(ticker);
        self.flush();
        log_session_end(&self.summary);
        self.summary
    }

    /// Apply one input item.
    pub fn apply(&mut self, input: SessionInput) {
        match input {
            SessionInput::Spawn(entity) => self.world.spawn(entity),
            SessionInput::Despawn(actor) => {
                self.world.despawn(actor);
                self.aggregator.release(actor);
            }
            SessionInput::Weapon(weapon) => self.world.register_weapon(weapon),
            SessionInput::Event(envelope) => {
                let outcome = self.aggregator.process(&self.world, &envelope.event);
                self.summary.events_processed = self.aggregator.events_processed();
                if matches!(
                    outcome,
                    DispatchOutcome::Skipped(_) | DispatchOutcome::Ignored
                ) {
                    self.summary.events_skipped = self.summary.events_skipped.saturating_add(1);
                }
            }
        }
    }

    /// Take a snapshot and write it. Failures are logged and counted.
    pub fn flush(&mut self) -> bool {
        let snapshot = self.aggregator.snapshot();
        match self.writer.write_snapshot(&snapshot) {
            Ok(()) => {
                self.summary.flushes_succeeded = self.summary.flushes_succeeded.saturating_add(1);
                true
            }
            Err(e) => {
                warn!(error = %e, path = %self.writer.path().display(), "Snapshot flush failed");
                self.summary.flushes_failed = self.summary.flushes_failed.saturating_add(1);
                false
            }
        }
    }
}

/// Log the final session summary.
fn log_session_end(summary: &SessionSummary) {
    info!(
        events_processed = summary.events_processed,
        events_skipped = summary.events_skipped,
        flushes_succeeded = summary.flushes_succeeded,
        flushes_failed = summary.flushes_failed,
        "Session ended"
    );
}
