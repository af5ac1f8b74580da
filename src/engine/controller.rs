use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::errors::EngineError;
use crate::location::LocationClient;
use crate::models::{LocationSample, Trip};

use super::state::{TripSnapshot, TripState, TripTelemetry};

const TICK_MS: u64 = 1000;

/// A cancellable background task. `stop` is the only way to drop one, so a
/// transition is complete only after the task has fully wound down and can
/// no longer touch the telemetry.
struct WorkerTask {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl WorkerTask {
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            error!("Trip worker task failed to join: {err}");
        }
    }
}

/// Consumes a location-update stream, maintains running trip statistics,
/// walks the Idle → Started → Paused/Stopped → Idle lifecycle and hands
/// finalized trips to the store.
///
/// Lifecycle calls from mismatched states are deterministic no-ops; see the
/// individual methods. All telemetry mutation is serialized on one mutex,
/// shared with the sampler and duration-ticker tasks.
#[derive(Clone)]
pub struct TripEngine {
    telemetry: Arc<Mutex<TripTelemetry>>,
    location: Arc<dyn LocationClient>,
    db: Database,
    sampler: Arc<Mutex<Option<WorkerTask>>>,
    ticker: Arc<Mutex<Option<WorkerTask>>>,
    updates: Arc<watch::Sender<TripSnapshot>>,
    sample_interval: Duration,
}

impl TripEngine {
    pub fn new(location: Arc<dyn LocationClient>, db: Database) -> Self {
        let (updates, _) = watch::channel(TripTelemetry::new().snapshot());
        Self {
            telemetry: Arc::new(Mutex::new(TripTelemetry::new())),
            location,
            db,
            sampler: Arc::new(Mutex::new(None)),
            ticker: Arc::new(Mutex::new(None)),
            updates: Arc::new(updates),
            sample_interval: Duration::from_millis(TICK_MS),
        }
    }

    /// Last-value-wins feed of telemetry snapshots. Late subscribers see
    /// the current value, not history.
    pub fn subscribe(&self) -> watch::Receiver<TripSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> TripSnapshot {
        self.telemetry.lock().await.snapshot()
    }

    pub async fn state(&self) -> TripState {
        self.telemetry.lock().await.state
    }

    /// Begins a new tracking session: resets the telemetry, subscribes to
    /// the location source and starts the duration ticker.
    ///
    /// A subscription failure leaves the engine `Idle` with the telemetry
    /// untouched. Calling while a session is active is a no-op.
    pub async fn start(&self) -> Result<(), EngineError> {
        {
            let guard = self.telemetry.lock().await;
            if guard.state != TripState::Idle {
                warn!("Start requested while {:?}; ignoring", guard.state);
                return Ok(());
            }
        }

        // Subscribe before touching any state so a permission or provider
        // failure leaves nothing to unwind.
        let rx = self.location.subscribe(self.sample_interval)?;

        {
            let mut guard = self.telemetry.lock().await;
            guard.reset();
            guard.state = TripState::Started;
        }

        self.spawn_sampler(rx).await;
        self.spawn_ticker().await;
        self.publish().await;
        info!("Trip started");
        Ok(())
    }

    /// Freezes the session: unsubscribes from the location source and halts
    /// the duration ticker. Accumulated statistics are kept. No-op unless
    /// `Started`. When this returns, no further sample or tick can land.
    pub async fn pause(&self) {
        {
            let mut guard = self.telemetry.lock().await;
            if guard.state != TripState::Started {
                return;
            }
            guard.state = TripState::Paused;
        }

        self.halt_workers().await;
        self.publish().await;
        info!("Trip paused");
    }

    /// Re-subscribes and resumes duration ticking. No-op unless `Paused`.
    ///
    /// A subscription failure leaves the engine `Paused` with all progress
    /// intact, so the caller can retry.
    pub async fn resume(&self) -> Result<(), EngineError> {
        {
            let guard = self.telemetry.lock().await;
            if guard.state != TripState::Paused {
                return Ok(());
            }
        }

        let rx = self.location.subscribe(self.sample_interval)?;

        {
            let mut guard = self.telemetry.lock().await;
            guard.state = TripState::Started;
        }

        self.spawn_sampler(rx).await;
        self.spawn_ticker().await;
        self.publish().await;
        info!("Trip resumed");
        Ok(())
    }

    /// Ends the session: captures the last known position as the trip end,
    /// unsubscribes and halts ticking. Accepted from `Started` or `Paused`;
    /// no-op otherwise. The session then awaits `save` or `discard`.
    pub async fn stop(&self) {
        {
            let mut guard = self.telemetry.lock().await;
            if !matches!(guard.state, TripState::Started | TripState::Paused) {
                return;
            }
            guard.end_location = guard.last_location;
            guard.state = TripState::Stopped;
        }

        self.halt_workers().await;
        self.publish().await;
        info!("Trip stopped");
    }

    /// Finalizes the stopped session into a [`Trip`], persists it and
    /// resets to `Idle`. Returns the stored record with its assigned id,
    /// or `None` when there is no stopped session to save.
    ///
    /// A storage failure is surfaced without resetting: the engine stays
    /// `Stopped` with the telemetry intact, so the trip is not lost.
    pub async fn save(&self) -> Result<Option<Trip>, EngineError> {
        let record = {
            let guard = self.telemetry.lock().await;
            if guard.state != TripState::Stopped {
                return Ok(None);
            }

            // A trip that never saw a fix falls back to the origin, the
            // same as an empty-provider reading on the device.
            let start = guard.start_location.unwrap_or_default();
            let end = guard
                .end_location
                .or(guard.last_location)
                .unwrap_or_default();

            Trip {
                id: 0,
                start: start.encode(),
                end: end.encode(),
                distance: guard.distance_km,
                average_speed: guard.avg_speed_kmh(),
                max_speed: guard.max_speed_kmh,
                duration: guard.duration_ms as i64,
                date: Utc::now().timestamp_millis(),
            }
        };

        let id = self.db.insert_trip(&record).await?;

        {
            let mut guard = self.telemetry.lock().await;
            guard.reset();
        }
        self.publish().await;
        info!("Trip {id} saved");
        Ok(Some(Trip { id, ..record }))
    }

    /// Throws the stopped session away without persisting. No-op unless
    /// `Stopped`.
    pub async fn discard(&self) {
        {
            let mut guard = self.telemetry.lock().await;
            if guard.state != TripState::Stopped {
                return;
            }
            guard.reset();
        }
        self.publish().await;
        info!("Trip discarded");
    }

    async fn spawn_sampler(&self, mut rx: mpsc::Receiver<LocationSample>) {
        let mut slot = self.sampler.lock().await;
        if let Some(task) = slot.take() {
            task.stop().await;
        }

        let telemetry = self.telemetry.clone();
        let updates = self.updates.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    sample = rx.recv() => {
                        let Some(sample) = sample else {
                            warn!("Location stream closed");
                            break;
                        };
                        let mut guard = telemetry.lock().await;
                        // A transition can land between recv and lock; a
                        // sample must never mutate a non-running session.
                        if guard.state != TripState::Started {
                            break;
                        }
                        guard.apply_sample(&sample);
                        updates.send_replace(guard.snapshot());
                    }
                }
            }
        });

        *slot = Some(WorkerTask { handle, cancel });
    }

    async fn spawn_ticker(&self) {
        let mut slot = self.ticker.lock().await;
        if let Some(task) = slot.take() {
            task.stop().await;
        }

        let telemetry = self.telemetry.clone();
        let updates = self.updates.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_millis(TICK_MS));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so every
            // later tick marks a full elapsed second.
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut guard = telemetry.lock().await;
                        if guard.state != TripState::Started {
                            break;
                        }
                        guard.duration_ms += TICK_MS;
                        updates.send_replace(guard.snapshot());
                    }
                }
            }
        });

        *slot = Some(WorkerTask { handle, cancel });
    }

    async fn halt_workers(&self) {
        if let Some(task) = self.sampler.lock().await.take() {
            task.stop().await;
        }
        if let Some(task) = self.ticker.lock().await.take() {
            task.stop().await;
        }
    }

    async fn publish(&self) {
        let snapshot = self.telemetry.lock().await.snapshot();
        self.updates.send_replace(snapshot);
    }
}
