//! Adaptive-interval location sampling loop.

use crate::geo;
use crate::location::{
    LocationError, LocationEvent, LocationSource, Position, Permission, TrackerConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Tracks displacement across consecutive fixes to decide whether the
/// device is effectively stationary.
///
/// A heuristic, not a guarantee: failing to notice slow drift is
/// acceptable, over-polling is the safe failure direction, so a single
/// moving sample resets the stationary streak.
pub struct MovementDetector {
    threshold_m: f64,
    required_samples: u32,
    last_fix: Option<Position>,
    stationary_count: u32,
}

impl MovementDetector {
    /// Create a detector for the given displacement threshold.
    pub fn new(threshold_m: f64, required_samples: u32) -> Self {
        Self {
            threshold_m,
            required_samples,
            last_fix: None,
            stationary_count: 0,
        }
    }

    /// Record a fix; returns whether the device counts as stationary.
    pub fn observe(&mut self, position: &Position) -> bool {
        let stationary = match &self.last_fix {
            None => false,
            Some(previous) => {
                let moved = geo::distance_meters(
                    previous.latitude,
                    previous.longitude,
                    position.latitude,
                    position.longitude,
                );
                if moved < self.threshold_m {
                    self.stationary_count += 1;
                } else {
                    self.stationary_count = 0;
                }
                self.stationary_count >= self.required_samples
            }
        };
        self.last_fix = Some(*position);
        stationary
    }
}

/// Drives periodic position sampling against a [`LocationSource`].
///
/// While the last samples show negligible displacement the loop lengthens
/// its interval to conserve battery; detected movement restores the
/// baseline interval.
pub struct LocationTracker<S: LocationSource> {
    source: Arc<S>,
    config: TrackerConfig,
    active: Arc<AtomicBool>,
}

impl<S: LocationSource> LocationTracker<S> {
    /// Create a tracker over the given source.
    pub fn new(source: S, config: TrackerConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the sampling loop and return its event stream.
    ///
    /// The loop requests permission once; denial is surfaced as a single
    /// terminal [`LocationEvent::Error`] and the loop exits without
    /// retrying. If a previous loop is still active this is a no-op that
    /// returns an immediately closed receiver.
    pub fn start(&self) -> mpsc::UnboundedReceiver<LocationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        if self.active.swap(true, Ordering::SeqCst) {
            tracing::warn!("LocationTracker already running, ignoring start");
            return rx;
        }

        tracing::info!(
            baseline_secs = self.config.baseline_interval_secs,
            idle_secs = self.config.idle_interval_secs,
            "Starting location tracking"
        );

        let source = self.source.clone();
        let config = self.config.clone();
        let active = self.active.clone();

        tokio::spawn(async move {
            Self::run_loop(source, config, active, tx).await;
        });

        rx
    }

    /// Stop the sampling loop.
    ///
    /// Idempotent. Any fix already in flight is discarded by the loop's
    /// still-active guard rather than delivered after stop.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!("Stopping location tracking");
        }
    }

    /// Whether the sampling loop is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn run_loop(
        source: Arc<S>,
        config: TrackerConfig,
        active: Arc<AtomicBool>,
        tx: mpsc::UnboundedSender<LocationEvent>,
    ) {
        match source.request_permission().await {
            Permission::Granted => {}
            Permission::Denied => {
                let _ = tx.send(LocationEvent::Error(LocationError::PermissionDenied));
                active.store(false, Ordering::SeqCst);
                let _ = tx.send(LocationEvent::Stopped);
                return;
            }
            Permission::Unavailable => {
                let _ = tx.send(LocationEvent::Error(LocationError::Unavailable));
                active.store(false, Ordering::SeqCst);
                let _ = tx.send(LocationEvent::Stopped);
                return;
            }
        }

        let options = config.fix_options();
        let mut interval = config.baseline_interval();
        let mut detector =
            MovementDetector::new(config.movement_threshold_m, config.stationary_samples);

        while active.load(Ordering::SeqCst) {
            match source.current_position(&options).await {
                Ok(position) => {
                    // A fix that raced a stop() must not be delivered.
                    if !active.load(Ordering::SeqCst) {
                        break;
                    }

                    let next_interval = if detector.observe(&position) {
                        config.idle_interval()
                    } else {
                        config.baseline_interval()
                    };
                    if next_interval != interval {
                        if next_interval == config.idle_interval() {
                            tracing::debug!(
                                idle_secs = config.idle_interval_secs,
                                "Device stationary, backing off sampling"
                            );
                        } else {
                            tracing::debug!("Movement detected, resuming baseline sampling");
                        }
                        interval = next_interval;
                    }

                    if tx.send(LocationEvent::Fix(position)).is_err() {
                        // Consumer is gone; nothing left to track for.
                        break;
                    }
                }
                Err(e) if e.is_terminal() => {
                    tracing::warn!(error = %e, "Terminal location error, ending session");
                    let _ = tx.send(LocationEvent::Error(e));
                    break;
                }
                Err(e) => {
                    // Transient failure: retried at the next scheduled
                    // sample, never in a tight loop.
                    tracing::debug!(error = %e, "Transient location error, will retry");
                }
            }

            tokio::time::sleep(interval).await;
        }

        active.store(false, Ordering::SeqCst);
        let _ = tx.send(LocationEvent::Stopped);
        tracing::info!("Location tracking loop exited");
    }
}
