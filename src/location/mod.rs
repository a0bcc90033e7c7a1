//! Location tracking service.
//!
//! Abstracts over whichever device location API is available (browser
//! geolocation or a native equivalent) behind one [`LocationSource`] seam
//! and produces a live stream of position samples with adaptive sampling.

pub mod tracker;

use crate::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// Re-export main types
pub use tracker::{LocationTracker, MovementDetector};

/// A single GPS fix.
///
/// Immutable; each new sample supersedes the previous one rather than
/// mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Reported accuracy radius in meters, if the platform provides one
    pub accuracy_m: Option<f64>,
    /// When the fix was produced
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Create a position stamped now.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a platform accuracy estimate.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// The fix as a coordinate pair.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Outcome of a location permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// User granted access
    Granted,
    /// User denied access
    Denied,
    /// No location capability on this platform
    Unavailable,
}

/// Options for a single position fix request.
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Request the most accurate fix the platform can produce
    pub enable_high_accuracy: bool,
    /// How long the platform may take before failing with a timeout
    pub timeout: Duration,
    /// Maximum age of a cached fix the platform may return
    pub maximum_age: Duration,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(2),
        }
    }
}

/// The seam over the platform location API.
pub trait LocationSource: Send + Sync + 'static {
    /// Ask the platform for location permission.
    fn request_permission(&self) -> impl std::future::Future<Output = Permission> + Send;

    /// Request a single position fix.
    fn current_position(
        &self,
        options: &FixOptions,
    ) -> impl std::future::Future<Output = Result<Position, LocationError>> + Send;
}

/// Errors from the location system.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    /// User denied location permission
    #[error("location permission denied")]
    PermissionDenied,

    /// Platform has no location capability
    #[error("location unavailable on this platform")]
    Unavailable,

    /// The platform did not produce a fix in time
    #[error("position request timed out")]
    Timeout,

    /// The platform failed to produce a fix
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
}

impl LocationError {
    /// Terminal errors end the tracking session; transient ones are
    /// retried at the next scheduled sample.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::Unavailable
        )
    }
}

/// Events from the tracking loop.
#[derive(Debug, Clone)]
pub enum LocationEvent {
    /// A new position fix arrived
    Fix(Position),
    /// A terminal error ended the session
    Error(LocationError),
    /// The tracking loop exited
    Stopped,
}

/// Configuration for the tracking loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Sampling interval while moving, in seconds
    pub baseline_interval_secs: u64,
    /// Sampling interval while stationary, in seconds
    pub idle_interval_secs: u64,
    /// Displacement below this counts as stationary, in meters
    pub movement_threshold_m: f64,
    /// Consecutive stationary samples before backing off
    pub stationary_samples: u32,
    /// Request high-accuracy fixes
    pub high_accuracy: bool,
    /// Per-fix timeout in seconds
    pub fix_timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            baseline_interval_secs: 5,
            idle_interval_secs: 30,
            movement_threshold_m: 5.0,
            stationary_samples: 3,
            high_accuracy: true,
            fix_timeout_secs: 10,
        }
    }
}

impl TrackerConfig {
    /// Baseline sampling interval.
    pub fn baseline_interval(&self) -> Duration {
        Duration::from_secs(self.baseline_interval_secs)
    }

    /// Backed-off sampling interval for a stationary device.
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    /// Fix options derived from this configuration.
    pub fn fix_options(&self) -> FixOptions {
        FixOptions {
            enable_high_accuracy: self.high_accuracy,
            timeout: Duration::from_secs(self.fix_timeout_secs),
            ..Default::default()
        }
    }
}
