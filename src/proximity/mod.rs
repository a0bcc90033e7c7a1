//! Proximity zones and evaluation.
//!
//! The evaluator reconciles the latest position against the landmark
//! catalog, ranks landmarks by distance, and emits stable zone-transition
//! and closest-changed events for the notification coordinator.

pub mod evaluator;

use crate::catalog::Landmark;
use serde::{Deserialize, Serialize};

// Re-export main types
pub use evaluator::{Evaluation, ProximityEvaluator};

/// Per-user proximity thresholds, in meters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximitySettings {
    /// Innermost band: prominent alerts
    pub inner_distance_m: f64,
    /// Outer band: lighter-weight notifications; also the re-arm boundary
    pub outer_distance_m: f64,
    /// Card band: floating-card eligibility
    pub card_distance_m: f64,
    /// Evaluation range cap; landmarks beyond it are not ranked
    pub default_distance_m: f64,
    /// Master switch for proximity features
    pub enabled: bool,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            inner_distance_m: 50.0,
            outer_distance_m: 250.0,
            card_distance_m: 400.0,
            default_distance_m: 1000.0,
            enabled: true,
        }
    }
}

impl ProximitySettings {
    /// Validate the threshold ordering invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.inner_distance_m > self.outer_distance_m {
            return Err(format!(
                "inner distance {} exceeds outer distance {}",
                self.inner_distance_m, self.outer_distance_m
            ));
        }
        Ok(())
    }
}

/// Distance band around the user.
///
/// Ordered by closeness: `Inner < Outer < Card < Far`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Within the inner threshold
    Inner,
    /// Within the outer threshold
    Outer,
    /// Within the card threshold
    Card,
    /// Beyond every threshold
    Far,
}

impl Zone {
    /// Classify a distance against the settings thresholds.
    ///
    /// Comparisons are `<=`: a landmark exactly at a threshold counts as
    /// inside it.
    pub fn classify(distance_m: f64, settings: &ProximitySettings) -> Self {
        if distance_m <= settings.inner_distance_m {
            Zone::Inner
        } else if distance_m <= settings.outer_distance_m {
            Zone::Outer
        } else if distance_m <= settings.card_distance_m {
            Zone::Card
        } else {
            Zone::Far
        }
    }

    /// Whether this band is eligible for any notification.
    pub fn is_notifiable(&self) -> bool {
        !matches!(self, Zone::Far)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Inner => write!(f, "inner"),
            Zone::Outer => write!(f, "outer"),
            Zone::Card => write!(f, "card"),
            Zone::Far => write!(f, "far"),
        }
    }
}

/// A landmark paired with its computed distance.
///
/// Ephemeral projection, rebuilt on every evaluation; never persisted.
#[derive(Debug, Clone)]
pub struct LandmarkWithDistance {
    /// The landmark
    pub landmark: Landmark,
    /// Great-circle distance from the user, in meters
    pub distance_m: f64,
}

/// Transitions emitted by the evaluator.
#[derive(Debug, Clone)]
pub enum ProximityEvent {
    /// A different landmark became the closest in range
    ClosestChanged {
        landmark: Landmark,
        distance_m: f64,
    },
    /// No landmark is in range anymore
    ClosestLost,
    /// A landmark crossed inward into a zone
    ZoneEntered {
        landmark: Landmark,
        zone: Zone,
        distance_m: f64,
    },
    /// A landmark crossed back out past the outer boundary
    ZoneExited { landmark: Landmark },
}
