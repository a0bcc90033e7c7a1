//! The proximity evaluator.
//!
//! Re-run on every position/catalog/settings change. The computation is
//! synchronous and runs to completion once started, so its transition
//! detection needs no locking under the session's single-consumer model.

use crate::catalog::Landmark;
use crate::geo;
use crate::location::Position;
use crate::proximity::{
    LandmarkWithDistance, ProximityEvent, ProximitySettings, Zone,
};
use std::collections::HashMap;

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Landmarks within range, ascending by distance (id tiebreak)
    pub ranked: Vec<LandmarkWithDistance>,
    /// Transitions detected against the retained state
    pub events: Vec<ProximityEvent>,
}

/// Computes distance-ranked landmarks and stable zone transitions.
///
/// Retains per-landmark zone state and the closest landmark id across
/// evaluations so that re-confirming an unchanged situation emits nothing.
/// The evaluator is the single writer of that state; consumers read events.
pub struct ProximityEvaluator {
    settings: ProximitySettings,
    /// Retained zone per landmark id
    zones: HashMap<String, Zone>,
    /// Retained closest landmark id
    closest_id: Option<String>,
    /// Forced distances for deterministic QA, keyed by landmark id
    overrides: HashMap<String, f64>,
}

impl ProximityEvaluator {
    /// Create an evaluator with the given settings.
    pub fn new(settings: ProximitySettings) -> Self {
        if let Err(e) = settings.validate() {
            tracing::warn!(error = %e, "Proximity settings fail validation, using them anyway");
        }
        Self {
            settings,
            zones: HashMap::new(),
            closest_id: None,
            overrides: HashMap::new(),
        }
    }

    /// Replace the settings; retained state is kept and transitions are
    /// re-derived on the next evaluation.
    pub fn set_settings(&mut self, settings: ProximitySettings) {
        if let Err(e) = settings.validate() {
            tracing::warn!(error = %e, "Proximity settings fail validation, using them anyway");
        }
        self.settings = settings;
    }

    /// Current settings.
    pub fn settings(&self) -> &ProximitySettings {
        &self.settings
    }

    /// Id of the currently retained closest landmark.
    pub fn closest_id(&self) -> Option<&str> {
        self.closest_id.as_deref()
    }

    /// Force a landmark's computed distance to a fixed value.
    ///
    /// Short-circuits the haversine call for that landmark only; the rest
    /// of the algorithm is unchanged.
    pub fn set_override(&mut self, landmark_id: impl Into<String>, distance_m: f64) {
        self.overrides.insert(landmark_id.into(), distance_m);
    }

    /// Remove a forced distance.
    pub fn clear_override(&mut self, landmark_id: &str) {
        self.overrides.remove(landmark_id);
    }

    /// Evaluate the landmark set against a position.
    ///
    /// Emits `ClosestChanged`/`ClosestLost` ahead of zone transitions;
    /// zone transitions follow in ascending distance order.
    pub fn evaluate(&mut self, position: &Position, landmarks: &[Landmark]) -> Evaluation {
        if !self.settings.enabled {
            return Evaluation::default();
        }
        if landmarks.is_empty() {
            return Evaluation::default();
        }

        // Step 1: distance projection, consulting the override map first.
        let mut measured: Vec<LandmarkWithDistance> = landmarks
            .iter()
            .map(|landmark| {
                let distance_m = match self.overrides.get(&landmark.id) {
                    Some(forced) => *forced,
                    None => geo::distance_meters(
                        position.latitude,
                        position.longitude,
                        landmark.coordinates.latitude,
                        landmark.coordinates.longitude,
                    ),
                };
                LandmarkWithDistance {
                    landmark: landmark.clone(),
                    distance_m,
                }
            })
            .collect();

        // Steps 2-3: deterministic sort, distance then id.
        measured.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.landmark.id.cmp(&b.landmark.id))
        });

        let ranked: Vec<LandmarkWithDistance> = measured
            .iter()
            .filter(|m| m.distance_m <= self.settings.default_distance_m)
            .cloned()
            .collect();

        let mut events = Vec::new();

        // Steps 4-5: closest-change detection with re-fire suppression.
        match ranked.first() {
            Some(closest) => {
                if self.closest_id.as_deref() != Some(closest.landmark.id.as_str()) {
                    tracing::debug!(
                        id = %closest.landmark.id,
                        distance_m = closest.distance_m,
                        "Closest landmark changed"
                    );
                    self.closest_id = Some(closest.landmark.id.clone());
                    events.push(ProximityEvent::ClosestChanged {
                        landmark: closest.landmark.clone(),
                        distance_m: closest.distance_m,
                    });
                }
            }
            None => {
                if self.closest_id.take().is_some() {
                    events.push(ProximityEvent::ClosestLost);
                }
            }
        }

        // Step 6: per-landmark zone transitions.
        for item in &measured {
            let new_zone = Zone::classify(item.distance_m, &self.settings);
            let previous = self
                .zones
                .get(&item.landmark.id)
                .copied()
                .unwrap_or(Zone::Far);

            if new_zone < previous {
                // Crossed inward.
                if new_zone.is_notifiable() {
                    events.push(ProximityEvent::ZoneEntered {
                        landmark: item.landmark.clone(),
                        zone: new_zone,
                        distance_m: item.distance_m,
                    });
                }
            } else if previous <= Zone::Outer && item.distance_m > self.settings.outer_distance_m {
                // Crossed back out past the outer boundary; the landmark
                // re-arms and may trigger again on a future approach.
                events.push(ProximityEvent::ZoneExited {
                    landmark: item.landmark.clone(),
                });
            }

            self.zones.insert(item.landmark.id.clone(), new_zone);
        }

        // Drop retained state for landmarks no longer in the catalog.
        self.zones
            .retain(|id, _| measured.iter().any(|m| m.landmark.id == *id));

        Evaluation { ranked, events }
    }
}
