//! Tour session wiring.
//!
//! One explicitly owned state object ties the pipeline together: location
//! tracker feeding the proximity evaluator, evaluator events feeding the
//! notification coordinator and preloaders. Created at session start,
//! torn down at session end; nothing lives in module-level globals.

use crate::catalog::{Landmark, LandmarkCatalog};
use crate::location::{
    LocationError, LocationEvent, LocationSource, LocationTracker, Position,
};
use crate::notify::{MapSurface, NotificationCoordinator, NotificationSurface};
use crate::preload::PreloadTarget;
use crate::proximity::{ProximityEvaluator, ProximityEvent, ProximitySettings};
use crate::storage::EngineConfig;
use crossbeam::channel::{Receiver, Sender};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How often expired cooldown entries are pruned.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Events mirrored to frame-polling UI shells.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new position fix was processed
    Fix(Position),
    /// A proximity transition was detected
    Proximity(ProximityEvent),
    /// Location tracking failed terminally
    TrackingError(LocationError),
    /// Location tracking ended
    TrackingStopped,
}

/// A running travel-companion session.
///
/// The consuming loop is the single writer of evaluator and coordinator
/// state; each evaluation reads the latest retained position and catalog
/// at evaluation time, so a stale fix scheduled earlier can never
/// overwrite state derived from a newer one.
pub struct TourSession<S: LocationSource> {
    tracker: LocationTracker<S>,
    catalog: Arc<Mutex<LandmarkCatalog>>,
    evaluator: Arc<Mutex<ProximityEvaluator>>,
    coordinator: Arc<Mutex<NotificationCoordinator>>,
    latest_position: Arc<Mutex<Option<Position>>>,
    preloaders: Vec<Arc<dyn PreloadTarget>>,
    event_tx: Option<Sender<SessionEvent>>,
}

impl<S: LocationSource> TourSession<S> {
    /// Assemble a session from configuration and its injected collaborators.
    pub fn new(
        config: EngineConfig,
        source: S,
        surface: Arc<dyn NotificationSurface>,
        map: Arc<dyn MapSurface>,
    ) -> Self {
        let tracker = LocationTracker::new(source, config.tracker.clone());
        let catalog = LandmarkCatalog::new(map.clone());
        let evaluator = ProximityEvaluator::new(config.proximity.clone());
        let coordinator = NotificationCoordinator::new(config.notify.clone(), surface, map);

        Self {
            tracker,
            catalog: Arc::new(Mutex::new(catalog)),
            evaluator: Arc::new(Mutex::new(evaluator)),
            coordinator: Arc::new(Mutex::new(coordinator)),
            latest_position: Arc::new(Mutex::new(None)),
            preloaders: Vec::new(),
            event_tx: None,
        }
    }

    /// Register a preloader to warm on zone entries.
    pub fn add_preloader(&mut self, preloader: Arc<dyn PreloadTarget>) {
        self.preloaders.push(preloader);
    }

    /// Get an event receiver for a frame-polling shell.
    pub fn event_receiver(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.event_tx = Some(tx);
        rx
    }

    /// Start tracking and the consuming loop.
    pub fn start(&mut self) {
        let mut location_rx = self.tracker.start();
        let mut preload_rx = self.coordinator.lock().unwrap().preload_requests();

        // Fire-and-forget preload drain.
        let drain_targets = self.preloaders.clone();
        tokio::spawn(async move {
            while let Some(landmark) = preload_rx.recv().await {
                for target in &drain_targets {
                    target.warm(&landmark).await;
                }
            }
        });

        let catalog = self.catalog.clone();
        let evaluator = self.evaluator.clone();
        let coordinator = self.coordinator.clone();
        let latest_position = self.latest_position.clone();
        let preloaders = self.preloaders.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut maintenance = tokio::time::interval(MAINTENANCE_INTERVAL);

            loop {
                tokio::select! {
                    event = location_rx.recv() => {
                        let Some(event) = event else { break };
                        match event {
                            LocationEvent::Fix(position) => {
                                *latest_position.lock().unwrap() = Some(position);
                                Self::evaluate_once(
                                    &catalog,
                                    &evaluator,
                                    &coordinator,
                                    &latest_position,
                                    &preloaders,
                                    &event_tx,
                                );
                            }
                            LocationEvent::Error(e) => {
                                tracing::warn!(error = %e, "Tracking error in session");
                                if let Some(tx) = &event_tx {
                                    let _ = tx.send(SessionEvent::TrackingError(e));
                                }
                            }
                            LocationEvent::Stopped => {
                                if let Some(tx) = &event_tx {
                                    let _ = tx.send(SessionEvent::TrackingStopped);
                                }
                                break;
                            }
                        }
                    }
                    _ = maintenance.tick() => {
                        coordinator.lock().unwrap().prune_cooldowns();
                    }
                }
            }

            tracing::info!("Tour session loop exited");
        });
    }

    /// One synchronous evaluation pass over the latest retained state.
    fn evaluate_once(
        catalog: &Arc<Mutex<LandmarkCatalog>>,
        evaluator: &Arc<Mutex<ProximityEvaluator>>,
        coordinator: &Arc<Mutex<NotificationCoordinator>>,
        latest_position: &Arc<Mutex<Option<Position>>>,
        preloaders: &[Arc<dyn PreloadTarget>],
        event_tx: &Option<Sender<SessionEvent>>,
    ) {
        // Read the latest retained position and catalog at evaluation
        // time, not values captured when the fix was scheduled.
        let Some(position) = *latest_position.lock().unwrap() else {
            return;
        };
        let landmarks = catalog.lock().unwrap().landmarks();

        let (evaluation, relevance_radius) = {
            let mut evaluator = evaluator.lock().unwrap();
            let radius = evaluator.settings().card_distance_m;
            (evaluator.evaluate(&position, &landmarks), radius)
        };

        // Landmarks in or approaching the outer zone stay cache-relevant.
        let relevant: HashSet<String> = evaluation
            .ranked
            .iter()
            .filter(|m| m.distance_m <= relevance_radius)
            .map(|m| m.landmark.id.clone())
            .collect();
        for target in preloaders {
            target.set_relevant(relevant.clone());
        }

        {
            let mut coordinator = coordinator.lock().unwrap();
            for event in &evaluation.events {
                coordinator.handle_event(event);
            }
        }

        if let Some(tx) = event_tx {
            let _ = tx.send(SessionEvent::Fix(position));
            for event in evaluation.events {
                let _ = tx.send(SessionEvent::Proximity(event));
            }
        }
    }

    /// Install the static top-list landmarks.
    pub fn set_top_landmarks(&self, list: Vec<Landmark>) {
        self.catalog.lock().unwrap().set_top_landmarks(list);
    }

    /// Install the experience database landmarks.
    pub fn set_experience_landmarks(&self, list: Vec<Landmark>) {
        self.catalog.lock().unwrap().set_experience_landmarks(list);
    }

    /// Replace the tour landmarks with a freshly generated list.
    pub fn replace_tour_landmarks(&self, list: Vec<Landmark>) {
        self.catalog.lock().unwrap().replace_tour_landmarks(list);
    }

    /// Replace the proximity thresholds.
    pub fn set_proximity_settings(&self, settings: ProximitySettings) {
        self.evaluator.lock().unwrap().set_settings(settings);
    }

    /// Force a landmark's computed distance (deterministic QA path).
    pub fn set_debug_distance(&self, landmark_id: impl Into<String>, distance_m: f64) {
        self.evaluator
            .lock()
            .unwrap()
            .set_override(landmark_id, distance_m);
    }

    /// Remove a forced distance.
    pub fn clear_debug_distance(&self, landmark_id: &str) {
        self.evaluator.lock().unwrap().clear_override(landmark_id);
    }

    /// The UI dismissed the active card.
    pub fn card_dismissed(&self) {
        self.coordinator.lock().unwrap().card_dismissed();
    }

    /// Last known position, if any fix has arrived.
    pub fn latest_position(&self) -> Option<Position> {
        *self.latest_position.lock().unwrap()
    }

    /// Whether tracking is running.
    pub fn is_tracking(&self) -> bool {
        self.tracker.is_active()
    }

    /// Stop tracking; the consuming loop drains and exits.
    pub fn shutdown(&self) {
        self.tracker.stop();
    }
}
