//! End-to-end pipeline test: scripted walk through the full session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wayfarer::catalog::Landmark;
use wayfarer::geo::Coordinates;
use wayfarer::location::{
    FixOptions, LocationError, LocationSource, Permission, Position, TrackerConfig,
};
use wayfarer::notify::{HighlightStyle, MapSurface, NotificationSurface, ToastVariant};
use wayfarer::proximity::{ProximityEvent, Zone};
use wayfarer::session::{SessionEvent, TourSession};
use wayfarer::storage::EngineConfig;

/// Replays a scripted track, then times out forever.
struct WalkSource {
    steps: Mutex<VecDeque<Position>>,
}

impl WalkSource {
    fn new(steps: Vec<Position>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }
}

impl LocationSource for WalkSource {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self, _options: &FixOptions) -> Result<Position, LocationError> {
        match self.steps.lock().unwrap().pop_front() {
            Some(position) => Ok(position),
            None => Err(LocationError::Timeout),
        }
    }
}

#[derive(Default)]
struct RecordingSurface {
    toasts: Mutex<Vec<String>>,
    cards: Mutex<Vec<String>>,
    chimes: Mutex<usize>,
}

impl NotificationSurface for RecordingSurface {
    fn show_toast(&self, message: &str, _variant: ToastVariant, _duration: Duration) {
        self.toasts.lock().unwrap().push(message.to_string());
    }
    fn show_card(&self, landmark: &Landmark) {
        self.cards.lock().unwrap().push(landmark.name.clone());
    }
    fn play_chime(&self) {
        *self.chimes.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct RecordingMap {
    highlights: Mutex<Vec<(String, HighlightStyle)>>,
}

impl MapSurface for RecordingMap {
    fn add_marker(&self, _id: &str, _coordinates: Coordinates) {}
    fn remove_marker(&self, _id: &str) {}
    fn highlight(&self, id: &str, style: HighlightStyle) {
        self.highlights.lock().unwrap().push((id.to_string(), style));
    }
}

fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.tracker = TrackerConfig {
        baseline_interval_secs: 0,
        idle_interval_secs: 0,
        ..Default::default()
    };
    config
}

/// Collect session events until the predicate matches or time runs out.
fn wait_for(
    rx: &crossbeam::channel::Receiver<SessionEvent>,
    mut predicate: impl FnMut(&SessionEvent) -> bool,
) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) if predicate(&event) => return true,
            Ok(_) => continue,
            Err(crossbeam::channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam::channel::RecvTimeoutError::Disconnected) => return false,
        }
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_toward_landmark_fires_card_then_alert() {
    // Landmark at the base point; the walk approaches from ~500 m out.
    let landmark = Landmark::new("top-1", "Eiffel Tower", Coordinates::new(48.8584, 2.2945));
    let walk = WalkSource::new(vec![
        Position::new(48.8584 + 0.0045, 2.2945), // ~500 m: in default range only
        Position::new(48.8584 + 0.0027, 2.2945), // ~300 m: card zone
        Position::new(48.8584 + 0.00036, 2.2945), // ~40 m: inner zone
    ]);

    let surface = Arc::new(RecordingSurface::default());
    let map = Arc::new(RecordingMap::default());

    let mut session = TourSession::new(fast_config(), walk, surface.clone(), map.clone());
    session.set_top_landmarks(vec![landmark]);
    let rx = session.event_receiver();
    session.start();

    let saw_inner = tokio::task::spawn_blocking(move || {
        wait_for(&rx, |event| {
            matches!(
                event,
                SessionEvent::Proximity(ProximityEvent::ZoneEntered {
                    zone: Zone::Inner,
                    ..
                })
            )
        })
    })
    .await
    .unwrap();
    assert!(saw_inner, "never saw the inner zone entry");

    session.shutdown();

    // One card on the approach, one prominent alert up close.
    assert_eq!(*surface.cards.lock().unwrap(), vec!["Eiffel Tower"]);
    assert_eq!(surface.toasts.lock().unwrap().len(), 1);
    assert_eq!(*surface.chimes.lock().unwrap(), 1);

    // The landmark was highlighted as closest at some point.
    assert!(map
        .highlights
        .lock()
        .unwrap()
        .iter()
        .any(|(id, style)| id == "top-1" && *style == HighlightStyle::Closest));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_permission_denied_degrades_gracefully() {
    struct DeniedSource;

    impl LocationSource for DeniedSource {
        async fn request_permission(&self) -> Permission {
            Permission::Denied
        }
        async fn current_position(
            &self,
            _options: &FixOptions,
        ) -> Result<Position, LocationError> {
            panic!("must not be called after denial");
        }
    }

    let surface = Arc::new(RecordingSurface::default());
    let map = Arc::new(RecordingMap::default());

    let mut session = TourSession::new(fast_config(), DeniedSource, surface.clone(), map);
    session.set_top_landmarks(vec![Landmark::new(
        "top-1",
        "Eiffel Tower",
        Coordinates::new(48.8584, 2.2945),
    )]);
    let rx = session.event_receiver();
    session.start();

    let saw_error = tokio::task::spawn_blocking(move || {
        let mut error_seen = false;
        wait_for(&rx, |event| {
            if matches!(
                event,
                SessionEvent::TrackingError(LocationError::PermissionDenied)
            ) {
                error_seen = true;
            }
            matches!(event, SessionEvent::TrackingStopped) && error_seen
        })
    })
    .await
    .unwrap();

    assert!(saw_error, "expected terminal error followed by stop");
    // No proximity effects without positions.
    assert!(surface.toasts.lock().unwrap().is_empty());
    assert!(surface.cards.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tour_replacement_mid_session() {
    let walk = WalkSource::new(vec![Position::new(48.8584, 2.2945)]);
    let surface = Arc::new(RecordingSurface::default());
    let map = Arc::new(RecordingMap::default());

    let mut session = TourSession::new(fast_config(), walk, surface, map);
    let rx = session.event_receiver();

    session.replace_tour_landmarks(vec![
        Landmark::new(
            "tour-landmark-1",
            "Old Stop",
            Coordinates::new(48.8600, 2.2950),
        ),
    ]);
    session.replace_tour_landmarks(vec![
        Landmark::new(
            "tour-landmark-2",
            "New Stop",
            Coordinates::new(48.8586, 2.2945),
        ),
    ]);

    session.start();

    // The closest landmark can only come from the second tour.
    let closest_ids = tokio::task::spawn_blocking(move || {
        let mut ids = Vec::new();
        let matched = wait_for(&rx, |event| {
            if let SessionEvent::Proximity(ProximityEvent::ClosestChanged { landmark, .. }) = event
            {
                ids.push(landmark.id.clone());
                return true;
            }
            false
        });
        assert!(matched, "never saw a closest-changed event");
        ids
    })
    .await
    .unwrap();
    assert_eq!(closest_ids, vec!["tour-landmark-2"]);

    session.shutdown();
}
