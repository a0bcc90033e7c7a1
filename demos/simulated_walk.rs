//! Simulated walk through central Paris.
//!
//! Drives the whole pipeline with a scripted GPS track and
//! terminal-printing surfaces. Run with:
//!
//! ```sh
//! cargo run --example simulated_walk
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wayfarer::catalog::Landmark;
use wayfarer::geo::{format_distance, Coordinates, UnitSystem};
use wayfarer::location::{
    FixOptions, LocationError, LocationSource, Permission, Position, TrackerConfig,
};
use wayfarer::notify::{HighlightStyle, MapSurface, NotificationSurface, ToastVariant};
use wayfarer::proximity::ProximityEvent;
use wayfarer::session::{SessionEvent, TourSession};
use wayfarer::storage::EngineConfig;

/// Replays a scripted walk, one step per sample.
struct ScriptedWalk {
    steps: Mutex<VecDeque<Position>>,
}

impl LocationSource for ScriptedWalk {
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

struct ConsoleSurface;

impl NotificationSurface for ConsoleSurface {
    fn show_toast(&self, message: &str, variant: ToastVariant, _duration: Duration) {
        println!("  [toast/{variant:?}] {message}");
    }
    fn show_card(&self, landmark: &Landmark) {
        println!("  [card] {} — {}", landmark.name, landmark.description);
    }
    fn play_chime(&self) {
        println!("  [chime]");
    }
}

struct ConsoleMap;

impl MapSurface for ConsoleMap {
    fn add_marker(&self, id: &str, coordinates: Coordinates) {
        println!(
            "  [map] marker {id} at ({:.4}, {:.4})",
            coordinates.latitude, coordinates.longitude
        );
    }
    fn remove_marker(&self, id: &str) {
        println!("  [map] marker {id} removed");
    }
    fn highlight(&self, id: &str, style: HighlightStyle) {
        println!("  [map] marker {id} highlight {style:?}");
    }
}

fn paris_tour() -> Vec<Landmark> {
    vec![
        Landmark::new("top-1", "Eiffel Tower", Coordinates::new(48.8584, 2.2945))
            .with_description("Wrought-iron lattice tower on the Champ de Mars")
            .with_rating(4.7),
        Landmark::new(
            "tour-landmark-1",
            "Pont de Bir-Hakeim",
            Coordinates::new(48.8556, 2.2877),
        )
        .with_description("Two-level bridge with a view of the tower"),
        Landmark::new(
            "tour-landmark-2",
            "Trocadéro Gardens",
            Coordinates::new(48.8616, 2.2893),
        )
        .with_description("Fountains and the classic photo spot"),
    ]
}

/// A walk from the Champ de Mars up to the tower, then away.
fn walk_track() -> Vec<Position> {
    let base = (48.8584, 2.2945);
    [0.0060, 0.0040, 0.0025, 0.0012, 0.0004, 0.0001, 0.0012, 0.0030]
        .iter()
        .map(|offset| Position::new(base.0 + offset, base.1))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting simulated walk v{}", env!("CARGO_PKG_VERSION"));

    let mut config = EngineConfig::default();
    config.tracker = TrackerConfig {
        baseline_interval_secs: 1,
        idle_interval_secs: 2,
        ..Default::default()
    };

    let walk = ScriptedWalk {
        steps: Mutex::new(walk_track().into()),
    };

    let mut session = TourSession::new(config, walk, Arc::new(ConsoleSurface), Arc::new(ConsoleMap));
    let landmarks = paris_tour();
    let (top, tour): (Vec<_>, Vec<_>) = landmarks
        .into_iter()
        .partition(|lm| lm.id.starts_with("top-"));
    session.set_top_landmarks(top);
    session.replace_tour_landmarks(tour);

    let events = session.event_receiver();
    session.start();

    // Poll the event stream the way a UI frame loop would.
    let deadline = std::time::Instant::now() + Duration::from_secs(12);
    while std::time::Instant::now() < deadline {
        match events.recv_timeout(Duration::from_millis(200)) {
            Ok(SessionEvent::Fix(position)) => {
                println!(
                    "fix ({:.4}, {:.4})",
                    position.latitude, position.longitude
                );
            }
            Ok(SessionEvent::Proximity(ProximityEvent::ClosestChanged {
                landmark,
                distance_m,
            })) => {
                println!(
                    "closest: {} at {}",
                    landmark.name,
                    format_distance(distance_m, UnitSystem::Metric)
                );
            }
            Ok(SessionEvent::Proximity(_)) => {}
            Ok(SessionEvent::TrackingError(e)) => {
                eprintln!("tracking error: {e}");
                break;
            }
            Ok(SessionEvent::TrackingStopped) => break,
            Err(crossbeam::channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam::channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    session.shutdown();
    tracing::info!("Walk finished");
    Ok(())
}
