//! Wayfarer - Travel Companion Engine
//!
//! A library core for travel-companion apps: reconciles a live GPS stream
//! against a dynamic landmark catalog, classifies landmarks into distance
//! zones, and coordinates cooldown-gated notifications, marker highlights,
//! and detail pre-fetching. Map rendering, UI, and network services stay
//! behind narrow seams owned by the consuming shell.

pub mod catalog;
pub mod geo;
pub mod location;
pub mod notify;
pub mod preload;
pub mod proximity;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use catalog::{Landmark, LandmarkCatalog, LandmarkSource};
pub use geo::{format_distance, Coordinates, UnitSystem};
pub use location::{LocationSource, LocationTracker, Position};
pub use notify::{MapSurface, NotificationCoordinator, NotificationSurface};
pub use proximity::{ProximityEvaluator, ProximityEvent, ProximitySettings, Zone};
pub use session::{SessionEvent, TourSession};
pub use storage::EngineConfig;
