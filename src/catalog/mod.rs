//! Landmark catalog: canonical landmark shape and multi-source merging.
//!
//! Landmarks arrive from a static "top" list, from AI-generated tours, and
//! from the experience database. The catalog normalizes them into one shape
//! and owns the id conventions that encode provenance, because downstream
//! consumers (map-marker cleanup, cooldown keys) match on those prefixes.

pub mod manager;

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export main types
pub use manager::LandmarkCatalog;

/// Id prefix for static top-list landmarks.
pub const TOP_ID_PREFIX: &str = "top-";

/// Id prefix for tour-generated landmarks.
pub const TOUR_ID_PREFIX: &str = "tour-landmark-";

/// Which source produced a landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkSource {
    /// Static seed list of well-known sights
    Top,
    /// AI-generated tour stop
    Tour,
    /// Experience database record (UUID id)
    Experience,
}

impl LandmarkSource {
    /// Classify an id string back to its source by prefix convention.
    pub fn of(id: &str) -> Self {
        if id.starts_with(TOP_ID_PREFIX) {
            LandmarkSource::Top
        } else if id.starts_with(TOUR_ID_PREFIX) {
            LandmarkSource::Tour
        } else {
            LandmarkSource::Experience
        }
    }
}

impl std::fmt::Display for LandmarkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandmarkSource::Top => write!(f, "Top"),
            LandmarkSource::Tour => write!(f, "Tour"),
            LandmarkSource::Experience => write!(f, "Experience"),
        }
    }
}

/// A point of interest in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    /// Unique, provenance-tagged identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Location
    pub coordinates: Coordinates,
    /// Short description shown on cards
    pub description: String,
    /// Aggregate rating, if known
    pub rating: Option<f32>,
    /// Photo URLs, if any
    pub photo_urls: Vec<String>,
    /// Place kinds/tags (museum, park, ...)
    pub kinds: Vec<String>,
    /// Stable external place identifier
    pub place_id: Option<String>,
    /// Formatted street address
    pub formatted_address: Option<String>,
    /// Provenance
    pub source: LandmarkSource,
}

impl Landmark {
    /// Create a landmark with the required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinates: Coordinates) -> Self {
        let id = id.into();
        let source = LandmarkSource::of(&id);
        Self {
            id,
            name: name.into(),
            coordinates,
            description: String::new(),
            rating: None,
            photo_urls: Vec::new(),
            kinds: Vec::new(),
            place_id: None,
            formatted_address: None,
            source,
        }
    }

    /// Create an experience-database landmark with a fresh UUID id.
    pub fn new_experience(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self::new(Uuid::new_v4().to_string(), name, coordinates)
    }

    /// Add a description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a rating.
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Add a stable external place id.
    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }

    /// Add photo URLs.
    pub fn with_photos(mut self, urls: Vec<String>) -> Self {
        self.photo_urls = urls;
        self
    }

    /// Stable key for cooldowns and marker bookkeeping.
    ///
    /// Prefers the external place id; falls back to the landmark name for
    /// records that never had one.
    pub fn notify_key(&self) -> &str {
        self.place_id.as_deref().unwrap_or(&self.name)
    }

    /// Whether the landmark's coordinates are usable.
    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates.is_valid()
    }
}
