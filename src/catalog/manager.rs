//! Catalog manager: owns the merged landmark set and its map markers.

use crate::catalog::{Landmark, LandmarkSource};
use crate::notify::MapSurface;
use std::collections::HashSet;
use std::sync::Arc;

/// Merge landmark source lists into one de-duplicated collection.
///
/// Ids are trusted to be provenance-tagged by each source's adapter;
/// duplicates across the concatenation are dropped with a warning. Records
/// with unusable coordinates are filtered here and never reach the
/// evaluator.
pub fn merge(sources: Vec<Vec<Landmark>>) -> Vec<Landmark> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for list in sources {
        for landmark in list {
            if !landmark.has_valid_coordinates() {
                tracing::warn!(
                    id = %landmark.id,
                    name = %landmark.name,
                    "Dropping landmark with invalid coordinates"
                );
                continue;
            }
            if !seen.insert(landmark.id.clone()) {
                tracing::warn!(id = %landmark.id, "Dropping duplicate landmark id");
                continue;
            }
            merged.push(landmark);
        }
    }

    merged
}

/// Owns the live landmark collection for a session.
///
/// Tour landmarks are replaced wholesale whenever a new tour is generated;
/// the old ids have their map markers removed synchronously before the new
/// list is installed, so a second replacement arriving right behind the
/// first cannot leave orphaned markers.
pub struct LandmarkCatalog {
    /// Static top-list landmarks
    top: Vec<Landmark>,
    /// Current tour landmarks
    tour: Vec<Landmark>,
    /// Experience database landmarks
    experience: Vec<Landmark>,
    /// Map rendering surface for marker side effects
    map: Arc<dyn MapSurface>,
}

impl LandmarkCatalog {
    /// Create an empty catalog bound to a map surface.
    pub fn new(map: Arc<dyn MapSurface>) -> Self {
        Self {
            top: Vec::new(),
            tour: Vec::new(),
            experience: Vec::new(),
            map,
        }
    }

    /// Install the static top-list landmarks.
    pub fn set_top_landmarks(&mut self, list: Vec<Landmark>) {
        self.replace_source(LandmarkSource::Top, list);
    }

    /// Install the experience database landmarks.
    pub fn set_experience_landmarks(&mut self, list: Vec<Landmark>) {
        self.replace_source(LandmarkSource::Experience, list);
    }

    /// Replace the current tour landmarks with a freshly generated list.
    ///
    /// Clear-then-repopulate, never an incremental patch: marker removal
    /// for every previously tracked tour id is drained before the first
    /// insertion.
    pub fn replace_tour_landmarks(&mut self, list: Vec<Landmark>) {
        self.replace_source(LandmarkSource::Tour, list);
    }

    fn replace_source(&mut self, source: LandmarkSource, list: Vec<Landmark>) {
        // Drain removal side effects for the outgoing set first.
        let old = match source {
            LandmarkSource::Top => std::mem::take(&mut self.top),
            LandmarkSource::Tour => std::mem::take(&mut self.tour),
            LandmarkSource::Experience => std::mem::take(&mut self.experience),
        };
        for landmark in &old {
            self.map.remove_marker(&landmark.id);
        }

        let sanitized = merge(vec![list]);
        for landmark in &sanitized {
            self.map.add_marker(&landmark.id, landmark.coordinates);
        }

        tracing::info!(
            %source,
            removed = old.len(),
            installed = sanitized.len(),
            "Replaced landmark source"
        );

        match source {
            LandmarkSource::Top => self.top = sanitized,
            LandmarkSource::Tour => self.tour = sanitized,
            LandmarkSource::Experience => self.experience = sanitized,
        }
    }

    /// The merged, validated landmark view in source order.
    pub fn landmarks(&self) -> Vec<Landmark> {
        merge(vec![
            self.top.clone(),
            self.tour.clone(),
            self.experience.clone(),
        ])
    }

    /// Total landmark count across all sources.
    pub fn len(&self) -> usize {
        self.top.len() + self.tour.len() + self.experience.len()
    }

    /// Whether the catalog holds no landmarks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
