//! Unit tests for catalog merging and tour replacement.

use std::sync::{Arc, Mutex};
use wayfarer::catalog::{manager, Landmark, LandmarkCatalog, LandmarkSource};
use wayfarer::geo::Coordinates;
use wayfarer::notify::{HighlightStyle, MapSurface};

#[derive(Default)]
struct MarkerLog {
    entries: Mutex<Vec<String>>,
}

impl MapSurface for MarkerLog {
    fn add_marker(&self, id: &str, _coordinates: Coordinates) {
        self.entries.lock().unwrap().push(format!("add:{id}"));
    }
    fn remove_marker(&self, id: &str) {
        self.entries.lock().unwrap().push(format!("remove:{id}"));
    }
    fn highlight(&self, _id: &str, _style: HighlightStyle) {}
}

fn landmark(id: &str, name: &str) -> Landmark {
    Landmark::new(id, name, Coordinates::new(48.8584, 2.2945))
}

#[test]
fn test_merge_preserves_source_tagging() {
    let merged = manager::merge(vec![
        vec![landmark("top-1", "Eiffel Tower")],
        vec![landmark("tour-landmark-1", "Hidden Passage")],
        vec![landmark("e3b0c442-98fc-4d15-9b1f-6e1a7a2b3c4d", "Wine Cellar")],
    ]);

    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].source, LandmarkSource::Top);
    assert_eq!(merged[1].source, LandmarkSource::Tour);
    assert_eq!(merged[2].source, LandmarkSource::Experience);
}

#[test]
fn test_nan_coordinates_filtered_without_panic() {
    let bad = Landmark::new("top-9", "Ghost", Coordinates::new(f64::NAN, f64::NAN));
    let list = vec![
        landmark("top-1", "Eiffel Tower"),
        bad,
        landmark("top-2", "Louvre"),
    ];

    let merged = manager::merge(vec![list]);
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().all(|lm| lm.id != "top-9"));
}

#[test]
fn test_rapid_double_replacement_leaves_only_second_list() {
    let map = Arc::new(MarkerLog::default());
    let mut catalog = LandmarkCatalog::new(map.clone());

    catalog.replace_tour_landmarks(vec![
        landmark("tour-landmark-1", "First A"),
        landmark("tour-landmark-2", "First B"),
    ]);
    catalog.replace_tour_landmarks(vec![landmark("tour-landmark-3", "Second A")]);

    let ids: Vec<String> = catalog.landmarks().iter().map(|lm| lm.id.clone()).collect();
    assert_eq!(ids, vec!["tour-landmark-3"]);

    // Every marker added for the first list was removed before the
    // second install.
    let log = map.entries.lock().unwrap();
    let first_removal = log.iter().position(|e| e == "remove:tour-landmark-1");
    let second_add = log.iter().position(|e| e == "add:tour-landmark-3");
    assert!(first_removal.unwrap() < second_add.unwrap());
}

#[test]
fn test_tour_replacement_does_not_touch_other_sources() {
    let map = Arc::new(MarkerLog::default());
    let mut catalog = LandmarkCatalog::new(map);

    catalog.set_top_landmarks(vec![landmark("top-1", "Eiffel Tower")]);
    catalog.replace_tour_landmarks(vec![landmark("tour-landmark-1", "Stop")]);
    catalog.replace_tour_landmarks(vec![]);

    let ids: Vec<String> = catalog.landmarks().iter().map(|lm| lm.id.clone()).collect();
    assert_eq!(ids, vec!["top-1"]);
}
