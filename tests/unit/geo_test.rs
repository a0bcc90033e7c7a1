//! Unit tests for distance computation and formatting.

use wayfarer::geo::{distance_meters, format_distance, Coordinates, UnitSystem};

#[test]
fn test_distance_is_symmetric() {
    let pairs = [
        ((48.8584, 2.2945), (48.8606, 2.3376)),
        ((51.5007, -0.1246), (48.8584, 2.2945)),
        ((35.6586, 139.7454), (35.7101, 139.8107)),
        ((-33.8568, 151.2153), (-33.8523, 151.2108)),
    ];

    for ((lat1, lon1), (lat2, lon2)) in pairs {
        let forward = distance_meters(lat1, lon1, lat2, lon2);
        let reverse = distance_meters(lat2, lon2, lat1, lon1);
        assert!(
            (forward - reverse).abs() < 1e-9,
            "asymmetric for ({lat1},{lon1})-({lat2},{lon2})"
        );
    }
}

#[test]
fn test_distance_to_self_is_zero() {
    assert_eq!(distance_meters(48.8584, 2.2945, 48.8584, 2.2945), 0.0);
    assert_eq!(distance_meters(-33.8568, 151.2153, -33.8568, 151.2153), 0.0);
}

#[test]
fn test_city_scale_accuracy() {
    // Eiffel Tower to Notre-Dame: about 4.1 km
    let d = distance_meters(48.8584, 2.2945, 48.8530, 2.3499);
    assert!((3900.0..4300.0).contains(&d), "got {d}");

    // Tokyo Tower to Skytree: about 8.2 km
    let d = distance_meters(35.6586, 139.7454, 35.7101, 139.8107);
    assert!((7900.0..8500.0).contains(&d), "got {d}");
}

#[test]
fn test_metric_formatting() {
    assert_eq!(format_distance(0.0, UnitSystem::Metric), "0 m");
    assert_eq!(format_distance(999.4, UnitSystem::Metric), "999 m");
    assert_eq!(format_distance(1000.0, UnitSystem::Metric), "1.0 km");
    assert_eq!(format_distance(1500.0, UnitSystem::Metric), "1.5 km");
    assert_eq!(format_distance(12_340.0, UnitSystem::Metric), "12.3 km");
}

#[test]
fn test_imperial_formatting_uses_feet_below_threshold() {
    let formatted = format_distance(150.0, UnitSystem::Imperial);
    assert!(formatted.ends_with(" ft"), "expected feet, got {formatted}");
    assert_eq!(formatted, "492 ft");

    let formatted = format_distance(3218.7, UnitSystem::Imperial);
    assert!(formatted.ends_with(" mi"), "expected miles, got {formatted}");
    assert_eq!(formatted, "2.0 mi");
}

#[test]
fn test_coordinate_validity() {
    assert!(Coordinates::new(0.0, 0.0).is_valid());
    assert!(Coordinates::new(-90.0, 180.0).is_valid());
    assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    assert!(!Coordinates::new(90.5, 0.0).is_valid());
}
