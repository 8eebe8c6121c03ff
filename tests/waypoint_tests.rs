use sidetrip::config::SelectorConfig;
use sidetrip::models::{Coordinates, PoiCategory, PoiRecord};
use sidetrip::route::WaypointSelector;

mod common;

fn mannheim() -> Coordinates {
    Coordinates::new(49.4875, 8.4660).unwrap()
}

fn fuessen() -> Coordinates {
    Coordinates::new(47.5576, 10.7498).unwrap()
}

fn corridor_candidates() -> Vec<PoiRecord> {
    vec![
        common::poi("Kloster Maulbronn", PoiCategory::Church, 49.0011, 8.8120),
        common::poi("Schloss Ludwigsburg", PoiCategory::Castle, 48.9000, 9.1950),
        common::poi("Blautopf", PoiCategory::Lake, 48.4163, 9.7843),
        common::poi("Kloster Ottobeuren", PoiCategory::Church, 47.9410, 10.2990),
        common::poi("Forggensee", PoiCategory::Lake, 47.6190, 10.7030),
    ]
}

#[test]
fn empty_pool_yields_empty_selection() {
    let selector = WaypointSelector::new(SelectorConfig::default());
    let selected = selector
        .select_waypoints(&mannheim(), &fuessen(), Vec::new(), 3)
        .unwrap();
    assert!(selected.is_empty());
}

#[test]
fn selection_respects_max_pois() {
    let selector = WaypointSelector::new(SelectorConfig::default());
    let selected = selector
        .select_waypoints(&mannheim(), &fuessen(), corridor_candidates(), 3)
        .unwrap();
    assert!(selected.len() <= 3);
    assert!(!selected.is_empty());
}

#[test]
fn waypoints_come_back_in_corridor_order() {
    let selector = WaypointSelector::new(SelectorConfig::default());
    let selected = selector
        .select_waypoints(&mannheim(), &fuessen(), corridor_candidates(), 5)
        .unwrap();

    for pair in selected.windows(2) {
        let pa = pair[0].position_along_route.unwrap();
        let pb = pair[1].position_along_route.unwrap();
        assert!(pa <= pb);
    }
}

#[test]
fn progressive_invariant_holds_over_the_selection() {
    // In corridor order, no waypoint may sit farther from the destination
    // than the closest one seen so far plus the tolerance.
    let selector = WaypointSelector::new(SelectorConfig::default());
    let end = fuessen();
    let selected = selector
        .select_waypoints(&mannheim(), &end, corridor_candidates(), 5)
        .unwrap();
    assert!(!selected.is_empty());

    let mut closest = f64::INFINITY;
    for wp in &selected {
        let d = wp.coordinates.distance_to(&end);
        assert!(d <= closest + 2.0 + 1e-9);
        closest = closest.min(d);
    }
}

#[test]
fn backtracking_candidate_is_dropped() {
    // A candidate projecting near the end of the corridor but ~200 km east
    // of the destination would force the route backward; the progressive
    // filter must reject it once a genuinely close candidate precedes it.
    let selector = WaypointSelector::new(SelectorConfig::default());
    let mut pool = corridor_candidates();
    pool.push(common::poi(
        "Königssee",
        PoiCategory::Lake,
        47.5551,
        12.9766,
    ));

    let selected = selector
        .select_waypoints(&mannheim(), &fuessen(), pool, 6)
        .unwrap();
    assert!(selected.iter().all(|p| p.name != "Königssee"));
}

#[test]
fn near_duplicates_collapse_on_the_dedup_grid() {
    let selector = WaypointSelector::new(SelectorConfig::default());
    let pool = vec![
        common::poi("Blautopf", PoiCategory::Lake, 48.4163, 9.7843),
        // ~30 m away, same grid cell at the 100 m threshold
        common::poi("Blautopf (Quelle)", PoiCategory::Lake, 48.41635, 9.78435),
        common::poi("Forggensee", PoiCategory::Lake, 47.6190, 10.7030),
    ];
    let deduped = selector.deduplicate(pool);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].name, "Blautopf");
}

#[test]
fn detour_estimate_is_never_negative() {
    let start = mannheim();
    let end = fuessen();
    let selector = WaypointSelector::new(SelectorConfig::default());
    let selected = selector
        .select_waypoints(&start, &end, corridor_candidates(), 3)
        .unwrap();

    let detour = WaypointSelector::estimate_detour_km(&start, &end, &selected);
    assert!(detour >= 0.0);
}

#[test]
fn zero_max_pois_is_rejected() {
    let selector = WaypointSelector::new(SelectorConfig::default());
    let err = selector
        .select_waypoints(&mannheim(), &fuessen(), corridor_candidates(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        sidetrip::error::AppError::InvalidRequest(_)
    ));
}
