mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use wayfinder_lib::{
    build_graph, plan_route, EdgeDirection, Error, PreferenceProfile, RouteAlgorithm,
    RouteRequest, RouteResult, SearchControl,
};

use common::{
    fixture_snapshot, stairs_building, two_landmark_building, BuildingBuilder, FIXTURE_BUILDING,
};

fn route(
    snapshot: &wayfinder_lib::BuildingSnapshot,
    request: &RouteRequest,
) -> wayfinder_lib::Result<RouteResult> {
    let graph = build_graph(snapshot);
    plan_route(&graph, request, &SearchControl::unbounded())
}

fn path_ids(result: &RouteResult) -> Vec<i64> {
    result.steps.iter().map(|step| step.path).collect()
}

#[test]
fn single_path_route_has_one_step() {
    let snapshot = two_landmark_building().build();
    let result = route(&snapshot, &RouteRequest::new(1, 1, 2)).expect("route computed");

    assert!(result.reachable);
    assert_eq!(result.step_count(), 1);
    assert_eq!(result.total_distance, 10.0);
    assert_eq!(result.total_estimated_time, 10.0);

    let step = &result.steps[0];
    assert_eq!((step.from, step.to), (1, 2));
    assert_eq!(step.direction, EdgeDirection::Forward);
    assert_eq!(step.instruction, "Walk east 10m");
    assert_eq!(step.cumulative_distance, 10.0);
}

#[test]
fn bidirectional_path_walked_backwards_uses_reverse_instruction() {
    let snapshot = two_landmark_building().build();
    let result = route(&snapshot, &RouteRequest::new(1, 2, 1)).expect("route computed");

    assert_eq!(result.step_count(), 1);
    assert_eq!(result.steps[0].direction, EdgeDirection::Reverse);
    assert_eq!(result.steps[0].instruction, "Walk west 10m");
    assert_eq!(result.total_distance, 10.0);
}

#[test]
fn avoiding_stairs_makes_stairs_only_destination_unreachable() {
    let snapshot = stairs_building();
    let request = RouteRequest::new(1, 1, 3).with_preferences(PreferenceProfile {
        avoid_stairs: true,
        ..PreferenceProfile::default()
    });

    let result = route(&snapshot, &request).expect("search completes");
    assert!(!result.reachable);
    assert!(result.steps.is_empty());
    assert_eq!(result.total_distance, 0.0);
    assert!(result.render_plain().contains("Try relaxing"));
}

#[test]
fn default_preferences_take_the_stairs() {
    let snapshot = stairs_building();
    let result = route(&snapshot, &RouteRequest::new(1, 1, 3)).expect("route computed");

    assert!(result.reachable);
    assert_eq!(result.step_count(), 2);
    assert_eq!(result.total_distance, 16.0);
    assert!(result.steps[1].changes_floor());
}

#[test]
fn cheaper_two_edge_detour_beats_direct_path() {
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(4, 0, 3.0, 0.0)
        .landmark(5, 0, 1.5, 1.0)
        .path(1, 4, 5.0, "Walk straight ahead")
        .path(1, 5, 2.0, "Bear left")
        .path(5, 4, 2.0, "Bear right")
        .build();

    for algorithm in [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar] {
        let request = RouteRequest::new(1, 1, 4).with_algorithm(algorithm);
        let result = route(&snapshot, &request).expect("route computed");
        assert_eq!(result.total_distance, 4.0, "{algorithm}");
        assert_eq!(path_ids(&result), vec![2, 3], "{algorithm}");
    }
}

#[test]
fn equal_weight_prefers_fewer_edges() {
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(2, 0, 1.0, 1.0)
        .landmark(3, 0, 2.0, 0.0)
        .path(1, 2, 2.0, "First leg")
        .path(2, 3, 2.0, "Second leg")
        .path(1, 3, 4.0, "Direct")
        .build();

    let result = route(&snapshot, &RouteRequest::new(1, 1, 3)).expect("route computed");
    assert_eq!(path_ids(&result), vec![3]);
}

#[test]
fn equal_weight_and_length_prefers_lexicographically_smaller_sequence() {
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(7, 0, 1.0, -1.0)
        .landmark(3, 0, 1.0, 1.0)
        .landmark(9, 0, 2.0, 0.0)
        .path(1, 7, 2.0, "Via seven")
        .path(7, 9, 2.0, "Seven to nine")
        .path(1, 3, 2.0, "Via three")
        .path(3, 9, 2.0, "Three to nine")
        .build();

    for algorithm in [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar] {
        let request = RouteRequest::new(1, 1, 9).with_algorithm(algorithm);
        let result = route(&snapshot, &request).expect("route computed");
        let landmarks: Vec<_> = result.steps.iter().map(|step| step.to).collect();
        assert_eq!(landmarks, vec![3, 9], "{algorithm}");
    }
}

#[test]
fn same_source_and_destination_is_empty_reachable_route() {
    let snapshot = fixture_snapshot();
    let result = route(&snapshot, &RouteRequest::new(FIXTURE_BUILDING, 2, 2)).expect("route");

    assert!(result.reachable);
    assert!(result.steps.is_empty());
    assert_eq!(result.total_distance, 0.0);
}

#[test]
fn fixture_default_route_uses_stairs() {
    let snapshot = fixture_snapshot();
    let result = route(&snapshot, &RouteRequest::new(FIXTURE_BUILDING, 1, 7)).expect("route");

    assert_eq!(path_ids(&result), vec![100, 102, 104, 105]);
    assert_eq!(result.total_distance, 38.0);
    assert_eq!(result.total_estimated_time, 56.0);
    assert_eq!(result.steps[2].from_floor, 0);
    assert_eq!(result.steps[2].to_floor, 1);
    assert_eq!(result.steps[3].cumulative_distance, 38.0);
}

#[test]
fn fixture_wheelchair_route_takes_the_elevator() {
    let snapshot = fixture_snapshot();
    let request = RouteRequest::new(FIXTURE_BUILDING, 1, 7)
        .with_preferences(PreferenceProfile::wheelchair());
    let result = route(&snapshot, &request).expect("route");

    assert_eq!(path_ids(&result), vec![100, 101, 103, 106, 105]);
    assert_eq!(result.total_distance, 51.0);
    assert_eq!(result.total_estimated_time, 92.0);
    assert!(result.steps.iter().all(|step| step.path != 104));
}

#[test]
fn fixture_fastest_route_minimizes_time() {
    let snapshot = fixture_snapshot();
    let request = RouteRequest::new(FIXTURE_BUILDING, 1, 7).with_preferences(PreferenceProfile {
        shortest_distance: false,
        ..PreferenceProfile::default()
    });
    let result = route(&snapshot, &request).expect("route");

    assert_eq!(path_ids(&result), vec![100, 102, 104, 105]);
    assert_eq!(result.total_estimated_time, 56.0);
}

#[test]
fn fixture_route_reversed_has_same_total_and_mirrored_steps() {
    let snapshot = fixture_snapshot();
    let there = route(&snapshot, &RouteRequest::new(FIXTURE_BUILDING, 1, 7)).expect("there");
    let back = route(&snapshot, &RouteRequest::new(FIXTURE_BUILDING, 7, 1)).expect("back");

    assert_eq!(there.total_distance, back.total_distance);
    let mut reversed = path_ids(&back);
    reversed.reverse();
    assert_eq!(path_ids(&there), reversed);

    let instructions: Vec<_> = back.steps.iter().map(|s| s.instruction.as_str()).collect();
    assert_eq!(
        instructions,
        vec![
            "Walk west to Room 101",
            "Walk down the stairs to the ground floor",
            "Continue west to the stairwell",
            "Walk west through the entrance hall to the lobby",
        ]
    );
}

#[test]
fn repeated_requests_return_identical_results() {
    let snapshot = fixture_snapshot();
    let graph = build_graph(&snapshot);
    let request = RouteRequest::new(FIXTURE_BUILDING, 8, 7)
        .with_preferences(PreferenceProfile::wheelchair())
        .with_algorithm(RouteAlgorithm::AStar);

    let first = plan_route(&graph, &request, &SearchControl::unbounded()).expect("first");
    for _ in 0..5 {
        let again = plan_route(&graph, &request, &SearchControl::unbounded()).expect("again");
        assert_eq!(first, again);
    }
}

#[test]
fn a_star_matches_dijkstra_on_fixture() {
    let snapshot = fixture_snapshot();
    let graph = build_graph(&snapshot);
    let ids: Vec<i64> = snapshot
        .landmarks
        .iter()
        .filter(|landmark| landmark.active)
        .map(|landmark| landmark.id)
        .collect();

    for &from in &ids {
        for &to in &ids {
            for preferences in [PreferenceProfile::default(), PreferenceProfile::wheelchair()] {
                let base = RouteRequest::new(FIXTURE_BUILDING, from, to).with_preferences(preferences);
                let dijkstra = plan_route(
                    &graph,
                    &base.clone().with_algorithm(RouteAlgorithm::Dijkstra),
                    &SearchControl::unbounded(),
                )
                .expect("dijkstra");
                let a_star = plan_route(
                    &graph,
                    &base.with_algorithm(RouteAlgorithm::AStar),
                    &SearchControl::unbounded(),
                )
                .expect("a-star");

                assert_eq!(dijkstra.reachable, a_star.reachable, "{from} -> {to}");
                assert!(
                    (dijkstra.total_distance - a_star.total_distance).abs() < 1e-9,
                    "{from} -> {to}"
                );
            }
        }
    }
}

#[test]
fn a_star_stays_optimal_when_paths_undercut_straight_line() {
    // The detour through landmark 3 is far shorter than its coordinates suggest.
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(2, 0, 10.0, 0.0)
        .landmark(3, 0, 0.0, 10.0)
        .path(1, 2, 12.0, "Walk east along the hall")
        .path(1, 3, 1.0, "Step through the side door")
        .path(3, 2, 1.0, "Step into the gallery")
        .build();
    let graph = build_graph(&snapshot);
    assert_eq!(graph.short_paths().len(), 2);

    for algorithm in [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar] {
        let result = plan_route(
            &graph,
            &RouteRequest::new(1, 1, 2).with_algorithm(algorithm),
            &SearchControl::unbounded(),
        )
        .expect("route");
        assert_eq!(result.total_distance, 2.0, "{algorithm}");
        assert_eq!(path_ids(&result), vec![2, 3], "{algorithm}");
    }
}

#[test]
fn disconnected_landmark_is_unreachable_not_an_error() {
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(2, 0, 1.0, 0.0)
        .landmark(3, 0, 5.0, 5.0)
        .path(1, 2, 1.0, "Walk ahead")
        .build();

    let result = route(&snapshot, &RouteRequest::new(1, 1, 3)).expect("search completes");
    assert!(!result.reachable);
    assert!(!result.render_plain().contains("Try relaxing"));
}

#[test]
fn one_way_path_cannot_be_walked_backwards() {
    let snapshot = BuildingBuilder::new(1)
        .landmark(1, 0, 0.0, 0.0)
        .landmark(2, 0, 1.0, 0.0)
        .path_with(1, 2, 1.0, "Exit through the turnstile", |path| {
            path.bidirectional = false;
        })
        .build();

    assert!(route(&snapshot, &RouteRequest::new(1, 1, 2)).expect("forward").reachable);
    assert!(!route(&snapshot, &RouteRequest::new(1, 2, 1)).expect("backward").reachable);
}

#[test]
fn unknown_or_inactive_landmarks_are_invalid_references() {
    let snapshot = fixture_snapshot();

    for (from, to, bad) in [(1, 42, 42), (9, 1, 9), (1, 9, 9)] {
        match route(&snapshot, &RouteRequest::new(FIXTURE_BUILDING, from, to)) {
            Err(Error::InvalidReference { landmark, .. }) => assert_eq!(landmark, bad),
            other => panic!("expected InvalidReference for {from} -> {to}, got {other:?}"),
        }
    }
}

#[test]
fn request_for_another_building_is_invalid_reference() {
    let snapshot = fixture_snapshot();
    let err = route(&snapshot, &RouteRequest::new(2, 1, 7)).expect_err("wrong building");
    assert!(matches!(err, Error::InvalidReference { building: 2, .. }));
}

#[test]
fn raised_cancel_flag_aborts_search() {
    let snapshot = fixture_snapshot();
    let graph = build_graph(&snapshot);
    let flag = Arc::new(AtomicBool::new(true));
    let control = SearchControl::unbounded().with_cancel_flag(flag);

    let err = plan_route(&graph, &RouteRequest::new(FIXTURE_BUILDING, 1, 7), &control)
        .expect_err("cancelled");
    assert!(matches!(err, Error::SearchCancelled));
}

#[test]
fn elapsed_deadline_aborts_search() {
    let snapshot = fixture_snapshot();
    let graph = build_graph(&snapshot);
    let control = SearchControl::unbounded().with_deadline(Instant::now());

    let err = plan_route(&graph, &RouteRequest::new(FIXTURE_BUILDING, 1, 7), &control)
        .expect_err("deadline passed");
    assert!(matches!(err, Error::DeadlineExceeded));
}
