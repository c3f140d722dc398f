//! Integration tests for the Forecourt station search pipeline
//!
//! These tests run against the full public API and verify that the
//! end-to-end pipeline behaves correctly: search narrowing, both sort modes,
//! amenity filtering, observer delivery and the retry path.

use std::sync::{Arc, Mutex};

use forecourt::{
    FixedDistanceResolver, FnObserver, OpeningHours, RunOutcome, SearchRequest, SharedObserver,
    SortMode, StaticStationSource, Station, StationId, StationPipeline, amenity,
};

fn setup_test_env() {
    let _ = forecourt::init_logging(tracing::Level::WARN);
}

fn fixture_stations() -> Vec<Station> {
    vec![
        Station::new(1, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79)
            .with_amenities(["carWash", "atm"])
            .with_items(["coffee", "sandwiches"])
            .with_hours(OpeningHours::new(6, 22)),
        Station::new(2, "Aral Mitte", "Torstr. 10", 1.82)
            .with_amenities(["atm", "convenienceStore"])
            .with_items(["firewood"])
            .with_hours(OpeningHours::new(0, 23)),
        Station::new(3, "Esso Nord", "Seestr. 44", 1.71)
            .with_amenities(["diesel"])
            .with_hours(OpeningHours::new(20, 2)),
    ]
}

fn fixture_resolver() -> FixedDistanceResolver {
    FixedDistanceResolver::new([
        (StationId(1), 3.4),
        (StationId(2), 0.9),
        (StationId(3), 6.1),
    ])
}

fn build_pipeline() -> (StationPipeline, Arc<Mutex<Vec<Vec<u64>>>>) {
    let pipeline = StationPipeline::builder()
        .source(StaticStationSource::new(fixture_stations()))
        .resolver(fixture_resolver())
        .build()
        .expect("pipeline should assemble");

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    pipeline.add_observer(Arc::new(FnObserver::new(move |stations: &[Station]| {
        sink.lock()
            .unwrap()
            .push(stations.iter().map(|s| s.id.0).collect());
    })));

    (pipeline, log)
}

#[tokio::test]
async fn test_full_workflow() {
    setup_test_env();

    let (pipeline, log) = build_pipeline();

    // 1. Empty query, price sort: everything back, cheapest first.
    let outcome = pipeline
        .run(&SearchRequest::new("", SortMode::ByPrice))
        .await
        .expect("run should succeed");
    assert!(matches!(outcome, RunOutcome::Notified(3)));

    // 2. Narrowing query, distance sort.
    let outcome = pipeline
        .run(&SearchRequest::new("str", SortMode::ByDistance))
        .await
        .expect("run should succeed");
    assert!(matches!(outcome, RunOutcome::Notified(3)));

    // 3. Query matching a single station's items.
    let outcome = pipeline
        .run(&SearchRequest::new("coffee", SortMode::ByPrice))
        .await
        .expect("run should succeed");
    assert!(matches!(outcome, RunOutcome::Notified(1)));

    let deliveries = log.lock().unwrap().clone();
    assert_eq!(
        deliveries,
        vec![
            vec![3, 1, 2], // by price: 1.71, 1.79, 1.82
            vec![2, 1, 3], // by distance: 0.9, 3.4, 6.1
            vec![1],       // only Shell stocks coffee
        ]
    );
}

#[tokio::test]
async fn test_amenity_selection_flows_into_filter() {
    setup_test_env();

    let (pipeline, log) = build_pipeline();

    // The UI presents the full label list; the user picks "ATM".
    let available: Vec<String> = amenity::display_labels()
        .into_iter()
        .map(String::from)
        .collect();
    let atm_index = available
        .iter()
        .position(|label| label == "ATM")
        .expect("ATM should be a selectable label");

    let request = SearchRequest::new("", SortMode::ByPrice)
        .with_amenity_selection(vec![atm_index], available);
    let outcome = pipeline.run(&request).await.expect("run should succeed");

    assert!(matches!(outcome, RunOutcome::Notified(2)));
    assert_eq!(*log.lock().unwrap(), vec![vec![1, 2]]);
}

#[tokio::test]
async fn test_bad_selection_aborts_before_anything_runs() {
    setup_test_env();

    let (pipeline, log) = build_pipeline();

    let request = SearchRequest::new("", SortMode::ByPrice)
        .with_amenity_selection(vec![7], vec!["Car Wash".into()]);
    let result = pipeline.run(&request).await;

    assert!(result.is_err(), "out-of-range selection is fatal");
    assert!(log.lock().unwrap().is_empty(), "no partial delivery");
}

#[tokio::test]
async fn test_label_synonym_search() {
    setup_test_env();

    let (pipeline, log) = build_pipeline();

    // Stations store the identifier `atm`; the user types a label synonym.
    let outcome = pipeline
        .run(&SearchRequest::new("cash machine", SortMode::ByPrice))
        .await
        .expect("run should succeed");

    assert!(matches!(outcome, RunOutcome::Notified(2)));
    assert_eq!(*log.lock().unwrap(), vec![vec![1, 2]]);
}

#[tokio::test]
async fn test_retry_succeeds_once_the_resolver_recovers() {
    setup_test_env();

    // A resolver that fails every lookup until told otherwise.
    #[derive(Clone)]
    struct FlakyResolver {
        healthy: Arc<Mutex<Option<FixedDistanceResolver>>>,
    }
    impl forecourt::DistanceResolver for FlakyResolver {
        fn resolve_distance<'a>(&'a self, station: &'a Station) -> forecourt::DistanceFuture<'a> {
            let inner = self.healthy.lock().unwrap().clone();
            Box::pin(async move {
                match inner {
                    Some(resolver) => resolver.resolve_distance(station).await,
                    None => Err(forecourt::ResolveError::new("network unreachable")),
                }
            })
        }
    }

    let healthy = Arc::new(Mutex::new(None));
    let pipeline = StationPipeline::builder()
        .source(StaticStationSource::new(fixture_stations()))
        .resolver(FlakyResolver {
            healthy: Arc::clone(&healthy),
        })
        .build()
        .expect("pipeline should assemble");

    let log: Arc<Mutex<Vec<Vec<u64>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    pipeline.add_observer(Arc::new(FnObserver::new(move |stations: &[Station]| {
        sink.lock()
            .unwrap()
            .push(stations.iter().map(|s| s.id.0).collect());
    })));

    let outcome = pipeline
        .run(&SearchRequest::new("", SortMode::ByDistance))
        .await
        .expect("transient failure is not an Err");
    let handle = match outcome {
        RunOutcome::RetryNeeded(handle) => handle,
        other => panic!("expected RetryNeeded, got {other:?}"),
    };
    assert!(log.lock().unwrap().is_empty(), "nothing delivered on failure");

    // Network comes back; the user taps reload.
    *healthy.lock().unwrap() = Some(fixture_resolver());
    let outcome = handle.retry().await.expect("retry should succeed");

    assert!(matches!(outcome, RunOutcome::Notified(3)));
    assert_eq!(*log.lock().unwrap(), vec![vec![2, 1, 3]]);
}

#[tokio::test]
async fn test_observer_removal_stops_delivery() {
    setup_test_env();

    let (pipeline, log) = build_pipeline();

    let second_log = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&second_log);
    let second: SharedObserver = Arc::new(FnObserver::new(move |_: &[Station]| {
        *counter.lock().unwrap() += 1;
    }));
    pipeline.add_observer(Arc::clone(&second));
    assert_eq!(pipeline.observer_count(), 2);

    pipeline
        .run(&SearchRequest::new("", SortMode::ByPrice))
        .await
        .expect("run should succeed");
    assert_eq!(*second_log.lock().unwrap(), 1);

    assert!(pipeline.remove_observer(&second));
    assert_eq!(pipeline.observer_count(), 1);

    pipeline
        .run(&SearchRequest::new("", SortMode::ByPrice))
        .await
        .expect("run should succeed");

    // First observer saw both runs, the removed one only the first.
    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(*second_log.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_open_now_filter_scenario() {
    setup_test_env();

    // Deterministic-clock variant: at 14:00 the 6-22 and 0-23 windows pass,
    // the overnight 20-2 window fails (non-wrapping limitation).
    let stations = fixture_stations();
    let kept = forecourt::filter_stations_at_hour(&stations, &[amenity::OPEN_NOW.into()], 14);
    let ids: Vec<u64> = kept.iter().map(|s| s.id.0).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_closest_and_cheapest_station() {
    setup_test_env();

    let (pipeline, _log) = build_pipeline();

    let closest = pipeline
        .closest_station()
        .await
        .expect("closest should resolve");
    assert_eq!(closest.map(|s| s.id), Some(StationId(2)));

    let cheapest = pipeline.cheapest_station().expect("cheapest should exist");
    assert_eq!(cheapest.id, StationId(3));
}
