//! Observer registration, amenity filtering and the manual-retry path.
//!
//! Demonstrates a resolver that fails its first round of lookups (a network
//! blip) and the retry handle that replays the identical invocation once
//! the resolver recovers.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use forecourt::{
    DistanceFuture, DistanceResolver, FixedDistanceResolver, FnObserver, ResolveError, RunOutcome,
    SearchRequest, SortMode, StaticStationSource, Station, StationPipeline, amenity,
};
use tracing::{Level, info, warn};

/// Fails every lookup while `offline` is set, then delegates to fixed
/// distances.
struct RecoveringResolver {
    offline: AtomicBool,
    inner: FixedDistanceResolver,
}

impl DistanceResolver for RecoveringResolver {
    fn resolve_distance<'a>(&'a self, station: &'a Station) -> DistanceFuture<'a> {
        Box::pin(async move {
            if self.offline.load(Ordering::SeqCst) {
                return Err(ResolveError::new("location service unreachable"));
            }
            self.inner.resolve_distance(station).await
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    forecourt::init_logging(Level::INFO)?;

    let stations = vec![
        Station::new(1, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79).with_amenities(["atm"]),
        Station::new(2, "Aral Mitte", "Torstr. 10", 1.82).with_amenities(["atm", "carWash"]),
        Station::new(3, "Esso Nord", "Seestr. 44", 1.71).with_amenities(["diesel"]),
    ];

    let resolver = Arc::new(RecoveringResolver {
        offline: AtomicBool::new(true),
        inner: FixedDistanceResolver::new([(1.into(), 3.4), (2.into(), 0.9), (3.into(), 6.1)]),
    });

    let pipeline = StationPipeline::builder()
        .source(StaticStationSource::new(stations))
        .resolver(Arc::clone(&resolver))
        .build()?;

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    pipeline.add_observer(Arc::new(FnObserver::new(move |stations: &[Station]| {
        let names: Vec<String> = stations.iter().map(|s| s.name.clone()).collect();
        info!(?names, "observer received results");
        sink.lock().unwrap().push(names);
    })));

    // The user asked for nearby stations with an ATM; the UI presented the
    // full amenity label list and the user picked "ATM".
    let available: Vec<String> = amenity::display_labels()
        .into_iter()
        .map(String::from)
        .collect();
    let atm_index = available
        .iter()
        .position(|l| l == "ATM")
        .expect("ATM is a selectable label");
    let request = SearchRequest::new("", SortMode::ByDistance)
        .with_amenity_selection(vec![atm_index], available);

    // First attempt: the location service is down, distance resolution
    // fails as a unit and the run offers a retry instead of notifying.
    match pipeline.run(&request).await? {
        RunOutcome::RetryNeeded(handle) => {
            warn!("transient failure, retrying after the service recovers");
            resolver.offline.store(false, Ordering::SeqCst);

            match handle.retry().await? {
                RunOutcome::Notified(count) => info!(count, "retry delivered results"),
                other => warn!(?other, "retry did not deliver"),
            }
        }
        other => info!(?other, "unexpected first-attempt outcome"),
    }

    println!("deliveries: {:?}", *delivered.lock().unwrap());
    Ok(())
}
