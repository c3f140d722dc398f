//! Distance resolution capability and the scatter/gather barrier.
//!
//! The geolocation subsystem is out of scope; the sort engine only sees the
//! [`DistanceResolver`] trait: an async capability returning a distance for a
//! given station, invoked exactly once per station per distance sort. Each
//! invocation completes exactly once; a resolver that never completes hangs
//! the sort (accepted, there is no in-band timeout here).

use std::{future::Future, pin::Pin};

use ahash::AHashMap;
use futures::future;
use thiserror::Error;
use tracing::{debug, warn};

use super::SortError;
use crate::station::{Station, StationId};

/// Boxed future carrying one distance resolution.
pub type DistanceFuture<'a> = Pin<Box<dyn Future<Output = Result<f64, ResolveError>> + Send + 'a>>;

/// A single failed distance lookup, as reported by a resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("distance resolution failed: {reason}")]
pub struct ResolveError {
    reason: String,
}

impl ResolveError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Async capability resolving the distance to a station.
///
/// Implementations wrap whatever actually measures distance (a geolocation
/// service, a routing API). The sort engine issues one call per station and
/// joins on all of them before ordering anything.
pub trait DistanceResolver: Send + Sync {
    fn resolve_distance<'a>(&'a self, station: &'a Station) -> DistanceFuture<'a>;
}

impl<T: DistanceResolver + ?Sized> DistanceResolver for std::sync::Arc<T> {
    fn resolve_distance<'a>(&'a self, station: &'a Station) -> DistanceFuture<'a> {
        (**self).resolve_distance(station)
    }
}

/// Map-backed [`DistanceResolver`] with fixed answers.
///
/// Stations absent from the map fail to resolve. Used by tests, examples and
/// anywhere distances are known up front.
#[derive(Debug, Clone, Default)]
pub struct FixedDistanceResolver {
    distances: AHashMap<StationId, f64>,
}

impl FixedDistanceResolver {
    pub fn new(distances: impl IntoIterator<Item = (StationId, f64)>) -> Self {
        Self {
            distances: distances.into_iter().collect(),
        }
    }
}

impl DistanceResolver for FixedDistanceResolver {
    fn resolve_distance<'a>(&'a self, station: &'a Station) -> DistanceFuture<'a> {
        Box::pin(async move {
            self.distances
                .get(&station.id)
                .copied()
                .ok_or_else(|| ResolveError::new(format!("no distance known for {}", station.id)))
        })
    }
}

/// Fan out one resolution per station and join on all of them.
///
/// The result-merge barrier: nothing proceeds until every station has
/// reported. Responses complete in any order; attribution is by the
/// station's position in the join, keyed into the returned map by id. If ANY
/// resolution failed the whole batch fails with every per-station failure;
/// no partial distance map escapes.
pub(super) async fn resolve_all(
    stations: &[Station],
    resolver: &dyn DistanceResolver,
) -> Result<AHashMap<StationId, f64>, SortError> {
    let results =
        future::join_all(stations.iter().map(|s| resolver.resolve_distance(s))).await;

    let mut distances = AHashMap::with_capacity(stations.len());
    let mut failures = Vec::new();
    for (station, result) in stations.iter().zip(results) {
        match result {
            Ok(distance) => {
                distances.insert(station.id, distance);
            }
            Err(error) => failures.push((station.id, error)),
        }
    }

    if failures.is_empty() {
        debug!(resolved = distances.len(), "all distance resolutions complete");
        Ok(distances)
    } else {
        warn!(
            failed = failures.len(),
            total = stations.len(),
            "distance resolution failed"
        );
        Err(SortError::Resolution {
            failures,
            total: stations.len(),
        })
    }
}
