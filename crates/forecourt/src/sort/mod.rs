//! Station ordering by price or by resolved distance.
//!
//! Two strategies behind one entry point: price is a pure synchronous
//! comparison, distance fans out one async resolution per station and joins
//! on all of them before comparing (see [`distance`]). A distance sort with
//! any failed resolution fails as a unit; no partial ordering is ever
//! returned.

use std::fmt;

pub use error::SortError;
use error::Result;
use itertools::Itertools;
use tracing::{debug, instrument};

mod distance;

pub use distance::{DistanceFuture, DistanceResolver, FixedDistanceResolver, ResolveError};

use crate::station::Station;

/// How one pipeline invocation orders its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Ascending by resolved distance; requires a [`DistanceResolver`].
    ByDistance,
    /// Ascending by `gas_price`; pure and synchronous.
    ByPrice,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByDistance => write!(f, "distance"),
            Self::ByPrice => write!(f, "price"),
        }
    }
}

/// Sort `stations` according to `mode`.
///
/// Dispatches to [`sort_by_price`] or [`sort_by_distance`]; the resolver is
/// only consulted for [`SortMode::ByDistance`].
#[instrument(name = "Sort Stations", level = "debug", skip(stations, resolver), fields(count = stations.len()))]
pub async fn sort_stations(
    mode: SortMode,
    stations: Vec<Station>,
    resolver: &dyn DistanceResolver,
) -> Result<Vec<Station>> {
    match mode {
        SortMode::ByPrice => Ok(sort_by_price(stations)),
        SortMode::ByDistance => sort_by_distance(stations, resolver).await,
    }
}

/// Stable ascending sort by `gas_price`; ties keep input order. Idempotent.
#[must_use]
pub fn sort_by_price(stations: Vec<Station>) -> Vec<Station> {
    stations
        .into_iter()
        .sorted_by(|a, b| a.gas_price.total_cmp(&b.gas_price))
        .collect()
}

/// Stable ascending sort by resolved distance.
///
/// Empty input returns immediately without a single resolver call. Otherwise
/// one resolution is issued per station and joined on; the transient
/// distance map lives only inside this call and is dropped on return. Any
/// failed resolution fails the whole sort with
/// [`SortError::Resolution`]; the caller decides whether that is worth a
/// retry.
pub async fn sort_by_distance(
    stations: Vec<Station>,
    resolver: &dyn DistanceResolver,
) -> Result<Vec<Station>> {
    if stations.is_empty() {
        return Ok(stations);
    }

    let distances = distance::resolve_all(&stations, resolver).await?;

    // Decorate with the resolved key so the comparator never touches the map
    // again; every id is present after a successful barrier.
    let sorted: Vec<Station> = stations
        .into_iter()
        .map(|station| {
            let key = distances.get(&station.id).copied().unwrap_or(f64::INFINITY);
            (key, station)
        })
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, station)| station)
        .collect();

    debug!(count = sorted.len(), "distance sort complete");
    Ok(sorted)
}

/// The nearest station, or `None` for an empty input (no resolver calls).
///
/// Degenerate distance sort: resolve everything, take the first.
pub async fn closest_station(
    stations: Vec<Station>,
    resolver: &dyn DistanceResolver,
) -> Result<Option<Station>> {
    if stations.is_empty() {
        return Ok(None);
    }
    let sorted = sort_by_distance(stations, resolver).await?;
    Ok(sorted.into_iter().next())
}

/// The cheapest station.
///
/// Degenerate price sort. Empty input is a caller error and fails with
/// [`SortError::NoStations`] rather than defaulting to anything.
pub fn cheapest_station(stations: Vec<Station>) -> Result<Station> {
    sort_by_price(stations)
        .into_iter()
        .next()
        .ok_or(SortError::NoStations)
}

mod error {
    use thiserror::Error;

    use crate::station::StationId;

    use super::distance::ResolveError;

    #[derive(Error, Debug)]
    pub enum SortError {
        /// At least one distance lookup failed; the sort produced nothing.
        /// Carries every per-station failure. Treated by the pipeline as a
        /// transient condition worth a manual retry.
        #[error("distance resolution failed for {} of {total} stations", failures.len())]
        Resolution {
            failures: Vec<(StationId, ResolveError)>,
            total: usize,
        },
        /// Cheapest-station query on an empty collection; caller error.
        #[error("no stations available")]
        NoStations,
    }
    pub type Result<T> = std::result::Result<T, SortError>;
}
