//! Conjunction filtering of stations by amenity identifiers.

use chrono::Timelike;
use tracing::debug;

use super::OPEN_NOW;
use crate::station::Station;

/// Filter `stations` down to those satisfying every requested amenity.
///
/// Order-preserving subsequence of the input. A station is kept iff the
/// conjunction of all predicates holds:
///
/// - [`OPEN_NOW`]: the current local wall-clock hour falls inside the
///   station's half-open `[open, close)` window;
/// - any other identifier: exact membership in the station's amenity set
///   (case as stored, no substring semantics).
///
/// An empty `amenity_ids` keeps every station (conjunction over the empty
/// set).
#[must_use]
pub fn filter_stations(stations: &[Station], amenity_ids: &[String]) -> Vec<Station> {
    filter_stations_at_hour(stations, amenity_ids, chrono::Local::now().hour())
}

/// [`filter_stations`] with the clock hour supplied by the caller.
///
/// The deterministic variant used by tests and anything replaying a run at a
/// fixed time.
#[must_use]
pub fn filter_stations_at_hour(
    stations: &[Station],
    amenity_ids: &[String],
    hour: u32,
) -> Vec<Station> {
    let kept: Vec<Station> = stations
        .iter()
        .filter(|station| {
            amenity_ids.iter().all(|id| {
                if id == OPEN_NOW {
                    station.hours.is_open_at(hour)
                } else {
                    station.amenities.iter().any(|a| a == id)
                }
            })
        })
        .cloned()
        .collect();
    debug!(
        input = stations.len(),
        kept = kept.len(),
        criteria = amenity_ids.len(),
        "amenity filter applied"
    );
    kept
}
