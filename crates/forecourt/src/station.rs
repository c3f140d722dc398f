//! Station records and the source they are read from.
//!
//! A [`Station`] is the unit every pipeline stage operates on. Records are
//! treated as read-only for the duration of a pipeline run; the run takes a
//! snapshot from a [`StationSource`] once and never writes back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique key for a station, used to attribute distance resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub u64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station#{}", self.0)
    }
}

impl From<u64> for StationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Daily opening window in wall-clock hours.
///
/// Both bounds are hours in `[0, 23]`. The window is half-open: a station is
/// open at hour `h` iff `open <= h < close`. Overnight windows where
/// `close < open` (e.g. open 20, close 2) never match any hour; this is a
/// known limitation carried over from the original behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: u32,
    pub close: u32,
}

impl OpeningHours {
    #[must_use]
    pub const fn new(open: u32, close: u32) -> Self {
        Self { open, close }
    }

    /// Whether the station is open at the given wall-clock hour.
    #[must_use]
    pub const fn is_open_at(&self, hour: u32) -> bool {
        self.open <= hour && hour < self.close
    }
}

/// A single gas station record.
///
/// Immutable per pipeline run. `amenities` is a set-like ordered sequence of
/// canonical amenity identifiers (see [`crate::amenity`]); `items` is the
/// free-form list of things sold on site.
///
/// # Examples
///
/// ```rust
/// use forecourt::{OpeningHours, Station, StationId};
///
/// let station = Station::new(StationId(1), "Shell Kreuzberg", "Skalitzer Str. 1", 1.79)
///     .with_hours(OpeningHours::new(6, 22))
///     .with_amenities(["carWash", "atm"])
///     .with_items(["coffee", "sandwiches"]);
///
/// assert_eq!(station.id, StationId(1));
/// assert!(station.hours.is_open_at(12));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub amenities: Vec<String>,
    pub items: Vec<String>,
    pub gas_price: f64,
    pub hours: OpeningHours,
}

impl Station {
    /// Create a station with empty amenity and item lists and a `0..23`
    /// opening window.
    pub fn new(
        id: impl Into<StationId>,
        name: impl Into<String>,
        address: impl Into<String>,
        gas_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            amenities: Vec::new(),
            items: Vec::new(),
            gas_price,
            hours: OpeningHours::new(0, 23),
        }
    }

    #[must_use]
    pub fn with_hours(mut self, hours: OpeningHours) -> Self {
        self.hours = hours;
        self
    }

    #[must_use]
    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }
}

/// Read accessor for the current full station collection.
///
/// Called exactly once per pipeline run; the returned vector is that run's
/// snapshot. The collection itself is owned elsewhere (app data layer, test
/// fixture) and out of scope here.
pub trait StationSource: Send + Sync {
    fn stations(&self) -> Vec<Station>;
}

/// In-memory [`StationSource`] over an owned list of stations.
#[derive(Debug, Clone, Default)]
pub struct StaticStationSource {
    stations: Vec<Station>,
}

impl StaticStationSource {
    #[must_use]
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }
}

impl StationSource for StaticStationSource {
    fn stations(&self) -> Vec<Station> {
        self.stations.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_hours_half_open_window() {
        let hours = OpeningHours::new(8, 18);
        assert!(!hours.is_open_at(7));
        assert!(hours.is_open_at(8));
        assert!(hours.is_open_at(17));
        assert!(!hours.is_open_at(18));
    }

    #[test]
    fn test_overnight_window_never_matches() {
        // Documented limitation: close < open matches no hour at all.
        let hours = OpeningHours::new(20, 2);
        for hour in 0..24 {
            assert!(!hours.is_open_at(hour), "hour {hour} should not match");
        }
    }

    #[test]
    fn test_station_serde_round_trip() {
        let station = Station::new(7, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79)
            .with_hours(OpeningHours::new(6, 22))
            .with_amenities(["carWash", "atm"])
            .with_items(["coffee"]);

        let json = serde_json::to_string(&station).unwrap();
        let back: Station = serde_json::from_str(&json).unwrap();
        assert_eq!(station, back);
    }

    #[test]
    fn test_static_source_returns_snapshot() {
        let source = StaticStationSource::new(vec![
            Station::new(1, "A", "Addr A", 1.70),
            Station::new(2, "B", "Addr B", 1.65),
        ]);
        assert_eq!(source.stations().len(), 2);
        // A second read yields the same snapshot.
        assert_eq!(source.stations(), source.stations());
    }
}
