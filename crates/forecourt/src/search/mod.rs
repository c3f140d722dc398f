//! Free-text search over station records.
//!
//! A single case-insensitive substring scan across the searchable fields of
//! each station. The result is always an order-preserving subsequence of the
//! input: no reordering, no duplication, no insertion.

use tracing::debug;

use crate::{amenity, station::Station};

/// Search `stations` for records matching `query`.
///
/// An empty query is the identity: the full input comes back unchanged, not
/// an empty "no matches" result. A non-empty query is matched
/// case-insensitively as a substring, per station, in priority order with a
/// short-circuit on the first hit:
///
/// 1. `name`
/// 2. `address`
/// 3. each amenity identifier, plus every display label cross-referenced
///    from it
/// 4. each item
///
/// The label cross-reference exists because a user may type either the
/// internal identifier ("carWash") or any human label for it ("Car Wash");
/// all labels for a stored identifier are tested. A station appears at most
/// once no matter how many fields match.
///
/// # Examples
///
/// ```rust
/// use forecourt::{Station, search_stations};
///
/// let stations = vec![
///     Station::new(1, "Shell", "Hauptstr. 1", 1.80).with_items(["coffee"]),
///     Station::new(2, "Aral", "Ringstr. 2", 1.75),
/// ];
///
/// let hits = search_stations("coffee", &stations);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].name, "Shell");
///
/// // Empty query is the identity.
/// assert_eq!(search_stations("", &stations), stations);
/// ```
#[must_use]
pub fn search_stations(query: &str, stations: &[Station]) -> Vec<Station> {
    if query.is_empty() {
        return stations.to_vec();
    }

    let needle = query.to_lowercase();
    let matches: Vec<Station> = stations
        .iter()
        .filter(|station| station_matches(station, &needle))
        .cloned()
        .collect();

    debug!(
        query,
        input = stations.len(),
        matched = matches.len(),
        "text search complete"
    );
    matches
}

/// One station against an already-lowercased needle, field priority order.
fn station_matches(station: &Station, needle: &str) -> bool {
    if contains(&station.name, needle) || contains(&station.address, needle) {
        return true;
    }
    for amenity_id in &station.amenities {
        if contains(amenity_id, needle) {
            return true;
        }
        // Cross-reference: test every display label for the stored id.
        if amenity::labels_for(amenity_id)
            .iter()
            .any(|label| contains(label, needle))
        {
            return true;
        }
    }
    station.items.iter().any(|item| contains(item, needle))
}

fn contains(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}
