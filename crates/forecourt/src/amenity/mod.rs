//! Amenity taxonomy and selection resolution.
//!
//! The taxonomy is a static bidirectional table between canonical amenity
//! identifiers (what a [`crate::Station`] stores) and the display labels a UI
//! shows. Labels are many-to-one onto identifiers: "ATM" and "Cash Machine"
//! both resolve to `atm`, so the reverse direction id -> labels is
//! one-to-many.
//!
//! Selection resolution turns the opaque indices a UI hands back (positions
//! in the label list it was given) into canonical identifiers. Any bad index
//! or unmapped label aborts the whole resolution; a partial filter set would
//! silently weaken the conjunction applied later.

pub use error::SelectionError;
use error::Result;
use once_cell::sync::Lazy;
use tracing::debug;

mod filter;

pub use filter::{filter_stations, filter_stations_at_hour};

/// Pseudo-amenity identifier for the "currently open" predicate.
///
/// Resolvable through the table like any real amenity, but it is never stored
/// on a station; the filter engine evaluates it against the clock instead of
/// the station's amenity set.
pub const OPEN_NOW: &str = "openNow";

/// Canonical (identifier, display label) pairs. Table order is the order a UI
/// presents labels in. An identifier may appear more than once (label
/// synonyms); the first label for an identifier is its primary one.
static AMENITY_TABLE: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("carWash", "Car Wash"),
        ("atm", "ATM"),
        ("atm", "Cash Machine"),
        ("convenienceStore", "Convenience Store"),
        ("convenienceStore", "Shop"),
        ("restroom", "Restroom"),
        ("airPump", "Air Pump"),
        ("evCharging", "EV Charging"),
        ("diesel", "Diesel"),
        (OPEN_NOW, "Open Now"),
    ]
});

/// Canonical identifier for a display label, if the label is known.
#[must_use]
pub fn canonical_id(label: &str) -> Option<&'static str> {
    AMENITY_TABLE
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(id, _)| *id)
}

/// Every display label mapping to an identifier, in table order.
///
/// The one-to-many reverse lookup; returns an empty vector for an unknown
/// identifier.
#[must_use]
pub fn labels_for(id: &str) -> Vec<&'static str> {
    AMENITY_TABLE
        .iter()
        .filter(|(i, _)| *i == id)
        .map(|(_, l)| *l)
        .collect()
}

/// The selectable display labels in table order, for UIs building an amenity
/// picker.
#[must_use]
pub fn display_labels() -> Vec<&'static str> {
    AMENITY_TABLE.iter().map(|(_, l)| *l).collect()
}

/// Resolve a UI's selected indices into canonical amenity identifiers.
///
/// Each index addresses a position in `available` (the label list the UI was
/// built from); the label there is then mapped to its canonical identifier.
///
/// # Errors
///
/// [`SelectionError::IndexOutOfRange`] for an index outside `available`,
/// [`SelectionError::UnknownLabel`] for a label with no canonical mapping.
/// Either error means no identifiers at all are returned.
///
/// # Examples
///
/// ```rust
/// use forecourt::amenity;
///
/// let available: Vec<String> = vec!["Car Wash".into(), "Open Now".into()];
/// let ids = amenity::resolve_selection(&[0, 1], &available)?;
/// assert_eq!(ids, vec!["carWash".to_string(), "openNow".to_string()]);
/// # Ok::<(), forecourt::amenity::SelectionError>(())
/// ```
pub fn resolve_selection(indices: &[usize], available: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(indices.len());
    for &index in indices {
        let label = available
            .get(index)
            .ok_or(SelectionError::IndexOutOfRange {
                index,
                len: available.len(),
            })?;
        let id = canonical_id(label).ok_or_else(|| SelectionError::UnknownLabel {
            label: label.clone(),
        })?;
        ids.push(id.to_owned());
    }
    debug!(selected = indices.len(), resolved = ids.len(), "resolved amenity selection");
    Ok(ids)
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum SelectionError {
        #[error("selection index {index} out of range for {len} available amenities")]
        IndexOutOfRange { index: usize, len: usize },
        #[error("amenity label '{label}' has no canonical identifier")]
        UnknownLabel { label: String },
    }
    pub type Result<T> = std::result::Result<T, SelectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        display_labels().into_iter().map(String::from).collect()
    }

    #[test]
    fn test_resolve_selection_maps_labels_to_ids() {
        let ids = resolve_selection(&[0, 1], &available()).unwrap();
        assert_eq!(ids, vec!["carWash".to_string(), "atm".to_string()]);
    }

    #[test]
    fn test_label_synonyms_share_an_identifier() {
        assert_eq!(canonical_id("ATM"), Some("atm"));
        assert_eq!(canonical_id("Cash Machine"), Some("atm"));
        assert_eq!(labels_for("atm"), vec!["ATM", "Cash Machine"]);
    }

    #[test]
    fn test_open_now_resolves_like_any_label() {
        assert_eq!(canonical_id("Open Now"), Some(OPEN_NOW));
    }

    #[test]
    fn test_index_out_of_range_yields_no_partial_set() {
        let err = resolve_selection(&[0, 99], &available()).unwrap_err();
        assert_eq!(
            err,
            SelectionError::IndexOutOfRange {
                index: 99,
                len: available().len()
            }
        );
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let available: Vec<String> = vec!["Helipad".into()];
        let err = resolve_selection(&[0], &available).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownLabel { .. }));
    }

    #[test]
    fn test_unknown_identifier_has_no_labels() {
        assert!(labels_for("helipad").is_empty());
    }
}
