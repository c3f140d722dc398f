//! Forecourt - Gas Station Search Pipeline Library
//!
//! Forecourt turns a free-text query, a sort preference and an amenity
//! selection into an ordered list of gas stations, delivered to registered
//! observers. It is the search-sort-filter core of a station finder: text
//! matching across every searchable field, price or distance ordering (the
//! latter over an async distance capability with an all-or-nothing barrier),
//! amenity filtering including an "open now" window, and a manual-retry
//! handle for transient resolution failures.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use forecourt::{
//!     FixedDistanceResolver, FnObserver, SearchRequest, SortMode, StaticStationSource, Station,
//!     StationPipeline,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! # tokio::runtime::Builder::new_current_thread().build()?.block_on(async {
//! let source = StaticStationSource::new(vec![
//!     Station::new(1, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79).with_items(["coffee"]),
//!     Station::new(2, "Aral Mitte", "Torstr. 10", 1.82),
//! ]);
//!
//! let pipeline = StationPipeline::builder()
//!     .source(source)
//!     .resolver(FixedDistanceResolver::new([(1.into(), 2.5), (2.into(), 0.8)]))
//!     .build()?;
//!
//! // Observers receive the results of every successful run.
//! pipeline.add_observer(Arc::new(FnObserver::new(|stations| {
//!     for station in stations {
//!         println!("{} ({})", station.name, station.address);
//!     }
//! })));
//!
//! // Search for coffee, cheapest first.
//! pipeline.run(&SearchRequest::new("coffee", SortMode::ByPrice)).await?;
//! # anyhow::Ok(())
//! # })?;
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline Stages
//!
//! One [`StationPipeline::run`] walks, in order:
//! - **Amenity selection**: UI indices resolved to canonical identifiers
//!   through a static bidirectional table ([`amenity`]).
//! - **Text search**: case-insensitive substring match across name, address,
//!   amenities (with display-label cross-reference) and items
//!   ([`search_stations`]). The empty query is the identity.
//! - **Sort**: ascending by price (pure) or by distance (one async
//!   resolution per station, joined before comparing; any failure fails the
//!   sort as a unit).
//! - **Amenity filter**: conjunction of the selected predicates, including
//!   the "open now" clock window.
//! - **Notification**: the final list goes to every registered observer in
//!   insertion order. A transient sort failure instead yields a
//!   [`RetryHandle`] replaying the identical invocation on demand.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod amenity;
mod core;
pub mod error;
mod observer;
mod search;
mod sort;
mod station;

pub use core::{RetryHandle, RunOutcome, SearchRequest, StationPipeline, StationPipelineBuilder};

pub use amenity::{OPEN_NOW, filter_stations, filter_stations_at_hour};
pub use error::ForecourtError;
pub use observer::{FnObserver, ResultObserver, SharedObserver};
pub use search::search_stations;
pub use sort::{
    DistanceFuture, DistanceResolver, FixedDistanceResolver, ResolveError, SortError, SortMode,
    cheapest_station, closest_station, sort_by_distance, sort_by_price, sort_stations,
};
pub use station::{OpeningHours, StaticStationSource, Station, StationId, StationSource};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Forecourt library.
///
/// This sets up structured logging with configurable levels and filtering.
/// Call this once at the start of your application to enable detailed
/// logging output from Forecourt operations.
///
/// # Arguments
///
/// * `level` - The minimum log level to display
///
/// # Examples
///
/// ```rust
/// use forecourt::init_logging;
/// use tracing::Level;
///
/// // Initialize with info-level logging
/// init_logging(Level::INFO)?;
/// # Ok::<(), forecourt::ForecourtError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), ForecourtError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?;

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
