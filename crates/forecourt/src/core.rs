//! The end-to-end search pipeline for the Forecourt library.
//!
//! This module provides the main [`StationPipeline`] interface composing
//! amenity selection, free-text search, sorting and amenity filtering into a
//! single run whose results fan out to registered observers.
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
//!     Station::new(1, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79),
//!     Station::new(2, "Aral Mitte", "Torstr. 10", 1.82),
//! ]);
//!
//! let pipeline = StationPipeline::builder()
//!     .source(source)
//!     .resolver(FixedDistanceResolver::new([(1.into(), 2.5), (2.into(), 0.8)]))
//!     .build()?;
//!
//! pipeline.add_observer(Arc::new(FnObserver::new(|stations| {
//!     println!("got {} stations", stations.len());
//! })));
//!
//! let request = SearchRequest::new("shell", SortMode::ByPrice);
//! pipeline.run(&request).await?;
//! # anyhow::Ok(())
//! # })?;
//! # Ok(())
//! # }
//! ```
//!
//! # Run Outcomes
//!
//! A run never hands results back directly; observers receive them. The
//! returned [`RunOutcome`] tells the caller what happened instead:
//! - **Notified**: every observer received the final list (possibly empty;
//!   an empty list is a real result, not a failure);
//! - **`RetryNeeded`**: distance resolution failed transiently; the carried
//!   [`RetryHandle`] replays the identical invocation on demand;
//! - **Superseded**: a newer run started before this one finished, so its
//!   stale results were discarded unseen.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    amenity,
    error::ForecourtError,
    observer::{ObserverRegistry, SharedObserver},
    search::search_stations,
    sort::{self, DistanceResolver, SortError, SortMode},
    station::{Station, StationSource},
};

/// One pipeline invocation's parameters.
///
/// `Clone` so a [`RetryHandle`] can capture them verbatim. `amenity_indices`
/// are positions into `available_amenities`, the display-label list the UI
/// presented (see [`crate::amenity::resolve_selection`]).
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub sort_mode: SortMode,
    pub amenity_indices: Vec<usize>,
    pub available_amenities: Vec<String>,
}

impl SearchRequest {
    /// A request with no amenity selection.
    pub fn new(query: impl Into<String>, sort_mode: SortMode) -> Self {
        Self {
            query: query.into(),
            sort_mode,
            amenity_indices: Vec::new(),
            available_amenities: Vec::new(),
        }
    }

    /// Attach an amenity selection: chosen indices into the label list the
    /// UI was built from.
    #[must_use]
    pub fn with_amenity_selection(
        mut self,
        indices: Vec<usize>,
        available: Vec<String>,
    ) -> Self {
        self.amenity_indices = indices;
        self.available_amenities = available;
        self
    }
}

/// What a pipeline run did, as seen by the caller.
#[derive(Debug)]
pub enum RunOutcome {
    /// All observers were notified; carries the number of stations
    /// delivered.
    Notified(usize),
    /// Transient distance-resolution failure; nothing was delivered. Replay
    /// the identical invocation via the handle when the caller chooses to.
    RetryNeeded(RetryHandle),
    /// A newer run superseded this one before it could notify; its results
    /// were discarded.
    Superseded,
}

/// Zero-argument replay of a failed pipeline invocation.
///
/// Bound to the original request, so a retry runs the exact same query,
/// sort mode and amenity selection. No automatic backoff lives here; the
/// surrounding application decides when (typically a user tapping reload).
#[derive(Clone)]
pub struct RetryHandle {
    pipeline: StationPipeline,
    request: SearchRequest,
}

impl RetryHandle {
    /// Re-run the captured invocation. May itself yield another
    /// [`RunOutcome::RetryNeeded`] if the failure persists.
    pub async fn retry(&self) -> Result<RunOutcome, ForecourtError> {
        info!(query = %self.request.query, "retrying pipeline run");
        self.pipeline.run(&self.request).await
    }

    /// The request this handle replays.
    #[must_use]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

impl fmt::Debug for RetryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryHandle")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

struct PipelineInner {
    source: Box<dyn StationSource>,
    resolver: Box<dyn DistanceResolver>,
    observers: ObserverRegistry,
    generation: AtomicU64,
    // Held across the staleness re-check and notify_all so a stale run can
    // never deliver after a newer one has.
    publish: Mutex<()>,
}

/// The main search pipeline: query + sort mode + amenity selection in,
/// ordered station list out to every registered observer.
///
/// Cheap to clone; clones share the observer registry and run-generation
/// state.
///
/// # Examples
///
/// ```rust
/// use forecourt::{FixedDistanceResolver, StaticStationSource, StationPipeline};
///
/// let pipeline = StationPipeline::builder()
///     .source(StaticStationSource::default())
///     .resolver(FixedDistanceResolver::default())
///     .build()?;
/// assert_eq!(pipeline.observer_count(), 0);
/// # Ok::<(), forecourt::ForecourtError>(())
/// ```
#[derive(Clone)]
pub struct StationPipeline {
    inner: Arc<PipelineInner>,
}

impl fmt::Debug for StationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationPipeline").finish_non_exhaustive()
    }
}

impl StationPipeline {
    /// Start assembling a pipeline.
    #[must_use]
    pub fn builder() -> StationPipelineBuilder {
        StationPipelineBuilder::default()
    }

    /// Register an observer; it is notified on every successful run from now
    /// on, in insertion order, until removed.
    pub fn add_observer(&self, observer: SharedObserver) {
        self.inner.observers.add(observer);
    }

    /// Remove a previously registered observer by handle identity. Returns
    /// whether anything was removed.
    pub fn remove_observer(&self, observer: &SharedObserver) -> bool {
        self.inner.observers.remove(observer)
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Run the full pipeline for one request.
    ///
    /// Stages, in order: resolve the amenity selection, snapshot the station
    /// source, narrow by text search, sort, narrow by amenity filter, notify
    /// observers. The single suspension point is the distance-resolution
    /// barrier inside a [`SortMode::ByDistance`] sort.
    ///
    /// # Errors
    ///
    /// A bad amenity selection ([`crate::amenity::SelectionError`]) is fatal
    /// and propagates as `Err`; it is never retried. A transient
    /// distance-resolution failure is NOT an `Err`: it comes back as
    /// `Ok(RunOutcome::RetryNeeded)`.
    #[instrument(
        name = "Pipeline Run",
        level = "info",
        skip_all,
        fields(query = %request.query, sort_mode = %request.sort_mode)
    )]
    pub async fn run(&self, request: &SearchRequest) -> Result<RunOutcome, ForecourtError> {
        let t_run = std::time::Instant::now();

        let amenity_ids =
            amenity::resolve_selection(&request.amenity_indices, &request.available_amenities)?;

        // A run joins the supersession race only once its inputs validate;
        // an invocation that dies on a bad selection never delivers, so it
        // must not invalidate an in-flight run either.
        let run_generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let stations = self.inner.source.stations();
        debug!(total = stations.len(), "station snapshot taken");

        let matched = search_stations(&request.query, &stations);

        let sorted = match sort::sort_stations(
            request.sort_mode,
            matched,
            self.inner.resolver.as_ref(),
        )
        .await
        {
            Ok(sorted) => sorted,
            Err(SortError::Resolution { failures, total }) => {
                warn!(
                    failed = failures.len(),
                    total, "transient resolution failure, offering retry"
                );
                return Ok(RunOutcome::RetryNeeded(RetryHandle {
                    pipeline: self.clone(),
                    request: request.clone(),
                }));
            }
            Err(other) => return Err(other.into()),
        };

        let results = amenity::filter_stations(&sorted, &amenity_ids);

        // Publication is atomic with the staleness re-check: the lock is
        // held across both, so a newer run cannot stamp the generation AND
        // deliver between this check and notify_all. A newer run that
        // reaches its own publish step while this lock is held waits its
        // turn, keeping deliveries serialized and monotonic in generation.
        let publish = self.inner.publish.lock();
        if self.inner.generation.load(Ordering::SeqCst) != run_generation {
            info!("run superseded by a newer invocation, discarding results");
            return Ok(RunOutcome::Superseded);
        }

        self.inner.observers.notify_all(&results);
        drop(publish);
        info!(
            results = results.len(),
            elapsed = ?t_run.elapsed(),
            "pipeline run complete"
        );
        Ok(RunOutcome::Notified(results.len()))
    }

    /// The nearest station over the source's current snapshot, or `None`
    /// when the source is empty.
    pub async fn closest_station(&self) -> Result<Option<Station>, ForecourtError> {
        sort::closest_station(self.inner.source.stations(), self.inner.resolver.as_ref())
            .await
            .map_err(From::from)
    }

    /// The cheapest station over the source's current snapshot.
    ///
    /// # Errors
    ///
    /// [`SortError::NoStations`] when the source is empty: a precondition
    /// violation, never a defaulted result.
    pub fn cheapest_station(&self) -> Result<Station, ForecourtError> {
        sort::cheapest_station(self.inner.source.stations()).map_err(From::from)
    }
}

/// Assembles a [`StationPipeline`] from its two external collaborators.
///
/// # Examples
///
/// ```rust
/// use forecourt::{FixedDistanceResolver, StaticStationSource, StationPipeline};
///
/// let pipeline = StationPipeline::builder()
///     .source(StaticStationSource::default())
///     .resolver(FixedDistanceResolver::default())
///     .build()?;
/// # Ok::<(), forecourt::ForecourtError>(())
/// ```
#[derive(Default)]
pub struct StationPipelineBuilder {
    source: Option<Box<dyn StationSource>>,
    resolver: Option<Box<dyn DistanceResolver>>,
}

impl StationPipelineBuilder {
    /// The station collection the pipeline reads its per-run snapshot from.
    #[must_use]
    pub fn source(mut self, source: impl StationSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The capability distance sorts resolve through.
    #[must_use]
    pub fn resolver(mut self, resolver: impl DistanceResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// [`ForecourtError::ConfigError`] if the source or resolver is missing.
    pub fn build(self) -> Result<StationPipeline, ForecourtError> {
        let source = self
            .source
            .ok_or_else(|| ForecourtError::ConfigError("station source not set".into()))?;
        let resolver = self
            .resolver
            .ok_or_else(|| ForecourtError::ConfigError("distance resolver not set".into()))?;

        Ok(StationPipeline {
            inner: Arc::new(PipelineInner {
                source,
                resolver,
                observers: ObserverRegistry::default(),
                generation: AtomicU64::new(0),
                publish: Mutex::new(()),
            }),
        })
    }
}
