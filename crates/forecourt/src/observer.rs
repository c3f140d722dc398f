//! Observer registration and result fan-out.
//!
//! Observers are how the pipeline delivers results; `run` itself returns
//! only an outcome. The registry is insertion-ordered: observers are
//! notified in the order they were added, each exactly once per successful
//! run.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::station::Station;

/// A listener for pipeline results.
///
/// `on_results` is invoked inline on the pipeline's task, so implementations
/// must be fast and non-blocking; hand the slice off to a channel or queue
/// if real work is needed. Deliveries are serialized across runs, so a
/// callback must never wait for another pipeline run to complete.
pub trait ResultObserver: Send + Sync {
    fn on_results(&self, stations: &[Station]);
}

/// Shared handle to a registered observer. Removal is by handle identity
/// (`Arc::ptr_eq`), so keep the handle you registered with.
pub type SharedObserver = Arc<dyn ResultObserver>;

/// Adapts any closure over the result slice into a [`ResultObserver`].
///
/// # Examples
///
/// ```rust
/// use forecourt::FnObserver;
///
/// let observer = FnObserver::new(|stations| {
///     println!("got {} stations", stations.len());
/// });
/// ```
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: Fn(&[Station]) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ResultObserver for FnObserver<F>
where
    F: Fn(&[Station]) + Send + Sync,
{
    fn on_results(&self, stations: &[Station]) {
        (self.0)(stations);
    }
}

/// Insertion-ordered registry of observer handles.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: RwLock<Vec<SharedObserver>>,
}

impl ObserverRegistry {
    pub(crate) fn add(&self, observer: SharedObserver) {
        self.observers.write().push(observer);
    }

    /// Remove a previously added observer by handle identity. Returns
    /// whether anything was removed.
    pub(crate) fn remove(&self, observer: &SharedObserver) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|existing| !Arc::ptr_eq(existing, observer));
        observers.len() < before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver `stations` to every registered observer, insertion order.
    ///
    /// The list is snapshotted before delivery and the lock released, so an
    /// observer may re-enter add/remove from its callback.
    pub(crate) fn notify_all(&self, stations: &[Station]) {
        let snapshot: Vec<SharedObserver> = self.observers.read().clone();
        debug!(
            observers = snapshot.len(),
            stations = stations.len(),
            "notifying observers"
        );
        for observer in snapshot {
            observer.on_results(stations);
        }
    }
}
