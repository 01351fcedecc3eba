//! In-memory cache of the dashboard payload.
//!
//! The payload is fetched once and served from memory until
//! [`DashboardCache::invalidate`] is called. The fetch runs under the cache
//! lock, so callers racing on an empty cache share a single request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::DashboardSource;
use crate::error::DashboardError;
use crate::types::{
    DashboardData, EvaluationRunDetail, LlmSpec, Metrics, ModelType, TestCase, TestResult,
};

/// Owned get-or-load cache around a [`DashboardSource`].
pub struct DashboardCache<S> {
    source: S,
    slot: Mutex<Option<Arc<DashboardData>>>,
}

impl<S: DashboardSource> DashboardCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached payload, fetching it first if the cache is empty.
    ///
    /// A failed fetch leaves the cache empty, so the next call tries again.
    pub fn get_or_load(&self) -> Result<Arc<DashboardData>, DashboardError> {
        let mut slot = self.lock();

        if let Some(data) = slot.as_ref() {
            tracing::trace!("dashboard cache hit");
            return Ok(Arc::clone(data));
        }

        tracing::debug!("dashboard cache empty, fetching");
        let data = Arc::new(self.source.fetch_dashboard()?);
        tracing::debug!(
            "loaded {} test cases and {} results",
            data.test_cases.len(),
            data.results.len()
        );

        *slot = Some(Arc::clone(&data));
        Ok(data)
    }

    /// Load the dashboard. Same as [`Self::get_or_load`].
    pub fn load_dashboard(&self) -> Result<Arc<DashboardData>, DashboardError> {
        self.get_or_load()
    }

    /// Drop the cached payload; the next access fetches again.
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            tracing::debug!("dashboard cache invalidated");
        }
    }

    /// Whether a payload is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    pub fn metrics(&self) -> Result<Metrics, DashboardError> {
        Ok(self.get_or_load()?.metrics.clone())
    }

    pub fn test_cases(&self) -> Result<Vec<TestCase>, DashboardError> {
        Ok(self.get_or_load()?.test_cases.clone())
    }

    /// Results for one model type, in payload order.
    pub fn results(&self, model_type: ModelType) -> Result<Vec<TestResult>, DashboardError> {
        Ok(self.get_or_load()?.results.get(model_type).to_vec())
    }

    /// All results: structure, then discount, then rules.
    pub fn all_results(&self) -> Result<Vec<TestResult>, DashboardError> {
        Ok(self.get_or_load()?.results.iter_all().cloned().collect())
    }

    pub fn llm_specs(&self) -> Result<Vec<LlmSpec>, DashboardError> {
        Ok(self.get_or_load()?.llm_specs.clone())
    }

    /// Fetch the latest evaluation run. Runs are not cached.
    pub fn latest_run(&self) -> Result<EvaluationRunDetail, DashboardError> {
        self.source.fetch_latest_run()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<DashboardData>>> {
        // The slot only ever holds a complete payload, so a poisoned lock is still usable.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultSets, Status};
    use serde_json::Value as JsonValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    /// Source that counts fetches and optionally fails.
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingSource {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn result(id: &str, model_type: ModelType) -> TestResult {
        TestResult {
            id: id.to_string(),
            test_case_id: "tc-1".to_string(),
            model_type,
            status: Status::Pass,
            actual_output: JsonValue::Null,
        }
    }

    impl DashboardSource for CountingSource {
        fn fetch_dashboard(&self) -> Result<DashboardData, DashboardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if self.fail {
                return Err(DashboardError::fetch("mem://dashboard", Some(500), "HTTP 500"));
            }
            Ok(DashboardData {
                results: ResultSets {
                    structure: vec![result("s1", ModelType::Structure)],
                    discount: vec![result("d1", ModelType::Discount)],
                    rules: vec![result("r1", ModelType::Rules)],
                },
                ..DashboardData::default()
            })
        }

        fn fetch_latest_run(&self) -> Result<EvaluationRunDetail, DashboardError> {
            Err(DashboardError::fetch("mem://run", Some(404), "HTTP 404"))
        }
    }

    #[test]
    fn test_fetches_once_across_accessors() {
        let cache = DashboardCache::new(CountingSource::ok());

        cache.load_dashboard().unwrap();
        cache.metrics().unwrap();
        cache.test_cases().unwrap();
        cache.results(ModelType::Rules).unwrap();
        cache.all_results().unwrap();
        cache.llm_specs().unwrap();

        assert_eq!(cache.source().calls(), 1);
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let cache = DashboardCache::new(CountingSource::ok());

        cache.get_or_load().unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());
        cache.get_or_load().unwrap();

        assert_eq!(cache.source().calls(), 2);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = DashboardCache::new(CountingSource::failing());

        let err = cache.get_or_load().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!cache.is_loaded());

        assert!(cache.metrics().is_err());
        assert_eq!(cache.source().calls(), 2);
    }

    #[test]
    fn test_concurrent_first_loads_share_one_fetch() {
        let cache = DashboardCache::new(CountingSource {
            delay: Duration::from_millis(20),
            ..CountingSource::ok()
        });
        let barrier = Barrier::new(4);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    barrier.wait();
                    cache.get_or_load().unwrap();
                });
            }
        });

        assert_eq!(cache.source().calls(), 1);
    }

    #[test]
    fn test_all_results_order() {
        let cache = DashboardCache::new(CountingSource::ok());
        let ids: Vec<_> = cache
            .all_results()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["s1", "d1", "r1"]);
    }

    #[test]
    fn test_latest_run_bypasses_cache() {
        let cache = DashboardCache::new(CountingSource::ok());
        assert!(cache.latest_run().is_err());
        assert!(!cache.is_loaded());
    }
}
