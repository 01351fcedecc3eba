//! Joining results to the test cases they were produced for.

use std::collections::HashMap;

use crate::types::{DashboardData, EnrichedResult, ModelType, TestCase, TestResult};

impl DashboardData {
    /// Pair every result of `model_type` with its test case.
    ///
    /// Result order is preserved. Results whose `test_case_id` does not
    /// resolve are left out.
    #[must_use]
    pub fn enrich_results(&self, model_type: ModelType) -> Vec<EnrichedResult<'_>> {
        enrich(&self.test_cases, self.results.get(model_type))
    }

    /// [`Self::enrich_results`] for structure, discount and rules, concatenated.
    #[must_use]
    pub fn enrich_all(&self) -> Vec<EnrichedResult<'_>> {
        ModelType::ALL
            .into_iter()
            .flat_map(|model_type| self.enrich_results(model_type))
            .collect()
    }
}

/// Join `results` to `test_cases` by id.
///
/// When several test cases share an id, the first one wins.
#[must_use]
pub fn enrich<'a>(test_cases: &'a [TestCase], results: &'a [TestResult]) -> Vec<EnrichedResult<'a>> {
    let mut index: HashMap<&str, &TestCase> = HashMap::with_capacity(test_cases.len());
    for test_case in test_cases {
        index.entry(test_case.id.as_str()).or_insert(test_case);
    }

    let enriched: Vec<_> = results
        .iter()
        .filter_map(|result| {
            index
                .get(result.test_case_id.as_str())
                .copied()
                .map(|test_case| EnrichedResult { test_case, result })
        })
        .collect();

    let dropped = results.len() - enriched.len();
    if dropped > 0 {
        tracing::debug!(
            "skipped {} of {} results with no matching test case",
            dropped,
            results.len()
        );
    }

    enriched
}
