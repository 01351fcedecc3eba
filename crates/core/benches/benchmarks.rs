//! Benchmarks for evaldash-core.
//!
//! Run with: `cargo bench -p evaldash-core`
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use evaldash_core::{
    normalize, Accuracy, Category, DashboardData, FilterState, ModelType, ResultSets, Status,
    Style, TestCase, TestResult,
};
use serde_json::json;

/// Build a synthetic payload with `size` test cases and one rules result each.
/// Every tenth result points at a test case that does not exist.
fn synthetic_dashboard(size: usize) -> DashboardData {
    let categories = [Category::SingleTier, Category::MultiTier, Category::Adversarial];
    let styles = [Style::Formal, Style::Casual];

    let test_cases = (0..size)
        .map(|i| TestCase {
            id: format!("tc-{}", i),
            category: categories[i % categories.len()].clone(),
            style: styles[i % styles.len()].clone(),
            input: format!("buy {} items get {}% off", i % 7 + 1, i % 30),
            expected_structure: None,
            expected_discount: None,
            expected_rules: None,
            adversarial_type: None,
            collections: vec![],
            products: vec![],
        })
        .collect();

    let rules = (0..size)
        .map(|i| TestResult {
            id: format!("r-{}", i),
            test_case_id: if i % 10 == 9 {
                format!("missing-{}", i)
            } else {
                format!("tc-{}", i)
            },
            model_type: ModelType::Rules,
            status: if i % 3 == 0 { Status::Fail } else { Status::Pass },
            actual_output: json!({
                "conditions": {"rules": [{"type": "quantity", "condition": "greaterThanOrEqualTo", "value": i % 7 + 1}]}
            }),
        })
        .collect();

    DashboardData {
        test_cases,
        results: ResultSets {
            rules,
            ..ResultSets::default()
        },
        ..DashboardData::default()
    }
}

/// Join results to test cases at increasing payload sizes.
fn bench_enrich(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich_results");

    for size in [100, 1_000, 10_000] {
        let data = synthetic_dashboard(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("results", size), &data, |b, data| {
            b.iter(|| black_box(data).enrich_results(ModelType::Rules));
        });
    }

    group.finish();
}

/// Filter plus tally, as done on every filter change.
fn bench_filter_and_tally(c: &mut Criterion) {
    let data = synthetic_dashboard(10_000);
    let rows = data.enrich_results(ModelType::Rules);
    let filter = FilterState::from_params("ADVERSARIAL", "", "FAIL").unwrap_or_default();

    c.bench_function("filter_and_tally", |b| {
        b.iter(|| {
            let kept = filter.apply(black_box(&rows));
            Accuracy::tally(kept)
        });
    });
}

/// Normalize every rules output in the payload.
fn bench_normalize(c: &mut Criterion) {
    let data = synthetic_dashboard(1_000);

    c.bench_function("normalize_rules", |b| {
        b.iter(|| {
            data.results
                .rules
                .iter()
                .map(|result| normalize(ModelType::Rules, black_box(&result.actual_output)))
                .count()
        });
    });
}

criterion_group!(benches, bench_enrich, bench_filter_and_tally, bench_normalize);
criterion_main!(benches);
