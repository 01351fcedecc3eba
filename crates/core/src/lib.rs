//! evaldash Core
//!
//! Loads pre-computed evaluation results for the structure, discount and
//! rules extraction models, joins them to their test cases, normalizes the
//! loosely shaped model outputs and filters them for display.
//!
//! # Quick Start
//!
//! ```no_run
//! use evaldash_core::{DashboardCache, FilterState, HttpSource, ModelType};
//!
//! let cache = DashboardCache::new(HttpSource::new("http://localhost:3000"));
//! let data = cache.get_or_load()?;
//!
//! let rows = data.enrich_results(ModelType::Rules);
//! let failing = FilterState::from_params("ADVERSARIAL", "", "FAIL")?.apply(&rows);
//! println!("{} failing adversarial rules results", failing.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Normalizing Outputs
//!
//! ```
//! use evaldash_core::normalize::normalize_rules;
//! use serde_json::json;
//!
//! let output = normalize_rules(&json!({
//!     "conditions": {"rules": [{"type": "amount", "condition": "equalTo", "value": 5}]}
//! }));
//! assert_eq!(output.rules().unwrap()[0].condition_label(), "Exactly");
//!
//! // An empty list is the default rule set, not missing data.
//! assert!(normalize_rules(&json!([])).applies_default());
//! ```
//!
//! # Accuracy
//!
//! ```
//! use evaldash_core::Accuracy;
//!
//! let accuracy = Accuracy { passed: 3, failed: 1 };
//! assert_eq!(accuracy.label(), "75.0%");
//! assert_eq!(Accuracy::default().label(), "0%");
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod reconcile;
pub mod state;
pub mod summary;
pub mod types;

pub use cache::DashboardCache;
pub use client::{DashboardSource, FileSource, HttpSource};
pub use error::DashboardError;
pub use filter::{Classified, FilterState};
pub use normalize::{normalize, ModelOutput};
pub use state::LoadState;
pub use summary::{by_category, Accuracy, CategoryAccuracy};
pub use types::*;
