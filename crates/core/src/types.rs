//! Core types for evaldash.
//!
//! These mirror the JSON payload served by the evaluation backend. Payload
//! fields are camelCase on the wire; model outputs stay loosely typed
//! (`serde_json::Value`) until [`crate::normalize`] resolves them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Declare a string-backed enum whose unknown values are kept verbatim in
/// an `Other` variant instead of failing deserialization.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Unrecognized value, kept as received.
            Other(String),
        }

        impl $name {
            /// The wire representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(s) => s,
                }
            }

            /// Whether this is one of the known variants.
            #[must_use]
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Other(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use open_enum;

/// The three extraction tasks under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Structure,
    Discount,
    Rules,
}

impl ModelType {
    /// All model types, in dashboard order.
    pub const ALL: [ModelType; 3] = [Self::Structure, Self::Discount, Self::Rules];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Discount => "discount",
            Self::Rules => "rules",
        }
    }

    /// Heading used in rendered views.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Discount => "Discount",
            Self::Rules => "Rules",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structure" => Ok(Self::Structure),
            "discount" => Ok(Self::Discount),
            "rules" => Ok(Self::Rules),
            _ => Err(ParseEnumError {
                kind: "model type",
                value: s.to_string(),
                expected: "structure, discount, rules",
            }),
        }
    }
}

/// Error returned when a closed enum is parsed from an unknown string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

open_enum! {
    /// Test case category.
    Category {
        SingleTier => "SINGLE_TIER",
        MultiTier => "MULTI_TIER",
        Bundle => "BUNDLE",
        EdgeCase => "EDGE_CASE",
        Adversarial => "ADVERSARIAL",
    }
}

open_enum! {
    /// Writing style of a test case input.
    Style {
        Formal => "FORMAL",
        Casual => "CASUAL",
        Shorthand => "SHORTHAND",
        Verbose => "VERBOSE",
    }
}

/// Pass/fail verdict. The canonical status for filtering, aggregation and
/// display across both data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    /// Status derived from a boolean match flag.
    #[must_use]
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
                expected: "PASS, FAIL",
            }),
        }
    }
}

/// Four-state status recorded by evaluation runs.
///
/// Only shown as recorded; the canonical [`Status`] of a run result is
/// derived from its rules match flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Pass,
    Fail,
    Partial,
    Error,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Partial => "PARTIAL",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled input with expected outputs for one or more model types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub category: Category,
    pub style: Style,
    #[serde(alias = "text")]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_structure: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_discount: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_rules: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adversarial_type: Option<String>,
    /// Display-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<JsonValue>,
    /// Display-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<JsonValue>,
}

impl TestCase {
    /// Expected output for the given model type, if the test case has one.
    #[must_use]
    pub fn expected_for(&self, model_type: ModelType) -> Option<&JsonValue> {
        match model_type {
            ModelType::Structure => self.expected_structure.as_ref(),
            ModelType::Discount => self.expected_discount.as_ref(),
            ModelType::Rules => self.expected_rules.as_ref(),
        }
    }
}

/// A recorded model output plus its verdict for one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub test_case_id: String,
    pub model_type: ModelType,
    pub status: Status,
    #[serde(default)]
    pub actual_output: JsonValue,
}

/// Ephemeral join of one test case and one of its results.
///
/// Always satisfies `test_case.id == result.test_case_id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult<'a> {
    pub test_case: &'a TestCase,
    pub result: &'a TestResult,
}

/// Aggregate numbers for one model type, as computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelMetrics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<ModelMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<ModelMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<ModelMetrics>,
}

impl Metrics {
    #[must_use]
    pub fn for_model(&self, model_type: ModelType) -> Option<&ModelMetrics> {
        match model_type {
            ModelType::Structure => self.structure.as_ref(),
            ModelType::Discount => self.discount.as_ref(),
            ModelType::Rules => self.rules.as_ref(),
        }
    }
}

/// Which LLM produced a model type's outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_version: Option<String>,
}

/// Results grouped by model type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSets {
    pub structure: Vec<TestResult>,
    pub discount: Vec<TestResult>,
    pub rules: Vec<TestResult>,
}

impl ResultSets {
    #[must_use]
    pub fn get(&self, model_type: ModelType) -> &[TestResult] {
        match model_type {
            ModelType::Structure => &self.structure,
            ModelType::Discount => &self.discount,
            ModelType::Rules => &self.rules,
        }
    }

    /// All results: structure, then discount, then rules.
    pub fn iter_all(&self) -> impl Iterator<Item = &TestResult> {
        ModelType::ALL
            .into_iter()
            .flat_map(move |model_type| self.get(model_type).iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.structure.len() + self.discount.len() + self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The full dashboard payload (the `data` field of the response envelope).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub llm_specs: Vec<LlmSpec>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    pub results: ResultSets,
}

impl DashboardData {
    /// Look up a test case by id.
    #[must_use]
    pub fn test_case(&self, id: &str) -> Option<&TestCase> {
        self.test_cases.iter().find(|tc| tc.id == id)
    }
}

/// One evaluation run, as returned by the latest-run endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRunDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub results: Vec<EvaluationResult>,
}

/// Per-test outcome inside an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_case_id: Option<String>,
    pub category: Category,
    pub style: Style,
    #[serde(alias = "input")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    pub rules_result: RulesResult,
}

/// Rules comparison for one evaluation-run test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesResult {
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(default)]
    pub expected: JsonValue,
    #[serde(default)]
    pub actual: JsonValue,
    #[serde(
        default,
        alias = "mismatchReason",
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation: Option<String>,
}

/// Identifiers arrive as strings or numbers depending on the backend table.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_enum_known_and_unknown() {
        assert_eq!(Category::from("ADVERSARIAL"), Category::Adversarial);
        assert_eq!(
            Category::from("SEASONAL"),
            Category::Other("SEASONAL".to_string())
        );
        assert!(!Category::from("SEASONAL").is_known());
        assert_eq!(Style::Shorthand.to_string(), "SHORTHAND");
    }

    #[test]
    fn test_open_enum_serde_round_trip() {
        let style: Style = serde_json::from_value(json!("CASUAL")).unwrap();
        assert_eq!(style, Style::Casual);
        let other: Style = serde_json::from_value(json!("PIRATE")).unwrap();
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("PIRATE"));
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("pass".parse::<Status>().unwrap(), Status::Pass);
        assert_eq!(" FAIL ".parse::<Status>().unwrap(), Status::Fail);
        assert!("PARTIAL".parse::<Status>().is_err());
    }

    #[test]
    fn test_model_type_parse() {
        assert_eq!("Rules".parse::<ModelType>().unwrap(), ModelType::Rules);
        let err = "pricing".parse::<ModelType>().unwrap_err();
        assert!(err.to_string().contains("pricing"));
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let result: TestResult = serde_json::from_value(json!({
            "id": 17,
            "testCaseId": 4,
            "modelType": "discount",
            "status": "PASS"
        }))
        .unwrap();
        assert_eq!(result.id, "17");
        assert_eq!(result.test_case_id, "4");
        assert!(result.actual_output.is_null());
    }

    #[test]
    fn test_test_case_text_alias_and_defaults() {
        let tc: TestCase = serde_json::from_value(json!({
            "id": "tc-1",
            "category": "BUNDLE",
            "style": "FORMAL",
            "text": "Buy 3 get 10% off",
            "expectedRules": null
        }))
        .unwrap();
        assert_eq!(tc.input, "Buy 3 get 10% off");
        assert!(tc.expected_for(ModelType::Rules).is_none());
        assert!(tc.collections.is_empty());
    }

    #[test]
    fn test_result_sets_iter_all_order() {
        let make = |id: &str, model_type| TestResult {
            id: id.to_string(),
            test_case_id: "tc".to_string(),
            model_type,
            status: Status::Pass,
            actual_output: JsonValue::Null,
        };
        let sets = ResultSets {
            structure: vec![make("s1", ModelType::Structure)],
            discount: vec![make("d1", ModelType::Discount)],
            rules: vec![make("r1", ModelType::Rules), make("r2", ModelType::Rules)],
        };
        let ids: Vec<_> = sets.iter_all().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["s1", "d1", "r1", "r2"]);
        assert_eq!(sets.len(), 4);
    }

    #[test]
    fn test_rules_result_match_field() {
        let result: EvaluationResult = serde_json::from_value(json!({
            "category": "EDGE_CASE",
            "style": "VERBOSE",
            "text": "spend $100 save $10",
            "status": "PARTIAL",
            "rulesResult": {
                "match": false,
                "expected": [],
                "actual": [{"type": "amount"}],
                "mismatchReason": "extra rule"
            }
        }))
        .unwrap();
        assert!(!result.rules_result.matched);
        assert_eq!(result.status, Some(RunStatus::Partial));
        assert_eq!(result.rules_result.explanation.as_deref(), Some("extra rule"));
        assert!(result.test_case_id.is_none());
    }
}
