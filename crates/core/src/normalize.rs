//! Normalization of loosely shaped model outputs.
//!
//! Each model type accepts several payload shapes. Known shapes are matched
//! in priority order; anything else becomes a `Raw` variant carrying the
//! original JSON. Normalization never fails, and unknown discriminator
//! values pass through verbatim in the `Other` variants.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::types::{open_enum, ModelType};

/// Shown for a rules output that resolved to an empty list.
pub const DEFAULT_RULES_MESSAGE: &str = "Default rules apply to any quantity";

open_enum! {
    /// Discriminator of a structure output.
    StructureType {
        SingleStep => "SINGLE_STEP",
        MultiStep => "MULTI_STEP",
    }
}

impl StructureType {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::SingleStep => "Single step",
            Self::MultiStep => "Multi step",
            Self::Other(s) => s,
        }
    }
}

open_enum! {
    /// Discriminator of a discount output.
    DiscountMode {
        Percentage => "PERCENTAGE",
        Fixed => "FIXED",
        FixedBundlePrice => "FIXED_BUNDLE_PRICE",
    }
}

impl DiscountMode {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Percentage => "Percentage off",
            Self::Fixed => "Fixed amount off",
            Self::FixedBundlePrice => "Fixed bundle price",
            Self::Other(s) => s,
        }
    }
}

open_enum! {
    /// What a discount or condition rule is measured against.
    QualifierType {
        Quantity => "quantity",
        Amount => "amount",
    }
}

impl QualifierType {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Quantity => "Quantity",
            Self::Amount => "Amount",
            Self::Other(s) => s,
        }
    }
}

open_enum! {
    /// Comparison operator of a condition rule.
    Condition {
        GreaterThanOrEqualTo => "greaterThanOrEqualTo",
        LessThanOrEqualTo => "lessThanOrEqualTo",
        EqualTo => "equalTo",
    }
}

impl Condition {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::GreaterThanOrEqualTo => "At least",
            Self::LessThanOrEqualTo => "At most",
            Self::EqualTo => "Exactly",
            Self::Other(s) => s,
        }
    }
}

/// One step of a structure output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureStep {
    pub label: String,
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureOutput {
    #[serde(rename_all = "camelCase")]
    Structured {
        structure_type: StructureType,
        steps: Vec<StructureStep>,
    },
    /// The model declined the input (`structureType` null or absent).
    Rejected,
    Raw {
        value: JsonValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRule {
    pub qualifier: Option<QualifierType>,
    pub threshold: JsonValue,
    pub discount: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountOutput {
    /// `mode` is `None` when the model decided no discount applies.
    Configured {
        mode: Option<DiscountMode>,
        rules: Vec<DiscountRule>,
    },
    Raw {
        value: JsonValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRule {
    pub qualifier: Option<QualifierType>,
    pub condition: Option<Condition>,
    pub value: JsonValue,
    pub step_index: Option<u64>,
}

impl ConditionRule {
    /// Human label of the condition, e.g. "At least".
    #[must_use]
    pub fn condition_label(&self) -> &str {
        self.condition.as_ref().map_or("", Condition::label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RulesOutput {
    /// An empty list means the default rules apply.
    Rules {
        rules: Vec<ConditionRule>,
    },
    Raw {
        value: JsonValue,
    },
}

impl RulesOutput {
    #[must_use]
    pub fn rules(&self) -> Option<&[ConditionRule]> {
        match self {
            Self::Rules { rules } => Some(rules),
            Self::Raw { .. } => None,
        }
    }

    /// Whether the output resolved to the empty "default rules" list.
    #[must_use]
    pub fn applies_default(&self) -> bool {
        matches!(self, Self::Rules { rules } if rules.is_empty())
    }
}

/// A normalized output of any model type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", content = "output", rename_all = "lowercase")]
pub enum ModelOutput {
    Structure(StructureOutput),
    Discount(DiscountOutput),
    Rules(RulesOutput),
}

impl ModelOutput {
    #[must_use]
    pub fn model_type(&self) -> ModelType {
        match self {
            Self::Structure(_) => ModelType::Structure,
            Self::Discount(_) => ModelType::Discount,
            Self::Rules(_) => ModelType::Rules,
        }
    }

    /// Whether no known shape matched.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(
            self,
            Self::Structure(StructureOutput::Raw { .. })
                | Self::Discount(DiscountOutput::Raw { .. })
                | Self::Rules(RulesOutput::Raw { .. })
        )
    }
}

/// Normalize `value` as an output of `model_type`.
#[must_use]
pub fn normalize(model_type: ModelType, value: &JsonValue) -> ModelOutput {
    match model_type {
        ModelType::Structure => ModelOutput::Structure(normalize_structure(value)),
        ModelType::Discount => ModelOutput::Discount(normalize_discount(value)),
        ModelType::Rules => ModelOutput::Rules(normalize_rules(value)),
    }
}

#[must_use]
pub fn normalize_structure(value: &JsonValue) -> StructureOutput {
    let obj = match value {
        JsonValue::Null => return StructureOutput::Rejected,
        JsonValue::Object(obj) => obj,
        _ => return raw_structure(value),
    };

    let structure_type = match obj.get("structureType") {
        None | Some(JsonValue::Null) => return StructureOutput::Rejected,
        Some(JsonValue::String(s)) => StructureType::from(s.as_str()),
        Some(_) => return raw_structure(value),
    };

    let steps = match obj.get("steps") {
        None | Some(JsonValue::Null) => Some(Vec::new()),
        Some(JsonValue::Array(entries)) => entries.iter().map(structure_step).collect(),
        Some(_) => None,
    };

    match steps {
        Some(steps) => StructureOutput::Structured {
            structure_type,
            steps,
        },
        None => raw_structure(value),
    }
}

fn raw_structure(value: &JsonValue) -> StructureOutput {
    StructureOutput::Raw {
        value: value.clone(),
    }
}

fn structure_step(entry: &JsonValue) -> Option<StructureStep> {
    match entry {
        JsonValue::String(label) => Some(StructureStep {
            label: label.clone(),
            hints: Vec::new(),
        }),
        JsonValue::Object(obj) => {
            let label = ["label", "name", "title"]
                .iter()
                .find_map(|key| obj.get(*key))
                .map(display_value)
                .unwrap_or_default();
            let hints = match obj.get("hints") {
                Some(JsonValue::Array(hints)) => hints.iter().map(display_value).collect(),
                Some(JsonValue::String(hint)) => vec![hint.clone()],
                _ => Vec::new(),
            };
            Some(StructureStep { label, hints })
        }
        _ => None,
    }
}

/// Normalize a discount output. A nested `discountConfiguration` object and
/// the same fields at the top level resolve identically.
#[must_use]
pub fn normalize_discount(value: &JsonValue) -> DiscountOutput {
    let obj = match value {
        JsonValue::Null => {
            return DiscountOutput::Configured {
                mode: None,
                rules: Vec::new(),
            }
        }
        JsonValue::Object(obj) => obj,
        _ => return raw_discount(value),
    };

    let config = match obj.get("discountConfiguration") {
        Some(JsonValue::Object(nested)) => nested,
        _ => obj,
    };

    let mode = match config.get("discountMode") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(DiscountMode::from(s.as_str())),
        Some(other) => Some(DiscountMode::Other(other.to_string())),
    };

    let rules = match config.get("rules") {
        None | Some(JsonValue::Null) => Some(Vec::new()),
        Some(JsonValue::Array(entries)) => entries.iter().map(discount_rule).collect(),
        Some(_) => None,
    };

    match rules {
        Some(rules) => DiscountOutput::Configured { mode, rules },
        None => raw_discount(value),
    }
}

fn raw_discount(value: &JsonValue) -> DiscountOutput {
    DiscountOutput::Raw {
        value: value.clone(),
    }
}

fn discount_rule(entry: &JsonValue) -> Option<DiscountRule> {
    let obj = entry.as_object()?;
    Some(DiscountRule {
        qualifier: qualifier(obj),
        threshold: first_of(obj, &["threshold", "value"]),
        discount: first_of(obj, &["discount", "discountValue"]),
    })
}

/// Normalize a rules output.
///
/// The rule list is looked up, in order, as the value itself, under
/// `conditions.rules`, then under `rules`. The first shape that holds an
/// array wins.
#[must_use]
pub fn normalize_rules(value: &JsonValue) -> RulesOutput {
    let list = value
        .as_array()
        .or_else(|| value.pointer("/conditions/rules").and_then(JsonValue::as_array))
        .or_else(|| value.get("rules").and_then(JsonValue::as_array));

    let rules = list.and_then(|entries| {
        entries
            .iter()
            .map(condition_rule)
            .collect::<Option<Vec<_>>>()
    });

    match rules {
        Some(rules) => RulesOutput::Rules { rules },
        None => RulesOutput::Raw {
            value: value.clone(),
        },
    }
}

fn condition_rule(entry: &JsonValue) -> Option<ConditionRule> {
    let obj = entry.as_object()?;
    let condition = match obj.get("condition") {
        Some(JsonValue::String(s)) => Some(Condition::from(s.as_str())),
        Some(JsonValue::Null) | None => None,
        Some(other) => Some(Condition::Other(other.to_string())),
    };
    Some(ConditionRule {
        qualifier: qualifier(obj),
        condition,
        value: obj.get("value").cloned().unwrap_or(JsonValue::Null),
        step_index: obj.get("stepIndex").and_then(JsonValue::as_u64),
    })
}

fn qualifier(obj: &Map<String, JsonValue>) -> Option<QualifierType> {
    match obj.get("type")? {
        JsonValue::String(s) => Some(QualifierType::from(s.as_str())),
        JsonValue::Null => None,
        other => Some(QualifierType::Other(other.to_string())),
    }
}

fn first_of(obj: &Map<String, JsonValue>, keys: &[&str]) -> JsonValue {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .cloned()
        .unwrap_or(JsonValue::Null)
}

/// Render a scalar for display: strings without quotes, null as "-".
#[must_use]
pub fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "-".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
