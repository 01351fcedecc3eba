//! Category / style / status filtering.

use std::fmt;

use crate::types::{Category, EnrichedResult, EvaluationResult, ParseEnumError, Status, Style};

/// Anything that can be filtered and tallied: it has a category, a style and
/// a canonical pass/fail status.
pub trait Classified {
    fn category(&self) -> &Category;
    fn style(&self) -> &Style;
    fn status(&self) -> Status;
}

impl Classified for EnrichedResult<'_> {
    fn category(&self) -> &Category {
        &self.test_case.category
    }

    fn style(&self) -> &Style {
        &self.test_case.style
    }

    fn status(&self) -> Status {
        self.result.status
    }
}

impl Classified for EvaluationResult {
    fn category(&self) -> &Category {
        &self.category
    }

    fn style(&self) -> &Style {
        &self.style
    }

    /// Derived from the rules match flag, not the recorded run status.
    fn status(&self) -> Status {
        Status::from_match(self.rules_result.matched)
    }
}

impl<T: Classified + ?Sized> Classified for &T {
    fn category(&self) -> &Category {
        (**self).category()
    }

    fn style(&self) -> &Style {
        (**self).style()
    }

    fn status(&self) -> Status {
        (**self).status()
    }
}

fn known_or_verbatim<T: From<String>>(
    value: String,
    is_known: fn(&T) -> bool,
    field: &str,
) -> T {
    let upper = T::from(value.to_uppercase());
    if is_known(&upper) {
        return upper;
    }
    tracing::warn!("unknown {} {:?}, matching it exactly", field, value);
    T::from(value)
}

/// User-selected filters. `None` means "no filter" for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: Option<Category>,
    pub style: Option<Style>,
    pub status: Option<Status>,
}

impl FilterState {
    /// Build from raw form values, where an empty string means "no filter".
    ///
    /// Known categories and styles match case-insensitively. Anything else
    /// is kept verbatim and only matches the exact same string.
    pub fn from_params(category: &str, style: &str, status: &str) -> Result<Self, ParseEnumError> {
        let non_empty = |s: &str| Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Self {
            category: non_empty(category)
                .map(|s| known_or_verbatim(s, Category::is_known, "category")),
            style: non_empty(style).map(|s| known_or_verbatim(s, Style::is_known, "style")),
            status: non_empty(status).map(|s| s.parse::<Status>()).transpose()?,
        })
    }

    /// Whether no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.style.is_none() && self.status.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `item` satisfies every set predicate.
    pub fn matches<T: Classified + ?Sized>(&self, item: &T) -> bool {
        self.category.as_ref().map_or(true, |c| item.category() == c)
            && self.style.as_ref().map_or(true, |s| item.style() == s)
            && self.status.map_or(true, |s| item.status() == s)
    }

    /// Keep the items that satisfy every set predicate, in order.
    pub fn apply<I>(&self, items: I) -> Vec<I::Item>
    where
        I: IntoIterator,
        I::Item: Classified,
    {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(format!("category={}", category));
        }
        if let Some(style) = &self.style {
            parts.push(format!("style={}", style));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelType, RulesResult, TestCase, TestResult};
    use serde_json::Value as JsonValue;

    fn pair(id: &str, category: Category, style: Style, status: Status) -> (TestCase, TestResult) {
        let test_case = TestCase {
            id: id.to_string(),
            category,
            style,
            input: format!("input {}", id),
            expected_structure: None,
            expected_discount: None,
            expected_rules: None,
            adversarial_type: None,
            collections: vec![],
            products: vec![],
        };
        let result = TestResult {
            id: format!("r-{}", id),
            test_case_id: id.to_string(),
            model_type: ModelType::Rules,
            status,
            actual_output: JsonValue::Null,
        };
        (test_case, result)
    }

    fn enriched(pairs: &[(TestCase, TestResult)]) -> Vec<EnrichedResult<'_>> {
        pairs
            .iter()
            .map(|(test_case, result)| EnrichedResult { test_case, result })
            .collect()
    }

    #[test]
    fn test_adversarial_fail_filter() {
        let pairs = [
            pair("a", Category::Adversarial, Style::Casual, Status::Fail),
            pair("b", Category::Adversarial, Style::Casual, Status::Pass),
        ];
        let rows = enriched(&pairs);

        let filter = FilterState::from_params("ADVERSARIAL", "", "FAIL").unwrap();
        let kept = filter.apply(&rows);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].test_case.id, "a");
    }

    #[test]
    fn test_predicates_are_anded() {
        let pairs = [
            pair("a", Category::Bundle, Style::Formal, Status::Pass),
            pair("b", Category::Bundle, Style::Casual, Status::Pass),
            pair("c", Category::EdgeCase, Style::Formal, Status::Pass),
        ];
        let rows = enriched(&pairs);

        let filter = FilterState {
            category: Some(Category::Bundle),
            style: Some(Style::Formal),
            status: None,
        };
        let ids: Vec<_> = filter
            .apply(rows.iter().copied())
            .into_iter()
            .map(|row| row.test_case.id.as_str())
            .collect();
        assert_eq!(ids, ["a"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let pairs = [
            pair("a", Category::Bundle, Style::Formal, Status::Pass),
            pair("b", Category::MultiTier, Style::Verbose, Status::Fail),
        ];
        let rows = enriched(&pairs);

        let mut filter = FilterState::from_params("BUNDLE", "FORMAL", "PASS").unwrap();
        assert_eq!(filter.apply(&rows).len(), 1);

        filter.clear();
        assert!(filter.is_empty());
        assert_eq!(filter, FilterState::from_params("", "", "").unwrap());
        assert_eq!(filter.apply(&rows).len(), rows.len());
    }

    #[test]
    fn test_unknown_category_matches_exactly() {
        let pairs = [
            pair("a", Category::from("SEASONAL"), Style::Formal, Status::Pass),
            pair("b", Category::Bundle, Style::Formal, Status::Pass),
        ];
        let rows = enriched(&pairs);

        let filter = FilterState::from_params("SEASONAL", "", "").unwrap();
        let kept = filter.apply(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].test_case.id, "a");
    }

    #[test]
    fn test_known_values_ignore_case() {
        let filter = FilterState::from_params("adversarial", " Casual ", "").unwrap();
        assert_eq!(filter.category, Some(Category::Adversarial));
        assert_eq!(filter.style, Some(Style::Casual));

        let pairs = [
            pair("a", Category::Adversarial, Style::Casual, Status::Fail),
            pair("b", Category::Bundle, Style::Casual, Status::Fail),
        ];
        let rows = enriched(&pairs);
        let kept = filter.apply(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].test_case.id, "a");

        let filter = FilterState::from_params("Seasonal", "", "").unwrap();
        assert_eq!(filter.category, Some(Category::Other("Seasonal".to_string())));
    }

    #[test]
    fn test_invalid_status_param() {
        assert!(FilterState::from_params("", "", "MAYBE").is_err());
    }

    #[test]
    fn test_evaluation_result_status_from_match() {
        let run_result = EvaluationResult {
            test_case_id: None,
            category: Category::EdgeCase,
            style: Style::Shorthand,
            text: "3+ items 5 off".to_string(),
            status: None,
            rules_result: RulesResult {
                matched: true,
                expected: JsonValue::Null,
                actual: JsonValue::Null,
                explanation: None,
            },
        };
        assert_eq!(run_result.status(), Status::Pass);

        let filter = FilterState {
            status: Some(Status::Fail),
            ..FilterState::default()
        };
        assert!(!filter.matches(&run_result));
    }

    #[test]
    fn test_display() {
        assert_eq!(FilterState::default().to_string(), "none");
        let filter = FilterState::from_params("BUNDLE", "", "fail").unwrap();
        assert_eq!(filter.to_string(), "category=BUNDLE status=FAIL");
    }
}
