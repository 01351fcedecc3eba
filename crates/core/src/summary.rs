//! Pass/fail tallies and accuracy.

use serde::Serialize;

use crate::filter::Classified;
use crate::types::Category;

/// Pass/fail counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Accuracy {
    pub passed: usize,
    pub failed: usize,
}

impl Accuracy {
    /// Count passes and failures by canonical status.
    pub fn tally<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Classified,
    {
        items.into_iter().fold(Self::default(), |mut acc, item| {
            acc.record(&item);
            acc
        })
    }

    fn record<T: Classified + ?Sized>(&mut self, item: &T) {
        if item.status().is_pass() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// `passed / total * 100`, or 0 for an empty set.
    #[must_use]
    pub fn percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passed as f64 / total as f64 * 100.0,
        }
    }

    /// Percentage with one decimal place, e.g. "75.0%". An empty set is "0%".
    #[must_use]
    pub fn label(&self) -> String {
        if self.total() == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.percent())
        }
    }
}

/// Accuracy for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAccuracy {
    pub category: Category,
    pub accuracy: Accuracy,
}

/// Accuracy per category, in order of first appearance.
pub fn by_category<I>(items: I) -> Vec<CategoryAccuracy>
where
    I: IntoIterator,
    I::Item: Classified,
{
    let mut breakdown: Vec<CategoryAccuracy> = Vec::new();
    for item in items {
        let position = match breakdown.iter().position(|b| &b.category == item.category()) {
            Some(position) => position,
            None => {
                breakdown.push(CategoryAccuracy {
                    category: item.category().clone(),
                    accuracy: Accuracy::default(),
                });
                breakdown.len() - 1
            }
        };
        breakdown[position].accuracy.record(&item);
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Status, Style};

    struct Row(Category, Status);

    static STYLE: Style = Style::Formal;

    impl Classified for Row {
        fn category(&self) -> &Category {
            &self.0
        }

        fn style(&self) -> &Style {
            &STYLE
        }

        fn status(&self) -> Status {
            self.1
        }
    }

    #[test]
    fn test_three_of_four() {
        let rows = [
            Row(Category::Bundle, Status::Pass),
            Row(Category::Bundle, Status::Pass),
            Row(Category::EdgeCase, Status::Fail),
            Row(Category::EdgeCase, Status::Pass),
        ];
        let accuracy = Accuracy::tally(&rows);
        assert_eq!(accuracy.passed, 3);
        assert_eq!(accuracy.failed, 1);
        assert_eq!(accuracy.total(), 4);
        assert_eq!(accuracy.label(), "75.0%");
    }

    #[test]
    fn test_empty_is_zero_percent() {
        let accuracy = Accuracy::tally(Vec::<Row>::new());
        assert_eq!(accuracy.percent(), 0.0);
        assert_eq!(accuracy.label(), "0%");
    }

    #[test]
    fn test_label_rounding() {
        let accuracy = Accuracy {
            passed: 2,
            failed: 1,
        };
        assert_eq!(accuracy.label(), "66.7%");
        assert_eq!(
            Accuracy {
                passed: 5,
                failed: 0
            }
            .label(),
            "100.0%"
        );
    }

    #[test]
    fn test_by_category_first_seen_order() {
        let rows = [
            Row(Category::EdgeCase, Status::Fail),
            Row(Category::Bundle, Status::Pass),
            Row(Category::EdgeCase, Status::Pass),
        ];
        let breakdown = by_category(&rows);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, Category::EdgeCase);
        assert_eq!(breakdown[0].accuracy.label(), "50.0%");
        assert_eq!(breakdown[1].accuracy.total(), 1);
    }
}
