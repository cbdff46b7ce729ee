use qdrant_client::qdrant::{Condition, Filter as StoreFilter, Range};
use serde::Serialize;

use crate::filter::{DateRange, Filter, FilterOutcome};

/// Payload field used to order results when the latest files are wanted.
pub const LATEST_ORDER_FIELD: &str = "created_ts";

/// A single condition on the stored payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    AnyOf { field: String, values: Vec<String> },
    Between { field: String, start: i64, end: i64 },
}

impl Predicate {
    fn to_condition(&self) -> Condition {
        match self {
            Predicate::AnyOf { field, values } => Condition::matches(field.as_str(), values.clone()),
            Predicate::Between { field, start, end } => Condition::range(
                field.as_str(),
                Range {
                    gte: Some(*start as f64),
                    lte: Some(*end as f64),
                    ..Default::default()
                },
            ),
        }
    }
}

/// How a [`FilterOutcome`] constrains a search over the media collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorePredicates {
    pub must: Vec<Predicate>,
    pub prefer_latest: bool,
    /// Extra texts to search with alongside the original query.
    pub expansion_texts: Vec<String>,
}

fn date_predicate(field: &str, range: &DateRange) -> Option<Predicate> {
    range.bounds().map(|(start, end)| Predicate::Between {
        field: field.to_string(),
        start,
        end,
    })
}

impl StorePredicates {
    pub fn from_filter(filter: &Filter) -> Self {
        let mut must = Vec::new();
        if !filter.file_type.is_empty() {
            must.push(Predicate::AnyOf {
                field: "extension".to_string(),
                values: filter.file_type.clone(),
            });
        }
        must.extend(
            [
                ("created_year", &filter.year),
                ("created_month", &filter.month),
                ("created_day", &filter.day),
            ]
            .into_iter()
            .filter_map(|(field, range)| date_predicate(field, range)),
        );

        Self {
            must,
            prefer_latest: filter.prefers_latest(),
            expansion_texts: filter.file_content.clone(),
        }
    }

    /// An empty outcome constrains nothing: search on content alone.
    pub fn from_outcome(outcome: &FilterOutcome) -> Self {
        match outcome {
            FilterOutcome::Filter(filter) => Self::from_filter(filter),
            FilterOutcome::Empty => Self::default(),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.must.is_empty()
    }

    /// The vector-store filter, or `None` when nothing constrains the search.
    pub fn to_store_filter(&self) -> Option<StoreFilter> {
        if self.must.is_empty() {
            return None;
        }
        Some(StoreFilter::must(
            self.must.iter().map(Predicate::to_condition),
        ))
    }

    pub fn order_by(&self) -> Option<&'static str> {
        self.prefer_latest.then_some(LATEST_ORDER_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> Filter {
        Filter {
            year: DateRange::Between {
                start: 2023,
                end: 2023,
            },
            month: DateRange::Unknown,
            day: DateRange::Between { start: 10, end: 12 },
            file_content: vec!["Tech Summit Slides".to_string()],
            file_type: vec!["pdf".to_string(), "pptx".to_string()],
        }
    }

    #[test]
    fn test_ranges_and_types_become_predicates() {
        let predicates = StorePredicates::from_filter(&filter());
        assert_eq!(
            predicates.must,
            vec![
                Predicate::AnyOf {
                    field: "extension".to_string(),
                    values: vec!["pdf".to_string(), "pptx".to_string()],
                },
                Predicate::Between {
                    field: "created_year".to_string(),
                    start: 2023,
                    end: 2023
                },
                Predicate::Between {
                    field: "created_day".to_string(),
                    start: 10,
                    end: 12
                },
            ]
        );
        assert_eq!(predicates.expansion_texts, vec!["Tech Summit Slides"]);
        assert!(!predicates.prefer_latest);
        assert_eq!(predicates.order_by(), None);

        let store_filter = predicates.to_store_filter().unwrap();
        assert_eq!(store_filter.must.len(), 3);
    }

    #[test]
    fn test_latest_orders_without_constraining() {
        let latest = Filter {
            year: DateRange::Latest,
            month: DateRange::Latest,
            day: DateRange::Latest,
            file_content: vec![],
            file_type: vec![],
        };
        let predicates = StorePredicates::from_filter(&latest);
        assert!(predicates.is_unconstrained());
        assert!(predicates.prefer_latest);
        assert_eq!(predicates.order_by(), Some(LATEST_ORDER_FIELD));
        assert!(predicates.to_store_filter().is_none());
    }

    #[test]
    fn test_empty_outcome_constrains_nothing() {
        let predicates = StorePredicates::from_outcome(&FilterOutcome::Empty);
        assert_eq!(predicates, StorePredicates::default());
        assert!(predicates.to_store_filter().is_none());
    }

    #[test]
    fn test_predicates_serialize_for_display() {
        let value = serde_json::to_value(StorePredicates::from_filter(&filter())).unwrap();
        assert_eq!(value["must"][0]["kind"], "any_of");
        assert_eq!(value["must"][1]["start"], 2023);
    }
}
