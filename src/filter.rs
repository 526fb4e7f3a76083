//! Interactive dashboard filters, applied client-side before re-aggregating.

use crate::records::{fields, Record};

/// The filter controls exposed by the dashboard. All active predicates must
/// match (conjunctive AND); `None` or an empty string is the default "all"
/// selection and matches everything.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    /// Exact match on `Make`.
    pub make: Option<String>,
    /// Exact match on `Model Year`.
    pub model_year: Option<String>,
    /// Case-insensitive substring match against `Make` OR `Model`.
    pub search: Option<String>,
}

fn active(selection: &Option<String>) -> Option<&str> {
    selection.as_deref().filter(|s| !s.is_empty())
}

impl FilterSet {
    pub fn matches(&self, record: &Record) -> bool {
        let make_ok = match active(&self.make) {
            Some(make) => record.field(fields::MAKE) == Some(make),
            None => true,
        };
        let year_ok = match active(&self.model_year) {
            Some(year) => record.field(fields::MODEL_YEAR) == Some(year),
            None => true,
        };
        let search_ok = match active(&self.search) {
            Some(term) => {
                let needle = term.to_lowercase();
                [fields::MAKE, fields::MODEL].iter().any(|f| {
                    record
                        .field(f)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                })
            }
            None => true,
        };
        make_ok && year_ok && search_ok
    }

    /// Produce the filtered dataset. Re-running the aggregation engine on the
    /// result is the dashboard's whole interaction loop.
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::chart_summaries;

    fn sample() -> Vec<Record> {
        vec![
            Record::from_fields([
                (fields::VIN, "1"),
                (fields::MAKE, "Tesla"),
                (fields::MODEL, "Model 3"),
                (fields::MODEL_YEAR, "2020"),
            ]),
            Record::from_fields([
                (fields::VIN, "2"),
                (fields::MAKE, "Tesla"),
                (fields::MODEL, "Model Y"),
                (fields::MODEL_YEAR, "2021"),
            ]),
            Record::from_fields([
                (fields::VIN, "3"),
                (fields::MAKE, "Nissan"),
                (fields::MODEL, "Leaf"),
                (fields::MODEL_YEAR, "2020"),
            ]),
        ]
    }

    #[test]
    fn default_filter_matches_everything() {
        let records = sample();
        assert_eq!(FilterSet::default().apply(&records), records);
    }

    #[test]
    fn empty_string_selection_is_inactive() {
        let filter = FilterSet {
            make: Some(String::new()),
            model_year: Some(String::new()),
            search: Some(String::new()),
        };
        let records = sample();
        assert_eq!(filter.apply(&records).len(), records.len());
    }

    #[test]
    fn filters_combine_conjunctively() {
        let records = sample();
        let combined = FilterSet {
            make: Some("Tesla".to_string()),
            model_year: Some("2020".to_string()),
            search: None,
        };

        // applying the two predicates one at a time must land on the same set
        let by_make = FilterSet {
            make: Some("Tesla".to_string()),
            ..Default::default()
        }
        .apply(&records);
        let sequential = FilterSet {
            model_year: Some("2020".to_string()),
            ..Default::default()
        }
        .apply(&by_make);

        let at_once = combined.apply(&records);
        assert_eq!(sequential, at_once);
        assert_eq!(at_once.len(), 1);
        assert_eq!(at_once[0].field(fields::MODEL), Some("Model 3"));
        assert_eq!(
            chart_summaries(&sequential),
            chart_summaries(&at_once)
        );
    }

    #[test]
    fn search_is_case_insensitive_over_make_or_model() {
        let records = sample();
        let by_make = FilterSet {
            search: Some("TESLA".to_string()),
            ..Default::default()
        };
        assert_eq!(by_make.apply(&records).len(), 2);

        let by_model = FilterSet {
            search: Some("leaf".to_string()),
            ..Default::default()
        };
        let matched = by_model.apply(&records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].field(fields::MAKE), Some("Nissan"));
    }

    #[test]
    fn search_misses_when_neither_field_contains_term() {
        let records = sample();
        let filter = FilterSet {
            search: Some("cybertruck".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&records).is_empty());
    }
}
