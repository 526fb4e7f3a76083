//! Chart summaries over a parsed dataset.
//!
//! Every operation here is a pure fold over an immutable slice of records:
//! callers can re-run any of them on any filtered subset and get the same
//! shapes back. Records without a VIN are dropped once, up front, and that
//! filtered view is shared by all six reference summaries.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::records::{fields, Record};

/// Ranked averages are cut to the ten highest groups.
pub const RANKED_GROUP_LIMIT: usize = 10;

/// Category -> count, preserving first-seen category order so the client
/// renders chart segments in reduction order rather than alphabetically.
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCount {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl CategoryCount {
    fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts; equals the number of records folded in.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order.iter().map(|k| (k.as_str(), self.counts[k]))
    }
}

impl Serialize for CategoryCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for key in &self.order {
            map.serialize_entry(key, &self.counts[key])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = CategoryCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = CategoryCount::default();
                while let Some((key, count)) = access.next_entry::<String, u64>()? {
                    out.order.push(key.clone());
                    out.counts.insert(key, count);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(CountVisitor)
    }
}

/// One entry of a ranked-average summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub group: String,
    pub average: f64,
}

/// The six independent summaries the dashboard charts are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummaries {
    pub make_count: CategoryCount,
    pub ev_type_count: CategoryCount,
    pub city_count: CategoryCount,
    pub year_distribution: CategoryCount,
    pub avg_electric_range_by_make: Vec<GroupAverage>,
    pub cafv_eligibility: CategoryCount,
}

/// Count records per value of `field`. Records with the field absent are
/// counted under [`fields::ABSENT`], never skipped, so the total always
/// equals the number of records given.
pub fn count_by<'a, I>(records: I, field: &str) -> CategoryCount
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts = CategoryCount::default();
    for record in records {
        counts.increment(record.field(field).unwrap_or(fields::ABSENT));
    }
    counts
}

/// Average `numeric_field` per value of `group_field`, ranked descending and
/// cut to the top [`RANKED_GROUP_LIMIT`] groups.
///
/// A value that does not parse as an integer contributes 0 to its group's sum
/// but still raises the count, so one bad cell drags an average down rather
/// than failing the computation. Equal averages keep first-encountered group
/// order (stable sort).
pub fn average_by_group<'a, I>(records: I, group_field: &str, numeric_field: &str) -> Vec<GroupAverage>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (i64, u64)> = HashMap::new();

    for record in records {
        let group = record.field(group_field).unwrap_or(fields::ABSENT);
        let value: i64 = record
            .field(numeric_field)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        match sums.get_mut(group) {
            Some((sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => {
                order.push(group.to_string());
                sums.insert(group.to_string(), (value, 1));
            }
        }
    }

    let mut ranked: Vec<GroupAverage> = order
        .into_iter()
        .map(|group| {
            let (sum, count) = sums[&group];
            GroupAverage {
                group,
                average: sum as f64 / count as f64,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(RANKED_GROUP_LIMIT);
    ranked
}

/// Unique values of `field` in first-occurrence order; absent values are
/// skipped. Feeds the dashboard's filter dropdowns.
pub fn distinct_values<'a, I>(records: I, field: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in records {
        if let Some(value) = record.field(field) {
            if seen.insert(value.to_string()) {
                values.push(value.to_string());
            }
        }
    }
    values
}

/// Compute all six reference summaries in one pass over the valid records.
///
/// The summaries only share read access to the filtered slice, so they run
/// on the rayon pool in parallel.
pub fn chart_summaries(records: &[Record]) -> ChartSummaries {
    let valid: Vec<&Record> = records.iter().filter(|r| r.has_vin()).collect();

    let ((make_count, ev_type_count), (city_count, year_distribution)) = rayon::join(
        || {
            rayon::join(
                || count_by(valid.iter().copied(), fields::MAKE),
                || count_by(valid.iter().copied(), fields::EV_TYPE),
            )
        },
        || {
            rayon::join(
                || count_by(valid.iter().copied(), fields::CITY),
                || count_by(valid.iter().copied(), fields::MODEL_YEAR),
            )
        },
    );
    let (avg_electric_range_by_make, cafv_eligibility) = rayon::join(
        || average_by_group(valid.iter().copied(), fields::MAKE, fields::ELECTRIC_RANGE),
        || count_by(valid.iter().copied(), fields::CAFV_ELIGIBILITY),
    );

    ChartSummaries {
        make_count,
        ev_type_count,
        city_count,
        year_distribution,
        avg_electric_range_by_make,
        cafv_eligibility,
    }
}
