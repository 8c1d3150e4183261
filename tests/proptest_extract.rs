//! Property-Based Tests — Extractor Invariants
//!
//! Uses `proptest` to verify that extraction is partial rather than
//! all-or-nothing, and that document layout does not change results.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

use ultrahuman_poller::domain::{Extractor, MetricName, QueryWindow, RawReading, TimezonePolicy};

fn window() -> QueryWindow {
    QueryWindow::ending_on(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), 0)
}

/// Nested document: `{ "<category>": { "<name>": value } }`.
fn nested(fields: &[(MetricName, f64)]) -> Value {
    let mut root = Map::new();
    for (metric, value) in fields {
        root.entry(metric.category().key())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .unwrap()
            .insert(metric.as_str().to_string(), json!(value));
    }
    Value::Object(root)
}

/// Flat daily_data document for the window's end date.
fn flat(fields: &[(MetricName, f64)]) -> Value {
    let record: Map<String, Value> = fields
        .iter()
        .map(|(metric, value)| (metric.as_str().to_string(), json!(value)))
        .collect();
    json!({ "data": { "daily_data": { "2024-06-03": record } } })
}

fn present_fields() -> impl Strategy<Value = Vec<(MetricName, f64)>> {
    (
        proptest::collection::btree_set(0usize..16, 0..=16),
        proptest::collection::vec(-1.0e6f64..1.0e6, 16),
    )
        .prop_map(|(indices, values): (BTreeSet<usize>, Vec<f64>)| {
            indices
                .into_iter()
                .map(|i| (MetricName::ALL[i], values[i]))
                .collect()
        })
}

proptest! {
    /// Exactly the present metrics come out, with their values.
    #[test]
    fn extracts_exactly_present_fields(fields in present_fields()) {
        let extractor = Extractor::new(TimezonePolicy::Utc);
        let points = extractor.extract(&RawReading::new(nested(&fields), window()));

        let got: Vec<_> = points.iter().map(|p| (p.name, p.value)).collect();
        prop_assert_eq!(got, fields);
    }

    /// Removing one metric removes only that metric's point.
    #[test]
    fn missing_field_only_drops_itself(fields in present_fields(), drop_idx in 0usize..16) {
        let dropped = MetricName::ALL[drop_idx];
        let kept: Vec<_> = fields.iter().copied().filter(|(m, _)| *m != dropped).collect();

        let extractor = Extractor::new(TimezonePolicy::Utc);
        let points = extractor.extract(&RawReading::new(nested(&kept), window()));

        prop_assert!(points.iter().all(|p| p.name != dropped));
        prop_assert_eq!(points.len(), kept.len());
    }

    /// Flat and nested layouts carry the same metrics.
    #[test]
    fn flat_and_nested_layouts_agree(fields in present_fields()) {
        let extractor = Extractor::new(TimezonePolicy::Utc);
        let from_nested = extractor.extract(&RawReading::new(nested(&fields), window()));
        let from_flat = extractor.extract(&RawReading::new(flat(&fields), window()));
        prop_assert_eq!(from_nested, from_flat);
    }

    /// Arbitrary scalar documents never produce points or panic.
    #[test]
    fn scalar_documents_yield_nothing(s in ".*", n in any::<i64>()) {
        let extractor = Extractor::default();
        prop_assert!(extractor.extract(&RawReading::new(json!(s), window())).is_empty());
        prop_assert!(extractor.extract(&RawReading::new(json!(n), window())).is_empty());
        prop_assert!(extractor.extract(&RawReading::new(json!([s, n]), window())).is_empty());
    }
}

#[test]
fn every_metric_alone_yields_one_point() {
    let extractor = Extractor::new(TimezonePolicy::Utc);
    for metric in MetricName::ALL {
        let points = extractor.extract(&RawReading::new(nested(&[(metric, 7.5)]), window()));
        assert_eq!(points.len(), 1, "{metric}");
        assert_eq!(points[0].name, metric);
        assert!((points[0].value - 7.5).abs() < f64::EPSILON);
    }
}
