//! GALLOP Test Utilities
//!
//! Shared test infrastructure for the GALLOP workspace:
//! - Proptest generators for records and label payloads
//! - Fixtures for the common aggregation scenarios
//! - Assertions for aggregation results

pub use gallop_core::{
    count_by_topic, list_topics, LabelField, RawRecord, Record, StateCount, Topic,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for records, topics and stored label payloads.

    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    /// Two-letter state codes, kept small so generated records collide.
    pub fn arb_state() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["CA", "TX", "NY", "FL", "WA", "OH"]).prop_map(str::to_string)
    }

    /// Labels drawn from a fixed vocabulary with random case and padding.
    pub fn arb_label() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["Health", "Crime", "Economy", "Education", "Immigration"]),
            any::<bool>(),
            prop::sample::select(vec!["", " ", "  "]),
        )
            .prop_map(|(label, upper, pad)| {
                let label = if upper {
                    label.to_uppercase()
                } else {
                    label.to_string()
                };
                format!("{pad}{label}{pad}")
            })
    }

    pub fn arb_labels() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_label(), 0..4)
    }

    pub fn arb_topic() -> impl Strategy<Value = Topic> {
        arb_label().prop_map(Topic::new)
    }

    pub fn arb_record() -> impl Strategy<Value = Record> {
        (arb_state(), arb_labels()).prop_map(|(state, labels)| Record::new(state, labels))
    }

    pub fn arb_records() -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(arb_record(), 0..40)
    }

    /// One label list in every stored shape it can take.
    ///
    /// Every variant decodes to the same labels.
    pub fn arb_label_value_for(labels: Vec<String>) -> impl Strategy<Value = Value> {
        let array = json!(labels);
        let double_quoted = Value::String(array.to_string());
        let single_quoted = Value::String(array.to_string().replace('"', "'"));
        prop_oneof![Just(array), Just(double_quoted), Just(single_quoted)]
    }

    /// Label payloads that can never decode to labels.
    pub fn arb_garbage_label_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(json!(42)),
            Just(json!({"label": "Health"})),
            Just(json!("")),
            Just(json!("   ")),
            Just(json!("\"Health\"")),
            "[a-z]{1,12}".prop_map(Value::String),
        ]
    }

    /// Raw rows whose label field is a well-formed list in any stored shape.
    pub fn arb_raw_record() -> impl Strategy<Value = RawRecord> {
        (arb_state(), arb_labels()).prop_flat_map(|(state, labels)| {
            arb_label_value_for(labels)
                .prop_map(move |value| RawRecord::new(state.clone(), LabelField::from_json(value)))
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built record sets for common scenarios.

    use super::*;
    use serde_json::json;

    /// Two matching CA records and an unlabeled TX record.
    pub fn health_records() -> Vec<Record> {
        vec![
            Record::new("CA", ["Health"]),
            Record::new("CA", ["Health", "Crime"]),
            Record::new("TX", Vec::<String>::new()),
        ]
    }

    /// The same labels as a real array and as a single-quoted string.
    pub fn mixed_shape_rows() -> Vec<RawRecord> {
        vec![
            RawRecord::new("CA", json!(["Health", "Crime"])),
            RawRecord::new("CA", json!("['Health', 'Crime']")),
            RawRecord::new("NY", json!("[\"Economy\"]")),
            RawRecord::new("TX", json!(null)),
            RawRecord::new("WA", json!("not-a-list")),
        ]
    }

    pub fn mixed_shape_records() -> Vec<Record> {
        mixed_shape_rows()
            .into_iter()
            .map(RawRecord::normalize)
            .collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over aggregation output.

    use super::*;

    /// Assert the count for `state`, treating an absent state as zero.
    #[track_caller]
    pub fn assert_state_count(counts: &[StateCount], state: &str, expected: u64) {
        let actual = counts
            .iter()
            .find(|c| c.state == state)
            .map(|c| c.count)
            .unwrap_or(0);
        assert_eq!(actual, expected, "Wrong count for {}: {:?}", state, counts);
    }

    /// Assert no state appears twice and no count is zero.
    #[track_caller]
    pub fn assert_well_formed_counts(counts: &[StateCount]) {
        let mut seen = std::collections::HashSet::new();
        for c in counts {
            assert!(seen.insert(c.state.as_str()), "Duplicate state {}", c.state);
            assert!(c.count > 0, "Zero count emitted for {}", c.state);
        }
    }

    /// Assert a topic list is strictly ascending (sorted and unique).
    #[track_caller]
    pub fn assert_sorted_unique(topics: &[String]) {
        for pair in topics.windows(2) {
            assert!(pair[0] < pair[1], "Not sorted/unique: {:?}", topics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_health_fixture_counts() {
        let counts = count_by_topic(&Topic::new("health"), &health_records());
        assert_eq!(counts.len(), 1);
        assert_state_count(&counts, "CA", 2);
        assert_state_count(&counts, "TX", 0);
    }

    #[test]
    fn test_mixed_shapes_decode_alike() {
        let records = mixed_shape_records();
        assert_eq!(records[0].labels, records[1].labels);
        assert!(records[3].labels.is_empty());
        assert!(records[4].labels.is_empty());
        assert_sorted_unique(&list_topics(&records));
    }

    mod properties {
        use crate::generators::*;
        use super::*;
        use proptest::prelude::*;

        fn arb_garbage_row() -> impl Strategy<Value = RawRecord> {
            (arb_state(), arb_garbage_label_value())
                .prop_map(|(state, value)| RawRecord::new(state, LabelField::from_json(value)))
        }

        proptest! {
            #[test]
            fn unparsable_rows_change_nothing(
                clean in prop::collection::vec(arb_raw_record(), 0..20),
                garbage in prop::collection::vec(arb_garbage_row(), 1..10),
                topic in arb_topic(),
            ) {
                let clean: Vec<Record> = clean.into_iter().map(RawRecord::normalize).collect();
                let mixed: Vec<Record> = clean
                    .iter()
                    .cloned()
                    .chain(garbage.into_iter().map(RawRecord::normalize))
                    .collect();

                let counts = count_by_topic(&topic, &mixed);
                assert_well_formed_counts(&counts);
                prop_assert_eq!(&counts, &count_by_topic(&topic, &clean));

                let topics = list_topics(&mixed);
                assert_sorted_unique(&topics);
                prop_assert_eq!(topics, list_topics(&clean));
            }

            #[test]
            fn every_stored_shape_decodes_alike(
                (labels, value) in arb_labels()
                    .prop_flat_map(|labels| (Just(labels.clone()), arb_label_value_for(labels))),
            ) {
                let decoded = RawRecord::new("CA", LabelField::from_json(value)).normalize();
                prop_assert_eq!(decoded, Record::new("CA", labels));
            }
        }
    }
}
