//! Topic aggregation over normalized records.
//!
//! Both views are a single linear scan of the record set. They are the
//! expensive path the cache-aside layer exists to avoid.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::topic::Topic;

/// Number of records in a state whose labels contain a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StateCount {
    pub state: String,
    pub count: u64,
}

impl StateCount {
    pub fn new(state: impl Into<String>, count: u64) -> Self {
        Self {
            state: state.into(),
            count,
        }
    }
}

/// Count matching records per state.
///
/// A record matches when any of its labels equals `topic` case-insensitively.
/// States without a match are omitted. Entries come out in the order each
/// state first matched.
pub fn count_by_topic(topic: &Topic, records: &[Record]) -> Vec<StateCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<StateCount> = Vec::new();

    for record in records {
        if !record.labels.iter().any(|label| topic.matches(label)) {
            continue;
        }
        match index.get(record.state.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(record.state.as_str(), counts.len());
                counts.push(StateCount {
                    state: record.state.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// Every distinct trimmed label, sorted ascending.
pub fn list_topics(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.labels.iter())
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use serde_json::json;

    fn scenario_records() -> Vec<Record> {
        vec![
            Record::new("CA", ["Health"]),
            Record::new("CA", ["Health", "Crime"]),
            Record::new("TX", Vec::<String>::new()),
        ]
    }

    #[test]
    fn test_count_by_topic_case_insensitive() {
        let counts = count_by_topic(&Topic::new("health"), &scenario_records());
        assert_eq!(
            counts,
            vec![StateCount {
                state: "CA".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_count_by_topic_first_occurrence_order() {
        let records = vec![
            Record::new("NY", ["Crime"]),
            Record::new("CA", ["crime"]),
            Record::new("NY", [" CRIME "]),
        ];
        let counts = count_by_topic(&Topic::new("Crime"), &records);
        let states: Vec<_> = counts.iter().map(|c| c.state.as_str()).collect();
        assert_eq!(states, vec!["NY", "CA"]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_count_by_topic_no_match() {
        assert!(count_by_topic(&Topic::new("Education"), &scenario_records()).is_empty());
    }

    #[test]
    fn test_single_quoted_payload_counts_like_array() {
        let quoted = vec![RawRecord::new("CA", json!("['Health', 'Crime']")).normalize()];
        let array = vec![RawRecord::new("CA", json!(["Health", "Crime"])).normalize()];
        let topic = Topic::new("crime");
        assert_eq!(count_by_topic(&topic, &quoted), count_by_topic(&topic, &array));
        assert_eq!(list_topics(&quoted), list_topics(&array));
    }

    #[test]
    fn test_unparsable_record_contributes_nothing() {
        let records = vec![
            RawRecord::new("CA", json!("Health, Crime")).normalize(),
            Record::new("TX", ["Health"]),
        ];
        let counts = count_by_topic(&Topic::new("health"), &records);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].state, "TX");
        assert_eq!(list_topics(&records), vec!["Health"]);
    }

    #[test]
    fn test_list_topics_sorted_unique() {
        let topics = list_topics(&scenario_records());
        assert_eq!(topics, vec!["Crime", "Health"]);
    }

    #[test]
    fn test_list_topics_empty() {
        assert!(list_topics(&[]).is_empty());
    }

    #[test]
    fn test_blank_labels_are_dropped() {
        let records = vec![
            RawRecord::new("CA", json!(["", "  ", "Health"])).normalize(),
            RawRecord::new("TX", json!("['', ' ']")).normalize(),
        ];
        assert_eq!(records[0].labels, vec!["Health"]);
        assert!(records[1].labels.is_empty());
        assert_eq!(list_topics(&records), vec!["Health"]);
        assert!(count_by_topic(&Topic::new(""), &records).is_empty());
    }

    #[test]
    fn test_list_topics_keeps_case_variants() {
        let records = vec![Record::new("CA", ["health", "Health"])];
        assert_eq!(list_topics(&records), vec!["Health", "health"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_records() -> impl Strategy<Value = Vec<Record>> {
            let state = prop::sample::select(vec!["CA", "TX", "NY"]);
            let label = prop::sample::select(vec!["Health", "health ", "Crime", "ECONOMY"]);
            prop::collection::vec(
                (state, prop::collection::vec(label, 0..3))
                    .prop_map(|(state, labels)| Record::new(state, labels)),
                0..30,
            )
        }

        proptest! {
            #[test]
            fn counts_sum_to_matching_records(records in arb_records()) {
                let topic = Topic::new("HEALTH");
                let counts = count_by_topic(&topic, &records);
                let matching = records
                    .iter()
                    .filter(|r| r.labels.iter().any(|l| topic.matches(l)))
                    .count() as u64;

                prop_assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), matching);
                prop_assert!(counts.iter().all(|c| c.count > 0));
            }

            #[test]
            fn topics_strictly_ascending(records in arb_records()) {
                let topics = list_topics(&records);
                prop_assert!(topics.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
