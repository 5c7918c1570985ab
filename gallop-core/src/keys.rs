//! Cache key naming.
//!
//! Every cached view has exactly one key. Topic keys use the normalized
//! topic, so differently-cased requests share one entry.

use std::fmt;

use crate::topic::Topic;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    IdeologyByTopic(Topic),
    IdeologyTopics,
    CongressMembers,
    MemberProportions,
    CombinedData,
    StatesTopojson,
    DistrictsTopojson,
}

impl CacheKey {
    /// Short label used for metrics; never includes the topic.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::IdeologyByTopic(_) => "ideology_by_topic",
            CacheKey::IdeologyTopics => "ideology_topics",
            CacheKey::CongressMembers => "congress_members",
            CacheKey::MemberProportions => "member_proportions",
            CacheKey::CombinedData => "combined_data",
            CacheKey::StatesTopojson => "us_states_topojson",
            CacheKey::DistrictsTopojson => "us_districts_topojson",
        }
    }

    /// [`kind`](Self::kind) recovered from a rendered key string.
    pub fn kind_of(key: &str) -> &'static str {
        if key.starts_with("ideology_data_") {
            return "ideology_by_topic";
        }
        match key {
            "ideology_topics" => "ideology_topics",
            "congress_members" => "congress_members",
            "congress_members_with_proportions" => "member_proportions",
            "combined_data" => "combined_data",
            "us_states_topojson" => "us_states_topojson",
            "us_districts_topojson" => "us_districts_topojson",
            _ => "other",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::IdeologyByTopic(topic) => write!(f, "ideology_data_{}", topic),
            CacheKey::IdeologyTopics => f.write_str("ideology_topics"),
            CacheKey::CongressMembers => f.write_str("congress_members"),
            CacheKey::MemberProportions => f.write_str("congress_members_with_proportions"),
            CacheKey::CombinedData => f.write_str("combined_data"),
            CacheKey::StatesTopojson => f.write_str("us_states_topojson"),
            CacheKey::DistrictsTopojson => f.write_str("us_districts_topojson"),
        }
    }
}
