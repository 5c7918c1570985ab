//! GALLOP Core - Records, Topics and Aggregation
//!
//! Pure data structures and the topic aggregator. No I/O lives here:
//! records arrive already fetched, and results leave as plain values for
//! the cache layer in `gallop-storage` to persist.

pub mod aggregate;
pub mod error;
pub mod keys;
pub mod record;
pub mod topic;

pub use aggregate::{count_by_topic, list_topics, StateCount};
pub use error::{CacheError, GallopError, GallopResult, LabelParseError, StorageError};
pub use keys::CacheKey;
pub use record::{parse_label_text, LabelField, RawRecord, Record};
pub use topic::Topic;
