//! Per-partition offsets returned by the offset listing calls.

use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::protocol::error::Error as ProtocolError;
use crate::protocol::messages::{IsolationLevel, EARLIEST_TIMESTAMP, LATEST_TIMESTAMP};

/// Which offset to list for every partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetQuery {
    /// The oldest retained offset, also known as the log start offset.
    Start,

    /// The newest offset, also known as the high watermark.
    End,

    /// The newest offset outside of open transactions, also known as the last stable offset.
    Committed,

    /// The first offset whose record timestamp is at or after the given unix milliseconds.
    After(i64),
}

impl OffsetQuery {
    /// Query for the first offset at or after `time`.
    pub fn after_time(time: DateTime<Utc>) -> Self {
        Self::After(time.timestamp_millis())
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        match self {
            Self::Committed => IsolationLevel::ReadCommitted,
            Self::Start | Self::End | Self::After(_) => IsolationLevel::ReadUncommitted,
        }
    }

    /// The timestamp sent for every partition, including the `-1` / `-2` sentinels.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Start => EARLIEST_TIMESTAMP,
            Self::End | Self::Committed => LATEST_TIMESTAMP,
            Self::After(ts) => *ts,
        }
    }
}

/// Offset information of one partition.
///
/// If `err` is set, only `topic` and `partition` are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedOffset {
    pub topic: String,
    pub partition: i32,

    /// Timestamp of the returned record when listing after a time, otherwise `-1`.
    pub timestamp: i64,

    /// The record offset, `-1` if none was found.
    pub offset: i64,

    /// The leader epoch at this offset, `-1` if unknown.
    pub leader_epoch: i32,

    pub err: Option<ProtocolError>,
}

/// Listed offsets keyed by topic, then partition.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListedOffsets(HashMap<String, HashMap<i32, ListedOffset>>);

impl ListedOffsets {
    /// Stores an offset, handing back the one it displaced.
    pub fn insert(&mut self, offset: ListedOffset) -> Option<ListedOffset> {
        self.0
            .entry(offset.topic.clone())
            .or_default()
            .insert(offset.partition, offset)
    }

    pub fn lookup(&self, topic: &str, partition: i32) -> Option<&ListedOffset> {
        self.0.get(topic).and_then(|ps| ps.get(&partition))
    }

    /// All offsets of all topics, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ListedOffset> {
        self.0.values().flat_map(|ps| ps.values())
    }

    pub fn each<F>(&self, f: F)
    where
        F: FnMut(&ListedOffset),
    {
        self.iter().for_each(f)
    }

    /// Total number of partitions.
    pub fn partition_count(&self) -> usize {
        self.0.values().map(HashMap::len).sum()
    }
}

impl Deref for ListedOffsets {
    type Target = HashMap<String, HashMap<i32, ListedOffset>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn listed(topic: &str, partition: i32, offset: i64) -> ListedOffset {
        ListedOffset {
            topic: topic.to_string(),
            partition,
            timestamp: -1,
            offset,
            leader_epoch: 0,
            err: None,
        }
    }

    #[test]
    fn query_sentinels() {
        assert_eq!(OffsetQuery::Start.timestamp(), -2);
        assert_eq!(OffsetQuery::End.timestamp(), -1);
        assert_eq!(OffsetQuery::Committed.timestamp(), -1);
        assert_eq!(OffsetQuery::After(1_500).timestamp(), 1_500);

        assert_eq!(
            OffsetQuery::Committed.isolation_level(),
            IsolationLevel::ReadCommitted
        );
        for q in [OffsetQuery::Start, OffsetQuery::End, OffsetQuery::After(0)] {
            assert_eq!(q.isolation_level(), IsolationLevel::ReadUncommitted);
        }
    }

    #[test]
    fn after_time_uses_millis() {
        let t = Utc.timestamp_millis_opt(1_477_920_049_286).unwrap();
        assert_eq!(OffsetQuery::after_time(t), OffsetQuery::After(1_477_920_049_286));
    }

    #[test]
    fn insert_and_traverse() {
        let mut offsets = ListedOffsets::default();
        assert!(offsets.insert(listed("a", 0, 10)).is_none());
        assert!(offsets.insert(listed("a", 1, 11)).is_none());
        assert!(offsets.insert(listed("b", 0, 20)).is_none());
        assert_eq!(offsets.insert(listed("b", 0, 21)).unwrap().offset, 20);

        assert_eq!(offsets.partition_count(), 3);
        assert_eq!(offsets.lookup("a", 1).unwrap().offset, 11);
        assert!(offsets.lookup("a", 2).is_none());

        let mut seen = vec![];
        offsets.each(|o| seen.push((o.topic.clone(), o.partition, o.offset)));
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 0, 10),
                ("a".to_string(), 1, 11),
                ("b".to_string(), 0, 21)
            ]
        );
    }
}
