//! Topics and partitions as described by a metadata response.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::protocol::error::Error as ProtocolError;

/// The 16 byte identifier of a topic.
///
/// All zeros when the cluster does not support topic IDs. Unlike the name, the ID survives
/// a delete-and-recreate cycle as a distinct value, so it can tell incarnations apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId(pub [u8; 16]);

impl TopicId {
    /// The all-zero ID reported by clusters without topic ID support.
    pub const ZERO: Self = Self([0; 16]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for TopicId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Standard base64.
impl Display for TopicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.0))
    }
}

#[derive(Debug, Error)]
pub enum ParseTopicIdError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Topic ID must be 16 bytes, got {0}")]
    Length(usize),
}

impl FromStr for TopicId {
    type Err = ParseTopicIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = STANDARD.decode(s)?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| ParseTopicIdError::Length(b.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TopicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Detail of one partition.
///
/// If the partition failed to load, only `topic`, `partition` and `err` are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDetail {
    /// The topic this partition belongs to.
    pub topic: String,

    /// The partition number.
    pub partition: i32,

    /// The ID of the leader broker, `-1` if there is none.
    pub leader: i32,

    /// The leader's current epoch.
    pub leader_epoch: i32,

    /// Brokers hosting a replica, ascending.
    pub replicas: Vec<i32>,

    /// Replicas in sync with the leader, ascending.
    pub isr: Vec<i32>,

    /// Offline replicas, ascending.
    pub offline_replicas: Vec<i32>,

    /// Set if the partition has a load error.
    pub err: Option<ProtocolError>,
}

impl PartitionDetail {
    /// Builds a loaded partition. Replica lists are sorted whatever order they come in.
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        leader: i32,
        leader_epoch: i32,
        replicas: Vec<i32>,
        isr: Vec<i32>,
        offline_replicas: Vec<i32>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition,
            leader,
            leader_epoch,
            replicas: sorted(replicas),
            isr: sorted(isr),
            offline_replicas: sorted(offline_replicas),
            err: None,
        }
    }

    /// Builds a partition that failed to load.
    ///
    /// Only topic, partition and error are kept. `leader` and `leader_epoch` are `-1`, the
    /// protocol's "no leader" and "unknown epoch" values, and the replica lists are empty.
    pub fn failed(topic: impl Into<String>, partition: i32, err: ProtocolError) -> Self {
        Self {
            topic: topic.into(),
            partition,
            leader: -1,
            leader_epoch: -1,
            replicas: vec![],
            isr: vec![],
            offline_replicas: vec![],
            err: Some(err),
        }
    }
}

fn sorted(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids
}

/// Partitions of a topic, keyed by partition number.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PartitionDetails(HashMap<i32, PartitionDetail>);

impl PartitionDetails {
    pub fn insert(&mut self, detail: PartitionDetail) -> Option<PartitionDetail> {
        self.0.insert(detail.partition, detail)
    }

    /// Partitions ascending by number.
    pub fn sorted(&self) -> Vec<&PartitionDetail> {
        let mut s: Vec<_> = self.0.values().collect();
        s.sort_unstable_by_key(|p| p.partition);
        s
    }

    /// Partition numbers, ascending.
    pub fn numbers(&self) -> Vec<i32> {
        sorted(self.0.keys().copied().collect())
    }
}

impl Deref for PartitionDetails {
    type Target = HashMap<i32, PartitionDetail>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<PartitionDetail> for PartitionDetails {
    fn from_iter<T: IntoIterator<Item = PartitionDetail>>(iter: T) -> Self {
        Self(iter.into_iter().map(|p| (p.partition, p)).collect())
    }
}

impl IntoIterator for PartitionDetails {
    type Item = (i32, PartitionDetail);
    type IntoIter = std::collections::hash_map::IntoIter<i32, PartitionDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Detail of one topic.
///
/// If the topic failed to load, `partitions` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDetail {
    /// The topic name, empty when the cluster only reported the ID.
    pub topic: String,

    pub id: TopicId,

    /// Whether the topic is internal to the cluster, such as the consumer offsets topic.
    pub is_internal: bool,

    pub partitions: PartitionDetails,

    /// Set if the topic could not be loaded.
    pub err: Option<ProtocolError>,
}

/// Topics keyed by name.
///
/// Topics reported only by ID share the empty name, so an insert replaces the previous ID-only
/// topic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopicDetails(HashMap<String, TopicDetail>);

impl TopicDetails {
    pub fn insert(&mut self, detail: TopicDetail) -> Option<TopicDetail> {
        self.0.insert(detail.topic.clone(), detail)
    }

    /// Topic names, lexicographically sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut all: Vec<_> = self.0.keys().map(String::as_str).collect();
        all.sort_unstable();
        all
    }

    /// Topics in name order; topics only known by ID come last, ordered by ID bytes.
    ///
    /// Since ID-only topics share the empty key there is at most one of them here. The ID
    /// ordering applies to lists sorted with the same order outside this map.
    pub fn sorted(&self) -> Vec<&TopicDetail> {
        let mut s: Vec<_> = self.0.values().collect();
        s.sort_by(|a, b| topic_order(a, b));
        s
    }

    /// Whether the topic is present and its load error is not "unknown topic".
    pub fn has(&self, topic: &str) -> bool {
        matches!(
            self.0.get(topic),
            Some(d) if d.err != Some(ProtocolError::UnknownTopicOrPartition)
        )
    }

    /// Removes internal topics.
    pub fn filter_internal(&mut self) {
        self.0.retain(|_, d| !d.is_internal);
    }
}

fn topic_order(a: &TopicDetail, b: &TopicDetail) -> Ordering {
    match (a.topic.is_empty(), b.topic.is_empty()) {
        (true, true) => a.id.cmp(&b.id),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.topic.cmp(&b.topic),
    }
}

impl Deref for TopicDetails {
    type Target = HashMap<String, TopicDetail>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<TopicDetail> for TopicDetails {
    fn from_iter<T: IntoIterator<Item = TopicDetail>>(iter: T) -> Self {
        Self(iter.into_iter().map(|t| (t.topic.clone(), t)).collect())
    }
}

impl IntoIterator for TopicDetails {
    type Item = (String, TopicDetail);
    type IntoIter = std::collections::hash_map::IntoIter<String, TopicDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn topic(name: &str, id: u8) -> TopicDetail {
        TopicDetail {
            topic: name.to_string(),
            id: TopicId([id; 16]),
            is_internal: false,
            partitions: PartitionDetails::default(),
            err: None,
        }
    }

    #[test]
    fn topic_id_base64() {
        assert_eq!(TopicId::ZERO.to_string(), "AAAAAAAAAAAAAAAAAAAAAA==");
        assert!(TopicId::ZERO.is_zero());

        let id: TopicId = "AQEBAQEBAQEBAQEBAQEBAQ==".parse().unwrap();
        assert_eq!(id, TopicId([1; 16]));
        assert!(!id.is_zero());
    }

    #[test]
    fn topic_id_parse_errors() {
        assert!(matches!(
            "not base64!".parse::<TopicId>(),
            Err(ParseTopicIdError::Base64(_))
        ));
        assert!(matches!(
            "AAAA".parse::<TopicId>(),
            Err(ParseTopicIdError::Length(3))
        ));
    }

    #[test]
    fn topic_id_json() {
        let id = TopicId([0xff; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"/////////////////////w==\"");
        assert_eq!(serde_json::from_str::<TopicId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<TopicId>("\"AAAA\"").is_err());
    }

    #[test]
    fn has_ignores_unknown_topics() {
        let mut unknown = topic("gone", 0);
        unknown.err = Some(ProtocolError::UnknownTopicOrPartition);
        let mut leaderless = topic("leaderless", 0);
        leaderless.err = Some(ProtocolError::LeaderNotAvailable);

        let topics: TopicDetails = [topic("a", 1), unknown, leaderless].into_iter().collect();

        assert!(topics.has("a"));
        assert!(topics.has("leaderless"));
        assert!(!topics.has("gone"));
        assert!(!topics.has("missing"));
    }

    #[test]
    fn sorted_puts_id_only_topics_last() {
        let mut all = vec![topic("b", 0), topic("", 9), topic("a", 5), topic("", 2)];
        all.sort_by(topic_order);
        let got: Vec<_> = all.iter().map(|t| (t.topic.as_str(), t.id.0[0])).collect();
        assert_eq!(got, vec![("a", 5), ("b", 0), ("", 2), ("", 9)]);
    }

    #[test]
    fn id_only_topics_share_the_empty_key() {
        let topics: TopicDetails = [topic("", 9), topic("a", 5), topic("", 2)]
            .into_iter()
            .collect();

        let got: Vec<_> = topics
            .sorted()
            .into_iter()
            .map(|t| (t.topic.as_str(), t.id.0[0]))
            .collect();
        assert_eq!(got, vec![("a", 5), ("", 2)]);
    }

    #[test]
    fn names_and_filter_internal() {
        let mut internal = topic("__consumer_offsets", 0);
        internal.is_internal = true;
        let mut topics: TopicDetails = [topic("z", 0), internal, topic("m", 0)]
            .into_iter()
            .collect();

        assert_eq!(topics.names(), vec!["__consumer_offsets", "m", "z"]);
        topics.filter_internal();
        assert_eq!(topics.names(), vec!["m", "z"]);
        assert_eq!(
            topics.sorted().iter().map(|t| t.topic.as_str()).collect::<Vec<_>>(),
            vec!["m", "z"]
        );
    }

    #[test]
    fn partitions_sorted_and_numbers() {
        let partitions: PartitionDetails = [2, 0, 1]
            .into_iter()
            .map(|p| PartitionDetail::new("t", p, 1, 0, vec![3, 1, 2], vec![2, 1], vec![]))
            .collect();

        assert_eq!(partitions.numbers(), vec![0, 1, 2]);
        assert_eq!(
            partitions.sorted().iter().map(|p| p.partition).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(partitions[&1].replicas, vec![1, 2, 3]);
    }

    #[test]
    fn failed_partition_is_zeroed() {
        let p = PartitionDetail::failed("t", 4, ProtocolError::LeaderNotAvailable);
        assert_eq!(p.partition, 4);
        assert_eq!(p.leader, -1);
        assert_eq!(p.leader_epoch, -1);
        assert!(p.replicas.is_empty());
        assert!(p.isr.is_empty());
        assert!(p.offline_replicas.is_empty());
        assert_eq!(p.err, Some(ProtocolError::LeaderNotAvailable));
    }

    proptest! {
        #[test]
        fn topic_id_roundtrip(bytes in any::<[u8; 16]>()) {
            let id = TopicId(bytes);
            prop_assert_eq!(id.to_string().parse::<TopicId>().unwrap(), id);
        }

        #[test]
        fn replica_lists_are_sorted(
            replicas in prop::collection::vec(any::<i32>(), 0..16),
            isr in prop::collection::vec(any::<i32>(), 0..16),
            offline in prop::collection::vec(any::<i32>(), 0..16),
        ) {
            let p = PartitionDetail::new("t", 0, -1, 0, replicas, isr, offline);
            for list in [&p.replicas, &p.isr, &p.offline_replicas] {
                prop_assert!(list.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        #[test]
        fn sorted_named_before_id_only(
            names in prop::collection::vec("[a-c]{0,3}", 0..12),
        ) {
            let all: Vec<_> = names
                .iter()
                .enumerate()
                .map(|(i, n)| topic(n, i as u8))
                .collect();
            let mut s = all.clone();
            s.sort_by(topic_order);

            let first_empty = s.iter().position(|t| t.topic.is_empty()).unwrap_or(s.len());
            prop_assert!(s[first_empty..].iter().all(|t| t.topic.is_empty()));
            prop_assert!(s[..first_empty].windows(2).all(|w| w[0].topic <= w[1].topic));
            prop_assert!(s[first_empty..].windows(2).all(|w| w[0].id <= w[1].id));
        }

        #[test]
        fn details_sorted_by_name_id_only_last(
            names in prop::collection::btree_set("[a-c]{1,3}", 0..8),
            id_only in prop::option::of(any::<u8>()),
        ) {
            let mut details: TopicDetails = names
                .iter()
                .enumerate()
                .map(|(i, n)| topic(n, i as u8))
                .collect();
            if let Some(id) = id_only {
                details.insert(topic("", id));
            }

            let got: Vec<_> = details.sorted().into_iter().map(|t| t.topic.as_str()).collect();
            let mut want: Vec<_> = names.iter().map(String::as_str).collect();
            if id_only.is_some() {
                want.push("");
            }
            prop_assert_eq!(got, want);
        }
    }
}
