use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use super::topology::BrokerTopology;
use super::{BrokerTransport, Gateway, RequestError, ShardResponse, NO_BROKER};
use crate::broker::BrokerDetail;
use crate::protocol::error::Error as ProtocolError;
use crate::protocol::messages::{
    ListOffsetsRequest, ListOffsetsRequestPartition, ListOffsetsResponse,
    ListOffsetsResponsePartition, ListOffsetsResponseTopic, MetadataRequest, MetadataRequestTopic,
    MetadataResponse,
};

/// [`Gateway`] that routes every partition of a sharded request to its current leader.
///
/// Leaders are looked up with one metadata request per sharded call. Partitions without a
/// reachable leader are answered locally with a per-partition error instead of being dropped.
#[derive(Debug)]
pub struct ShardedGateway<T> {
    transport: T,
    topology: BrokerTopology,
    max_in_flight: Option<usize>,
}

impl<T> ShardedGateway<T>
where
    T: BrokerTransport,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            topology: BrokerTopology::default(),
            max_in_flight: None,
        }
    }

    /// Limits how many brokers are contacted concurrently during one sharded call.
    ///
    /// Unlimited by default.
    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = Some(max_in_flight.max(1));
        self
    }

    /// Brokers seen in the metadata responses so far.
    pub fn brokers(&self) -> Vec<BrokerDetail> {
        self.topology.get_brokers()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn lookup(&self, request: MetadataRequest) -> Result<MetadataResponse, RequestError> {
        let response = self.transport.metadata(&request).await?;
        self.topology.update(&response.brokers);
        Ok(response)
    }

    /// Splits `request` into one sub-request per leader plus the partitions that cannot be routed.
    fn split(
        &self,
        request: ListOffsetsRequest,
        metadata: &MetadataResponse,
    ) -> (BTreeMap<i32, ListOffsetsRequest>, Unroutable) {
        let routes = Routes::new(metadata);
        let mut by_leader = BTreeMap::new();
        let mut unroutable = Unroutable::new(request.empty_like());

        for topic in &request.topics {
            for partition in &topic.partitions {
                match routes.leader(&topic.name, partition.partition_index) {
                    Ok(leader) if self.topology.get_broker(leader).is_some() => {
                        by_leader
                            .entry(leader)
                            .or_insert_with(|| request.empty_like())
                            .push_partition(&topic.name, partition.clone());
                    }
                    Ok(leader) => {
                        debug!(
                            topic=%topic.name,
                            partition=partition.partition_index,
                            leader,
                            "Leader not in topology",
                        );
                        unroutable.push(&topic.name, partition, ProtocolError::LeaderNotAvailable);
                    }
                    Err(e) => unroutable.push(&topic.name, partition, e),
                }
            }
        }

        (by_leader, unroutable)
    }
}

#[async_trait]
impl<T> Gateway for ShardedGateway<T>
where
    T: BrokerTransport,
{
    async fn request(&self, request: MetadataRequest) -> Result<MetadataResponse, RequestError> {
        self.lookup(request).await
    }

    async fn request_sharded(
        &self,
        request: ListOffsetsRequest,
    ) -> Vec<ShardResponse<ListOffsetsRequest>> {
        if request.partition_count() == 0 {
            return vec![];
        }

        let mut names: Vec<_> = request.topics.iter().map(|t| t.name.clone()).collect();
        names.sort_unstable();
        names.dedup();
        let lookup = MetadataRequest {
            topics: Some(
                names
                    .into_iter()
                    .map(|name| MetadataRequestTopic { name })
                    .collect(),
            ),
            allow_auto_topic_creation: Some(false),
        };

        let metadata = match self.lookup(lookup).await {
            Ok(metadata) => metadata,
            Err(e) => {
                return vec![ShardResponse {
                    broker: NO_BROKER,
                    request,
                    result: Err(e),
                }]
            }
        };

        let (by_leader, unroutable) = self.split(request, &metadata);
        debug!(
            brokers = by_leader.len(),
            unroutable = unroutable.request.partition_count(),
            "Sharding ListOffsets request",
        );

        let mut shards = Vec::with_capacity(by_leader.len() + 1);
        if unroutable.request.partition_count() > 0 {
            shards.push(unroutable.into_shard());
        }

        let transport = &self.transport;
        let tasks = by_leader.into_iter().map(move |(broker, request)| async move {
            let result = transport.list_offsets(broker, &request).await;
            ShardResponse {
                broker,
                request,
                result,
            }
        });
        let max_in_flight = self.max_in_flight.unwrap_or(usize::MAX);
        shards.extend(
            futures::stream::iter(tasks)
                .buffer_unordered(max_in_flight)
                .collect::<Vec<_>>()
                .await,
        );

        shards
    }
}

/// Error and leader of every partition of a topic.
type PartitionRoutes = HashMap<i32, (Option<ProtocolError>, i32)>;

/// Partition leaders by topic, from one metadata response.
struct Routes<'a> {
    topics: HashMap<&'a str, (Option<ProtocolError>, PartitionRoutes)>,
}

impl<'a> Routes<'a> {
    fn new(metadata: &'a MetadataResponse) -> Self {
        let topics = metadata
            .topics
            .iter()
            .filter_map(|t| {
                let name = t.name.as_deref()?;
                let partitions = t
                    .partitions
                    .iter()
                    .map(|p| (p.partition_index, (p.error, p.leader_id)))
                    .collect();
                Some((name, (t.error, partitions)))
            })
            .collect();
        Self { topics }
    }

    fn leader(&self, topic: &str, partition: i32) -> Result<i32, ProtocolError> {
        let (topic_error, partitions) = self
            .topics
            .get(topic)
            .ok_or(ProtocolError::UnknownTopicOrPartition)?;
        if let Some(e) = topic_error {
            return Err(*e);
        }

        match partitions.get(&partition) {
            None => Err(ProtocolError::UnknownTopicOrPartition),
            Some((_, leader)) if *leader >= 0 => Ok(*leader),
            Some((err, _)) => Err(err.unwrap_or(ProtocolError::LeaderNotAvailable)),
        }
    }
}

/// Partitions answered locally because no broker can serve them.
struct Unroutable {
    request: ListOffsetsRequest,
    response: ListOffsetsResponse,
}

impl Unroutable {
    fn new(request: ListOffsetsRequest) -> Self {
        Self {
            request,
            response: ListOffsetsResponse::default(),
        }
    }

    fn push(&mut self, topic: &str, partition: &ListOffsetsRequestPartition, err: ProtocolError) {
        self.request.push_partition(topic, partition.clone());

        let answered = ListOffsetsResponsePartition {
            partition_index: partition.partition_index,
            error_code: Some(err),
            timestamp: Some(-1),
            offset: Some(-1),
            leader_epoch: Some(-1),
        };
        match self.response.topics.iter_mut().find(|t| t.name == topic) {
            Some(t) => t.partitions.push(answered),
            None => self.response.topics.push(ListOffsetsResponseTopic {
                name: topic.to_string(),
                partitions: vec![answered],
            }),
        }
    }

    fn into_shard(self) -> ShardResponse<ListOffsetsRequest> {
        ShardResponse {
            broker: NO_BROKER,
            request: self.request,
            result: Ok(self.response),
        }
    }
}
