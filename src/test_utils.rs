//! Canned gateway for unit tests of the admin calls.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing_subscriber::util::SubscriberInitExt;

use crate::connection::{Gateway, RequestError, ShardResponse};
use crate::protocol::error::Error as ProtocolError;
use crate::protocol::messages::{
    ListOffsetsRequest, ListOffsetsResponse, ListOffsetsResponsePartition,
    ListOffsetsResponseTopic, MetadataRequest, MetadataResponse, MetadataResponseBroker,
    MetadataResponsePartition, MetadataResponseTopic,
};

/// How the mock answers a sharded request.
pub(crate) type Sharder = fn(ListOffsetsRequest) -> Vec<ShardResponse<ListOffsetsRequest>>;

#[derive(Debug)]
pub(crate) struct MockGateway {
    pub(crate) metadata: MetadataResponse,
    pub(crate) metadata_error: Mutex<Option<RequestError>>,
    pub(crate) sharder: Sharder,
    pub(crate) delay: Option<Duration>,
    pub(crate) shard_delay: Option<Duration>,
    pub(crate) metadata_requests: Mutex<Vec<MetadataRequest>>,
    pub(crate) sharded_requests: Mutex<Vec<ListOffsetsRequest>>,
}

impl MockGateway {
    pub(crate) fn new(metadata: MetadataResponse) -> Self {
        Self {
            metadata,
            metadata_error: Mutex::new(None),
            sharder: answer_all,
            delay: None,
            shard_delay: None,
            metadata_requests: Mutex::new(vec![]),
            sharded_requests: Mutex::new(vec![]),
        }
    }

    pub(crate) fn with_sharder(mut self, sharder: Sharder) -> Self {
        self.sharder = sharder;
        self
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn request(&self, request: MetadataRequest) -> Result<MetadataResponse, RequestError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = self.metadata_error.lock().take() {
            return Err(e);
        }

        let names: Vec<_> = request.topic_names().map(str::to_string).collect();
        self.metadata_requests.lock().push(request);

        let mut response = self.metadata.clone();
        if !names.is_empty() {
            response
                .topics
                .retain(|t| t.name.as_ref().is_some_and(|n| names.contains(n)));
            for name in names {
                if !response.topics.iter().any(|t| t.name.as_ref() == Some(&name)) {
                    response.topics.push(MetadataResponseTopic {
                        error: Some(ProtocolError::UnknownTopicOrPartition),
                        name: Some(name),
                        ..Default::default()
                    });
                }
            }
        }
        Ok(response)
    }

    async fn request_sharded(
        &self,
        request: ListOffsetsRequest,
    ) -> Vec<ShardResponse<ListOffsetsRequest>> {
        self.sharded_requests.lock().push(request.clone());
        if let Some(delay) = self.shard_delay {
            tokio::time::sleep(delay).await;
        }
        (self.sharder)(request)
    }
}

/// One shard answering every partition with `offset = partition * 10`.
pub(crate) fn answer_all(request: ListOffsetsRequest) -> Vec<ShardResponse<ListOffsetsRequest>> {
    let response = answer(&request, |_, _| None);
    vec![ShardResponse {
        broker: 1,
        request,
        result: Ok(response),
    }]
}

/// Answers every partition of `request`, with the error `error_for` picks.
pub(crate) fn answer<F>(request: &ListOffsetsRequest, error_for: F) -> ListOffsetsResponse
where
    F: Fn(&str, i32) -> Option<ProtocolError>,
{
    ListOffsetsResponse {
        throttle_time_ms: None,
        topics: request
            .topics
            .iter()
            .map(|t| ListOffsetsResponseTopic {
                name: t.name.clone(),
                partitions: t
                    .partitions
                    .iter()
                    .map(|p| ListOffsetsResponsePartition {
                        partition_index: p.partition_index,
                        error_code: error_for(&t.name, p.partition_index),
                        timestamp: Some(-1),
                        offset: Some(i64::from(p.partition_index) * 10),
                        leader_epoch: Some(0),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub(crate) fn broker(node_id: i32) -> MetadataResponseBroker {
    MetadataResponseBroker {
        node_id,
        host: format!("kafka-{node_id}"),
        port: 9092,
        rack: None,
    }
}

/// A healthy topic whose partition `p` is led by broker `p % 3 + 1`.
pub(crate) fn topic(name: &str, partitions: i32) -> MetadataResponseTopic {
    MetadataResponseTopic {
        error: None,
        name: Some(name.to_string()),
        topic_id: [name.len() as u8; 16],
        is_internal: Some(false),
        partitions: (0..partitions)
            .map(|partition_index| MetadataResponsePartition {
                error: None,
                partition_index,
                leader_id: partition_index % 3 + 1,
                leader_epoch: Some(5),
                replica_nodes: vec![3, 1, 2],
                isr_nodes: vec![2, 1],
                offline_replicas: vec![3],
            })
            .collect(),
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber on this thread and returns what it logged at info and above.
pub(crate) fn capture_logs<F, R>(f: F) -> (R, String)
where
    F: FnOnce() -> R,
{
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let result = {
        let _guard = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish()
            .set_default();
        f()
    };

    let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    (result, logs)
}
