use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

pub use crate::connection::RequestError;
pub use crate::protocol::error::Error as ProtocolError;

use crate::offsets::ListedOffsets;
use crate::protocol::api_key::ApiKey;
use crate::protocol::messages::ListOffsetsRequest;

/// The entity a server error was reported for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestContext {
    /// A topic.
    Topic(String),

    /// A specific partition of a topic.
    Partition(String, i32),
}

impl Display for RequestContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Topic(topic) => write!(f, "topic '{topic}'"),
            Self::Partition(topic, partition) => write!(f, "partition {partition} of topic '{topic}'"),
        }
    }
}

/// One broker that failed to answer its part of a sharded request.
#[derive(Debug, Error)]
#[error("broker {broker}: {error}")]
pub struct ShardError {
    /// The broker ID, [`NO_BROKER`](crate::connection::NO_BROKER) if the request failed before
    /// it could be split.
    pub broker: i32,

    /// Topics and partitions the shard covered.
    pub topics: Vec<(String, Vec<i32>)>,

    #[source]
    pub error: RequestError,
}

impl ShardError {
    pub(crate) fn new(broker: i32, request: &ListOffsetsRequest, error: RequestError) -> Self {
        Self {
            broker,
            topics: request
                .topics
                .iter()
                .map(|t| {
                    (
                        t.name.clone(),
                        t.partitions.iter().map(|p| p.partition_index).collect(),
                    )
                })
                .collect(),
            error,
        }
    }
}

/// All shards of one sharded request that failed.
#[derive(Debug)]
pub struct ShardErrors {
    pub request: ApiKey,
    pub errors: Vec<ShardError>,
}

impl Display for ShardErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "request {} has no shard errors", self.request),
            [only] => write!(f, "request {} failed on {only}", self.request),
            [first, rest @ ..] => write!(
                f,
                "request {} failed on {} brokers, first: {first}",
                self.request,
                rest.len() + 1
            ),
        }
    }
}

impl std::error::Error for ShardErrors {}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Not authorized, server error {protocol_error} for {request}")]
    Authorization {
        protocol_error: ProtocolError,
        request: RequestContext,
    },

    #[error("Metadata returned only {returned} topics of {requested} requested")]
    TopicCountMismatch { returned: usize, requested: usize },

    #[error("Got duplicate results for topic '{topic}' and partition {partition}")]
    DuplicateResult { topic: String, partition: i32 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Some brokers failed; `partial` holds what the others returned.
    #[error("{errors}")]
    PartialShardFailure {
        errors: ShardErrors,
        partial: Box<ListedOffsets>,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Offsets returned by the healthy brokers when some others failed.
    pub fn partial_offsets(&self) -> Option<&ListedOffsets> {
        match self {
            Self::PartialShardFailure { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Failed shards, if this is a partial failure.
    pub fn shard_errors(&self) -> Option<&ShardErrors> {
        match self {
            Self::PartialShardFailure { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
