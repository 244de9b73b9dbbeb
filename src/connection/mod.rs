//! Routing of requests to brokers.
//!
//! [`Gateway`] is the seam the admin client talks to. [`ShardedGateway`] implements it on top of a
//! [`BrokerTransport`] that knows how to exchange a single request with a single broker.

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::messages::{
    ListOffsetsRequest, ListOffsetsResponse, MetadataRequest, MetadataResponse, RequestBody,
};

mod sharded;
pub mod topology;

pub use sharded::ShardedGateway;

/// Broker ID used for shards that were answered without contacting any broker.
pub const NO_BROKER: i32 = -1;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RequestError {
    #[error("Cannot send request to broker {broker}: {source}")]
    IO {
        broker: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("No broker available to serve the request")]
    NoBrokerAvailable,

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Single request/response exchanges with individual brokers.
///
/// Implementations own encoding, connections and retries.
#[async_trait]
pub trait BrokerTransport: Debug + Send + Sync + 'static {
    /// Sends a metadata request to any broker the transport picks.
    async fn metadata(&self, request: &MetadataRequest) -> Result<MetadataResponse, RequestError>;

    async fn list_offsets(
        &self,
        broker: i32,
        request: &ListOffsetsRequest,
    ) -> Result<ListOffsetsResponse, RequestError>;
}

/// The part of a sharded request one broker was responsible for, and its outcome.
#[derive(Debug)]
pub struct ShardResponse<R>
where
    R: RequestBody,
{
    /// The broker the shard was sent to, [`NO_BROKER`] if it was answered locally.
    pub broker: i32,

    /// The sub-request this shard carried.
    pub request: R,

    pub result: Result<R::ResponseBody, RequestError>,
}

/// Issues requests against the cluster.
#[async_trait]
pub trait Gateway: Debug + Send + Sync {
    /// One round trip to an arbitrary broker.
    async fn request(&self, request: MetadataRequest) -> Result<MetadataResponse, RequestError>;

    /// Splits the request by partition leader, sends the pieces in parallel and returns one
    /// [`ShardResponse`] per piece.
    async fn request_sharded(
        &self,
        request: ListOffsetsRequest,
    ) -> Vec<ShardResponse<ListOffsetsRequest>>;
}
