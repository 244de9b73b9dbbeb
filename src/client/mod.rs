use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::broker::BrokerDetails;
use crate::connection::Gateway;
use crate::offsets::{ListedOffsets, OffsetQuery};
use crate::topic::TopicDetails;

pub mod classify;
pub mod error;
mod metadata;
mod offsets;

use error::{Error, Result};

pub use metadata::Metadata;

/// Builder for [`Client`].
pub struct ClientBuilder {
    gateway: Arc<dyn Gateway>,
    request_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new [`ClientBuilder`] issuing requests through `gateway`.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            request_timeout: None,
        }
    }

    /// Bounds every call, including all of its broker round trips.
    ///
    /// Calls that exceed it fail with [`Error::Timeout`] and return no partial result.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build [`Client`].
    pub fn build(self) -> Client {
        Client {
            gateway: self.gateway,
            request_timeout: self.request_timeout,
        }
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder").finish_non_exhaustive()
    }
}

/// Cluster-wide admin client for metadata and offsets.
///
/// Every call works on a fresh view of the cluster; nothing is cached between calls. Dropping a
/// call's future abandons all of its outstanding broker requests.
///
/// Must be constructed using [`ClientBuilder`].
#[derive(Debug)]
pub struct Client {
    gateway: Arc<dyn Gateway>,
    request_timeout: Option<Duration>,
}

impl Client {
    /// Returns the brokers of the cluster.
    pub async fn list_brokers(&self) -> Result<BrokerDetails> {
        self.timed(metadata::resolve_brokers(self.gateway.as_ref()))
            .await
    }

    /// Describes the cluster and the given topics, or every topic if `topics` is empty.
    ///
    /// Topics and partitions that failed to load carry their error in `err`. Authorization
    /// failures fail the whole call, as does a response missing any of the requested topics.
    pub async fn metadata(&self, topics: &[&str]) -> Result<Metadata> {
        self.timed(metadata::resolve_metadata(self.gateway.as_ref(), topics))
            .await
    }

    /// Describes the given topics, or every non-internal topic if `topics` is empty.
    pub async fn list_topics(&self, topics: &[&str]) -> Result<TopicDetails> {
        self.timed(offsets::list_topics(self.gateway.as_ref(), topics))
            .await
    }

    /// Lists the offset `query` selects for every partition of the given topics, or of every
    /// non-internal topic if `topics` is empty.
    ///
    /// If some brokers fail to answer, this returns [`Error::PartialShardFailure`], which still
    /// holds the offsets of the other brokers' partitions.
    pub async fn list_offsets(&self, query: OffsetQuery, topics: &[&str]) -> Result<ListedOffsets> {
        self.timed(offsets::list_offsets(self.gateway.as_ref(), query, topics))
            .await
    }

    /// Oldest offset of every partition, the log start offset.
    pub async fn list_start_offsets(&self, topics: &[&str]) -> Result<ListedOffsets> {
        self.list_offsets(OffsetQuery::Start, topics).await
    }

    /// Newest offset of every partition, the high watermark.
    pub async fn list_end_offsets(&self, topics: &[&str]) -> Result<ListedOffsets> {
        self.list_offsets(OffsetQuery::End, topics).await
    }

    /// Newest offset of every partition that is not part of an open transaction, the last
    /// stable offset. It may be lower than the end offset.
    pub async fn list_committed_offsets(&self, topics: &[&str]) -> Result<ListedOffsets> {
        self.list_offsets(OffsetQuery::Committed, topics).await
    }

    /// First offset of every partition whose record is at or after the unix `millisecond`.
    ///
    /// Unlike the other listings, the returned offsets carry the timestamp of their record.
    pub async fn list_offsets_after(
        &self,
        millisecond: i64,
        topics: &[&str],
    ) -> Result<ListedOffsets> {
        self.list_offsets(OffsetQuery::After(millisecond), topics)
            .await
    }

    /// Like [`list_offsets_after`](Self::list_offsets_after), from a point in time.
    pub async fn list_offsets_after_time(
        &self,
        time: DateTime<Utc>,
        topics: &[&str],
    ) -> Result<ListedOffsets> {
        self.list_offsets(OffsetQuery::after_time(time), topics)
            .await
    }

    async fn timed<F, T>(&self, f: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, f)
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => f.await,
        }
    }
}
