//! Individual API messages.

use crate::protocol::api_key::ApiKey;

mod list_offsets;
pub use list_offsets::*;
mod metadata;
pub use metadata::*;

/// A request body, tied to the response body the broker answers with.
pub trait RequestBody {
    /// The response type that will follow when issuing this request.
    type ResponseBody;

    /// Kafka API key.
    ///
    /// This will be added to the request header.
    const API_KEY: ApiKey;
}

/// Controls the visibility of transactional records.
///
/// # References
/// - [KIP-98](https://cwiki.apache.org/confluence/display/KAFKA/KIP-98+-+Exactly+Once+Delivery+and+Transactional+Messaging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    /// Every record is visible, including records of open or aborted transactions.
    ///
    /// Offsets are bounded by the high watermark.
    #[default]
    ReadUncommitted,

    /// Only records of committed transactions are visible.
    ///
    /// Offsets are bounded by the last stable offset.
    ReadCommitted,
}

impl From<IsolationLevel> for i8 {
    fn from(level: IsolationLevel) -> Self {
        match level {
            IsolationLevel::ReadUncommitted => 0,
            IsolationLevel::ReadCommitted => 1,
        }
    }
}
