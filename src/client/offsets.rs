use tracing::{debug, warn};

use crate::client::classify::classify;
use crate::client::error::{Error, RequestContext, Result, ShardError, ShardErrors};
use crate::client::metadata::resolve_metadata;
use crate::connection::{Gateway, ShardResponse};
use crate::offsets::{ListedOffset, ListedOffsets, OffsetQuery};
use crate::protocol::messages::{
    ListOffsetsRequest, ListOffsetsRequestPartition, RequestBody, CONSUMER_REPLICA_ID,
};
use crate::topic::TopicDetails;

/// Topic details for the given topics, or for every non-internal topic if `topics` is empty.
pub(crate) async fn list_topics(gateway: &dyn Gateway, topics: &[&str]) -> Result<TopicDetails> {
    let mut details = resolve_metadata(gateway, topics).await?.topics;
    if topics.is_empty() {
        details.filter_internal();
    }
    Ok(details)
}

/// Lists one offset per partition of the given topics.
///
/// Partitions are discovered first, then the list request is sharded across their leaders.
pub(crate) async fn list_offsets(
    gateway: &dyn Gateway,
    query: OffsetQuery,
    topics: &[&str],
) -> Result<ListedOffsets> {
    let details = list_topics(gateway, topics).await?;

    let mut request = ListOffsetsRequest {
        replica_id: CONSUMER_REPLICA_ID,
        isolation_level: Some(query.isolation_level()),
        topics: vec![],
    };
    for detail in details.sorted() {
        if detail.topic.is_empty() {
            continue;
        }
        for partition in detail.partitions.numbers() {
            request.push_partition(
                &detail.topic,
                ListOffsetsRequestPartition {
                    partition_index: partition,
                    current_leader_epoch: -1,
                    timestamp: query.timestamp(),
                },
            );
        }
    }

    if request.partition_count() == 0 {
        debug!(?query, "No partitions to list offsets for");
        return Ok(ListedOffsets::default());
    }

    debug!(
        ?query,
        topics = request.topics.len(),
        partitions = request.partition_count(),
        "Listing offsets",
    );
    let shards = gateway.request_sharded(request).await;
    merge(shards)
}

fn merge(shards: Vec<ShardResponse<ListOffsetsRequest>>) -> Result<ListedOffsets> {
    let mut listed = ListedOffsets::default();
    let mut failed = vec![];

    for shard in shards {
        let response = match shard.result {
            Ok(response) => response,
            Err(error) => {
                warn!(broker = shard.broker, e = %error, "ListOffsets shard failed");
                failed.push(ShardError::new(shard.broker, &shard.request, error));
                continue;
            }
        };

        for topic in response.topics {
            for p in topic.partitions {
                if !requested(&shard.request, &topic.name, p.partition_index) {
                    return Err(Error::InvalidResponse(format!(
                        "broker {} answered partition {} of topic '{}' which was not requested",
                        shard.broker, p.partition_index, topic.name,
                    )));
                }

                let err = classify(p.error_code).attach_or_abort(|| {
                    RequestContext::Partition(topic.name.clone(), p.partition_index)
                })?;
                if let Some(e) = err {
                    warn!(
                        topic = %topic.name,
                        partition = p.partition_index,
                        code = e.code(),
                        e = %e,
                        "ListOffsets partition error",
                    );
                }

                let offset = ListedOffset {
                    topic: topic.name.clone(),
                    partition: p.partition_index,
                    timestamp: p.timestamp.unwrap_or(-1),
                    offset: p.offset.unwrap_or(-1),
                    leader_epoch: p.leader_epoch.unwrap_or(-1),
                    err,
                };
                if listed.insert(offset).is_some() {
                    return Err(Error::DuplicateResult {
                        topic: topic.name,
                        partition: p.partition_index,
                    });
                }
            }
        }
    }

    if failed.is_empty() {
        Ok(listed)
    } else {
        Err(Error::PartialShardFailure {
            errors: ShardErrors {
                request: ListOffsetsRequest::API_KEY,
                errors: failed,
            },
            partial: Box::new(listed),
        })
    }
}

fn requested(request: &ListOffsetsRequest, topic: &str, partition: i32) -> bool {
    request
        .topics
        .iter()
        .filter(|t| t.name == topic)
        .any(|t| t.partitions.iter().any(|p| p.partition_index == partition))
}
