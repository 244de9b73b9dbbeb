use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::broker::{BrokerDetail, BrokerDetails};
use crate::client::classify::classify;
use crate::client::error::{Error, RequestContext, Result};
use crate::connection::Gateway;
use crate::protocol::messages::{MetadataRequest, MetadataRequestTopic, MetadataResponse};
use crate::topic::{PartitionDetail, PartitionDetails, TopicDetail, TopicDetails, TopicId};

/// Snapshot of the cluster from one metadata response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The cluster ID, empty if the broker did not report one.
    pub cluster: String,

    /// Node ID of the controller broker, `-1` if unknown.
    pub controller: i32,

    pub brokers: BrokerDetails,
    pub topics: TopicDetails,
}

/// Describes the given topics, or every topic if `topics` is empty.
pub(crate) async fn resolve_metadata(gateway: &dyn Gateway, topics: &[&str]) -> Result<Metadata> {
    // Duplicate names come back as one topic.
    let requested: BTreeSet<&str> = topics.iter().copied().collect();
    let request = MetadataRequest {
        topics: (!requested.is_empty()).then(|| {
            requested
                .iter()
                .map(|name| MetadataRequestTopic {
                    name: name.to_string(),
                })
                .collect()
        }),
        allow_auto_topic_creation: Some(false),
    };

    let response = gateway.request(request).await?;
    build_metadata(response, requested.len())
}

/// Describes the brokers only.
pub(crate) async fn resolve_brokers(gateway: &dyn Gateway) -> Result<BrokerDetails> {
    let request = MetadataRequest {
        topics: Some(vec![]),
        allow_auto_topic_creation: Some(false),
    };

    let response = gateway.request(request).await?;
    Ok(build_metadata(response, 0)?.brokers)
}

fn build_metadata(response: MetadataResponse, requested: usize) -> Result<Metadata> {
    debug!(
        brokers = response.brokers.len(),
        topics = response.topics.len(),
        requested,
        "Got metadata",
    );

    let mut topics = TopicDetails::default();
    for t in response.topics {
        let name = t.name.unwrap_or_default();
        let err = classify(t.error).attach_or_abort(|| RequestContext::Topic(name.clone()))?;

        let mut partitions = PartitionDetails::default();
        for p in t.partitions {
            let partition_err = classify(p.error).attach_or_abort(|| {
                RequestContext::Partition(name.clone(), p.partition_index)
            })?;
            if err.is_some() {
                continue;
            }

            partitions.insert(match partition_err {
                None => PartitionDetail::new(
                    name.clone(),
                    p.partition_index,
                    p.leader_id,
                    p.leader_epoch.unwrap_or(-1),
                    p.replica_nodes,
                    p.isr_nodes,
                    p.offline_replicas,
                ),
                Some(e) => {
                    warn!(
                        topic = %name,
                        partition = p.partition_index,
                        code = e.code(),
                        e = %e,
                        "Partition has load error",
                    );
                    PartitionDetail::failed(name.clone(), p.partition_index, e)
                }
            });
        }

        if let Some(e) = err {
            warn!(topic = %name, code = e.code(), e = %e, "Topic has load error");
        }

        topics.insert(TopicDetail {
            topic: name,
            id: TopicId::from(t.topic_id),
            is_internal: t.is_internal.unwrap_or_default(),
            partitions,
            err,
        });
    }

    if requested > 0 && topics.len() != requested {
        return Err(Error::TopicCountMismatch {
            returned: topics.len(),
            requested,
        });
    }

    Ok(Metadata {
        cluster: response.cluster_id.unwrap_or_default(),
        controller: response.controller_id.unwrap_or(-1),
        brokers: response.brokers.iter().map(BrokerDetail::from).collect(),
        topics,
    })
}
