use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::info;

use crate::broker::BrokerDetail;
use crate::protocol::messages::MetadataResponseBroker;

/// Brokers seen in metadata responses, keyed by broker ID.
#[derive(Debug, Default)]
pub struct BrokerTopology {
    topology: RwLock<HashMap<i32, BrokerDetail>>,
}

impl BrokerTopology {
    pub fn is_empty(&self) -> bool {
        self.topology.read().is_empty()
    }

    /// Returns the broker for the provided broker ID
    pub fn get_broker(&self, broker_id: i32) -> Option<BrokerDetail> {
        self.topology.read().get(&broker_id).cloned()
    }

    /// Returns a list of all brokers, ascending by ID
    pub fn get_brokers(&self) -> Vec<BrokerDetail> {
        let mut brokers: Vec<_> = self.topology.read().values().cloned().collect();
        brokers.sort_unstable_by_key(|b| b.node_id);
        brokers
    }

    /// Updates with the provided broker metadata
    pub fn update(&self, brokers: &[MetadataResponseBroker]) {
        let mut topology = self.topology.write();
        for broker in brokers {
            let new = BrokerDetail::from(broker);
            match topology.entry(broker.node_id) {
                Entry::Occupied(mut o) => {
                    let current = o.get_mut();
                    if *current != new {
                        info!(
                            broker=broker.node_id,
                            current=%current,
                            new=%new,
                            "Broker update",
                        );
                        *current = new;
                    }
                }
                Entry::Vacant(v) => {
                    info!(
                        broker=broker.node_id,
                        new=%new,
                        "New broker",
                    );
                    v.insert(new);
                }
            }
        }
    }
}
