//! Brokers as described by a metadata response.

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use crate::protocol::messages::MetadataResponseBroker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerDetail {
    /// Broker ID from the cluster metadata.
    pub node_id: i32,
    pub host: String,
    pub port: i32,

    /// The rack of the broker, if it has been assigned to one.
    pub rack: Option<String>,
}

impl Display for BrokerDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl<'a> From<&'a MetadataResponseBroker> for BrokerDetail {
    fn from(b: &'a MetadataResponseBroker) -> Self {
        Self {
            node_id: b.node_id,
            host: b.host.clone(),
            port: b.port,
            rack: b.rack.clone(),
        }
    }
}

/// Brokers in the order the cluster reported them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BrokerDetails(Vec<BrokerDetail>);

impl BrokerDetails {
    /// Broker IDs, ascending.
    pub fn node_ids(&self) -> Vec<i32> {
        let mut ids: Vec<_> = self.0.iter().map(|b| b.node_id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, node_id: i32) -> Option<&BrokerDetail> {
        self.0.iter().find(|b| b.node_id == node_id)
    }
}

impl Deref for BrokerDetails {
    type Target = [BrokerDetail];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<BrokerDetail> for BrokerDetails {
    fn from_iter<T: IntoIterator<Item = BrokerDetail>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BrokerDetails {
    type Item = BrokerDetail;
    type IntoIter = std::vec::IntoIter<BrokerDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
