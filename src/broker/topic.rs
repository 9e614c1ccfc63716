use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::resource::{ResourceKind, ResourceName, final_segment};

/// A topic as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: ResourceName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// A subscription as reported by the broker.
///
/// `topic` is kept as the raw string the broker sent: a subscription whose
/// topic was deleted reports `_deleted-topic_` there instead of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub name: ResourceName,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_deadline_seconds: Option<u32>,
}

impl Subscription {
    /// The bound topic, when the broker reported a fully-qualified topic path.
    pub fn topic_path(&self) -> Option<ResourceName> {
        self.topic
            .parse::<ResourceName>()
            .ok()
            .filter(|name| name.kind() == ResourceKind::Topic)
    }

    pub fn topic_short_name(&self) -> &str {
        final_segment(&self.topic)
    }
}
