use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::payload::decode_data;

/// A message as the broker hands it back, either from a pull or as the body
/// of a received message.
///
/// `data` stays base64 text exactly as transmitted; use [`decoded_data`] for
/// display.
///
/// [`decoded_data`]: PubsubMessage::decoded_data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub publish_time: String,
}

impl PubsubMessage {
    pub fn decoded_data(&self) -> String {
        decode_data(&self.data)
    }

    /// The broker-assigned publish time, if it is a valid RFC 3339 timestamp.
    pub fn publish_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.publish_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// One delivery of a message. `ack_id` is only valid for this delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message: PubsubMessage,
}
