use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::broker::{ReceivedMessage, Subscription, Topic};

#[derive(Debug, Serialize)]
pub struct PublishRequest {
    pub messages: Vec<OutgoingMessage>,
}

#[derive(Debug, Serialize)]
pub struct OutgoingMessage {
    /// Base64 of the payload bytes.
    pub data: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default)]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub topic: String,
    pub ack_deadline_seconds: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub return_immediately: bool,
    pub max_messages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    #[serde(default)]
    pub received_messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    pub ack_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTopicsResponse {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub struct ListSubscriptionsResponse {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// Topic-scoped listing returns bare subscription names.
#[derive(Debug, Deserialize)]
pub struct ListTopicSubscriptionsResponse {
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Extracts the human-readable message from an error response body.
///
/// Prefers the envelope's `message`, then the raw body text, then `None`.
pub fn broker_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return Some(envelope.error.message);
        }
        if let Some(status) = envelope.error.status {
            return Some(status);
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
