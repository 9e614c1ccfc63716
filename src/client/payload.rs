use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Message body handed to [`BrokerClient::publish_message`].
///
/// Text goes out as-is, bytes verbatim, and JSON values are serialized to
/// compact text before encoding.
///
/// [`BrokerClient::publish_message`]: super::BrokerClient::publish_message
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

impl Payload {
    /// The exact bytes that will be transmitted.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.as_bytes().to_vec(),
            Payload::Bytes(bytes) => bytes.clone(),
            Payload::Json(value) => value.to_string().into_bytes(),
        }
    }

    /// Base64 text for the `data` field of a publish request.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Bytes(bytes) => bytes.is_empty(),
            Payload::Json(_) => false,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// Best-effort decode of message data for display.
///
/// Valid base64 yields the decoded text (invalid UTF-8 sequences replaced);
/// anything else is returned unchanged. Never fails.
pub fn decode_data(data: &str) -> String {
    match STANDARD.decode(data) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => data.to_string(),
    }
}
