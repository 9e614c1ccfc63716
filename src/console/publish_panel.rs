use std::collections::BTreeMap;

use tracing::warn;

use super::panel::PanelPhase;
use crate::broker::ResourceName;
use crate::client::BrokerClient;
use crate::utils::{ConsoleError, Result};

/// Draft and submission state for publishing to one topic.
#[derive(Debug)]
pub struct PublishPanel {
    topic: ResourceName,
    payload: String,
    attributes: String,
    phase: PanelPhase,
}

/// A validated submission, ready to hand to the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishDraft {
    pub topic: ResourceName,
    pub payload: String,
    pub attributes: BTreeMap<String, String>,
}

impl PublishPanel {
    pub fn new(topic: ResourceName) -> Self {
        Self {
            topic,
            payload: String::new(),
            attributes: "{}".to_string(),
            phase: PanelPhase::Idle,
        }
    }

    pub fn topic(&self) -> &ResourceName {
        &self.topic
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    pub fn phase(&self) -> &PanelPhase {
        &self.phase
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
        self.mark_drafting();
    }

    pub fn set_attributes(&mut self, attributes: impl Into<String>) {
        self.attributes = attributes.into();
        self.mark_drafting();
    }

    fn mark_drafting(&mut self) {
        if !self.phase.is_submitting() {
            self.phase = PanelPhase::Drafting;
        }
    }

    /// Submission is possible with a non-empty payload and nothing outstanding.
    pub fn can_submit(&self) -> bool {
        !self.payload.is_empty() && !self.phase.is_submitting()
    }

    /// Validates the draft and moves to `Submitting`.
    ///
    /// Unparseable attributes fail the panel without anything being sent.
    pub fn begin_submit(&mut self) -> Result<PublishDraft> {
        if self.phase.is_submitting() {
            return Err(ConsoleError::validation("a publish is already in progress"));
        }
        if self.payload.is_empty() {
            return Err(ConsoleError::validation("message data is empty"));
        }

        let attributes = match parse_attributes(&self.attributes) {
            Ok(attributes) => attributes,
            Err(e) => {
                self.phase = PanelPhase::Failed(e.operator_message());
                return Err(e);
            }
        };

        self.phase = PanelPhase::Submitting;
        Ok(PublishDraft {
            topic: self.topic.clone(),
            payload: self.payload.clone(),
            attributes,
        })
    }

    /// Records the broker's answer. Success clears the payload but keeps the
    /// attributes text for the next publish.
    pub fn finish_submit(&mut self, result: &Result<String>) {
        match result {
            Ok(message_id) => {
                self.payload.clear();
                self.phase = PanelPhase::Succeeded(format!("Published! ID: {}", message_id));
            }
            Err(e) => {
                warn!("publish to {} failed: {}", self.topic, e);
                self.phase = PanelPhase::Failed(e.operator_message());
            }
        }
    }

    pub async fn submit(&mut self, client: &BrokerClient) -> Result<String> {
        let draft = self.begin_submit()?;
        let result = client
            .publish_message(&draft.topic, draft.payload, draft.attributes)
            .await;
        self.finish_submit(&result);
        result
    }
}

/// Parses attribute text as a flat JSON object of string values. No
/// attributes is written `{}`; blank text is rejected.
pub fn parse_attributes(text: &str) -> Result<BTreeMap<String, String>> {
    if text.trim().is_empty() {
        return Err(ConsoleError::validation(
            "attributes are empty; use {} for none",
        ));
    }
    serde_json::from_str(text).map_err(|e| {
        ConsoleError::validation(format!(
            "attributes must be a JSON object of string values: {}",
            e
        ))
    })
}
