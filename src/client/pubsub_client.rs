//! Broker client
//!
//! `BrokerClient` owns an [`HttpTransport`] pointed at the emulator's API
//! root and maps each broker capability onto one REST call. Identifiers typed
//! by an operator are normalized and validated here, before any request is
//! made, so a rejected input never reaches the network.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::broker::resource::final_segment;
use crate::broker::{ReceivedMessage, ResourceKind, ResourceName, Subscription, Topic};
use crate::client::payload::Payload;
use crate::transport::HttpTransport;
use crate::transport::message::{
    AcknowledgeRequest, CreateSubscriptionRequest, ListSubscriptionsResponse,
    ListTopicSubscriptionsResponse, ListTopicsResponse, OutgoingMessage, PublishRequest,
    PublishResponse, PullRequest, PullResponse,
};
use crate::utils::{ConsoleError, Result};

pub const DEFAULT_ACK_DEADLINE_SECONDS: u32 = 10;
pub const DEFAULT_MAX_MESSAGES: u32 = 10;

#[derive(Debug, Clone)]
pub struct BrokerClient {
    transport: HttpTransport,
}

impl BrokerClient {
    /// Create a client for the API root, e.g. `http://localhost:8085/v1`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(base_url)?,
        })
    }

    pub fn with_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub async fn list_topics(&self, project_id: &str) -> Result<Vec<Topic>> {
        let project_id = require_project(project_id)?;
        let response: ListTopicsResponse = self
            .transport
            .get(&format!("projects/{}/topics", project_id))
            .await?;
        debug!("listed {} topics in {}", response.topics.len(), project_id);
        Ok(response.topics)
    }

    /// Creates `projects/{project_id}/topics/{id}` where `id` is the final
    /// path segment of `topic_id`.
    pub async fn create_topic(&self, project_id: &str, topic_id: &str) -> Result<Topic> {
        let name = ResourceName::topic(require_project(project_id)?, final_segment(topic_id))?;
        let topic: Topic = self
            .transport
            .put::<(), _>(&name.path(), None)
            .await?;
        info!("created topic {}", topic.name);
        Ok(topic)
    }

    pub async fn delete_topic(&self, name: &ResourceName) -> Result<()> {
        require_kind(name, ResourceKind::Topic)?;
        self.transport.delete(&name.path()).await?;
        info!("deleted topic {}", name);
        Ok(())
    }

    /// Publishes a batch of exactly one message and returns its assigned id.
    pub async fn publish_message(
        &self,
        topic: &ResourceName,
        payload: impl Into<Payload>,
        attributes: BTreeMap<String, String>,
    ) -> Result<String> {
        require_kind(topic, ResourceKind::Topic)?;
        let payload = payload.into();
        let request = PublishRequest {
            messages: vec![OutgoingMessage {
                data: payload.encode(),
                attributes,
            }],
        };
        let response: PublishResponse = self
            .transport
            .post(&format!("{}:publish", topic), &request)
            .await?;

        let message_id = response
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| ConsoleError::Broker {
                status: 200,
                message: "publish response carried no message id".to_string(),
            })?;
        info!("published message {} to {}", message_id, topic);
        Ok(message_id)
    }

    pub async fn list_subscriptions(&self, project_id: &str) -> Result<Vec<Subscription>> {
        let project_id = require_project(project_id)?;
        let response: ListSubscriptionsResponse = self
            .transport
            .get(&format!("projects/{}/subscriptions", project_id))
            .await?;
        debug!(
            "listed {} subscriptions in {}",
            response.subscriptions.len(),
            project_id
        );
        Ok(response.subscriptions)
    }

    /// Names of the subscriptions attached to one topic.
    pub async fn list_topic_subscriptions(&self, topic: &ResourceName) -> Result<Vec<ResourceName>> {
        require_kind(topic, ResourceKind::Topic)?;
        let response: ListTopicSubscriptionsResponse = self
            .transport
            .get(&format!("{}/subscriptions", topic))
            .await?;
        response
            .subscriptions
            .iter()
            .map(|name| name.parse())
            .collect()
    }

    /// `topic` must already be fully qualified; resolving a bare id against a
    /// project is the caller's job.
    pub async fn create_subscription(
        &self,
        project_id: &str,
        subscription_id: &str,
        topic: &str,
        ack_deadline_seconds: u32,
    ) -> Result<Subscription> {
        let name = ResourceName::subscription(
            require_project(project_id)?,
            final_segment(subscription_id),
        )?;
        let topic: ResourceName = topic.parse()?;
        require_kind(&topic, ResourceKind::Topic)?;

        let request = CreateSubscriptionRequest {
            topic: topic.path(),
            ack_deadline_seconds,
        };
        let subscription: Subscription = self.transport.put(&name.path(), Some(&request)).await?;
        info!(
            "created subscription {} on {}",
            subscription.name, subscription.topic
        );
        Ok(subscription)
    }

    pub async fn delete_subscription(&self, name: &ResourceName) -> Result<()> {
        require_kind(name, ResourceKind::Subscription)?;
        self.transport.delete(&name.path()).await?;
        info!("deleted subscription {}", name);
        Ok(())
    }

    /// One non-blocking pull: the broker answers immediately, possibly with
    /// no messages.
    pub async fn pull_messages(
        &self,
        subscription: &ResourceName,
        max_messages: u32,
    ) -> Result<Vec<ReceivedMessage>> {
        require_kind(subscription, ResourceKind::Subscription)?;
        if max_messages == 0 {
            return Err(ConsoleError::validation("max messages must be at least 1"));
        }
        let request = PullRequest {
            return_immediately: true,
            max_messages,
        };
        let response: PullResponse = self
            .transport
            .post(&format!("{}:pull", subscription), &request)
            .await?;
        debug!(
            "pulled {} messages from {}",
            response.received_messages.len(),
            subscription
        );
        Ok(response.received_messages)
    }

    pub async fn acknowledge(&self, subscription: &ResourceName, ack_ids: &[String]) -> Result<()> {
        require_kind(subscription, ResourceKind::Subscription)?;
        if ack_ids.is_empty() {
            return Err(ConsoleError::validation("no ack ids given"));
        }
        let request = AcknowledgeRequest {
            ack_ids: ack_ids.to_vec(),
        };
        self.transport
            .post_empty(&format!("{}:acknowledge", subscription), &request)
            .await?;
        info!("acknowledged {} messages on {}", ack_ids.len(), subscription);
        Ok(())
    }
}

fn require_project(project_id: &str) -> Result<&str> {
    let project_id = project_id.trim();
    if project_id.is_empty() {
        Err(ConsoleError::validation("project id is empty"))
    } else {
        Ok(project_id)
    }
}

fn require_kind(name: &ResourceName, kind: ResourceKind) -> Result<()> {
    if name.kind() == kind {
        Ok(())
    } else {
        Err(ConsoleError::validation(format!(
            "'{}' is not a {}",
            name, kind
        )))
    }
}
