use std::collections::VecDeque;

use tracing::{info, warn};

use super::panel::PanelPhase;
use crate::broker::{ReceivedMessage, ResourceName};
use crate::client::BrokerClient;
use crate::utils::{ConsoleError, Result};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Pulled-message history for one subscription, most recent first.
#[derive(Debug)]
pub struct PullPanel {
    subscription: ResourceName,
    history: VecDeque<ReceivedMessage>,
    limit: usize,
    max_messages: u32,
    phase: PanelPhase,
}

impl PullPanel {
    pub fn new(subscription: ResourceName, limit: usize, max_messages: u32) -> Self {
        Self {
            subscription,
            history: VecDeque::with_capacity(limit),
            limit,
            max_messages,
            phase: PanelPhase::Idle,
        }
    }

    pub fn subscription(&self) -> &ResourceName {
        &self.subscription
    }

    pub fn history(&self) -> &VecDeque<ReceivedMessage> {
        &self.history
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn max_messages(&self) -> u32 {
        self.max_messages
    }

    pub fn phase(&self) -> &PanelPhase {
        &self.phase
    }

    /// Puts `batch` in front of the history, in the order received, and drops
    /// the oldest entries beyond the limit.
    pub fn absorb(&mut self, batch: Vec<ReceivedMessage>) {
        for message in batch.into_iter().rev() {
            self.history.push_front(message);
        }
        self.history.truncate(self.limit);
    }

    pub fn begin_pull(&mut self) -> Result<()> {
        if self.phase.is_submitting() {
            return Err(ConsoleError::validation("a pull is already in progress"));
        }
        self.phase = PanelPhase::Submitting;
        Ok(())
    }

    pub fn finish_pull(&mut self, result: Result<Vec<ReceivedMessage>>) -> Result<usize> {
        match result {
            Ok(batch) => {
                let count = batch.len();
                self.absorb(batch);
                self.phase = PanelPhase::Succeeded(format!("Pulled {} messages", count));
                Ok(count)
            }
            Err(e) => {
                warn!("pull from {} failed: {}", self.subscription, e);
                self.phase = PanelPhase::Failed(e.operator_message());
                Err(e)
            }
        }
    }

    /// Pulls once and returns how many messages arrived.
    pub async fn pull(&mut self, client: &BrokerClient) -> Result<usize> {
        self.begin_pull()?;
        let result = client
            .pull_messages(&self.subscription, self.max_messages)
            .await;
        self.finish_pull(result)
    }

    /// Forgets the local history. Nothing is acknowledged.
    pub fn clear(&mut self) {
        self.history.clear();
        self.phase = PanelPhase::Idle;
    }

    pub fn position(&self, ack_id: &str) -> Option<usize> {
        self.history.iter().position(|m| m.ack_id == ack_id)
    }

    /// Acknowledges one message from the history and removes it on success.
    ///
    /// An ack id that is not in the history fails without contacting the
    /// broker; a broker failure keeps the entry so it can be retried.
    pub async fn acknowledge(&mut self, client: &BrokerClient, ack_id: &str) -> Result<()> {
        if self.position(ack_id).is_none() {
            let e = ConsoleError::validation(format!("no pulled message with ack id '{}'", ack_id));
            self.phase = PanelPhase::Failed(e.operator_message());
            return Err(e);
        }

        match client
            .acknowledge(&self.subscription, &[ack_id.to_string()])
            .await
        {
            Ok(()) => {
                if let Some(index) = self.position(ack_id) {
                    self.history.remove(index);
                }
                info!("acknowledged {} on {}", ack_id, self.subscription);
                self.phase = PanelPhase::Succeeded("Acknowledged".to_string());
                Ok(())
            }
            Err(e) => {
                warn!("ack of {} on {} failed: {}", ack_id, self.subscription, e);
                self.phase = PanelPhase::Failed(e.operator_message());
                Err(e)
            }
        }
    }
}
