//! View state controller
//!
//! `ViewController` is the single owner of what the console displays: the
//! selected project, the topic and subscription lists, which item is
//! expanded and the panel attached to it. Refreshes always replace both lists
//! wholesale. Each refresh is dispatched as a [`RefreshTicket`] numbered from
//! a monotonic counter; only the outcome of the most recently dispatched
//! ticket is ever applied, so overlapping refreshes converge on the latest
//! selection no matter in which order they complete.

use tracing::{debug, info, warn};

use super::panel::Panel;
use super::publish_panel::PublishPanel;
use super::pull_panel::PullPanel;
use crate::broker::{ResourceKind, ResourceName, Subscription, Topic};
use crate::client::BrokerClient;
use crate::config::ConsoleSettings;
use crate::utils::{ConsoleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Topics,
    Subscriptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateTopic,
    DeleteTopic,
    CreateSubscription,
    DeleteSubscription,
}

impl ActionKind {
    fn label(self) -> &'static str {
        match self {
            ActionKind::CreateTopic => "create topic",
            ActionKind::DeleteTopic => "delete topic",
            ActionKind::CreateSubscription => "create subscription",
            ActionKind::DeleteSubscription => "delete subscription",
        }
    }
}

/// Outcome of the last create/delete action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStatus {
    pub action: ActionKind,
    pub succeeded: bool,
    pub message: String,
}

impl ActionStatus {
    pub fn summary(&self) -> String {
        if self.succeeded {
            format!("{}: {}", self.action.label(), self.message)
        } else {
            format!("Error: {} failed: {}", self.action.label(), self.message)
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub project_id: String,
    pub view: View,
    pub topics: Vec<Topic>,
    pub subscriptions: Vec<Subscription>,
    pub expanded: Option<ResourceName>,
    pub panel: Option<Panel>,
    /// Item staged by [`ViewController::request_delete`], awaiting confirmation.
    pub pending_delete: Option<ResourceName>,
    pub loading: bool,
    pub banner: Option<String>,
    pub last_action: Option<ActionStatus>,
}

/// A dispatched refresh: the project it was issued for and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    project_id: String,
}

#[derive(Debug)]
pub struct RefreshOutcome {
    pub seq: u64,
    pub project_id: String,
    pub result: Result<(Vec<Topic>, Vec<Subscription>)>,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Fetches topics and subscriptions concurrently.
    ///
    /// Owns everything it needs, so it can be spawned while the controller
    /// keeps handling input.
    pub async fn fetch(self, client: BrokerClient) -> RefreshOutcome {
        let result = futures::try_join!(
            client.list_topics(&self.project_id),
            client.list_subscriptions(&self.project_id)
        );
        RefreshOutcome {
            seq: self.seq,
            project_id: self.project_id,
            result,
        }
    }
}

#[derive(Debug)]
pub struct ViewController {
    client: BrokerClient,
    state: ViewState,
    latest_seq: u64,
    history_limit: usize,
    max_messages: u32,
    ack_deadline_seconds: u32,
}

impl ViewController {
    pub fn new(client: BrokerClient, settings: &ConsoleSettings) -> Self {
        Self {
            client,
            state: ViewState {
                project_id: settings.project_id.clone(),
                ..ViewState::default()
            },
            latest_seq: 0,
            history_limit: settings.history_limit,
            max_messages: settings.max_messages,
            ack_deadline_seconds: settings.ack_deadline_seconds,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn client(&self) -> &BrokerClient {
        &self.client
    }

    pub fn project_id(&self) -> &str {
        &self.state.project_id
    }

    /// Starts a refresh for the current project; the previous banner is cleared.
    pub fn request_refresh(&mut self) -> RefreshTicket {
        self.latest_seq += 1;
        self.state.loading = true;
        self.state.banner = None;
        debug!(
            "refresh #{} dispatched for {}",
            self.latest_seq, self.state.project_id
        );
        RefreshTicket {
            seq: self.latest_seq,
            project_id: self.state.project_id.clone(),
        }
    }

    /// Applies a refresh outcome if it belongs to the latest dispatched ticket.
    ///
    /// Returns whether the outcome was applied. An expanded item missing from
    /// the new list is collapsed. A failed fetch sets the banner and leaves the
    /// previous lists in place.
    pub fn apply_refresh(&mut self, outcome: RefreshOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            debug!(
                "discarding refresh #{} for {} (latest is #{})",
                outcome.seq, outcome.project_id, self.latest_seq
            );
            return false;
        }

        self.state.loading = false;
        match outcome.result {
            Ok((topics, subscriptions)) => {
                self.state.topics = topics;
                self.state.subscriptions = subscriptions;
                if let Some(expanded) = self.state.expanded.clone() {
                    if !self.is_listed(&expanded) {
                        debug!("{} is gone after refresh, collapsing", expanded);
                        self.collapse();
                    }
                }
                if let Some(pending) = self.state.pending_delete.clone() {
                    if !self.is_listed(&pending) {
                        self.state.pending_delete = None;
                    }
                }
            }
            Err(e) => {
                warn!("refresh for {} failed: {}", outcome.project_id, e);
                self.state.banner = Some(e.operator_message());
            }
        }
        true
    }

    /// Dispatches a refresh and applies it once it completes.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.request_refresh();
        let outcome = ticket.fetch(self.client.clone()).await;
        self.apply_refresh(outcome)
    }

    /// Changes the selected project and collapses the expanded item. Returns
    /// the refresh to run, or `None` when the selection did not change.
    pub fn select_project(&mut self, project_id: &str) -> Result<Option<RefreshTicket>> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(ConsoleError::validation("project id is empty"));
        }
        if project_id == self.state.project_id {
            return Ok(None);
        }
        info!("selected project {}", project_id);
        self.state.project_id = project_id.to_string();
        self.collapse();
        self.state.pending_delete = None;
        Ok(Some(self.request_refresh()))
    }

    /// Switches between the topics and subscriptions lists, collapsing any
    /// expanded item.
    pub fn switch_view(&mut self, view: View) {
        self.state.view = view;
        self.collapse();
        self.state.pending_delete = None;
    }

    pub fn collapse(&mut self) {
        self.state.expanded = None;
        self.state.panel = None;
    }

    pub fn expanded(&self) -> Option<&ResourceName> {
        self.state.expanded.as_ref()
    }

    /// Expands `name` with a fresh panel, or collapses it if it already is
    /// the expanded item. Only items in the current list can be expanded.
    pub fn toggle_expand(&mut self, name: &ResourceName) -> Result<()> {
        if self.state.expanded.as_ref() == Some(name) {
            self.collapse();
            return Ok(());
        }

        if !self.is_listed(name) {
            return Err(ConsoleError::validation(format!(
                "'{}' is not in the current list",
                name
            )));
        }
        let panel = match self.state.view {
            View::Topics => Panel::Publish(PublishPanel::new(name.clone())),
            View::Subscriptions => Panel::Pull(PullPanel::new(
                name.clone(),
                self.history_limit,
                self.max_messages,
            )),
        };

        self.state.expanded = Some(name.clone());
        self.state.panel = Some(panel);
        Ok(())
    }

    pub fn publish_panel_mut(&mut self) -> Option<&mut PublishPanel> {
        match self.state.panel.as_mut() {
            Some(Panel::Publish(panel)) => Some(panel),
            _ => None,
        }
    }

    pub fn pull_panel_mut(&mut self) -> Option<&mut PullPanel> {
        match self.state.panel.as_mut() {
            Some(Panel::Pull(panel)) => Some(panel),
            _ => None,
        }
    }

    pub async fn publish(&mut self) -> Result<String> {
        let client = &self.client;
        match self.state.panel.as_mut() {
            Some(Panel::Publish(panel)) => panel.submit(client).await,
            _ => Err(ConsoleError::validation("no topic is open")),
        }
    }

    pub async fn pull(&mut self) -> Result<usize> {
        let client = &self.client;
        match self.state.panel.as_mut() {
            Some(Panel::Pull(panel)) => panel.pull(client).await,
            _ => Err(ConsoleError::validation("no subscription is open")),
        }
    }

    pub async fn acknowledge(&mut self, ack_id: &str) -> Result<()> {
        let client = &self.client;
        match self.state.panel.as_mut() {
            Some(Panel::Pull(panel)) => panel.acknowledge(client, ack_id).await,
            _ => Err(ConsoleError::validation("no subscription is open")),
        }
    }

    pub async fn create_topic(&mut self, topic_id: &str) -> Result<Topic> {
        let result = self
            .client
            .create_topic(&self.state.project_id, topic_id)
            .await;
        self.settle(ActionKind::CreateTopic, result, |t| {
            format!("created {}", t.name)
        })
        .await
    }

    pub async fn delete_topic(&mut self, name: &ResourceName) -> Result<()> {
        let result = self.client.delete_topic(name).await;
        self.forget_if_expanded(name, &result);
        self.settle(ActionKind::DeleteTopic, result, |_| format!("deleted {}", name))
            .await
    }

    /// Creates a subscription bound to `topic_ref`, which is resolved with
    /// [`resolve_topic_reference`](Self::resolve_topic_reference) first.
    pub async fn create_subscription(
        &mut self,
        subscription_id: &str,
        topic_ref: &str,
    ) -> Result<Subscription> {
        let result = match self.resolve_topic_reference(topic_ref) {
            Ok(topic) => {
                self.client
                    .create_subscription(
                        &self.state.project_id,
                        subscription_id,
                        &topic.path(),
                        self.ack_deadline_seconds,
                    )
                    .await
            }
            Err(e) => Err(e),
        };
        self.settle(ActionKind::CreateSubscription, result, |s| {
            format!("created {} on {}", s.name, s.topic)
        })
        .await
    }

    pub async fn delete_subscription(&mut self, name: &ResourceName) -> Result<()> {
        let result = self.client.delete_subscription(name).await;
        self.forget_if_expanded(name, &result);
        self.settle(ActionKind::DeleteSubscription, result, |_| {
            format!("deleted {}", name)
        })
        .await
    }

    /// Deletes a topic or subscription, whichever `name` denotes.
    pub async fn delete(&mut self, name: &ResourceName) -> Result<()> {
        match name.kind() {
            ResourceKind::Topic => self.delete_topic(name).await,
            ResourceKind::Subscription => self.delete_subscription(name).await,
        }
    }

    /// Stages `name` for deletion. Nothing reaches the broker until
    /// [`confirm_delete`](Self::confirm_delete) is called.
    pub fn request_delete(&mut self, name: &ResourceName) -> Result<()> {
        if !self.is_listed(name) {
            return Err(ConsoleError::validation(format!(
                "'{}' is not in the current list",
                name
            )));
        }
        debug!("delete of {} awaiting confirmation", name);
        self.state.pending_delete = Some(name.clone());
        Ok(())
    }

    /// Deletes the staged item, if any.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let name = self
            .state
            .pending_delete
            .take()
            .ok_or_else(|| ConsoleError::validation("nothing to confirm"))?;
        self.delete(&name).await
    }

    /// Drops the staged deletion. Returns whether one was pending.
    pub fn cancel_delete(&mut self) -> bool {
        self.state.pending_delete.take().is_some()
    }

    /// Turns an operator's topic reference into a fully-qualified topic name.
    ///
    /// Accepts a 1-based index into the displayed topics, a full topic path,
    /// or a bare id which is qualified with the selected project.
    pub fn resolve_topic_reference(&self, reference: &str) -> Result<ResourceName> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ConsoleError::validation("topic is empty"));
        }
        if let Some(topic) = index_into(reference, &self.state.topics) {
            return Ok(topic.name.clone());
        }
        if reference.starts_with("projects/") {
            let name: ResourceName = reference.parse()?;
            if !name.is_topic() {
                return Err(ConsoleError::validation(format!(
                    "'{}' is not a topic",
                    name
                )));
            }
            return Ok(name);
        }
        ResourceName::topic(self.state.project_id.clone(), reference)
    }

    /// Resolves a reference to an item of the current list: a 1-based index,
    /// a full path or a short name.
    pub fn resolve_item(&self, reference: &str) -> Result<ResourceName> {
        let reference = reference.trim();
        let names: Vec<&ResourceName> = match self.state.view {
            View::Topics => self.state.topics.iter().map(|t| &t.name).collect(),
            View::Subscriptions => self.state.subscriptions.iter().map(|s| &s.name).collect(),
        };

        if let Some(name) = index_into(reference, &names) {
            return Ok((*name).clone());
        }
        names
            .into_iter()
            .find(|name| name.path() == reference || name.short_name() == reference)
            .cloned()
            .ok_or_else(|| {
                ConsoleError::validation(format!("'{}' is not in the current list", reference))
            })
    }

    /// Whether `name` is an item of the list the current view displays.
    fn is_listed(&self, name: &ResourceName) -> bool {
        match self.state.view {
            View::Topics => self.state.topics.iter().any(|t| &t.name == name),
            View::Subscriptions => self.state.subscriptions.iter().any(|s| &s.name == name),
        }
    }

    fn forget_if_expanded(&mut self, name: &ResourceName, result: &Result<()>) {
        if result.is_ok() && self.state.expanded.as_ref() == Some(name) {
            self.collapse();
        }
    }

    /// Records the action's status; a success triggers a refresh, a failure
    /// leaves the lists untouched.
    async fn settle<T>(
        &mut self,
        action: ActionKind,
        result: Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        match &result {
            Ok(value) => {
                self.state.last_action = Some(ActionStatus {
                    action,
                    succeeded: true,
                    message: describe(value),
                });
                self.refresh().await;
            }
            Err(e) => {
                warn!("{} failed: {}", action.label(), e);
                self.state.last_action = Some(ActionStatus {
                    action,
                    succeeded: false,
                    message: e.operator_message(),
                });
            }
        }
        result
    }
}

/// Interprets `reference` as a 1-based index into `items`.
fn index_into<'a, T>(reference: &str, items: &'a [T]) -> Option<&'a T> {
    let index: usize = reference.parse().ok()?;
    index.checked_sub(1).and_then(|i| items.get(i))
}
