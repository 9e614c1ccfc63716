//! Interactive console session.
//!
//! Reads command lines from stdin and drives a [`ViewController`]. Refreshes
//! are spawned and their outcomes fed back through a channel, so input keeps
//! being handled while a refresh is outstanding; the controller decides
//! whether an outcome is still current.
//!
//! Everything else (create, delete, publish, pull, ack) is awaited in place,
//! so those commands run one after another and input waits until each call
//! returns. `delete` only stages the item; it is carried out by the next
//! command if that is `confirm`, and dropped otherwise.

pub mod command;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::console::{RefreshOutcome, RefreshTicket, ViewController};
use crate::utils::{ConsoleError, Result};

pub use command::{HELP, ShellCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    controller: ViewController,
    refreshes: mpsc::UnboundedSender<RefreshOutcome>,
}

impl Session {
    /// Creates a session and the receiver its spawned refreshes report to.
    pub fn new(controller: ViewController) -> (Self, mpsc::UnboundedReceiver<RefreshOutcome>) {
        let (refreshes, outcomes) = mpsc::unbounded_channel();
        (
            Self {
                controller,
                refreshes,
            },
            outcomes,
        )
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    /// Runs `ticket` in the background; its outcome arrives on the session's
    /// receiver.
    pub fn spawn_refresh(&self, ticket: RefreshTicket) {
        let client = self.controller.client().clone();
        let tx = self.refreshes.clone();
        tokio::spawn(async move {
            let outcome = ticket.fetch(client).await;
            // The receiver is gone only when the session has ended.
            let _ = tx.send(outcome);
        });
    }

    pub fn apply(&mut self, outcome: RefreshOutcome) -> bool {
        self.controller.apply_refresh(outcome)
    }

    pub fn render(&self) -> String {
        self.controller.state().to_string()
    }

    /// Executes one command. Errors are scoped to the command; the session
    /// stays usable afterwards.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        debug!("executing {:?}", command);
        if command != ShellCommand::Confirm && self.controller.cancel_delete() {
            info!("pending delete cancelled");
        }
        match command {
            ShellCommand::Project(project_id) => {
                if let Some(ticket) = self.controller.select_project(&project_id)? {
                    self.spawn_refresh(ticket);
                }
            }
            ShellCommand::Refresh => {
                let ticket = self.controller.request_refresh();
                self.spawn_refresh(ticket);
            }
            ShellCommand::View(view) => self.controller.switch_view(view),
            ShellCommand::Open(reference) => {
                let name = self.controller.resolve_item(&reference)?;
                self.controller.toggle_expand(&name)?;
            }
            ShellCommand::CreateTopic(id) => {
                self.controller.create_topic(&id).await?;
            }
            ShellCommand::CreateSubscription { id, topic } => {
                self.controller.create_subscription(&id, &topic).await?;
            }
            ShellCommand::Delete(reference) => {
                let name = self.controller.resolve_item(&reference)?;
                self.controller.request_delete(&name)?;
            }
            ShellCommand::Confirm => self.controller.confirm_delete().await?,
            ShellCommand::Payload(text) => {
                self.controller
                    .publish_panel_mut()
                    .ok_or_else(|| ConsoleError::validation("no topic is open"))?
                    .set_payload(text);
            }
            ShellCommand::Attributes(text) => {
                self.controller
                    .publish_panel_mut()
                    .ok_or_else(|| ConsoleError::validation("no topic is open"))?
                    .set_attributes(text);
            }
            ShellCommand::Publish => {
                self.controller.publish().await?;
            }
            ShellCommand::Pull => {
                self.controller.pull().await?;
            }
            ShellCommand::Ack(reference) => {
                let ack_id = self.resolve_ack_id(&reference)?;
                self.controller.acknowledge(&ack_id).await?;
            }
            ShellCommand::Clear => {
                self.controller
                    .pull_panel_mut()
                    .ok_or_else(|| ConsoleError::validation("no subscription is open"))?
                    .clear();
            }
            ShellCommand::Show | ShellCommand::Help => {}
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// A 1-based position in the open pull history, or a literal ack id.
    fn resolve_ack_id(&mut self, reference: &str) -> Result<String> {
        let panel = self
            .controller
            .pull_panel_mut()
            .ok_or_else(|| ConsoleError::validation("no subscription is open"))?;
        let by_index = reference
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| panel.history().get(i))
            .map(|m| m.ack_id.clone());
        Ok(by_index.unwrap_or_else(|| reference.to_string()))
    }
}

/// Runs the interactive console on stdin/stdout until `quit` or end of input.
pub async fn run(controller: ViewController) -> std::io::Result<()> {
    let (mut session, mut outcomes) = Session::new(controller);
    info!(
        "console connected to {} (project {})",
        session.controller().client().base_url(),
        session.controller().project_id()
    );

    let initial = session.controller.request_refresh();
    session.spawn_refresh(initial);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match line.parse::<ShellCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("error: {}", e.operator_message());
                        continue;
                    }
                };
                let help = command == ShellCommand::Help;
                match session.execute(command).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) if help => println!("{}", HELP),
                    Ok(Flow::Continue) => println!("{}", session.render()),
                    Err(e) => {
                        println!("error: {}", e.operator_message());
                        println!("{}", session.render());
                    }
                }
            }
            Some(outcome) = outcomes.recv() => {
                if session.apply(outcome) {
                    println!("{}", session.render());
                }
            }
        }
    }
    Ok(())
}
