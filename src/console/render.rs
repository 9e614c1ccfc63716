//! Plain-text rendering of the view state and panels.

use std::fmt;

use super::controller::{View, ViewState};
use super::publish_panel::PublishPanel;
use super::pull_panel::PullPanel;
use crate::broker::ReceivedMessage;

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (topics_tab, subs_tab) = match self.view {
            View::Topics => ("[Topics]", " Subscriptions "),
            View::Subscriptions => (" Topics ", "[Subscriptions]"),
        };
        write!(f, "Project: {}   {} {}", self.project_id, topics_tab, subs_tab)?;
        if self.loading {
            write!(f, "   (refreshing)")?;
        }
        writeln!(f)?;

        if let Some(banner) = &self.banner {
            writeln!(f, "! Error connecting to emulator: {}", banner)?;
            writeln!(f, "  Make sure the emulator is running at the configured address")?;
        }
        if let Some(status) = &self.last_action {
            writeln!(f, "{}", status.summary())?;
        }
        if let Some(pending) = &self.pending_delete {
            writeln!(
                f,
                "? Delete {} {}? Type 'confirm' to proceed, anything else cancels.",
                pending.kind(),
                pending.short_name()
            )?;
        }
        writeln!(f)?;

        match self.view {
            View::Topics => {
                for (i, topic) in self.topics.iter().enumerate() {
                    let open = self.expanded.as_ref() == Some(&topic.name);
                    writeln!(
                        f,
                        "{} {:>2}. {}  ({})",
                        marker(open),
                        i + 1,
                        topic.name.short_name(),
                        topic.name
                    )?;
                    if open {
                        write_panel(f, &self.panel)?;
                    }
                }
                if self.topics.is_empty() && !self.loading {
                    writeln!(f, "No topics found. Create one to get started.")?;
                }
            }
            View::Subscriptions => {
                for (i, sub) in self.subscriptions.iter().enumerate() {
                    let open = self.expanded.as_ref() == Some(&sub.name);
                    writeln!(
                        f,
                        "{} {:>2}. {}  (topic: {})",
                        marker(open),
                        i + 1,
                        sub.name.short_name(),
                        sub.topic_short_name()
                    )?;
                    if open {
                        write_panel(f, &self.panel)?;
                    }
                }
                if self.subscriptions.is_empty() && !self.loading {
                    writeln!(
                        f,
                        "No subscriptions found. Create one to start pulling messages."
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn marker(open: bool) -> &'static str {
    if open { "v" } else { ">" }
}

fn write_panel(f: &mut fmt::Formatter<'_>, panel: &Option<super::panel::Panel>) -> fmt::Result {
    match panel {
        Some(panel) => {
            for line in panel.to_string().lines() {
                writeln!(f, "      {}", line)?;
            }
            Ok(())
        }
        None => Ok(()),
    }
}

impl fmt::Display for PublishPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Publish Message")?;
        writeln!(f, "  data:       {}", self.payload())?;
        writeln!(f, "  attributes: {}", self.attributes())?;
        if let Some(status) = self.phase().status() {
            writeln!(f, "  {}", status)?;
        }
        Ok(())
    }
}

impl fmt::Display for PullPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pulled Messages ({}/{})",
            self.history().len(),
            self.limit()
        )?;
        if let Some(status) = self.phase().status() {
            writeln!(f, "  {}", status)?;
        }
        if self.history().is_empty() {
            writeln!(f, "  No messages pulled yet.")?;
        }
        for (i, received) in self.history().iter().enumerate() {
            write_received(f, i + 1, received)?;
        }
        Ok(())
    }
}

fn write_received(f: &mut fmt::Formatter<'_>, index: usize, received: &ReceivedMessage) -> fmt::Result {
    let message = &received.message;
    let published = message
        .publish_time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| message.publish_time.clone());
    writeln!(f, "  #{} ID: {}  {}", index, message.message_id, published)?;
    for line in message.decoded_data().lines() {
        writeln!(f, "     | {}", line)?;
    }
    if !message.attributes.is_empty() {
        let attrs: Vec<String> = message
            .attributes
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        writeln!(f, "     Attributes: {}", attrs.join(", "))?;
    }
    writeln!(f, "     ack id: {}", received.ack_id)
}
