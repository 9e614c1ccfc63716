use std::str::FromStr;

use crate::console::View;
use crate::utils::ConsoleError;

pub const HELP: &str = "\
commands:
  project <id>             select a project (refreshes)
  refresh                  reload topics and subscriptions
  topics | subs            switch list (collapses the open item)
  open <name|#>            expand or collapse a list item
  create-topic <id>        create a topic in the selected project
  create-sub <id> <topic>  create a subscription; topic is #, id or full path
  delete <name|#>          stage deletion of a topic or subscription
  confirm | y              carry out the staged deletion (any other command cancels it)
  payload <text>           set the publish payload of the open topic
  attrs <json>             set the publish attributes of the open topic ({} for none)
  publish                  publish the draft to the open topic
  pull                     pull from the open subscription
  ack <ack-id|#>           acknowledge a pulled message
  clear                    forget pulled messages (nothing is acknowledged)
  show                     print the current view
  help                     print this help
  quit                     leave the console";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Project(String),
    Refresh,
    View(View),
    Open(String),
    CreateTopic(String),
    CreateSubscription { id: String, topic: String },
    Delete(String),
    Confirm,
    Payload(String),
    Attributes(String),
    Publish,
    Pull,
    Ack(String),
    Clear,
    Show,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "project" => ShellCommand::Project(required(word, rest)?),
            "refresh" | "r" => ShellCommand::Refresh,
            "topics" => ShellCommand::View(View::Topics),
            "subs" | "subscriptions" => ShellCommand::View(View::Subscriptions),
            "open" | "o" => ShellCommand::Open(required(word, rest)?),
            "create-topic" => ShellCommand::CreateTopic(required(word, rest)?),
            "create-sub" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next(), args.next()) {
                    (Some(id), Some(topic), None) => ShellCommand::CreateSubscription {
                        id: id.to_string(),
                        topic: topic.to_string(),
                    },
                    _ => return Err(ConsoleError::validation("usage: create-sub <id> <topic>")),
                }
            }
            "delete" => ShellCommand::Delete(required(word, rest)?),
            "confirm" | "y" | "yes" => ShellCommand::Confirm,
            // Payload text is taken verbatim, inner whitespace included.
            "payload" => ShellCommand::Payload(required(word, rest)?),
            "attrs" => ShellCommand::Attributes(required(word, rest)?),
            "publish" => ShellCommand::Publish,
            "pull" => ShellCommand::Pull,
            "ack" => ShellCommand::Ack(required(word, rest)?),
            "clear" => ShellCommand::Clear,
            "show" | "" => ShellCommand::Show,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => {
                return Err(ConsoleError::validation(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )));
            }
        };
        Ok(command)
    }
}

fn required(word: &str, rest: &str) -> Result<String, ConsoleError> {
    if rest.is_empty() {
        Err(ConsoleError::validation(format!("'{}' needs an argument", word)))
    } else {
        Ok(rest.to_string())
    }
}
