//! CLI for the Pub/Sub emulator console
//!
//! Subcommands:
//! - `topics`, `subscriptions`, `publish`, `pull`, `ack`: one-shot broker operations
//! - `console`: interactive session over the same operations

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use pubsub_console::broker::ResourceName;
use pubsub_console::client::{BrokerClient, Payload};
use pubsub_console::config::{Settings, load_config};
use pubsub_console::console::ViewController;
use pubsub_console::{shell, utils};
use tracing::error;

#[derive(Parser)]
#[command(name = "pubsub-console", about = "Admin console for a Pub/Sub emulator")]
struct Cli {
    /// Project to operate on (defaults to the configured project)
    #[arg(long, global = true)]
    project: Option<String>,
    /// API root of the emulator, e.g. http://localhost:8085/v1
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage topics
    #[command(subcommand)]
    Topics(TopicCommand),
    /// Manage subscriptions
    #[command(subcommand, alias = "subs")]
    Subscriptions(SubscriptionCommand),
    /// Publish one message to a topic (id or full path)
    Publish {
        topic: String,
        payload: String,
        /// Attribute as key=value; repeatable
        #[arg(long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
        /// Parse the payload as JSON and send its compact form
        #[arg(long)]
        json: bool,
    },
    /// Pull once from a subscription without waiting
    Pull {
        subscription: String,
        #[arg(long)]
        max: Option<u32>,
        /// Acknowledge everything that was pulled
        #[arg(long)]
        ack: bool,
    },
    /// Acknowledge pulled messages
    Ack {
        subscription: String,
        #[arg(required = true)]
        ack_ids: Vec<String>,
    },
    /// Start the interactive console
    Console,
}

#[derive(Subcommand)]
enum TopicCommand {
    List,
    Create { id: String },
    Delete { name: String },
    /// List subscriptions attached to a topic
    Subscriptions { topic: String },
}

#[derive(Subcommand)]
enum SubscriptionCommand {
    List,
    Create {
        id: String,
        /// Topic id or full topic path
        #[arg(long)]
        topic: String,
        #[arg(long)]
        ack_deadline: Option<u32>,
    },
    Delete { name: String },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            utils::logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    if let Some(project) = cli.project.clone() {
        settings.console.project_id = project;
    }
    if let Some(base_url) = cli.base_url.clone() {
        settings.broker.base_url = base_url;
    }
    if let Some(level) = cli.log_level.clone() {
        settings.logging.level = level;
    }
    utils::logging::init(&settings.logging.level);

    if let Err(e) = run(cli.command, settings).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = BrokerClient::new(settings.broker.base_url.clone())?;
    let project = settings.console.project_id.as_str();

    match command {
        Command::Topics(TopicCommand::List) => {
            for topic in client.list_topics(project).await? {
                println!("{}", topic.name);
            }
        }
        Command::Topics(TopicCommand::Create { id }) => {
            let topic = client.create_topic(project, &id).await?;
            println!("{}", topic.name);
        }
        Command::Topics(TopicCommand::Delete { name }) => {
            client.delete_topic(&topic_name(project, &name)?).await?;
        }
        Command::Topics(TopicCommand::Subscriptions { topic }) => {
            for name in client
                .list_topic_subscriptions(&topic_name(project, &topic)?)
                .await?
            {
                println!("{}", name);
            }
        }
        Command::Subscriptions(SubscriptionCommand::List) => {
            for sub in client.list_subscriptions(project).await? {
                println!("{}\t{}", sub.name, sub.topic);
            }
        }
        Command::Subscriptions(SubscriptionCommand::Create {
            id,
            topic,
            ack_deadline,
        }) => {
            let topic = topic_name(project, &topic)?;
            let sub = client
                .create_subscription(
                    project,
                    &id,
                    &topic.path(),
                    ack_deadline.unwrap_or(settings.console.ack_deadline_seconds),
                )
                .await?;
            println!("{}\t{}", sub.name, sub.topic);
        }
        Command::Subscriptions(SubscriptionCommand::Delete { name }) => {
            client
                .delete_subscription(&subscription_name(project, &name)?)
                .await?;
        }
        Command::Publish {
            topic,
            payload,
            attributes,
            json,
        } => {
            let payload = if json {
                Payload::Json(serde_json::from_str(&payload)?)
            } else {
                Payload::Text(payload)
            };
            let attributes: BTreeMap<String, String> = attributes.into_iter().collect();
            let id = client
                .publish_message(&topic_name(project, &topic)?, payload, attributes)
                .await?;
            println!("{}", id);
        }
        Command::Pull {
            subscription,
            max,
            ack,
        } => {
            let sub = subscription_name(project, &subscription)?;
            let received = client
                .pull_messages(&sub, max.unwrap_or(settings.console.max_messages))
                .await?;
            for m in &received {
                println!(
                    "{}\t{}\t{}",
                    m.message.message_id,
                    m.ack_id,
                    m.message.decoded_data()
                );
            }
            if ack && !received.is_empty() {
                let ids: Vec<String> = received.into_iter().map(|m| m.ack_id).collect();
                client.acknowledge(&sub, &ids).await?;
            }
        }
        Command::Ack {
            subscription,
            ack_ids,
        } => {
            client
                .acknowledge(&subscription_name(project, &subscription)?, &ack_ids)
                .await?;
        }
        Command::Console => {
            let controller = ViewController::new(client, &settings.console);
            shell::run(controller).await?;
        }
    }

    Ok(())
}

/// Accepts a full topic path or an id within `project`.
fn topic_name(project: &str, raw: &str) -> Result<ResourceName, pubsub_console::utils::ConsoleError> {
    if raw.starts_with("projects/") {
        raw.parse()
    } else {
        ResourceName::topic(project, raw)
    }
}

fn subscription_name(
    project: &str,
    raw: &str,
) -> Result<ResourceName, pubsub_console::utils::ConsoleError> {
    if raw.starts_with("projects/") {
        raw.parse()
    } else {
        ResourceName::subscription(project, raw)
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}
