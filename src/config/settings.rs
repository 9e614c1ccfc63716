use serde::Deserialize;

/// Top-level configuration settings for the console.
///
/// Includes where the broker lives, console defaults and logging.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub console: ConsoleSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for reaching the broker.
///
/// `base_url` is the API root every REST path is appended to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub base_url: String,
}

/// Defaults applied by the console when the operator does not override them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConsoleSettings {
    pub project_id: String,
    pub max_messages: u32,
    pub history_limit: usize,
    pub ack_deadline_seconds: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Settings as read from file and environment. Missing values can be filled using defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub console: Option<PartialConsoleSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialConsoleSettings {
    pub project_id: Option<String>,
    pub max_messages: Option<u32>,
    pub history_limit: Option<usize>,
    pub ack_deadline_seconds: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The broker default is the emulator's usual local port.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                base_url: "http://localhost:8085/v1".to_string(),
            },
            console: ConsoleSettings {
                project_id: "test-project".to_string(),
                max_messages: 10,
                history_limit: 50,
                ack_deadline_seconds: 10,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Fills every missing value of `partial` from the defaults.
    ///
    /// `emulator_host` is the value of `PUBSUB_EMULATOR_HOST`; it only applies
    /// when no base URL was configured explicitly.
    pub fn merge(partial: PartialSettings, emulator_host: Option<String>) -> Self {
        let default = Settings::default();

        let base_url = partial
            .broker
            .and_then(|b| b.base_url)
            .or_else(|| {
                emulator_host
                    .filter(|host| !host.trim().is_empty())
                    .map(|host| emulator_base_url(&host))
            })
            .unwrap_or(default.broker.base_url);

        let console = partial.console.unwrap_or_default();
        let logging = partial.logging.unwrap_or_default();

        Settings {
            broker: BrokerSettings { base_url },
            console: ConsoleSettings {
                project_id: console.project_id.unwrap_or(default.console.project_id),
                max_messages: console.max_messages.unwrap_or(default.console.max_messages),
                history_limit: console.history_limit.unwrap_or(default.console.history_limit),
                ack_deadline_seconds: console
                    .ack_deadline_seconds
                    .unwrap_or(default.console.ack_deadline_seconds),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(default.logging.level),
            },
        }
    }
}

/// `localhost:8085` becomes `http://localhost:8085/v1`; an explicit scheme is kept.
pub fn emulator_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/v1", host)
    } else {
        format!("http://{}/v1", host)
    }
}
