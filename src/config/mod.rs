mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{
    BrokerSettings, ConsoleSettings, LoggingSettings, Settings, emulator_base_url,
};

/// Environment prefix for console settings, e.g. `PUBSUB_CONSOLE_BROKER__BASE_URL`.
pub const ENV_PREFIX: &str = "PUBSUB_CONSOLE";

/// Standard variable pointing clients at a local emulator.
pub const EMULATOR_HOST_VAR: &str = "PUBSUB_EMULATOR_HOST";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the broker, console and logging configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(Settings::merge(partial, std::env::var(EMULATOR_HOST_VAR).ok()))
}
