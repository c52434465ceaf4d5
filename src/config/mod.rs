mod settings;

use config::{Config, ConfigError};

pub use settings::{BrokerSettings, LoggingSettings, ServerSettings, Settings};

/// Builds the broker `Settings` from built-in defaults and the values given
/// on the command line.
///
/// No file or environment source is attached: the command line is the only
/// external input the broker accepts.
pub fn load_config(max_connections: u32, port: u16) -> Result<Settings, ConfigError> {
    let default = Settings::default();

    let config = Config::builder()
        .set_default("server.host", default.server.host)?
        .set_default("server.port", i64::from(default.server.port))?
        .set_default(
            "broker.max_connections",
            i64::from(default.broker.max_connections),
        )?
        .set_default("logging.level", default.logging.level)?
        .set_override("server.port", i64::from(port))?
        .set_override("broker.max_connections", i64::from(max_connections))?
        .build()?;

    config.try_deserialize()
}
