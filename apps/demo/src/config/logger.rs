use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use tracing::metadata::Level;

#[derive(Deserialize)]
pub struct LoggerConfig {
    /// Level applied to the demo and to the `event_bus` crate
    #[serde(default = "default_level", deserialize_with = "deserialize_level")]
    pub level: Level,
    /// Prefix every line with the local time
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

fn deserialize_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
    let level = String::deserialize(deserializer)?;

    Level::from_str(&level).map_err(serde::de::Error::custom)
}

fn default_level() -> Level {
    Level::INFO
}

fn default_timestamps() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            timestamps: default_timestamps(),
        }
    }
}
