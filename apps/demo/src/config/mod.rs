use config::Config;
use event_bus::BusConfig;
use serde::Deserialize;

use std::path::PathBuf;

mod logger;
pub use logger::LoggerConfig;

mod scenario;
pub use scenario::ScenarioConfig;

#[derive(Deserialize, Default)]
pub struct DemoConfig {
    #[serde(default)]
    pub logger: LoggerConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl DemoConfig {
    pub fn from_path(path: PathBuf) -> eyre::Result<Self> {
        let config = Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
