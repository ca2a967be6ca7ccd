use crate::repository::DEFAULT_TASK_FILE;
use anyhow::Context;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;

/// Optional `task-cli.toml` (or any format the `config` crate knows) in the working directory.
pub const CONFIG_FILE_NAME: &str = "task-cli";
pub const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_file")]
    pub file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads configuration from the optional config file, then `TASK_CLI_*` environment
    /// variables, later sources winning.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(File::with_name(CONFIG_FILE_NAME).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX)),
        )
    }

    pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn level(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("Invalid log level '{}'", self.log_level))
    }
}

fn default_file() -> PathBuf {
    PathBuf::from(DEFAULT_TASK_FILE)
}

fn default_log_level() -> String {
    "warn".to_string()
}
