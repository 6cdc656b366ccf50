// ABOUTME: Configuration management for the stepwise application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            PathBuf::from("stepwise.yaml"),
            PathBuf::from("stepwise.yml"),
            PathBuf::from(".stepwise.yaml"),
            PathBuf::from(".stepwise.yml"),
        ];

        possible_paths
            .into_iter()
            .find(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from("stepwise.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Logging configuration
        if let Some(level) = lookup("STEPWISE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("STEPWISE_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Engine configuration
        if let Some(actor) = lookup("STEPWISE_ADMIN_ACTOR") {
            self.engine.admin_actor = actor;
        }
        if let Some(limit) = lookup("STEPWISE_MAX_CHAIN") {
            self.engine.max_chain_length = Some(limit.parse()?);
        }
        if let Some(fields) = lookup("STEPWISE_VOLATILE_FIELDS") {
            self.engine.volatile_fields = fields
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(())
    }
}
