//! Errors raised while loading and validating scenario configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Scenario file could not be read
    #[error("failed to read scenario file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scenario text is not valid YAML for [`ScenarioConfig`](super::config::ScenarioConfig)
    #[error("invalid scenario YAML")]
    Yaml(#[from] serde_yaml::Error),

    /// A value parsed but is out of range
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
