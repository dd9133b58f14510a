use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_MODEL_LABEL: &str = "DeepScan EfficientNet-B4 + Temporal Attention v2.1";

/// What to do when a file is submitted while another run is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Supersede the active run; it stops at its next stage transition.
    #[default]
    CancelPrevious,
    /// Refuse the new submission until the active run finishes.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub max_file_size_bytes: u64,
    pub stage_delay_ms: u64,
    pub deepfake_probability: f64,
    pub model_label: String,
    pub reentry_policy: ReentryPolicy,
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            stage_delay_ms: 600,
            deepfake_probability: 0.4,
            model_label: DEFAULT_MODEL_LABEL.to_string(),
            reentry_policy: ReentryPolicy::default(),
            seed: None,
        }
    }
}

impl Configuration {
    const ENV_PREFIX: &'static str = "DEEPSCAN";

    /// Layers an optional config file and `DEEPSCAN__*` environment variables
    /// over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_file_size_bytes == 0 {
            return Err(AppError::InvalidConfiguration(
                "Max file size must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.deepfake_probability) {
            return Err(AppError::InvalidConfiguration(
                "Deepfake probability must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.model_label.trim().is_empty() {
            return Err(AppError::InvalidConfiguration(
                "Model label must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
