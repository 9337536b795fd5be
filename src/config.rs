//! Configuration for gibdetect
//!
//! Supports loading config from:
//! - Environment variables
//! - `./gibdetect.toml` (or a path given with `--config`)
//! - `~/.config/gibdetect/config.toml`
//!
//! ```toml
//! [model]
//! path = "models/en.json"
//!
//! [train]
//! accepted_chars = "abcdefghijklmnopqrstuvwxyz "
//! prior = 10
//! ```

use crate::default_model::MODEL_ENV_VAR;
use crate::model::TrainConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-level config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "gibdetect.toml";

/// Overrides `[train] accepted_chars`
pub const ACCEPTED_CHARS_ENV_VAR: &str = "GIBDETECT_ACCEPTED_CHARS";

/// Overrides `[train] prior`
pub const PRIOR_ENV_VAR: &str = "GIBDETECT_PRIOR";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct GibConfig {
    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub train: TrainSection,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSection {
    /// Model file used by `score` and `check` (default: bundled model)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainSection {
    /// Accepted characters for new models
    pub accepted_chars: Option<String>,

    /// Smoothing pseudo-count for new models
    pub prior: Option<u64>,
}

impl GibConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. `explicit` path, or `./gibdetect.toml` if it exists
    /// 3. User config (~/.config/gibdetect/config.toml)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = GibConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| Self::read_optional(&p))
        {
            config.merge(user_config);
        }

        match explicit {
            // An explicitly requested file must exist and parse.
            Some(path) => {
                let project = Self::read(path)?;
                config.merge(project);
            }
            None => {
                let path = Path::new(PROJECT_CONFIG_FILE);
                if path.exists() {
                    if let Some(project) = Self::read_optional(path) {
                        config.merge(project);
                    }
                }
            }
        }

        config.apply_env()?;
        Ok(config)
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gibdetect").join("config.toml"))
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str::<GibConfig>(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Read a config file that is allowed to be broken: problems are logged
    /// and the file is skipped.
    fn read_optional(path: &Path) -> Option<Self> {
        match Self::read(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring config {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Environment variables override everything
    fn apply_env(&mut self) -> Result<()> {
        if let Some(path) = std::env::var_os(MODEL_ENV_VAR) {
            self.model.path = Some(PathBuf::from(path));
        }
        if let Ok(chars) = std::env::var(ACCEPTED_CHARS_ENV_VAR) {
            self.train.accepted_chars = Some(chars);
        }
        if let Ok(prior) = std::env::var(PRIOR_ENV_VAR) {
            let prior = prior
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", PRIOR_ENV_VAR, prior))?;
            self.train.prior = Some(prior);
        }
        Ok(())
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: GibConfig) {
        if other.model.path.is_some() {
            self.model.path = other.model.path;
        }
        if other.train.accepted_chars.is_some() {
            self.train.accepted_chars = other.train.accepted_chars;
        }
        if other.train.prior.is_some() {
            self.train.prior = other.train.prior;
        }
    }

    /// Training settings, falling back to the built-in defaults
    pub fn train_config(&self) -> TrainConfig {
        let defaults = TrainConfig::default();
        TrainConfig {
            accepted_chars: self
                .train
                .accepted_chars
                .clone()
                .unwrap_or(defaults.accepted_chars),
            prior: self.train.prior.unwrap_or(defaults.prior),
        }
    }

    /// Configured model path, if any
    pub fn model_path(&self) -> Option<&Path> {
        self.model.path.as_deref()
    }
}
