//! Model file resolution and loading.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → system → defaults.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::model::ModelConfig;
use crate::validate::{validate_model, ValidationError, ValidationResult};

/// Where the model file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via `--config`.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/markov-cohort/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_MODEL_PATH: &str = "MARKOV_COHORT_CONFIG";
pub const ENV_CONFIG_DIR: &str = "MARKOV_COHORT_CONFIG_DIR";

/// Standard model file name.
pub const MODEL_FILENAME: &str = "model.json";

/// Application name for XDG directories.
const APP_NAME: &str = "markov-cohort";

/// A validated model together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub model: ModelConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve the model file path.
///
/// Resolution order:
/// 1. Explicit CLI path (returned even if missing, so loading reports it)
/// 2. MARKOV_COHORT_CONFIG
/// 3. MARKOV_COHORT_CONFIG_DIR + model.json
/// 4. XDG config directory (~/.config/markov-cohort/)
/// 5. System config (/etc/markov-cohort/)
/// 6. Built-in defaults (None)
pub fn resolve_model_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }

    if let Ok(env_path) = std::env::var(ENV_MODEL_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(MODEL_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(MODEL_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(MODEL_FILENAME);
    if system_path.exists() {
        return (Some(system_path), ConfigSource::SystemConfig);
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for markov-cohort.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// Resolve, parse and validate the model.
pub fn load_model_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let (path, source) = resolve_model_path(cli_path);

    let model = match &path {
        Some(p) => {
            if !p.exists() {
                return Err(ValidationError::IoError(format!(
                    "Model file not found: {}",
                    p.display()
                )));
            }
            debug!(path = %p.display(), source = %source, "loading model file");
            ModelConfig::from_file(p)?
        }
        None => {
            debug!("no model file found, using built-in defaults");
            ModelConfig::default()
        }
    };

    validate_model(&model)?;

    info!(
        source = %source,
        path = path.as_ref().map(|p| p.display().to_string()).as_deref().unwrap_or("-"),
        population_size = model.simulation.population_size,
        horizon = model.simulation.horizon,
        "model configuration loaded"
    );

    Ok(LoadedConfig {
        model,
        path,
        source,
    })
}
