//! Application configuration is based on injecting a [PosConfigProvider], which can later be used
//! to retrieve [PosConfig].
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by `application.json` file in the working directory or environment variables prefixed with
//! `POS_`, using `__` as the nesting separator, e.g. `POS_APP__TITLE`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use springtime_di::component_registry::conditional::unregistered_component;
use springtime_di::instance_provider::ErrorPtr;
use springtime_di::{component_alias, injectable, Component};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONFIG_ENV_PREFIX: &str = "POS";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "application.json";

/// Window title used when none is configured.
pub const DEFAULT_TITLE: &str = "POS JavaFX Spring App";

/// Settings of the application window and its views, stored under the `app` key.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Title of the primary window.
    pub title: String,
    /// Directory containing view resources. Bundled views are used when not set.
    pub views_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            views_dir: None,
        }
    }
}

/// Application configuration which can be provided by a [PosConfigProvider].
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Should a default tracing logger be installed when the application context starts.
    pub install_tracing_logger: bool,
    pub app: AppConfig,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            app: Default::default(),
        }
    }
}

impl PosConfig {
    /// Loads the config from given file, if it exists, and the environment.
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load(Config::builder().add_source(File::from(path.as_ref()).required(false)))
    }

    fn init_from_environment() -> Result<Self, ConfigError> {
        Self::from_file(CONFIG_FILE)
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|config| config.try_deserialize::<PosConfig>())
    }
}

/// Provider for [PosConfig]. The primary instance of the provider will be used to retrieve
/// application configuration.
#[injectable]
pub trait PosConfigProvider {
    fn config(&self) -> Result<&PosConfig, ErrorPtr>;
}

#[derive(Component)]
#[component(priority = -128, condition = "unregistered_component::<dyn PosConfigProvider + Send + Sync>", constructor = "DefaultPosConfigProvider::new")]
struct DefaultPosConfigProvider {
    // cached init result
    #[component(ignore)]
    config: Result<PosConfig, ErrorPtr>,
}

impl DefaultPosConfigProvider {
    fn new() -> Result<Self, ErrorPtr> {
        Ok(Self {
            config: PosConfig::init_from_environment().map_err(|error| Arc::new(error) as ErrorPtr),
        })
    }
}

#[component_alias]
impl PosConfigProvider for DefaultPosConfigProvider {
    fn config(&self) -> Result<&PosConfig, ErrorPtr> {
        match &self.config {
            Ok(config) => Ok(config),
            Err(error) => Err(error.clone()),
        }
    }
}
