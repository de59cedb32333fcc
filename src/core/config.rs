// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Configuration Module
//!
//! Build configuration of NoteFlow, read from a TOML file and refined by
//! environment variables and programmatic overrides.
//!
//! Sources are applied in this order:
//!
//! 1. the TOML file, or the defaults when none is given
//! 2. the profile passed to the builder
//! 3. environment variables starting with the prefix, `__` separating a
//!    section from its key (`NOTEFLOW_NOTES__MARKER`)
//! 4. explicit overrides with dotted keys (`notes.marker`)
//!
//! The result is validated before it is returned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use noteflow::core::config::{ConfigBuilder, Profile};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("noteflow.toml")
//!     .with_env_prefix("NOTEFLOW_")
//!     .with_profile(Profile::Production)
//!     .with_override("output.minify", true)
//!     .build()
//!     .unwrap();
//!
//! let config_read = config.read();
//! assert_eq!(config_read.profile, Profile::Production);
//! assert!(config_read.output.minify);
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{NoteFlowError, Result};
use crate::core::traits::{Shareable, Validator};
use crate::processors::internal_notes::INTERNAL_NOTES_MARKER;
use crate::site::{SiteConfig, SiteValidator};

/// Default prefix of environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "NOTEFLOW_";

/// Operational profile of a build.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local writing.
    #[default]
    Development,
    /// Preview deployments.
    Staging,
    /// Published site.
    Production,
    /// Anything else.
    Custom,
}

impl Profile {
    /// Parses a profile name; unknown names map to [`Profile::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" => Profile::Development,
            "staging" => Profile::Staging,
            "production" => Profile::Production,
            _ => Profile::Custom,
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the markdown sources.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Directory the rendered pages are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Operational profile.
    #[serde(default)]
    pub profile: Profile,

    /// Internal-notes filtering.
    #[serde(default)]
    pub notes: NotesConfig,

    /// Output generation.
    #[serde(default)]
    pub output: OutputConfig,

    /// Site declaration; its theme also carries the markdown toggles.
    #[serde(default)]
    pub site: SiteConfig,

    /// Values NoteFlow does not interpret.
    #[serde(default)]
    pub custom: HashMap<String, TomlValue>,
}

/// Settings of the internal-notes filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Substring marking an internal note.
    pub marker: String,
    /// Whether every removed note is logged at `info` level.
    pub log_removals: bool,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            marker: INTERNAL_NOTES_MARKER.to_string(),
            log_removals: true,
        }
    }
}

/// Settings of the HTML output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Minify the written HTML.
    pub minify: bool,
}

/// Builds a [`Config`] from a file, the environment and overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    profile: Option<Profile>,
    overrides: HashMap<String, TomlValue>,
}

impl ConfigBuilder {
    /// Creates a builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from the TOML file at `path`.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Applies environment variables starting with `prefix`.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Sets the profile.
    pub fn with_profile<P: Into<Profile>>(mut self, profile: P) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Overrides `key` with `value`. Dotted keys address sections.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        let _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Applies every source and validates the result.
    pub fn build(self) -> Result<Arc<RwLock<Config>>> {
        let mut config = match &self.config_file {
            Some(path) => load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(profile) = self.profile {
            config.profile = profile;
        }

        if let Some(prefix) = &self.env_prefix {
            apply_env_overrides(&mut config, prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        validate_config(&config)?;

        debug!(
            "Loaded {:?} configuration: content {}, output {}",
            config.profile,
            config.content_dir.display(),
            config.output_dir.display()
        );
        Ok(config.into_shared())
    }
}

impl Config {
    /// Validates directories, the marker and the site declaration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// Reads a custom value as `T`.
    ///
    /// Returns `Ok(None)` if the key is absent and an error if the value
    /// does not convert.
    pub fn get_custom<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        self.custom
            .get(key)
            .map(|value| {
                value.clone().try_into().map_err(|e| {
                    NoteFlowError::config_error(
                        format!("Invalid custom config value: {}", e),
                        None,
                    )
                })
            })
            .transpose()
    }

    /// Stores a custom value.
    pub fn set_custom<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
    ) -> Result<()> {
        let value = TomlValue::try_from(value).map_err(|e| {
            NoteFlowError::config_error(
                format!("Invalid custom config value: {}", e),
                None,
            )
        })?;
        let _ = self.custom.insert(key.to_string(), value);
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            profile: Profile::default(),
            notes: NotesConfig::default(),
            output: OutputConfig::default(),
            site: SiteConfig::default(),
            custom: HashMap::new(),
        }
    }
}

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        NoteFlowError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        NoteFlowError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key = stripped
                .trim_start_matches('_')
                .to_lowercase()
                .replace("__", ".");
            if !is_known_key(&config_key) {
                warn!("Ignoring environment variable {}: unknown key", key);
                continue;
            }
            apply_config_value(config, &config_key, &value)?;
        }
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &HashMap<String, TomlValue>,
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    validate_dir(&config.content_dir, "content")?;

    if config.output_dir.exists() && !config.output_dir.is_dir() {
        return Err(NoteFlowError::config_error(
            format!(
                "output path is not a directory: {}",
                config.output_dir.display()
            ),
            Some(config.output_dir.clone()),
        ));
    }

    if config.notes.marker.trim().is_empty() {
        return Err(NoteFlowError::config_error(
            "The internal-notes marker cannot be empty",
            None,
        ));
    }

    SiteValidator::new()
        .with_content_dir(&config.content_dir)
        .validate(&config.site)
}

/// Keys [`apply_config_value`] accepts besides `custom.*`.
const CONFIG_KEYS: &[&str] = &[
    "content_dir",
    "output_dir",
    "profile",
    "notes.marker",
    "notes.log_removals",
    "output.minify",
    "site.base",
    "site.lang",
    "site.title",
    "site.description",
];

fn is_known_key(key: &str) -> bool {
    CONFIG_KEYS.contains(&key)
        || key
            .strip_prefix("custom.")
            .is_some_and(|custom_key| !custom_key.is_empty())
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "content_dir" => config.content_dir = PathBuf::from(value),
        "output_dir" => config.output_dir = PathBuf::from(value),
        "profile" => config.profile = Profile::from_name(value),
        "notes.marker" => config.notes.marker = value.to_string(),
        "notes.log_removals" => {
            config.notes.log_removals = parse_bool(key, value)?
        }
        "output.minify" => config.output.minify = parse_bool(key, value)?,
        "site.base" => config.site.base = value.to_string(),
        "site.lang" => config.site.lang = value.to_string(),
        "site.title" => config.site.title = value.to_string(),
        "site.description" => config.site.description = value.to_string(),
        _ => match key.split_once('.') {
            Some(("custom", custom_key)) => {
                let _ = config.custom.insert(
                    custom_key.to_string(),
                    TomlValue::String(value.to_string()),
                );
            }
            _ => {
                return Err(NoteFlowError::config_error(
                    format!("Unknown configuration key: {}", key),
                    None,
                ));
            }
        },
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|e| {
        NoteFlowError::config_error(
            format!("Invalid {} value '{}': {}", key, value, e),
            None,
        )
    })
}

fn validate_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        return Err(NoteFlowError::config_error(
            format!("{} directory does not exist: {}", name, path.display()),
            Some(path.to_path_buf()),
        ));
    }

    if !path.is_dir() {
        return Err(NoteFlowError::config_error(
            format!("{} path is not a directory: {}", name, path.display()),
            Some(path.to_path_buf()),
        ));
    }

    Ok(())
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}
