//! TOML-based configuration for rowgraph.
//!
//! Supports a config file (rowgraph.toml) with environment variable
//! expansion in path values.
//!
//! Example configuration:
//! ```toml
//! [hydration]
//! segment_size = 250
//! retain_segments = false
//!
//! [annotations]
//! namespace = "minor"
//! strict = false
//!
//! [annotations.aliases]
//! orm = "minor"
//!
//! [cache]
//! enabled = true
//! path = "${HOME}/.rowgraph/cache.db"
//!
//! [logging]
//! level = "debug"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::annotations::Namespaces;
use crate::cursor::{HydrationOptions, DEFAULT_SEGMENT_SIZE};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub hydration: HydrationSettings,
    pub annotations: AnnotationSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

/// Cursor settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HydrationSettings {
    /// Rows fetched and hydrated per segment.
    pub segment_size: usize,

    /// Keep hydrated segments so a rewind does not re-query the source.
    pub retain_segments: bool,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            retain_segments: false,
        }
    }
}

impl TryFrom<&HydrationSettings> for HydrationOptions {
    type Error = SettingsError;

    fn try_from(settings: &HydrationSettings) -> Result<Self, Self::Error> {
        if settings.segment_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "hydration.segment_size must be greater than zero".to_string(),
            ));
        }
        Ok(HydrationOptions {
            segment_size: settings.segment_size,
            retain_segments: settings.retain_segments,
        })
    }
}

/// Annotation lookup settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Namespace scanned for `relation`, `var` and `key` tags.
    pub namespace: String,

    /// Alias namespace -> namespace it stands in for.
    pub aliases: BTreeMap<String, String>,

    /// Disable the global-namespace fallback for `namespace`.
    pub strict: bool,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            namespace: "minor".to_string(),
            aliases: BTreeMap::new(),
            strict: false,
        }
    }
}

impl AnnotationSettings {
    /// Lookup rules for an [`AnnotationRegistry`](crate::annotations::AnnotationRegistry).
    pub fn namespaces(&self) -> Namespaces {
        let namespaces = self
            .aliases
            .iter()
            .fold(Namespaces::default(), |ns, (alias, target)| {
                ns.with_alias(alias.clone(), target.clone())
            });
        if self.strict {
            namespaces.with_strict(self.namespace.clone())
        } else {
            namespaces
        }
    }
}

/// Persistent structure cache settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,

    /// Database path (supports ${ENV_VAR} expansion). Defaults to
    /// `~/.rowgraph/cache.db`.
    pub path: Option<String>,
}

impl CacheSettings {
    /// Get the cache path with environment variables and a leading `~/`
    /// expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(|p| expand_home(&p)))
            .transpose()
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `ROWGRAPH_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.hydration_options()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ROWGRAPH_CONFIG`
    /// 2. `./rowgraph.toml`
    /// 3. `~/.config/rowgraph/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ROWGRAPH_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("rowgraph.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("rowgraph").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    pub fn hydration_options(&self) -> Result<HydrationOptions, SettingsError> {
        HydrationOptions::try_from(&self.hydration)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // lone $
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
