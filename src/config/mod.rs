//! Configuration module for rowgraph.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, AnnotationSettings, CacheSettings, HydrationSettings, LoggingSettings,
    Settings, SettingsError,
};
