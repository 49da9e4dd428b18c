//! Error types for easel_render

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::CommandRange;

/// Errors raised while executing a command against a backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The backend rejected an operation
    #[error("backend error: {0}")]
    Backend(String),

    /// Per-command scratch memory could not be allocated
    #[error("scratch allocation of {count} {what} failed")]
    Allocation { what: &'static str, count: usize },
}

/// Result type for backend operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Errors raised by the plugin registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("plugin '{0}' is already registered")]
    DuplicatePlugin(String),

    #[error("command range {range} of '{plugin}' overlaps '{other}' ({other_range})")]
    RangeOverlap {
        plugin: String,
        range: CommandRange,
        other: String,
        other_range: CommandRange,
    },

    #[error("invalid command range {start:#06x}..={end:#06x}")]
    InvalidRange { start: u16, end: u16 },

    #[error("command id {0:#06x} is not inside any registered range")]
    UnclaimedCommand(u16),

    #[error("a handler for command id {0:#06x} is already registered")]
    DuplicateHandler(u16),

    #[error("a component renderer is already registered for slot {0}")]
    DuplicateRenderer(u32),

    #[error("a callback bridge is already registered for slot {0}")]
    DuplicateBridge(u32),

    #[error("no component renderer registered for slot {0}")]
    MissingRenderer(u32),

    #[error("no callback bridge registered for slot {0}")]
    MissingBridge(u32),
}

/// Plugin activation failure; the registry has been rolled back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("canvas plugin init failed while registering {step}: {source}")]
pub struct PluginError {
    pub step: String,
    #[source]
    pub source: RegistryError,
}

/// Errors raised while loading [`CanvasConfig`](crate::config::CanvasConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid canvas config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid canvas config: {0}")]
    Invalid(String),
}
