//! Canvas renderer configuration
//!
//! Loaded from TOML, e.g. `canvas.toml`:
//!
//! ```toml
//! circle_segments = 64
//! arc_segments = 32
//! fill_strategy = "geometry"
//! component_slot = 10
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tessellate::{ARC_SEGMENTS, CIRCLE_SEGMENTS};

/// Component slot the canvas renderer and bridge register under by default
pub const DEFAULT_COMPONENT_SLOT: u32 = 10;

/// Upper bound for `circle_segments` and `arc_segments`
pub const MAX_SEGMENTS: usize = 4096;

/// How filled circles and ellipses are drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Submit the wedge fan as a triangle mesh (needs a white texture;
    /// falls back to [`FillStrategy::WedgeOutlines`] without one)
    #[default]
    Geometry,
    /// Stroke the outline of every wedge. Visibly approximate, but works
    /// on backends with no triangle rasterization.
    WedgeOutlines,
}

/// Renderer settings
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Segments used to approximate circles and ellipses
    pub circle_segments: usize,
    /// Segments used to approximate arcs
    pub arc_segments: usize,
    pub fill_strategy: FillStrategy,
    /// Registry slot for the component renderer and callback bridge
    pub component_slot: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            circle_segments: CIRCLE_SEGMENTS,
            arc_segments: ARC_SEGMENTS,
            fill_strategy: FillStrategy::default(),
            component_slot: DEFAULT_COMPONENT_SLOT,
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "loaded canvas config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.circle_segments < 3 {
            return Err(ConfigError::Invalid(format!(
                "circle_segments must be at least 3, got {}",
                self.circle_segments
            )));
        }
        if self.arc_segments < 1 {
            return Err(ConfigError::Invalid(
                "arc_segments must be at least 1".to_string(),
            ));
        }
        for (key, value) in [
            ("circle_segments", self.circle_segments),
            ("arc_segments", self.arc_segments),
        ] {
            if value > MAX_SEGMENTS {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be at most {MAX_SEGMENTS}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.circle_segments, 64);
        assert_eq!(config.arc_segments, 32);
        assert_eq!(config.fill_strategy, FillStrategy::Geometry);
        assert_eq!(config.component_slot, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(CanvasConfig::from_toml_str("").unwrap(), CanvasConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = CanvasConfig::from_toml_str(
            r#"
            arc_segments = 8
            fill_strategy = "wedge_outlines"
            "#,
        )
        .unwrap();
        assert_eq!(config.arc_segments, 8);
        assert_eq!(config.fill_strategy, FillStrategy::WedgeOutlines);
        assert_eq!(config.circle_segments, CIRCLE_SEGMENTS);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            CanvasConfig::from_toml_str("segments = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_segments() {
        assert!(matches!(
            CanvasConfig::from_toml_str("circle_segments = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CanvasConfig::from_toml_str("arc_segments = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_excessive_segments() {
        let err = CanvasConfig::from_toml_str("circle_segments = 4000000000").unwrap_err();
        assert!(err.to_string().contains("circle_segments"));
        assert!(matches!(
            CanvasConfig::from_toml_str("arc_segments = 4097"),
            Err(ConfigError::Invalid(_))
        ));
        let config = CanvasConfig::from_toml_str("circle_segments = 4096").unwrap();
        assert_eq!(config.circle_segments, MAX_SEGMENTS);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CanvasConfig::load("/definitely/not/here/canvas.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
