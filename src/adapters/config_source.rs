//! JSON configuration source.
//!
//! Implements [`ConfigPort`] over a JSON document embedded in the firmware
//! image (or handed in by a test). Fields absent from the document keep
//! their defaults; a document that parses but fails range validation is
//! rejected rather than clamped.

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::RigConfig;
use crate::error::ConfigError;

pub struct JsonConfigSource {
    document: Option<String>,
}

impl JsonConfigSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    /// A source with no document; `load` yields the defaults.
    pub fn defaults() -> Self {
        Self { document: None }
    }
}

impl ConfigPort for JsonConfigSource {
    fn load(&self) -> Result<RigConfig, ConfigError> {
        let Some(text) = self.document.as_deref().filter(|t| !t.trim().is_empty()) else {
            info!("JsonConfigSource: no document, using defaults");
            return Ok(RigConfig::default());
        };

        let cfg: RigConfig = serde_json::from_str(text).map_err(|e| {
            warn!("JsonConfigSource: parse error: {}", e);
            ConfigError::Malformed
        })?;
        cfg.validate()?;
        info!(
            "JsonConfigSource: {} pumps, {} ms/tenth, scale {:.2}",
            cfg.channel_count, cfg.pour_rate_ms, cfg.scale_factor
        );
        Ok(cfg)
    }
}
