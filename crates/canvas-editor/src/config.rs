//! Engine configuration.
//!
//! A plain struct with sensible defaults, optionally loaded from a JSON
//! blob the host stores alongside its other editor settings. Missing keys
//! fall back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the flow-reorder slider turns pointer travel into an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SliderSnapping {
    /// Round to the nearest whole step.
    #[default]
    RoundedValue,
    /// Truncate toward zero: the index only changes once a full step is
    /// crossed.
    RawValue,
}

/// What a pointer press does while an interaction session is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressDuringSession {
    /// Drop the press and keep the running session.
    #[default]
    Ignore,
    /// Commit the running session, then start a new one.
    ImplicitCommit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snap distance in screen pixels (divided by the canvas scale).
    pub snap_threshold: f32,
    /// Pointer travel in canvas pixels per slider step.
    pub reorder_slider_step: f32,
    pub slider_snapping: SliderSnapping,
    /// Arrow-key nudge distance.
    pub keyboard_nudge: f32,
    /// Arrow-key nudge distance with Shift held.
    pub keyboard_nudge_shift: f32,
    pub press_during_session: PressDuringSession,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 5.0,
            reorder_slider_step: 32.0,
            slider_snapping: SliderSnapping::RoundedValue,
            keyboard_nudge: 1.0,
            keyboard_nudge_shift: 10.0,
            press_during_session: PressDuringSession::Ignore,
        }
    }
}

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl EngineConfig {
    /// Parse a JSON config blob. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reorder_slider_step <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "reorder_slider_step",
                reason: format!("must be positive, got {}", self.reorder_slider_step),
            });
        }
        if self.snap_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "snap_threshold",
                reason: format!("must not be negative, got {}", self.snap_threshold),
            });
        }
        Ok(())
    }
}
