// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine configuration.
//!
//! Every tunable constant of the timeline lives here so hosts can load
//! them from a RON file instead of patching code.

use crate::block::BlockKind;
use crate::navigator::PastEndPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON could not be written
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// A value is out of its valid range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Minimum displayed duration per block kind, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinDurations {
    /// Slides
    pub slide: f64,
    /// Audio clips
    pub audio: f64,
    /// Video clips
    pub video: f64,
}

impl MinDurations {
    /// Minimum duration for a block kind
    pub fn for_kind(&self, kind: BlockKind) -> f64 {
        match kind {
            BlockKind::Slide => self.slide,
            BlockKind::Audio => self.audio,
            BlockKind::Video => self.video,
        }
    }
}

impl Default for MinDurations {
    fn default() -> Self {
        Self {
            slide: 1.0,
            audio: 1.0,
            video: 0.5,
        }
    }
}

/// Zoom bounds and stepping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomSettings {
    /// Zoom on a fresh timeline
    pub initial: f64,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Increment used by zoom in/out
    pub step: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            initial: 1.0,
            min: 0.5,
            max: 3.0,
            step: 0.25,
        }
    }
}

/// Timeline engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Pixels per second at zoom 1.0
    pub base_pixels_per_second: f64,
    /// Zoom bounds
    pub zoom: ZoomSettings,
    /// Minimum durations per block kind
    pub min_durations: MinDurations,
    /// Floor for the total duration of a timeline (seconds)
    pub min_total_duration: f64,
    /// Distance from the source end at which a playing clip restarts (seconds)
    pub loop_epsilon: f64,
    /// Playhead advance per tick for the fixed tick source (seconds)
    pub tick_step: f64,
    /// Largest step the measured tick source will report (seconds)
    pub max_measured_step: f64,
    /// What the slide navigator reports past the last slide
    pub past_end: PastEndPolicy,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_pixels_per_second: 50.0,
            zoom: ZoomSettings::default(),
            min_durations: MinDurations::default(),
            min_total_duration: 30.0,
            loop_epsilon: 0.05,
            tick_step: 1.0 / 60.0,
            max_measured_step: 0.25,
            past_end: PastEndPolicy::default(),
        }
    }
}

impl TimelineConfig {
    /// Load a configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse a configuration from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .depth_limit(3)
            .indentor("    ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Check value ranges. NaN and infinities are rejected everywhere.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.base_pixels_per_second) {
            return Err(ConfigError::Invalid(
                "base_pixels_per_second must be positive".into(),
            ));
        }
        let zoom = &self.zoom;
        if !is_positive(zoom.min) || !is_positive(zoom.max) || zoom.min > zoom.max {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds {}..{} are not a valid range",
                zoom.min, zoom.max
            )));
        }
        if !is_positive(zoom.initial) {
            return Err(ConfigError::Invalid("initial zoom must be positive".into()));
        }
        if !is_positive(zoom.step) {
            return Err(ConfigError::Invalid("zoom step must be positive".into()));
        }
        if !is_positive(self.tick_step) || !is_positive(self.max_measured_step) {
            return Err(ConfigError::Invalid("tick steps must be positive".into()));
        }
        let mins = &self.min_durations;
        if !is_positive(mins.slide) || !is_positive(mins.audio) || !is_positive(mins.video) {
            return Err(ConfigError::Invalid(
                "minimum durations must be positive".into(),
            ));
        }
        if !is_non_negative(self.loop_epsilon) || !is_non_negative(self.min_total_duration) {
            return Err(ConfigError::Invalid(
                "loop_epsilon and min_total_duration must be finite and not negative".into(),
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
