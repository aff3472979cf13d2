// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview errors.

use slidereel_timeline::{ConfigError, TimelineError};

/// Errors that end a preview run
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storyboard could not be parsed
    #[error("Storyboard parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine error
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Audio output could not be opened
    #[cfg(feature = "audio")]
    #[error("Audio error: {0}")]
    Audio(String),
}
