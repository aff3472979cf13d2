// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline error types.

use crate::block::{BlockId, BlockKind};
use crate::config::ConfigError;
use crate::media::MediaError;

/// Errors surfaced by the timeline API
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// No block with this ID
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    /// A block with this ID already exists
    #[error("Duplicate block ID: {0}")]
    DuplicateBlock(BlockId),

    /// A slide would overlap an existing slide
    #[error("Slide {block} overlaps slide {other}")]
    SlideOverlap {
        /// Slide being placed
        block: BlockId,
        /// Slide already occupying the interval
        other: BlockId,
    },

    /// The operation needs an audio or video block
    #[error("Not a media kind: {0:?}")]
    NotMedia(BlockKind),

    /// Media backend error
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
