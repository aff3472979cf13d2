// SPDX-License-Identifier: MIT OR Apache-2.0
//! Notifications queued for the host.

use crate::block::BlockId;

/// Something the host may want to react to (redraw, show a slide, ...).
///
/// Events are queued by the timeline and drained with
/// [`Timeline::take_events`](crate::Timeline::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// Playback started at this global time
    PlaybackStarted {
        /// Playhead position
        at: f64,
    },
    /// Playback paused at this global time
    PlaybackStopped {
        /// Playhead position
        at: f64,
    },
    /// The playhead reached the end of the timeline and playback stopped
    ReachedEnd {
        /// Total duration at the time of stopping
        at: f64,
    },
    /// The playhead was moved by the user
    Seeked {
        /// New playhead position
        to: f64,
    },
    /// A different slide became active
    SlideActivated {
        /// Index in slide order
        index: usize,
        /// Slide block
        block: BlockId,
    },
    /// No slide is active anymore
    SlideCleared,
    /// A block was added
    BlockAdded(BlockId),
    /// A block's fields changed
    BlockUpdated(BlockId),
    /// A block was deleted
    BlockRemoved(BlockId),
    /// The selection changed
    SelectionChanged(Option<BlockId>),
    /// The zoom factor changed
    ZoomChanged(f64),
}
