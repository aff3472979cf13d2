// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline and playback synchronization engine for SlideReel.
//!
//! This crate lays slides, audio clips and video clips out on one shared
//! time axis and plays them back in lock-step:
//! - Slide, audio and video tracks of draggable, stretchable blocks
//! - Collision rules that keep slides from overlapping
//! - One playhead driving every media resource, with looping and fades
//! - Automatic selection of the slide under the playhead
//!
//! ## Architecture
//!
//! The engine is built on:
//! - [`BlockStore`] holding every block with clamped partial updates
//! - [`InteractionController`] turning pointer gestures into block updates
//! - [`PlaybackClock`] owning the playhead and one [`MediaSynchronizer`] per
//!   media block
//! - [`SlideNavigator`] observing the clock
//! - [`Timeline`], the facade hosts talk to
//!
//! Media is reached through the [`MediaResource`] and [`MediaBackend`]
//! traits; [`SimulatedBackend`] plays deterministically without any decoder.

pub mod block;
pub mod clock;
pub mod config;
pub mod coords;
pub mod error;
pub mod event;
pub mod fade;
pub mod interaction;
pub mod media;
pub mod navigator;
pub mod placement;
pub mod store;
pub mod sync;
pub mod timeline;
pub mod track;
pub mod ui;

pub use block::{
    AudioCategory, AudioData, Block, BlockContent, BlockId, BlockKind, BlockUpdate, SlideData,
    SlidePlacement, SourceRef, VideoData,
};
pub use clock::{ClockState, FixedStep, MeasuredStep, PlaybackClock, TickSource};
pub use config::{ConfigError, MinDurations, TimelineConfig, ZoomSettings};
pub use coords::{format_time, RulerTick, TimeScale};
pub use error::{Result, TimelineError};
pub use event::TimelineEvent;
pub use interaction::{DragOperation, InteractionController, MoveOutcome, StretchEdge};
pub use media::{MediaBackend, MediaError, MediaResource, SimulatedBackend, SimulatedMedia};
pub use navigator::{PastEndPolicy, SlideNavigator, TimeObserver};
pub use placement::Placement;
pub use store::BlockStore;
pub use sync::{MediaSynchronizer, SyncStatus};
pub use timeline::Timeline;
pub use track::{Track, TrackKind};
pub use ui::TimelinePanel;
