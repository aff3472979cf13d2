// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-block media synchronization.
//!
//! A [`MediaSynchronizer`] owns exactly one media resource and keeps it in
//! step with the global playhead:
//! - outside the block's window the resource is paused
//! - inside it, the resource plays from `track_time mod original_duration`
//! - a playing resource that reaches its natural end restarts at 0, which
//!   loops the source when the block is stretched past it
//! - the fade envelope (audio) or plain volume (video) is applied every tick

use crate::block::{Block, BlockContent, BlockId};
use crate::fade;
use crate::media::{MediaError, MediaResource};

/// Whether the block is active at `track_time` seconds into it
pub fn is_active(track_time: f64, duration: f64) -> bool {
    (0.0..=duration).contains(&track_time)
}

/// Map a block-relative time onto the source's own timeline
pub fn local_time(track_time: f64, original_duration: f64) -> f64 {
    if original_duration <= f64::EPSILON {
        return 0.0;
    }
    track_time.rem_euclid(original_duration)
}

/// Resource volume (0..1) for a media block at `track_time`
pub fn block_volume(block: &Block, track_time: f64) -> Option<f32> {
    match &block.content {
        BlockContent::Slide(_) => None,
        BlockContent::Audio(audio) => Some(fade::faded_volume(
            audio.volume,
            track_time,
            block.duration,
            audio.fade_in,
            audio.fade_out,
        )),
        BlockContent::Video(video) => Some(fade::applied_volume(video.volume, 1.0)),
    }
}

/// Load state of a synchronizer's resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Resource loaded and controllable
    Ready,
    /// Resource failed to load; the block is skipped during playback
    Unavailable,
    /// Resource has been released
    Released,
}

/// Keeps one media resource aligned with the global playhead
pub struct MediaSynchronizer {
    block_id: BlockId,
    resource: Box<dyn MediaResource>,
    status: SyncStatus,
    loop_epsilon: f64,
    /// Set after a rejected `play()` has been reported
    play_rejected: bool,
}

impl MediaSynchronizer {
    /// Load `resource` for `block` and wrap it.
    ///
    /// A load failure is logged once and leaves the synchronizer
    /// [`SyncStatus::Unavailable`]; the block itself stays editable.
    pub fn attach(block: &Block, mut resource: Box<dyn MediaResource>, loop_epsilon: f64) -> Self {
        let status = match resource.load(&block.source) {
            Ok(natural) => {
                if let Some(original) = block.original_duration() {
                    if (natural - original).abs() > 0.01 {
                        tracing::debug!(
                            "Block {} source reports {:.3}s, block records {:.3}s",
                            block.id,
                            natural,
                            original
                        );
                    }
                }
                SyncStatus::Ready
            }
            Err(e) => {
                tracing::warn!("Block {} is unavailable for playback: {}", block.id, e);
                SyncStatus::Unavailable
            }
        };
        Self::with_status(block.id, resource, status, loop_epsilon)
    }

    /// Wrap a resource that has already been loaded
    pub fn loaded(block_id: BlockId, resource: Box<dyn MediaResource>, loop_epsilon: f64) -> Self {
        Self::with_status(block_id, resource, SyncStatus::Ready, loop_epsilon)
    }

    fn with_status(
        block_id: BlockId,
        resource: Box<dyn MediaResource>,
        status: SyncStatus,
        loop_epsilon: f64,
    ) -> Self {
        Self {
            block_id,
            resource,
            status,
            loop_epsilon,
            play_rejected: false,
        }
    }

    /// Block this synchronizer serves
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Load state
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Whether the resource is controllable
    pub fn is_ready(&self) -> bool {
        self.status == SyncStatus::Ready
    }

    /// Resource position on its own timeline
    pub fn position(&self) -> f64 {
        self.resource.position()
    }

    /// Whether the resource is playing
    pub fn is_playing(&self) -> bool {
        self.resource.is_playing()
    }

    /// Current resource volume (0..1)
    pub fn volume(&self) -> f32 {
        self.resource.volume()
    }

    /// Advance one clock tick at global time `global`
    pub fn tick(&mut self, block: &Block, global: f64, step: f64) {
        if !self.is_ready() {
            return;
        }
        let Some(original) = block.original_duration() else {
            return;
        };

        self.resource.elapse(step);

        let track_time = global - block.start_time;
        if !is_active(track_time, block.duration) {
            if self.resource.is_playing() {
                self.resource.pause();
                tracing::debug!("Block {} left its window at {:.3}s", block.id, global);
            }
            return;
        }

        if !self.resource.is_playing() {
            self.resource.seek(local_time(track_time, original));
            self.try_play();
        } else if self.resource.position() >= original - self.loop_epsilon {
            self.resource.seek(0.0);
        }

        self.apply_volume(block, track_time);
    }

    /// Seek and start playback if the block is active at `global`
    pub fn start(&mut self, block: &Block, global: f64) {
        if !self.is_ready() {
            return;
        }
        let Some(original) = block.original_duration() else {
            return;
        };

        let track_time = global - block.start_time;
        if is_active(track_time, block.duration) {
            self.resource.seek(local_time(track_time, original));
            self.try_play();
            self.apply_volume(block, track_time);
        }
    }

    /// Align the resource with `global` without changing its play state.
    ///
    /// Inactive blocks that are still playing are paused.
    pub fn seek(&mut self, block: &Block, global: f64) {
        if !self.is_ready() {
            return;
        }
        let Some(original) = block.original_duration() else {
            return;
        };

        let track_time = global - block.start_time;
        if is_active(track_time, block.duration) {
            self.resource.seek(local_time(track_time, original));
            self.apply_volume(block, track_time);
        } else if self.resource.is_playing() {
            self.resource.pause();
        }
    }

    /// Pause the resource
    pub fn pause(&mut self) {
        if self.is_ready() {
            self.resource.pause();
        }
    }

    /// Stop and free the resource; the synchronizer is inert afterwards
    pub fn release(&mut self) {
        if self.status != SyncStatus::Released {
            self.resource.release();
            self.status = SyncStatus::Released;
            tracing::debug!("Released media for block {}", self.block_id);
        }
    }

    fn try_play(&mut self) {
        match self.resource.play() {
            Ok(()) => self.play_rejected = false,
            Err(e) => self.report_rejection(&e),
        }
    }

    fn report_rejection(&mut self, error: &MediaError) {
        if self.play_rejected {
            tracing::trace!("Block {} still refuses playback: {}", self.block_id, error);
        } else {
            tracing::warn!("Block {} stays paused: {}", self.block_id, error);
            self.play_rejected = true;
        }
    }

    fn apply_volume(&mut self, block: &Block, track_time: f64) {
        if let Some(volume) = block_volume(block, track_time) {
            self.resource.set_volume(volume);
        }
    }
}

impl std::fmt::Debug for MediaSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSynchronizer")
            .field("block_id", &self.block_id)
            .field("status", &self.status)
            .field("position", &self.resource.position())
            .field("playing", &self.resource.is_playing())
            .finish()
    }
}
