// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playable media abstraction.
//!
//! This module provides:
//! - The [`MediaResource`] trait the synchronizer drives
//! - The [`MediaBackend`] factory hosts implement to open resources
//! - A deterministic in-memory backend used by tests and headless hosts
//!
//! How sources are fetched, decoded or authenticated is up to the backend.

use crate::block::{BlockKind, SourceRef};
use std::collections::{HashMap, HashSet};

/// Media errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    /// The natural duration could not be resolved
    #[error("Failed to load {uri}: {reason}")]
    Load {
        /// Source that failed
        uri: String,
        /// Backend-specific reason
        reason: String,
    },

    /// The resource refused to start playing
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),
}

/// A loadable, playable media handle.
///
/// Times are in seconds of the resource's own (local) timeline.
pub trait MediaResource {
    /// Resolve the source and return its natural duration
    fn load(&mut self, source: &SourceRef) -> Result<f64, MediaError>;

    /// Jump to a local position
    fn seek(&mut self, seconds: f64);

    /// Start or resume playback
    fn play(&mut self) -> Result<(), MediaError>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Set the output volume (0..1)
    fn set_volume(&mut self, volume: f32);

    /// Current output volume (0..1)
    fn volume(&self) -> f32;

    /// Current local position
    fn position(&self) -> f64;

    /// Whether the resource is currently playing
    fn is_playing(&self) -> bool;

    /// Called once per clock tick with the playhead step.
    /// Resources that play in real time ignore it.
    fn elapse(&mut self, _step: f64) {}

    /// Stop playback and free the underlying handle
    fn release(&mut self) {
        self.pause();
    }
}

/// Factory for media resources
pub trait MediaBackend {
    /// Open an (unloaded) resource for a block of `kind`
    fn open(&mut self, kind: BlockKind, source: &SourceRef) -> Box<dyn MediaResource>;
}

/// In-memory media resource advanced by clock ticks.
///
/// Behaves like a browser media element: playback stops by itself once
/// the position reaches the natural duration.
#[derive(Debug, Clone, Default)]
pub struct SimulatedMedia {
    natural_duration: Option<f64>,
    refuse_play: bool,
    loaded: bool,
    position: f64,
    playing: bool,
    volume: f32,
    seek_count: usize,
}

impl SimulatedMedia {
    /// A resource whose source resolves to `natural_duration`
    pub fn new(natural_duration: f64) -> Self {
        Self {
            natural_duration: Some(natural_duration),
            volume: 1.0,
            ..Default::default()
        }
    }

    /// A resource whose source never resolves
    pub fn broken() -> Self {
        Self {
            volume: 1.0,
            ..Default::default()
        }
    }

    /// Make every `play()` call fail
    pub fn refusing_play(mut self) -> Self {
        self.refuse_play = true;
        self
    }

    /// Number of seeks performed so far
    pub fn seek_count(&self) -> usize {
        self.seek_count
    }
}

impl MediaResource for SimulatedMedia {
    fn load(&mut self, source: &SourceRef) -> Result<f64, MediaError> {
        match self.natural_duration {
            Some(duration) if duration > 0.0 => {
                self.loaded = true;
                Ok(duration)
            }
            _ => Err(MediaError::Load {
                uri: source.as_str().to_string(),
                reason: "source did not resolve".to_string(),
            }),
        }
    }

    fn seek(&mut self, seconds: f64) {
        let end = self.natural_duration.unwrap_or(0.0);
        self.position = seconds.clamp(0.0, end);
        self.seek_count += 1;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if !self.loaded {
            return Err(MediaError::PlaybackRejected("resource not loaded".to_string()));
        }
        if self.refuse_play {
            return Err(MediaError::PlaybackRejected("play() refused".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn elapse(&mut self, step: f64) {
        if !self.playing {
            return;
        }
        let end = self.natural_duration.unwrap_or(0.0);
        self.position += step;
        if self.position >= end {
            self.position = end;
            self.playing = false;
        }
    }

    fn release(&mut self) {
        self.playing = false;
        self.loaded = false;
    }
}

/// Backend handing out [`SimulatedMedia`] for registered sources
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    durations: HashMap<String, f64>,
    refuse_play: HashSet<String>,
}

impl SimulatedBackend {
    /// Create an empty backend; unknown sources fail to load
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source with its natural duration
    pub fn with_source(mut self, source: impl Into<String>, natural_duration: f64) -> Self {
        self.add_source(source, natural_duration);
        self
    }

    /// Register a source with its natural duration
    pub fn add_source(&mut self, source: impl Into<String>, natural_duration: f64) {
        self.durations.insert(source.into(), natural_duration);
    }

    /// Make resources for `source` refuse to play
    pub fn refuse_play(&mut self, source: impl Into<String>) {
        self.refuse_play.insert(source.into());
    }
}

impl MediaBackend for SimulatedBackend {
    fn open(&mut self, _kind: BlockKind, source: &SourceRef) -> Box<dyn MediaResource> {
        let media = match self.durations.get(source.as_str()) {
            Some(duration) => SimulatedMedia::new(*duration),
            None => SimulatedMedia::broken(),
        };
        if self.refuse_play.contains(source.as_str()) {
            Box::new(media.refusing_play())
        } else {
            Box::new(media)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_media_ends() {
        let mut media = SimulatedMedia::new(2.0);
        assert_eq!(media.load(&SourceRef::new("a.mp3")), Ok(2.0));
        media.play().unwrap();
        media.elapse(1.5);
        assert!(media.is_playing());
        assert_eq!(media.position(), 1.5);
        media.elapse(1.0);
        assert!(!media.is_playing());
        assert_eq!(media.position(), 2.0);
    }

    #[test]
    fn test_play_requires_load() {
        let mut media = SimulatedMedia::new(2.0);
        assert!(matches!(media.play(), Err(MediaError::PlaybackRejected(_))));
    }

    #[test]
    fn test_paused_media_does_not_advance() {
        let mut media = SimulatedMedia::new(5.0);
        media.load(&SourceRef::new("a.mp3")).unwrap();
        media.seek(1.0);
        media.elapse(1.0);
        assert_eq!(media.position(), 1.0);
        assert_eq!(media.seek_count(), 1);
    }

    #[test]
    fn test_backend_sources() {
        let mut backend = SimulatedBackend::new().with_source("ok.mp3", 3.0);
        backend.refuse_play("ok.mp3");

        let mut ok = backend.open(BlockKind::Audio, &SourceRef::new("ok.mp3"));
        assert_eq!(ok.load(&SourceRef::new("ok.mp3")), Ok(3.0));
        assert!(ok.play().is_err());

        let mut missing = backend.open(BlockKind::Video, &SourceRef::new("missing.mp4"));
        assert!(matches!(
            missing.load(&SourceRef::new("missing.mp4")),
            Err(MediaError::Load { .. })
        ));
    }
}
