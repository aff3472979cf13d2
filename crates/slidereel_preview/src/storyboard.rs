// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storyboard files: the demo input the preview plays.
//!
//! A storyboard is a RON list of slides and media clips:
//!
//! ```ron
//! (
//!     entries: [
//!         Slide("title.png", 5.0),
//!         Audio("music.mp3", 12.0, 0.0),
//!         Video("intro.mp4", 3.0, 5.0),
//!     ],
//!     broken: ["missing.mp3"],
//!     reject_play: [],
//! )
//! ```
//!
//! `Audio` and `Video` carry `(source, natural_duration, start)`. Sources in
//! `broken` fail to load; sources in `reject_play` load but refuse to play.

use crate::error::PreviewError;
use serde::{Deserialize, Serialize};
use slidereel_timeline::{Block, BlockKind, SimulatedBackend, Timeline};
use std::path::Path;

/// One storyboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    /// Slide source and duration
    Slide(String, f64),
    /// Audio source, natural duration and start time
    Audio(String, f64, f64),
    /// Video source, natural duration and start time
    Video(String, f64, f64),
}

/// Storyboard file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    /// Entries in insertion order
    pub entries: Vec<Entry>,
    /// Sources that fail to load
    #[serde(default)]
    pub broken: Vec<String>,
    /// Sources that refuse to start playing
    #[serde(default)]
    pub reject_play: Vec<String>,
}

impl Storyboard {
    /// Load a storyboard from a RON file
    pub fn load(path: &Path) -> Result<Self, PreviewError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse a storyboard from a RON string
    pub fn from_ron(content: &str) -> Result<Self, PreviewError> {
        Ok(ron::from_str(content)?)
    }

    fn is_broken(&self, source: &str) -> bool {
        self.broken.iter().any(|s| s == source)
    }

    /// Simulated backend knowing every working media source
    pub fn simulated_backend(&self) -> SimulatedBackend {
        let mut backend = SimulatedBackend::new();
        for entry in &self.entries {
            if let Entry::Audio(source, natural, _) | Entry::Video(source, natural, _) = entry {
                if !self.is_broken(source) {
                    backend.add_source(source.clone(), *natural);
                }
            }
        }
        for source in &self.reject_play {
            backend.refuse_play(source.clone());
        }
        backend
    }

    /// Add every entry to `timeline`.
    ///
    /// Working media is imported through the backend. Broken media is added
    /// with the metadata from the storyboard so it stays visible on the
    /// timeline without a playable resource.
    pub fn populate(&self, timeline: &mut Timeline) -> Result<(), PreviewError> {
        for entry in &self.entries {
            match entry {
                Entry::Slide(source, duration) => {
                    timeline.add_slide(source.as_str(), *duration)?;
                }
                Entry::Audio(source, natural, start) => {
                    self.add_media(timeline, BlockKind::Audio, source, *natural, *start)?;
                }
                Entry::Video(source, natural, start) => {
                    self.add_media(timeline, BlockKind::Video, source, *natural, *start)?;
                }
            }
        }
        tracing::info!(
            "Storyboard loaded: {} blocks, {:.2}s total",
            timeline.store().len(),
            timeline.total_duration()
        );
        Ok(())
    }

    fn add_media(
        &self,
        timeline: &mut Timeline,
        kind: BlockKind,
        source: &str,
        natural: f64,
        start: f64,
    ) -> Result<(), PreviewError> {
        if self.is_broken(source) {
            let block = match kind {
                BlockKind::Video => Block::video(source, start, natural),
                _ => Block::audio(source, start, natural),
            };
            timeline.insert_block(block)?;
        } else {
            timeline.import_media(kind, source, start)?;
        }
        Ok(())
    }
}
