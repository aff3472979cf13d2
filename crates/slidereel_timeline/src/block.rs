// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block definitions for the timeline.
//!
//! A block is one placed item on a track: a slide, an audio clip or a
//! video clip. The per-kind fields live in [`BlockContent`] so every
//! consumer matches on the kind exhaustively.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Create a new random block ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the underlying resource (URL, path, asset key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub String);

impl SourceRef {
    /// Create a source reference
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// The raw reference string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, without query string
    pub fn file_name(&self) -> &str {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.rsplit(['/', '\\']).next().unwrap_or(path)
    }
}

impl From<&str> for SourceRef {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

/// Kind of block, also the kind of track it lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Visual slide
    Slide,
    /// Audio clip
    Audio,
    /// Video clip
    Video,
}

impl BlockKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slide => "Slides",
            Self::Audio => "Audio",
            Self::Video => "Video",
        }
    }

    /// Get the track color
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Slide => [100, 150, 255],
            Self::Audio => [200, 100, 255],
            Self::Video => [255, 150, 80],
        }
    }

    /// All kinds in track order
    pub fn all() -> [BlockKind; 3] {
        [Self::Slide, Self::Video, Self::Audio]
    }
}

/// Role of an audio clip in the mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AudioCategory {
    /// Background music
    #[default]
    Music,
    /// Narration
    Voiceover,
    /// Sound effect
    Sfx,
}

impl AudioCategory {
    /// Guess the category from a file name.
    pub fn infer(file_name: &str) -> Self {
        const VOICE: [&str; 6] = ["voice", "narrat", "vo_", "speech", "tts", "dialog"];
        const SFX: [&str; 7] = ["sfx", "fx_", "effect", "whoosh", "click", "impact", "swoosh"];

        let name = file_name.to_lowercase();
        if VOICE.iter().any(|needle| name.contains(needle)) {
            Self::Voiceover
        } else if SFX.iter().any(|needle| name.contains(needle)) {
            Self::Sfx
        } else {
            Self::Music
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Music => "Music",
            Self::Voiceover => "Voiceover",
            Self::Sfx => "SFX",
        }
    }
}

/// How a slide is positioned on the slide track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SlidePlacement {
    /// Starts where the previous slide ends
    #[default]
    Sequential,
    /// Positioned by its own start time
    Explicit,
}

/// Slide-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SlideData {
    /// Positioning mode
    pub placement: SlidePlacement,
}

/// Audio-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    original_duration: f64,
    /// Volume, 0-100
    pub volume: f32,
    /// Fade in length in seconds
    pub fade_in: f64,
    /// Fade out length in seconds
    pub fade_out: f64,
    category: AudioCategory,
}

impl AudioData {
    /// Natural length of the source
    pub fn original_duration(&self) -> f64 {
        self.original_duration
    }

    /// Category inferred at creation
    pub fn category(&self) -> AudioCategory {
        self.category
    }
}

/// Video-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    original_duration: f64,
    /// Volume, 0-100
    pub volume: f32,
}

impl VideoData {
    /// Natural length of the source
    pub fn original_duration(&self) -> f64 {
        self.original_duration
    }
}

/// Per-kind block payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockContent {
    /// Slide
    Slide(SlideData),
    /// Audio clip
    Audio(AudioData),
    /// Video clip
    Video(VideoData),
}

/// A block on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique block ID
    pub id: BlockId,
    /// Position on the global timeline (seconds)
    pub start_time: f64,
    /// Displayed length on the timeline (seconds)
    pub duration: f64,
    /// Underlying resource
    pub source: SourceRef,
    /// Display label
    pub label: Option<String>,
    /// Per-kind data
    pub content: BlockContent,
}

impl Block {
    /// Create a sequential slide
    pub fn slide(source: impl Into<SourceRef>, duration: f64) -> Self {
        Self {
            id: BlockId::new(),
            start_time: 0.0,
            duration,
            source: source.into(),
            label: None,
            content: BlockContent::Slide(SlideData::default()),
        }
    }

    /// Create an audio clip whose displayed length matches its source.
    /// The category is inferred from the source file name.
    pub fn audio(source: impl Into<SourceRef>, start_time: f64, original_duration: f64) -> Self {
        let source = source.into();
        let category = AudioCategory::infer(source.file_name());
        Self {
            id: BlockId::new(),
            start_time,
            duration: original_duration,
            source,
            label: None,
            content: BlockContent::Audio(AudioData {
                original_duration,
                volume: 100.0,
                fade_in: 0.0,
                fade_out: 0.0,
                category,
            }),
        }
    }

    /// Create a video clip whose displayed length matches its source
    pub fn video(source: impl Into<SourceRef>, start_time: f64, original_duration: f64) -> Self {
        Self {
            id: BlockId::new(),
            start_time,
            duration: original_duration,
            source: source.into(),
            label: None,
            content: BlockContent::Video(VideoData {
                original_duration,
                volume: 100.0,
            }),
        }
    }

    /// Place the block at an explicit start time
    pub fn at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        if let BlockContent::Slide(slide) = &mut self.content {
            slide.placement = SlidePlacement::Explicit;
        }
        self
    }

    /// Set the displayed duration
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Set fades (audio only; ignored for other kinds)
    pub fn with_fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        if let BlockContent::Audio(audio) = &mut self.content {
            audio.fade_in = fade_in;
            audio.fade_out = fade_out;
        }
        self
    }

    /// Set the volume (audio/video only)
    pub fn with_volume(mut self, volume: f32) -> Self {
        match &mut self.content {
            BlockContent::Audio(audio) => audio.volume = volume,
            BlockContent::Video(video) => video.volume = volume,
            BlockContent::Slide(_) => {}
        }
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Block kind
    pub fn kind(&self) -> BlockKind {
        match self.content {
            BlockContent::Slide(_) => BlockKind::Slide,
            BlockContent::Audio(_) => BlockKind::Audio,
            BlockContent::Video(_) => BlockKind::Video,
        }
    }

    /// End of the displayed interval
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Natural source length for media blocks
    pub fn original_duration(&self) -> Option<f64> {
        match &self.content {
            BlockContent::Slide(_) => None,
            BlockContent::Audio(audio) => Some(audio.original_duration),
            BlockContent::Video(video) => Some(video.original_duration),
        }
    }

    /// Base volume (0-100) for media blocks
    pub fn volume(&self) -> Option<f32> {
        match &self.content {
            BlockContent::Slide(_) => None,
            BlockContent::Audio(audio) => Some(audio.volume),
            BlockContent::Video(video) => Some(video.volume),
        }
    }

    /// Whether the block needs a media synchronizer
    pub fn is_media(&self) -> bool {
        !matches!(self.content, BlockContent::Slide(_))
    }

    /// Display label, falling back to the source file name
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.source.file_name())
    }
}

/// Partial update to a block. `None` fields are left untouched.
///
/// `original_duration` is not updatable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockUpdate {
    /// New start time
    pub start_time: Option<f64>,
    /// New displayed duration
    pub duration: Option<f64>,
    /// New volume (audio/video)
    pub volume: Option<f32>,
    /// New fade in (audio)
    pub fade_in: Option<f64>,
    /// New fade out (audio)
    pub fade_out: Option<f64>,
    /// New label
    pub label: Option<String>,
}

impl BlockUpdate {
    /// Update that moves a block
    pub fn start(start_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            ..Default::default()
        }
    }

    /// Update that resizes a block
    pub fn duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Update that moves and resizes a block at once
    pub fn placement(start_time: f64, duration: f64) -> Self {
        Self {
            start_time: Some(start_time),
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Update that changes the volume
    pub fn volume(volume: f32) -> Self {
        Self {
            volume: Some(volume),
            ..Default::default()
        }
    }

    /// Update that changes both fades
    pub fn fades(fade_in: f64, fade_out: f64) -> Self {
        Self {
            fade_in: Some(fade_in),
            fade_out: Some(fade_out),
            ..Default::default()
        }
    }

    /// Whether the update touches the block's interval
    pub fn moves(&self) -> bool {
        self.start_time.is_some() || self.duration.is_some()
    }

    /// Whether nothing would change
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_inference() {
        assert_eq!(AudioCategory::infer("Narration_take2.mp3"), AudioCategory::Voiceover);
        assert_eq!(AudioCategory::infer("tts-intro.wav"), AudioCategory::Voiceover);
        assert_eq!(AudioCategory::infer("whoosh_01.wav"), AudioCategory::Sfx);
        assert_eq!(AudioCategory::infer("SFX-door.ogg"), AudioCategory::Sfx);
        assert_eq!(AudioCategory::infer("lofi-beat.mp3"), AudioCategory::Music);
    }

    #[test]
    fn test_audio_block_uses_file_name() {
        let block = Block::audio("https://cdn.example.com/assets/voiceover.mp3?sig=abc", 2.0, 10.0);
        assert_eq!(block.kind(), BlockKind::Audio);
        assert_eq!(block.source.file_name(), "voiceover.mp3");
        assert_eq!(block.duration, 10.0);
        assert_eq!(block.original_duration(), Some(10.0));
        match &block.content {
            BlockContent::Audio(audio) => {
                assert_eq!(audio.category(), AudioCategory::Voiceover);
                assert_eq!(audio.volume, 100.0);
                assert_eq!(audio.fade_in, 0.0);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_builders() {
        let slide = Block::slide("title.png", 5.0).at(3.0).with_label("Title");
        assert_eq!(slide.end_time(), 8.0);
        assert_eq!(slide.display_name(), "Title");
        assert!(!slide.is_media());
        assert!(matches!(
            slide.content,
            BlockContent::Slide(SlideData { placement: SlidePlacement::Explicit })
        ));

        let video = Block::video("clip.mp4", 0.0, 4.0).with_duration(2.0).with_volume(40.0);
        assert_eq!(video.duration, 2.0);
        assert_eq!(video.original_duration(), Some(4.0));
        assert_eq!(video.volume(), Some(40.0));
        assert_eq!(video.display_name(), "clip.mp4");
    }

    #[test]
    fn test_update_helpers() {
        assert!(BlockUpdate::default().is_empty());
        assert!(BlockUpdate::start(1.0).moves());
        assert!(!BlockUpdate::volume(50.0).moves());
        assert!(!BlockUpdate::fades(1.0, 1.0).is_empty());
    }
}
