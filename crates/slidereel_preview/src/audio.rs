// SPDX-License-Identifier: MIT OR Apache-2.0
//! Real audio output for the preview.
//!
//! This module provides a [`MediaBackend`] backed by rodio (when the "audio"
//! feature is enabled). Every block gets its own sink; sources are decoded
//! from files resolved against the storyboard directory.
//!
//! Video sources are played for their audio track only.

use crate::error::PreviewError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use slidereel_timeline::{BlockKind, MediaBackend, MediaError, MediaResource, SourceRef};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend opening rodio sinks on the default output device
pub struct RodioBackend {
    /// Output stream (must be kept alive)
    _stream: OutputStream,
    /// Stream handle for creating sinks
    stream_handle: OutputStreamHandle,
    /// Directory relative sources are resolved against
    media_root: PathBuf,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new(media_root: impl Into<PathBuf>) -> Result<Self, PreviewError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| PreviewError::Audio(e.to_string()))?;
        tracing::info!("Audio output initialized");
        Ok(Self {
            _stream: stream,
            stream_handle,
            media_root: media_root.into(),
        })
    }
}

impl MediaBackend for RodioBackend {
    fn open(&mut self, kind: BlockKind, source: &SourceRef) -> Box<dyn MediaResource> {
        tracing::debug!("Opening {} source {}", kind.name(), source.as_str());
        Box::new(RodioMedia {
            stream_handle: self.stream_handle.clone(),
            path: resolve(&self.media_root, source.as_str()),
            sink: None,
            natural_duration: 0.0,
            volume: 1.0,
        })
    }
}

/// Resolve a source against the media root
fn resolve(root: &Path, source: &str) -> PathBuf {
    let path = PathBuf::from(source);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// One decoded file on its own sink
struct RodioMedia {
    stream_handle: OutputStreamHandle,
    path: PathBuf,
    sink: Option<Sink>,
    natural_duration: f64,
    volume: f32,
}

impl RodioMedia {
    fn decoder(&self) -> Result<Decoder<BufReader<File>>, MediaError> {
        let file = File::open(&self.path).map_err(|e| self.load_error(e.to_string()))?;
        Decoder::new(BufReader::new(file)).map_err(|e| self.load_error(e.to_string()))
    }

    fn load_error(&self, reason: String) -> MediaError {
        MediaError::Load {
            uri: self.path.display().to_string(),
            reason,
        }
    }

    /// A sink that reached the end of its source is empty; refill it paused
    fn refill(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        if !sink.empty() {
            return;
        }
        match self.decoder() {
            Ok(decoder) => {
                sink.pause();
                sink.append(decoder);
            }
            Err(e) => tracing::warn!("Could not reopen {}: {}", self.path.display(), e),
        }
    }
}

impl MediaResource for RodioMedia {
    fn load(&mut self, _source: &SourceRef) -> Result<f64, MediaError> {
        let decoder = self.decoder()?;
        let duration = decoder
            .total_duration()
            .ok_or_else(|| self.load_error("unknown duration".into()))?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| self.load_error(e.to_string()))?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(decoder);

        self.sink = Some(sink);
        self.natural_duration = duration.as_secs_f64();
        Ok(self.natural_duration)
    }

    fn seek(&mut self, seconds: f64) {
        self.refill();
        if let Some(sink) = &self.sink {
            let target = Duration::from_secs_f64(seconds.clamp(0.0, self.natural_duration));
            if let Err(e) = sink.try_seek(target) {
                tracing::debug!("Seek in {} failed: {}", self.path.display(), e);
            }
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.refill();
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| MediaError::PlaybackRejected(format!("{} is not loaded", self.path.display())))?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn position(&self) -> f64 {
        match &self.sink {
            Some(sink) if sink.empty() => self.natural_duration,
            Some(sink) => sink.get_pos().as_secs_f64(),
            None => 0.0,
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let root = Path::new("/media/project");
        assert_eq!(resolve(root, "music.mp3"), PathBuf::from("/media/project/music.mp3"));
        assert_eq!(resolve(root, "/tmp/voice.wav"), PathBuf::from("/tmp/voice.wav"));
    }
}
