// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Play a storyboard through the SlideReel timeline engine and log what happens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Storyboard to play (RON)
    #[arg(short = 's', long = "storyboard", value_name = "FILE")]
    pub storyboard: PathBuf,

    /// Engine configuration (RON); defaults apply when absent
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start position in seconds
    #[arg(long = "seek", value_name = "SECONDS")]
    pub seek: Option<f64>,

    /// Stop after this many seconds of timeline time
    #[arg(long = "max-seconds", value_name = "SECONDS")]
    pub max_seconds: Option<f64>,

    /// Advance by measured wall-clock time instead of a fixed step
    #[arg(long = "measured")]
    pub measured: bool,

    /// Play real audio files through the default output device
    #[cfg(feature = "audio")]
    #[arg(long = "rodio")]
    pub rodio: bool,
}

impl Args {
    /// Whether ticks should be paced to real time
    pub fn realtime(&self) -> bool {
        self.measured || self.wants_rodio()
    }

    /// Whether the rodio backend was requested
    #[cfg(feature = "audio")]
    pub fn wants_rodio(&self) -> bool {
        self.rodio
    }

    /// Whether the rodio backend was requested
    #[cfg(not(feature = "audio"))]
    pub fn wants_rodio(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["slidereel-preview", "--storyboard", "demo.ron"]).unwrap();
        assert_eq!(args.storyboard, PathBuf::from("demo.ron"));
        assert!(args.config.is_none());
        assert!(!args.realtime());
    }

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "slidereel-preview",
            "-s",
            "demo.ron",
            "--config",
            "engine.ron",
            "--seek",
            "4.5",
            "--max-seconds",
            "10",
            "--measured",
        ])
        .unwrap();
        assert_eq!(args.seek, Some(4.5));
        assert_eq!(args.max_seconds, Some(10.0));
        assert!(args.realtime());
    }

    #[test]
    fn test_storyboard_required() {
        assert!(Args::try_parse_from(["slidereel-preview"]).is_err());
    }
}
