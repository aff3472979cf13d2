// SPDX-License-Identifier: MIT OR Apache-2.0
//! `SlideReel` Preview - headless storyboard player
//!
//! Loads a storyboard and an engine configuration, builds a timeline and
//! plays it from start to end, logging slide changes and media state:
//! - Deterministic simulated media by default
//! - Real audio through rodio with the "audio" feature and `--rodio`
//! - Fixed or measured tick steps
//!
//! Set `RUST_LOG` to change verbosity.

#[cfg(feature = "audio")]
mod audio;
mod cli;
mod error;
mod player;
mod storyboard;

use clap::Parser;
use cli::Args;
use error::PreviewError;
use player::PlayOptions;
use slidereel_timeline::{MeasuredStep, MediaBackend, Timeline, TimelineConfig};
use storyboard::Storyboard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let args = Args::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["slidereel_timeline=debug", "slidereel_preview=debug"] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SlideReel Preview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        tracing::error!("Preview failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), PreviewError> {
    let config = match &args.config {
        Some(path) => TimelineConfig::load(path)?,
        None => TimelineConfig::default(),
    };
    let storyboard = Storyboard::load(&args.storyboard)?;

    let backend = media_backend(args, &storyboard)?;
    let max_measured_step = config.max_measured_step;
    let mut timeline = Timeline::new(config, backend)?;
    if args.measured {
        timeline.set_tick_source(Box::new(MeasuredStep::new(max_measured_step)));
    }

    storyboard.populate(&mut timeline)?;

    let report = player::run(
        &mut timeline,
        PlayOptions {
            seek: args.seek,
            max_seconds: args.max_seconds,
            realtime: args.realtime(),
        },
    );
    tracing::info!(
        "Finished after {} ticks at {} ({} slide changes{})",
        report.ticks,
        timeline.format_time(report.final_time),
        report.slides_shown.len(),
        if report.reached_end { ", reached the end" } else { "" }
    );
    Ok(())
}

#[cfg(feature = "audio")]
fn media_backend(args: &Args, storyboard: &Storyboard) -> Result<Box<dyn MediaBackend>, PreviewError> {
    if args.wants_rodio() {
        let root = args
            .storyboard
            .parent()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default();
        return Ok(Box::new(audio::RodioBackend::new(root)?));
    }
    Ok(Box::new(storyboard.simulated_backend()))
}

#[cfg(not(feature = "audio"))]
fn media_backend(_args: &Args, storyboard: &Storyboard) -> Result<Box<dyn MediaBackend>, PreviewError> {
    Ok(Box::new(storyboard.simulated_backend()))
}
