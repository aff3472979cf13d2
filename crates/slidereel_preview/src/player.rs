// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless playback loop.

use slidereel_timeline::{ClockState, SyncStatus, Timeline, TimelineEvent};
use std::time::Duration;

/// How the loop runs
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Start position
    pub seek: Option<f64>,
    /// Stop once the playhead passes this time
    pub max_seconds: Option<f64>,
    /// Sleep one frame between ticks
    pub realtime: bool,
}

const FRAME: Duration = Duration::from_millis(16);

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct PlayReport {
    /// Ticks executed
    pub ticks: u64,
    /// Playhead position at the end
    pub final_time: f64,
    /// Whether playback ran to the end of the timeline
    pub reached_end: bool,
    /// Slide activations seen, in order
    pub slides_shown: Vec<usize>,
}

/// Play `timeline` until it stops by itself or `max_seconds` is reached
pub fn run(timeline: &mut Timeline, options: PlayOptions) -> PlayReport {
    if let Some(seek) = options.seek {
        timeline.on_seek(seek);
    }

    let mut report = PlayReport {
        ticks: 0,
        final_time: timeline.current_time(),
        reached_end: false,
        slides_shown: Vec::new(),
    };
    drain_events(timeline, &mut report);

    timeline.play();
    drain_events(timeline, &mut report);

    loop {
        let state = timeline.tick();
        report.ticks += 1;
        drain_events(timeline, &mut report);

        if state == ClockState::Stopped {
            break;
        }
        if options
            .max_seconds
            .is_some_and(|max| timeline.current_time() >= max)
        {
            timeline.pause();
            drain_events(timeline, &mut report);
            break;
        }
        if options.realtime {
            std::thread::sleep(FRAME);
        }
    }

    report.final_time = timeline.current_time();
    log_media_status(timeline);
    report
}

fn drain_events(timeline: &mut Timeline, report: &mut PlayReport) {
    for event in timeline.take_events() {
        match &event {
            TimelineEvent::SlideActivated { index, block } => {
                let name = timeline.block(*block).map_or("?", |b| b.display_name());
                tracing::info!("Slide {} ({}) on screen at {:.2}s", index, name, timeline.current_time());
                report.slides_shown.push(*index);
            }
            TimelineEvent::ReachedEnd { at } => {
                tracing::info!("Reached the end at {:.2}s", at);
                report.reached_end = true;
            }
            TimelineEvent::PlaybackStarted { at } | TimelineEvent::PlaybackStopped { at } => {
                tracing::info!("{:?} ({})", event, timeline.format_time(*at));
            }
            _ => tracing::debug!("{:?}", event),
        }
    }
}

fn log_media_status(timeline: &Timeline) {
    for block in timeline.store().media() {
        let Some(sync) = timeline.synchronizer(block.id) else {
            continue;
        };
        match sync.status() {
            SyncStatus::Ready => tracing::info!(
                "{} {}: position {:.2}s, playing: {}",
                block.kind().name(),
                block.display_name(),
                sync.position(),
                sync.is_playing()
            ),
            SyncStatus::Unavailable | SyncStatus::Released => tracing::info!(
                "{} {}: {:?}",
                block.kind().name(),
                block.display_name(),
                sync.status()
            ),
        }
    }
}
