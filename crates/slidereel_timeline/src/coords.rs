// SPDX-License-Identifier: MIT OR Apache-2.0
//! Seconds <-> pixels projection for the timeline.

use crate::config::ZoomSettings;

/// Maps timeline seconds to horizontal pixels at the current zoom.
///
/// The scale is the only coordinate state of the timeline: blocks are
/// stored in seconds and never move when the zoom changes, only their
/// projection does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    base_pixels_per_second: f64,
    zoom: f64,
    bounds: ZoomSettings,
}

impl TimeScale {
    /// Create a scale at the initial zoom of `bounds`
    pub fn new(base_pixels_per_second: f64, bounds: ZoomSettings) -> Self {
        Self {
            base_pixels_per_second,
            zoom: bounds.initial.clamp(bounds.min, bounds.max),
            bounds,
        }
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Effective pixels per second
    pub fn pixels_per_second(&self) -> f64 {
        self.base_pixels_per_second * self.zoom
    }

    /// Set the zoom factor, clamped to the configured bounds.
    /// Returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.bounds.min, self.bounds.max);
        }
        self.zoom
    }

    /// Zoom in by one step
    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + self.bounds.step)
    }

    /// Zoom out by one step
    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - self.bounds.step)
    }

    /// Convert seconds to pixels
    pub fn time_to_pixels(&self, time: f64) -> f64 {
        time * self.pixels_per_second()
    }

    /// Convert pixels to seconds
    pub fn pixels_to_time(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second()
    }

    /// Ruler ticks covering `[start, end]`.
    ///
    /// The minor interval grows as the zoom shrinks so labels stay at least
    /// ~40px apart; every fifth minor tick is major.
    pub fn ruler_ticks(&self, start: f64, end: f64) -> Vec<RulerTick> {
        let pps = self.pixels_per_second();
        let interval = [0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
            .into_iter()
            .find(|i| i * pps * 5.0 >= 40.0)
            .unwrap_or(60.0);
        let major = interval * 5.0;

        let mut ticks = Vec::new();
        if !start.is_finite() || !end.is_finite() || end < start {
            return ticks;
        }
        let mut index = (start.max(0.0) / interval).ceil() as u64;
        loop {
            let time = index as f64 * interval;
            if time > end {
                break;
            }
            let is_major = ((time / major) - (time / major).round()).abs() < 1e-6;
            ticks.push(RulerTick { time, is_major });
            index += 1;
        }
        ticks
    }
}

/// One tick on the time ruler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    /// Time in seconds
    pub time: f64,
    /// Major ticks carry a label
    pub is_major: bool,
}

/// Format seconds as `M:SS`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
