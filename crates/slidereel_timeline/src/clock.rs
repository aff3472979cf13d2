// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clock driving every media synchronizer.
//!
//! The clock owns the single playhead (`current_time`) and the registry of
//! synchronizers, one per media block. The host calls [`PlaybackClock::tick`]
//! once per frame; each tick advances the playhead by the step reported by
//! the [`TickSource`], then lets every synchronizer and time observer catch
//! up with the new position.

use crate::block::BlockId;
use crate::config::TimelineConfig;
use crate::event::TimelineEvent;
use crate::navigator::{SlideNavigator, TimeObserver};
use crate::store::BlockStore;
use crate::sync::MediaSynchronizer;
use indexmap::IndexMap;
use std::time::Instant;

/// Supplies the playhead advance for each tick
pub trait TickSource {
    /// Seconds to advance on this tick
    fn next_step(&mut self) -> f64;

    /// Called when playback (re)starts
    fn reset(&mut self) {}
}

/// Constant advance per tick.
///
/// One animation frame is assumed to be `step` seconds long, so the
/// playhead drifts from wall-clock time whenever the host's frame rate
/// deviates from `1 / step`.
#[derive(Debug, Clone, Copy)]
pub struct FixedStep {
    step: f64,
}

impl FixedStep {
    /// Create a fixed tick source
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl TickSource for FixedStep {
    fn next_step(&mut self) -> f64 {
        self.step
    }
}

/// Wall-clock delta between ticks, capped at `max_step`
#[derive(Debug, Clone)]
pub struct MeasuredStep {
    last: Option<Instant>,
    max_step: f64,
}

impl MeasuredStep {
    /// Create a measured tick source
    pub fn new(max_step: f64) -> Self {
        Self { last: None, max_step }
    }
}

impl TickSource for MeasuredStep {
    fn next_step(&mut self) -> f64 {
        let now = Instant::now();
        let step = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.last = Some(now);
        step.min(self.max_step)
    }

    fn reset(&mut self) {
        self.last = Some(Instant::now());
    }
}

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Not advancing
    #[default]
    Stopped,
    /// Advancing on every tick
    Running,
}

/// Single authoritative playhead
pub struct PlaybackClock {
    current_time: f64,
    state: ClockState,
    synchronizers: IndexMap<BlockId, MediaSynchronizer>,
    navigator: SlideNavigator,
    observers: Vec<Box<dyn TimeObserver>>,
    tick_source: Box<dyn TickSource>,
    min_total_duration: f64,
    pending_events: Vec<TimelineEvent>,
}

impl PlaybackClock {
    /// Create a stopped clock at 0 with a fixed tick source
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            current_time: 0.0,
            state: ClockState::Stopped,
            synchronizers: IndexMap::new(),
            navigator: SlideNavigator::new(config.past_end),
            observers: Vec::new(),
            tick_source: Box::new(FixedStep::new(config.tick_step)),
            min_total_duration: config.min_total_duration,
            pending_events: Vec::new(),
        }
    }

    /// Replace the tick source
    pub fn set_tick_source(&mut self, source: Box<dyn TickSource>) {
        self.tick_source = source;
    }

    /// Current playhead position
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Slide navigator
    pub fn navigator(&self) -> &SlideNavigator {
        &self.navigator
    }

    /// Total duration of `store` under this clock's floor
    pub fn total_duration(&self, store: &BlockStore) -> f64 {
        store.total_duration(self.min_total_duration)
    }

    /// Add a synchronizer, releasing any previous one for the same block
    pub fn register(&mut self, synchronizer: MediaSynchronizer) {
        let id = synchronizer.block_id();
        if let Some(mut previous) = self.synchronizers.insert(id, synchronizer) {
            previous.release();
        }
    }

    /// Remove and release the synchronizer of a block
    pub fn unregister(&mut self, id: BlockId) -> bool {
        match self.synchronizers.shift_remove(&id) {
            Some(mut synchronizer) => {
                synchronizer.release();
                true
            }
            None => false,
        }
    }

    /// Synchronizer of a block
    pub fn synchronizer(&self, id: BlockId) -> Option<&MediaSynchronizer> {
        self.synchronizers.get(&id)
    }

    /// Number of registered synchronizers
    pub fn synchronizer_count(&self) -> usize {
        self.synchronizers.len()
    }

    /// Subscribe an additional time observer
    pub fn subscribe(&mut self, observer: Box<dyn TimeObserver>) {
        self.observers.push(observer);
    }

    /// Start playback from the current position.
    ///
    /// Starting at or past the end rewinds to 0 first.
    pub fn play(&mut self, store: &BlockStore) {
        if self.is_playing() {
            return;
        }
        if self.current_time >= self.total_duration(store) {
            self.current_time = 0.0;
        }

        let time = self.current_time;
        for (id, synchronizer) in &mut self.synchronizers {
            if let Some(block) = store.get(*id) {
                synchronizer.start(block, time);
            }
        }

        self.state = ClockState::Running;
        self.tick_source.reset();
        tracing::debug!("Playback started at {:.3}s", time);
        self.pending_events.push(TimelineEvent::PlaybackStarted { at: time });
        self.notify_time(store);
    }

    /// Pause every resource and stop advancing
    pub fn pause(&mut self) {
        self.pause_all();
        if self.state == ClockState::Running {
            self.state = ClockState::Stopped;
            tracing::debug!("Playback paused at {:.3}s", self.current_time);
            self.pending_events.push(TimelineEvent::PlaybackStopped { at: self.current_time });
        }
    }

    /// Advance one frame. Does nothing while stopped.
    pub fn tick(&mut self, store: &BlockStore) -> ClockState {
        if !self.is_playing() {
            return self.state;
        }

        let step = self.tick_source.next_step();
        self.current_time += step;

        let total = self.total_duration(store);
        if self.current_time >= total {
            self.current_time = total;
            self.pause_all();
            self.state = ClockState::Stopped;
            tracing::debug!("Playback reached the end at {:.3}s", total);
            self.pending_events.push(TimelineEvent::ReachedEnd { at: total });
            return self.state;
        }

        let time = self.current_time;
        for (id, synchronizer) in &mut self.synchronizers {
            if let Some(block) = store.get(*id) {
                synchronizer.tick(block, time, step);
            }
        }
        self.notify_time(store);
        self.state
    }

    /// Move the playhead without changing the play state
    pub fn seek(&mut self, store: &BlockStore, time: f64) {
        let total = self.total_duration(store);
        let time = if time.is_finite() { time.clamp(0.0, total) } else { 0.0 };
        self.current_time = time;

        for (id, synchronizer) in &mut self.synchronizers {
            if let Some(block) = store.get(*id) {
                synchronizer.seek(block, time);
            }
        }

        self.pending_events.push(TimelineEvent::Seeked { to: time });
        self.notify_time(store);
    }

    /// Re-align one block's resource after it was edited
    pub fn resync(&mut self, store: &BlockStore, id: BlockId) {
        let time = self.current_time;
        if let (Some(synchronizer), Some(block)) = (self.synchronizers.get_mut(&id), store.get(id)) {
            synchronizer.seek(block, time);
        }
    }

    /// Recompute the active slide without moving the playhead
    pub fn refresh(&mut self, store: &BlockStore) {
        self.notify_time(store);
    }

    /// Stop and release every resource; the registry is emptied
    pub fn release_all(&mut self) {
        for (_, mut synchronizer) in self.synchronizers.drain(..) {
            synchronizer.release();
        }
        self.state = ClockState::Stopped;
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn pause_all(&mut self) {
        for synchronizer in self.synchronizers.values_mut() {
            synchronizer.pause();
        }
    }

    fn notify_time(&mut self, store: &BlockStore) {
        let time = self.current_time;
        self.navigator.on_time(time, store, &mut self.pending_events);
        for observer in &mut self.observers {
            observer.on_time(time, store, &mut self.pending_events);
        }
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("current_time", &self.current_time)
            .field("state", &self.state)
            .field("synchronizers", &self.synchronizers.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
