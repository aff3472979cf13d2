// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline facade.
//!
//! [`Timeline`] is the surface a host talks to. It owns the block store, the
//! playback clock with every media synchronizer, the gesture controller and
//! the zoom, and it keeps them consistent: a block added here gets its
//! resource opened and registered, an edit re-aligns the block's resource
//! with the playhead, and a deletion releases it.

use crate::block::{Block, BlockId, BlockKind, BlockUpdate, SourceRef};
use crate::clock::{ClockState, PlaybackClock, TickSource};
use crate::config::TimelineConfig;
use crate::coords::{self, TimeScale};
use crate::error::{Result, TimelineError};
use crate::event::TimelineEvent;
use crate::interaction::{InteractionController, MoveOutcome, StretchEdge};
use crate::media::MediaBackend;
use crate::navigator::TimeObserver;
use crate::placement::Placement;
use crate::store::BlockStore;
use crate::sync::MediaSynchronizer;
use crate::track::{self, Track};

/// Timeline engine
pub struct Timeline {
    config: TimelineConfig,
    store: BlockStore,
    scale: TimeScale,
    clock: PlaybackClock,
    interaction: InteractionController,
    selected: Option<BlockId>,
    backend: Box<dyn MediaBackend>,
    pending_events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(config: TimelineConfig, backend: Box<dyn MediaBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: BlockStore::new(config.min_durations),
            scale: TimeScale::new(config.base_pixels_per_second, config.zoom),
            clock: PlaybackClock::new(&config),
            interaction: InteractionController::new(),
            selected: None,
            backend,
            pending_events: Vec::new(),
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Block store
    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// Get a block
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.store.get(id)
    }

    /// Tracks in display order
    pub fn tracks(&self) -> Vec<Track<'_>> {
        track::tracks(&self.store)
    }

    /// Coordinate scale
    pub fn scale(&self) -> &TimeScale {
        &self.scale
    }

    /// Playback clock
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Gesture controller
    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Synchronizer of a media block
    pub fn synchronizer(&self, id: BlockId) -> Option<&MediaSynchronizer> {
        self.clock.synchronizer(id)
    }

    /// Replace the clock's tick source
    pub fn set_tick_source(&mut self, source: Box<dyn TickSource>) {
        self.clock.set_tick_source(source);
    }

    /// Subscribe a time observer next to the slide navigator
    pub fn subscribe(&mut self, observer: Box<dyn TimeObserver>) {
        self.clock.subscribe(observer);
    }

    // ---- Block lifecycle ----

    /// Append a slide after the existing slides
    pub fn add_slide(&mut self, source: impl Into<SourceRef>, duration: f64) -> Result<BlockId> {
        self.insert_block(Block::slide(source, duration))
    }

    /// Add a block supplied by the host.
    ///
    /// Media blocks get a resource from the backend. A resource that fails
    /// to load leaves the block in place with an unavailable synchronizer.
    pub fn insert_block(&mut self, block: Block) -> Result<BlockId> {
        let id = self.store.insert(block)?;
        if let Some(block) = self.store.get(id).filter(|b| b.is_media()) {
            let resource = self.backend.open(block.kind(), &block.source);
            let synchronizer = MediaSynchronizer::attach(block, resource, self.config.loop_epsilon);
            self.clock.register(synchronizer);
        }
        self.block_added(id);
        Ok(id)
    }

    /// Load a media source and add it as a block starting at `start_time`.
    ///
    /// The block's original duration is the natural duration reported by
    /// the backend; a load failure is returned and no block is created.
    pub fn import_media(
        &mut self,
        kind: BlockKind,
        source: impl Into<SourceRef>,
        start_time: f64,
    ) -> Result<BlockId> {
        if kind == BlockKind::Slide {
            return Err(TimelineError::NotMedia(kind));
        }
        let source = source.into();
        let mut resource = self.backend.open(kind, &source);
        let natural = match resource.load(&source) {
            Ok(natural) => natural,
            Err(e) => {
                tracing::warn!("Import of {} failed: {}", source.as_str(), e);
                return Err(e.into());
            }
        };

        let block = match kind {
            BlockKind::Video => Block::video(source, start_time, natural),
            _ => Block::audio(source, start_time, natural),
        };
        let id = self.store.insert(block)?;
        self.clock.register(MediaSynchronizer::loaded(id, resource, self.config.loop_epsilon));
        self.block_added(id);
        Ok(id)
    }

    fn block_added(&mut self, id: BlockId) {
        if let Some(block) = self.store.get(id) {
            tracing::info!(
                "Added {} block {} ({}) at {:.2}s for {:.2}s",
                block.kind().name(),
                id,
                block.display_name(),
                block.start_time,
                block.duration
            );
        }
        self.clock.resync(&self.store, id);
        self.clock.refresh(&self.store);
        self.pending_events.push(TimelineEvent::BlockAdded(id));
        self.drain_clock();
    }

    /// Delete a block and release its resource
    pub fn remove_block(&mut self, id: BlockId) -> Result<Block> {
        let block = self.store.remove(id).ok_or(TimelineError::BlockNotFound(id))?;
        self.clock.unregister(id);
        if self.interaction.drag_op().block() == Some(id) {
            self.interaction.end();
        }
        if self.selected == Some(id) {
            self.on_block_select(None);
        }
        tracing::info!("Removed block {} ({})", id, block.display_name());

        self.clock.refresh(&self.store);
        self.pending_events.push(TimelineEvent::BlockRemoved(id));
        self.drain_clock();
        Ok(block)
    }

    /// Apply a partial update to a block.
    ///
    /// A rejected slide placement changes nothing and is not an error.
    pub fn on_block_update(&mut self, id: BlockId, update: &BlockUpdate) -> Result<Placement> {
        let placement = self.store.update(id, update)?;
        match placement {
            Placement::Committed => self.block_changed(id),
            Placement::Rejected => tracing::debug!("Update of block {} rejected: overlap", id),
        }
        Ok(placement)
    }

    fn block_changed(&mut self, id: BlockId) {
        self.clock.resync(&self.store, id);
        self.clock.refresh(&self.store);
        self.pending_events.push(TimelineEvent::BlockUpdated(id));
        self.drain_clock();
    }

    // ---- Selection ----

    /// Select a block, or clear the selection. Unknown ids are ignored.
    pub fn on_block_select(&mut self, id: Option<BlockId>) {
        if id.is_some_and(|id| !self.store.contains(id)) || id == self.selected {
            return;
        }
        self.selected = id;
        self.pending_events.push(TimelineEvent::SelectionChanged(id));
    }

    /// Selected block
    pub fn selected_block(&self) -> Option<BlockId> {
        self.selected
    }

    // ---- Playback ----

    /// Start playback from the playhead
    pub fn play(&mut self) {
        self.clock.play(&self.store);
        self.drain_clock();
    }

    /// Pause playback and every resource
    pub fn pause(&mut self) {
        self.clock.pause();
        self.drain_clock();
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance one frame; call once per host frame
    pub fn tick(&mut self) -> ClockState {
        let state = self.clock.tick(&self.store);
        self.drain_clock();
        state
    }

    /// Move the playhead
    pub fn on_seek(&mut self, seconds: f64) {
        self.clock.seek(&self.store, seconds);
        self.drain_clock();
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Playhead position
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Latest block end, floored at the configured minimum
    pub fn total_duration(&self) -> f64 {
        self.clock.total_duration(&self.store)
    }

    /// Index of the active slide, in slide order
    pub fn active_slide(&self) -> Option<usize> {
        self.clock.navigator().active_index()
    }

    /// Active slide block
    pub fn active_slide_block(&self) -> Option<BlockId> {
        self.clock.navigator().active_block()
    }

    // ---- Zoom and projection ----

    /// Set the zoom factor (clamped); returns the applied zoom
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let before = self.scale.zoom();
        let applied = self.scale.set_zoom(zoom);
        self.zoom_changed(before, applied)
    }

    /// Zoom in by one step
    pub fn zoom_in(&mut self) -> f64 {
        let before = self.scale.zoom();
        let applied = self.scale.zoom_in();
        self.zoom_changed(before, applied)
    }

    /// Zoom out by one step
    pub fn zoom_out(&mut self) -> f64 {
        let before = self.scale.zoom();
        let applied = self.scale.zoom_out();
        self.zoom_changed(before, applied)
    }

    fn zoom_changed(&mut self, before: f64, applied: f64) -> f64 {
        if (before - applied).abs() > f64::EPSILON {
            tracing::debug!("Zoom {:.2} -> {:.2}", before, applied);
            self.pending_events.push(TimelineEvent::ZoomChanged(applied));
        }
        applied
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f64 {
        self.scale.zoom()
    }

    /// Convert seconds to pixels
    pub fn time_to_pixels(&self, seconds: f64) -> f64 {
        self.scale.time_to_pixels(seconds)
    }

    /// Convert pixels to seconds
    pub fn pixels_to_time(&self, pixels: f64) -> f64 {
        self.scale.pixels_to_time(pixels)
    }

    /// Format seconds as `M:SS`
    pub fn format_time(&self, seconds: f64) -> String {
        coords::format_time(seconds)
    }

    // ---- Gestures ----

    /// Pointer pressed on the body of a block
    pub fn pointer_down_drag(&mut self, id: BlockId, x: f64) -> bool {
        self.on_block_select(Some(id));
        self.interaction.begin_drag(&self.store, id, x)
    }

    /// Pointer pressed on an edge handle of a block
    pub fn pointer_down_stretch(&mut self, id: BlockId, edge: StretchEdge, x: f64) -> bool {
        self.on_block_select(Some(id));
        self.interaction.begin_stretch(&self.store, id, edge, x)
    }

    /// Pointer moved while a gesture may be active
    pub fn pointer_move(&mut self, x: f64) -> MoveOutcome {
        let outcome = self.interaction.pointer_move(&mut self.store, &self.scale, x);
        if let (MoveOutcome::Committed(_), Some(id)) = (&outcome, self.interaction.drag_op().block()) {
            self.block_changed(id);
        }
        outcome
    }

    /// Pointer released
    pub fn pointer_up(&mut self) -> Option<BlockId> {
        self.interaction.end()
    }

    /// Pointer capture lost; the block returns to its pre-gesture placement
    pub fn pointer_cancel(&mut self) -> Option<BlockId> {
        let restored = self.interaction.cancel(&mut self.store);
        if let Some(id) = restored {
            self.block_changed(id);
        }
        restored
    }

    // ---- Events ----

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn drain_clock(&mut self) {
        self.pending_events.extend(self.clock.take_events());
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        tracing::debug!("Releasing {} media resources", self.clock.synchronizer_count());
        self.clock.release_all();
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("blocks", &self.store.len())
            .field("zoom", &self.scale.zoom())
            .field("clock", &self.clock)
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SimulatedBackend;
    use crate::sync::SyncStatus;

    fn timeline(backend: SimulatedBackend) -> Timeline {
        Timeline::new(TimelineConfig::default(), Box::new(backend)).unwrap()
    }

    fn run_until(timeline: &mut Timeline, seconds: f64) {
        while timeline.is_playing() && timeline.current_time() < seconds - 1e-9 {
            timeline.tick();
        }
    }

    #[test]
    fn test_import_media_captures_natural_duration() {
        let backend = SimulatedBackend::new().with_source("voiceover_intro.mp3", 8.5);
        let mut timeline = timeline(backend);
        let id = timeline.import_media(BlockKind::Audio, "voiceover_intro.mp3", 2.0).unwrap();

        let block = timeline.block(id).unwrap();
        assert_eq!(block.original_duration(), Some(8.5));
        assert_eq!(block.duration, 8.5);
        assert_eq!(block.start_time, 2.0);
        assert!(matches!(
            &block.content,
            crate::block::BlockContent::Audio(audio) if audio.category() == crate::block::AudioCategory::Voiceover
        ));
        assert!(timeline.synchronizer(id).unwrap().is_ready());
        assert!(timeline.take_events().contains(&TimelineEvent::BlockAdded(id)));
    }

    #[test]
    fn test_import_failure_creates_no_block() {
        let mut timeline = timeline(SimulatedBackend::new());
        let result = timeline.import_media(BlockKind::Video, "missing.mp4", 0.0);
        assert!(matches!(result, Err(TimelineError::Media(_))));
        assert!(timeline.store().is_empty());
    }

    #[test]
    fn test_import_slide_kind_is_refused() {
        let backend = SimulatedBackend::new().with_source("a.png", 1.0);
        let mut timeline = timeline(backend);
        assert!(matches!(
            timeline.import_media(BlockKind::Slide, "a.png", 0.0),
            Err(TimelineError::NotMedia(BlockKind::Slide))
        ));
    }

    #[test]
    fn test_insert_block_with_broken_source_stays_editable() {
        let mut timeline = timeline(SimulatedBackend::new());
        let id = timeline.insert_block(Block::audio("gone.mp3", 0.0, 5.0)).unwrap();
        assert_eq!(timeline.synchronizer(id).unwrap().status(), SyncStatus::Unavailable);

        let placement = timeline.on_block_update(id, &BlockUpdate::start(3.0)).unwrap();
        assert_eq!(placement, Placement::Committed);
        assert_eq!(timeline.block(id).unwrap().start_time, 3.0);

        timeline.play();
        run_until(&mut timeline, 4.0);
        assert!(!timeline.synchronizer(id).unwrap().is_playing());
    }

    #[test]
    fn test_failing_tracks_do_not_affect_others() {
        let mut backend = SimulatedBackend::new()
            .with_source("music.mp3", 10.0)
            .with_source("intro.mp4", 10.0);
        backend.refuse_play("intro.mp4");
        let mut timeline = timeline(backend);
        let music = timeline.import_media(BlockKind::Audio, "music.mp3", 0.0).unwrap();
        let intro = timeline.import_media(BlockKind::Video, "intro.mp4", 0.0).unwrap();
        let gone = timeline.insert_block(Block::audio("gone.mp3", 0.0, 10.0)).unwrap();

        timeline.play();
        for _ in 0..60 {
            timeline.tick();
        }

        assert!(timeline.is_playing());
        assert!((timeline.current_time() - 1.0).abs() < 1e-6);

        let music_sync = timeline.synchronizer(music).unwrap();
        assert!(music_sync.is_playing());
        assert!((music_sync.position() - 1.0).abs() < 0.05);

        let intro_sync = timeline.synchronizer(intro).unwrap();
        assert!(intro_sync.is_ready());
        assert!(!intro_sync.is_playing());

        assert_eq!(timeline.synchronizer(gone).unwrap().status(), SyncStatus::Unavailable);
    }

    #[test]
    fn test_end_to_end_audio_window() {
        let backend = SimulatedBackend::new().with_source("music.mp3", 10.0);
        let mut timeline = timeline(backend);
        let id = timeline.import_media(BlockKind::Audio, "music.mp3", 2.0).unwrap();
        timeline.on_block_update(id, &BlockUpdate::duration(4.0)).unwrap();

        timeline.play();
        run_until(&mut timeline, 1.9);
        assert!(!timeline.synchronizer(id).unwrap().is_playing());

        run_until(&mut timeline, 2.05);
        let sync = timeline.synchronizer(id).unwrap();
        assert!(sync.is_playing());
        assert!(sync.position() < 0.07);

        run_until(&mut timeline, 4.0);
        timeline.pause();
        let sync = timeline.synchronizer(id).unwrap();
        assert!(!sync.is_playing());
        assert!((sync.position() - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_slides_navigate_during_playback() {
        let mut timeline = timeline(SimulatedBackend::new());
        let first = timeline.add_slide("a.png", 5.0).unwrap();
        let second = timeline.add_slide("b.png", 5.0).unwrap();
        assert_eq!(timeline.block(second).unwrap().start_time, 5.0);

        timeline.take_events();
        timeline.on_seek(7.0);
        assert_eq!(timeline.active_slide(), Some(1));
        assert_eq!(timeline.active_slide_block(), Some(second));

        let events = timeline.take_events();
        assert_eq!(events[0], TimelineEvent::Seeked { to: 7.0 });
        assert_eq!(events[1], TimelineEvent::SlideActivated { index: 1, block: second });

        timeline.on_seek(0.0);
        assert_eq!(timeline.active_slide_block(), Some(first));
    }

    #[test]
    fn test_overlapping_slide_update_is_rejected() {
        let mut timeline = timeline(SimulatedBackend::new());
        let a = timeline.add_slide("a.png", 5.0).unwrap();
        timeline.add_slide("b.png", 5.0).unwrap();
        timeline.take_events();

        let placement = timeline.on_block_update(a, &BlockUpdate::duration(7.0)).unwrap();
        assert_eq!(placement, Placement::Rejected);
        assert_eq!(timeline.block(a).unwrap().duration, 5.0);
        assert!(timeline.take_events().is_empty());
    }

    #[test]
    fn test_unknown_block_update_fails() {
        let mut timeline = timeline(SimulatedBackend::new());
        let result = timeline.on_block_update(BlockId::new(), &BlockUpdate::start(1.0));
        assert!(matches!(result, Err(TimelineError::BlockNotFound(_))));
    }

    #[test]
    fn test_remove_releases_and_clears_selection() {
        let backend = SimulatedBackend::new().with_source("clip.mp4", 6.0);
        let mut timeline = timeline(backend);
        let id = timeline.import_media(BlockKind::Video, "clip.mp4", 0.0).unwrap();
        timeline.on_block_select(Some(id));
        timeline.play();
        assert!(timeline.synchronizer(id).unwrap().is_playing());

        timeline.take_events();
        timeline.remove_block(id).unwrap();
        assert!(timeline.synchronizer(id).is_none());
        assert_eq!(timeline.selected_block(), None);
        let events = timeline.take_events();
        assert!(events.contains(&TimelineEvent::SelectionChanged(None)));
        assert!(events.contains(&TimelineEvent::BlockRemoved(id)));
        assert!(timeline.remove_block(id).is_err());
    }

    #[test]
    fn test_gesture_through_facade() {
        let backend = SimulatedBackend::new().with_source("music.mp3", 10.0);
        let mut timeline = timeline(backend);
        let id = timeline.import_media(BlockKind::Audio, "music.mp3", 0.0).unwrap();
        timeline.take_events();

        assert!(timeline.pointer_down_drag(id, 0.0));
        assert_eq!(timeline.selected_block(), Some(id));
        let outcome = timeline.pointer_move(100.0);
        assert_eq!(outcome, MoveOutcome::Committed(BlockUpdate::start(2.0)));
        assert_eq!(timeline.pointer_up(), Some(id));

        let events = timeline.take_events();
        assert_eq!(events, vec![TimelineEvent::SelectionChanged(Some(id)), TimelineEvent::BlockUpdated(id)]);
        assert_eq!(timeline.block(id).unwrap().start_time, 2.0);

        timeline.pointer_down_stretch(id, StretchEdge::Right, 0.0);
        timeline.pointer_move(50.0);
        assert_eq!(timeline.block(id).unwrap().duration, 11.0);
        timeline.pointer_cancel();
        assert_eq!(timeline.block(id).unwrap().duration, 10.0);
    }

    #[test]
    fn test_zoom_changes_projection_only() {
        let backend = SimulatedBackend::new().with_source("music.mp3", 10.0);
        let mut timeline = timeline(backend);
        let id = timeline.import_media(BlockKind::Audio, "music.mp3", 4.0).unwrap();
        timeline.take_events();

        assert_eq!(timeline.time_to_pixels(4.0), 200.0);
        assert_eq!(timeline.zoom_in(), 1.25);
        assert_eq!(timeline.time_to_pixels(4.0), 250.0);
        assert_eq!(timeline.set_zoom(10.0), 3.0);
        assert_eq!(timeline.set_zoom(3.0), 3.0);
        assert_eq!(timeline.block(id).unwrap().start_time, 4.0);

        let events = timeline.take_events();
        assert_eq!(events, vec![TimelineEvent::ZoomChanged(1.25), TimelineEvent::ZoomChanged(3.0)]);
        assert_eq!(timeline.format_time(75.0), "1:15");
    }

    #[test]
    fn test_toggle_and_reaching_end() {
        let mut timeline = timeline(SimulatedBackend::new());
        timeline.on_seek(29.9);
        timeline.toggle_playback();
        assert!(timeline.is_playing());
        for _ in 0..10 {
            timeline.tick();
        }
        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 30.0);
        assert!(timeline.take_events().contains(&TimelineEvent::ReachedEnd { at: 30.0 }));

        timeline.toggle_playback();
        assert_eq!(timeline.current_time(), 0.0);
        timeline.toggle_playback();
        assert!(!timeline.is_playing());
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = TimelineConfig {
            tick_step: 0.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            Timeline::new(config, Box::new(SimulatedBackend::new())),
            Err(TimelineError::Config(_))
        ));
    }
}
