// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block store: every block on the timeline, in insertion order.

use crate::block::{Block, BlockContent, BlockId, BlockKind, BlockUpdate, SlidePlacement};
use crate::config::MinDurations;
use crate::error::{Result, TimelineError};
use crate::placement::{self, Placement};
use indexmap::IndexMap;

/// Ordered collection of blocks with clamped partial updates
#[derive(Debug, Clone)]
pub struct BlockStore {
    blocks: IndexMap<BlockId, Block>,
    min_durations: MinDurations,
}

impl BlockStore {
    /// Create an empty store
    pub fn new(min_durations: MinDurations) -> Self {
        Self {
            blocks: IndexMap::new(),
            min_durations,
        }
    }

    /// Minimum durations used for clamping
    pub fn min_durations(&self) -> &MinDurations {
        &self.min_durations
    }

    /// Add a block.
    ///
    /// Start, duration, volume and fades are clamped. A sequential slide is
    /// moved to the end of the slide track; an explicit slide that overlaps
    /// another slide is refused.
    pub fn insert(&mut self, mut block: Block) -> Result<BlockId> {
        if self.blocks.contains_key(&block.id) {
            return Err(TimelineError::DuplicateBlock(block.id));
        }

        let kind = block.kind();
        block.start_time = placement::clamp_start(block.start_time);
        block.duration = placement::clamp_duration(kind, block.duration, &self.min_durations);
        match &mut block.content {
            BlockContent::Slide(slide) => {
                if slide.placement == SlidePlacement::Sequential {
                    block.start_time = self.slide_track_end();
                }
            }
            BlockContent::Audio(audio) => {
                audio.volume = placement::clamp_volume(audio.volume);
                audio.fade_in = placement::clamp_fade(audio.fade_in);
                audio.fade_out = placement::clamp_fade(audio.fade_out);
            }
            BlockContent::Video(video) => {
                video.volume = placement::clamp_volume(video.volume);
            }
        }

        if kind == BlockKind::Slide {
            if let Some(other) = self.slide_collision(block.id, block.start_time, block.duration) {
                return Err(TimelineError::SlideOverlap { block: block.id, other });
            }
        }

        let id = block.id;
        self.blocks.insert(id, block);
        if kind == BlockKind::Slide {
            self.pin_diverged_slides();
        }
        Ok(id)
    }

    /// Remove a block
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let removed = self.blocks.shift_remove(&id)?;
        if removed.kind() == BlockKind::Slide {
            self.pin_diverged_slides();
        }
        Some(removed)
    }

    /// Keep sequential slides where they are drawn.
    ///
    /// A sequential slide must start at the cumulative duration of the
    /// slides before it. Any that no longer does (a predecessor was
    /// resized, moved or removed) is pinned to its current start.
    fn pin_diverged_slides(&mut self) {
        let mut cursor = 0.0;
        for block in self.blocks.values_mut() {
            let BlockContent::Slide(slide) = &mut block.content else {
                continue;
            };
            if slide.placement == SlidePlacement::Sequential
                && (block.start_time - cursor).abs() > 1e-9
            {
                slide.placement = SlidePlacement::Explicit;
            }
            cursor += block.duration;
        }
    }

    /// Get a block
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Whether the block exists
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Blocks of one kind in insertion order
    pub fn of_kind(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.values().filter(move |b| b.kind() == kind)
    }

    /// Slides in insertion order
    pub fn slides(&self) -> Vec<&Block> {
        self.of_kind(BlockKind::Slide).collect()
    }

    /// Media (audio and video) blocks in insertion order
    pub fn media(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values().filter(|b| b.is_media())
    }

    /// End of the last slide, 0 when there are none
    pub fn slide_track_end(&self) -> f64 {
        self.of_kind(BlockKind::Slide)
            .map(Block::end_time)
            .fold(0.0, f64::max)
    }

    /// Slide that a candidate interval for `id` would overlap
    pub fn slide_collision(&self, id: BlockId, start: f64, duration: f64) -> Option<BlockId> {
        placement::find_collision(
            id,
            start,
            duration,
            self.of_kind(BlockKind::Slide)
                .map(|b| (b.id, b.start_time, b.duration)),
        )
    }

    /// Apply a partial update.
    ///
    /// Every field is clamped. Slide updates that would overlap a sibling
    /// are discarded as a whole and reported as [`Placement::Rejected`].
    /// Volume and fade fields are ignored on kinds that do not carry them.
    pub fn update(&mut self, id: BlockId, update: &BlockUpdate) -> Result<Placement> {
        let block = self.blocks.get(&id).ok_or(TimelineError::BlockNotFound(id))?;
        let kind = block.kind();

        let start = update
            .start_time
            .map_or(block.start_time, placement::clamp_start);
        let duration = update.duration.map_or(block.duration, |d| {
            placement::clamp_duration(kind, d, &self.min_durations)
        });

        if kind == BlockKind::Slide
            && update.moves()
            && self.slide_collision(id, start, duration).is_some()
        {
            return Ok(Placement::Rejected);
        }

        let Some(block) = self.blocks.get_mut(&id) else {
            return Err(TimelineError::BlockNotFound(id));
        };
        block.start_time = start;
        block.duration = duration;
        if let Some(label) = &update.label {
            block.label = Some(label.clone());
        }

        match &mut block.content {
            BlockContent::Slide(slide) => {
                if update.start_time.is_some() {
                    slide.placement = SlidePlacement::Explicit;
                }
            }
            BlockContent::Audio(audio) => {
                if let Some(volume) = update.volume {
                    audio.volume = placement::clamp_volume(volume);
                }
                if let Some(fade_in) = update.fade_in {
                    audio.fade_in = placement::clamp_fade(fade_in);
                }
                if let Some(fade_out) = update.fade_out {
                    audio.fade_out = placement::clamp_fade(fade_out);
                }
            }
            BlockContent::Video(video) => {
                if let Some(volume) = update.volume {
                    video.volume = placement::clamp_volume(volume);
                }
            }
        }

        if kind == BlockKind::Slide && update.moves() {
            self.pin_diverged_slides();
        }
        Ok(Placement::Committed)
    }

    /// Latest block end, floored at `min_total`
    pub fn total_duration(&self, min_total: f64) -> f64 {
        self.blocks
            .values()
            .map(Block::end_time)
            .fold(min_total, f64::max)
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new(MinDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_ids(store: &mut BlockStore, durations: &[f64]) -> Vec<BlockId> {
        durations
            .iter()
            .map(|d| store.insert(Block::slide("slide.png", *d)).unwrap())
            .collect()
    }

    #[test]
    fn test_sequential_slides_stack() {
        let mut store = BlockStore::default();
        let ids = slide_ids(&mut store, &[5.0, 3.0, 4.0]);
        assert_eq!(store.get(ids[0]).unwrap().start_time, 0.0);
        assert_eq!(store.get(ids[1]).unwrap().start_time, 5.0);
        assert_eq!(store.get(ids[2]).unwrap().start_time, 8.0);
        assert_eq!(store.slide_track_end(), 12.0);
    }

    #[test]
    fn test_insert_clamps() {
        let mut store = BlockStore::default();
        let id = store
            .insert(Block::video("clip.mp4", -4.0, 0.1).with_volume(250.0))
            .unwrap();
        let block = store.get(id).unwrap();
        assert_eq!(block.start_time, 0.0);
        assert_eq!(block.duration, 0.5);
        assert_eq!(block.volume(), Some(100.0));
        // original duration is kept as loaded
        assert_eq!(block.original_duration(), Some(0.1));
    }

    #[test]
    fn test_explicit_slide_overlap_refused() {
        let mut store = BlockStore::default();
        slide_ids(&mut store, &[5.0]);
        let result = store.insert(Block::slide("b.png", 5.0).at(2.0));
        assert!(matches!(result, Err(TimelineError::SlideOverlap { .. })));
        assert_eq!(store.len(), 1);
        assert!(store.insert(Block::slide("c.png", 5.0).at(5.0)).is_ok());
    }

    #[test]
    fn test_duplicate_id_refused() {
        let mut store = BlockStore::default();
        let block = Block::audio("music.mp3", 0.0, 10.0);
        store.insert(block.clone()).unwrap();
        assert!(matches!(store.insert(block), Err(TimelineError::DuplicateBlock(_))));
    }

    #[test]
    fn test_update_clamps_and_applies() {
        let mut store = BlockStore::default();
        let id = store.insert(Block::audio("music.mp3", 2.0, 10.0)).unwrap();

        let update = BlockUpdate {
            start_time: Some(-1.0),
            duration: Some(0.25),
            volume: Some(-20.0),
            fade_in: Some(2.0),
            fade_out: Some(-1.0),
            label: Some("Bed".into()),
        };
        assert_eq!(store.update(id, &update).unwrap(), Placement::Committed);

        let block = store.get(id).unwrap();
        assert_eq!(block.start_time, 0.0);
        assert_eq!(block.duration, 1.0);
        assert_eq!(block.volume(), Some(0.0));
        assert_eq!(block.label.as_deref(), Some("Bed"));
        match &block.content {
            BlockContent::Audio(audio) => {
                assert_eq!(audio.fade_in, 2.0);
                assert_eq!(audio.fade_out, 0.0);
                assert_eq!(audio.original_duration(), 10.0);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_slide_update_rejected_atomically() {
        let mut store = BlockStore::default();
        let ids = slide_ids(&mut store, &[5.0, 5.0]);
        let update = BlockUpdate {
            start_time: Some(3.0),
            label: Some("moved".into()),
            ..Default::default()
        };
        assert_eq!(store.update(ids[1], &update).unwrap(), Placement::Rejected);
        let block = store.get(ids[1]).unwrap();
        assert_eq!(block.start_time, 5.0);
        assert!(block.label.is_none());
    }

    #[test]
    fn test_slide_move_becomes_explicit() {
        let mut store = BlockStore::default();
        let ids = slide_ids(&mut store, &[5.0]);
        store.update(ids[0], &BlockUpdate::start(10.0)).unwrap();
        assert!(matches!(
            store.get(ids[0]).unwrap().content,
            BlockContent::Slide(ref s) if s.placement == SlidePlacement::Explicit
        ));
    }

    #[test]
    fn test_followers_pinned_after_resize() {
        let mut store = BlockStore::default();
        let ids = slide_ids(&mut store, &[5.0, 5.0]);
        store.update(ids[0], &BlockUpdate::duration(3.0)).unwrap();
        let second = store.get(ids[1]).unwrap();
        assert_eq!(second.start_time, 5.0);
        assert!(matches!(
            second.content,
            BlockContent::Slide(ref s) if s.placement == SlidePlacement::Explicit
        ));
    }

    #[test]
    fn test_audio_overlap_allowed() {
        let mut store = BlockStore::default();
        let a = store.insert(Block::audio("music.mp3", 0.0, 10.0)).unwrap();
        store.insert(Block::audio("voice.mp3", 0.0, 10.0)).unwrap();
        assert!(store.update(a, &BlockUpdate::start(1.0)).unwrap().is_committed());
    }

    #[test]
    fn test_unknown_block() {
        let mut store = BlockStore::default();
        let result = store.update(BlockId::new(), &BlockUpdate::start(1.0));
        assert!(matches!(result, Err(TimelineError::BlockNotFound(_))));
    }

    #[test]
    fn test_total_duration() {
        let mut store = BlockStore::default();
        assert_eq!(store.total_duration(30.0), 30.0);
        store.insert(Block::video("clip.mp4", 28.0, 6.0)).unwrap();
        assert_eq!(store.total_duration(30.0), 34.0);
        let id = store.insert(Block::slide("s.png", 40.0)).unwrap();
        assert_eq!(store.total_duration(30.0), 40.0);
        store.remove(id);
        assert_eq!(store.total_duration(30.0), 34.0);
    }
}
