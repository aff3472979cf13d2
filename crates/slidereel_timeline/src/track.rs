// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track views over the block store.

use crate::block::{Block, BlockKind};
use crate::store::BlockStore;

/// Kind of a track; every track holds blocks of exactly one kind
pub type TrackKind = BlockKind;

/// Blocks of one kind in insertion order
#[derive(Debug, Clone)]
pub struct Track<'a> {
    kind: TrackKind,
    blocks: Vec<&'a Block>,
}

impl<'a> Track<'a> {
    /// Collect the track of `kind` from `store`
    pub fn collect(store: &'a BlockStore, kind: TrackKind) -> Self {
        Self {
            kind,
            blocks: store.of_kind(kind).collect(),
        }
    }

    /// Track kind
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Blocks on this track
    pub fn blocks(&self) -> &[&'a Block] {
        &self.blocks
    }

    /// Whether the track has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether blocks on this track may overlap each other
    pub fn allows_overlap(&self) -> bool {
        self.kind != BlockKind::Slide
    }

    /// End of the last block, 0 when empty
    pub fn end_time(&self) -> f64 {
        self.blocks.iter().map(|b| b.end_time()).fold(0.0, f64::max)
    }
}

/// All tracks in display order (slides, video, audio)
pub fn tracks(store: &BlockStore) -> Vec<Track<'_>> {
    BlockKind::all()
        .into_iter()
        .map(|kind| Track::collect(store, kind))
        .collect()
}
