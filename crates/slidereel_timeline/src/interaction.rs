// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer gestures on timeline blocks.
//!
//! A gesture spans several calls: it is started on pointer down, turned into
//! candidate block updates on every pointer move, and finished on pointer up.
//! Candidates are always computed from the values captured at gesture start,
//! so a rejected move never accumulates error.

use crate::block::{BlockId, BlockKind, BlockUpdate};
use crate::coords::TimeScale;
use crate::placement::Placement;
use crate::store::BlockStore;

/// Which edge of a block is being stretched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StretchEdge {
    /// Start edge; moves the start and changes the duration
    Left,
    /// End edge; changes the duration only
    Right,
}

/// Gesture in progress
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragOperation {
    /// No gesture
    #[default]
    None,
    /// Moving a block along the timeline
    Move {
        /// Dragged block
        block: BlockId,
        /// Pointer x when the gesture started
        origin_x: f64,
        /// Block start when the gesture started
        original_start: f64,
    },
    /// Stretching one edge of a block
    Stretch {
        /// Stretched block
        block: BlockId,
        /// Dragged edge
        edge: StretchEdge,
        /// Pointer x when the gesture started
        origin_x: f64,
        /// Block start when the gesture started
        original_start: f64,
        /// Block duration when the gesture started
        original_duration: f64,
    },
}

impl DragOperation {
    /// Block targeted by the gesture
    pub fn block(&self) -> Option<BlockId> {
        match self {
            Self::None => None,
            Self::Move { block, .. } | Self::Stretch { block, .. } => Some(*block),
        }
    }
}

/// Result of a pointer move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The candidate was applied to the store
    Committed(BlockUpdate),
    /// The candidate would overlap another slide; nothing changed
    Rejected,
    /// No gesture is active, or its block no longer exists
    Ignored,
}

/// Gesture state machine: `None -> Move | Stretch -> None`
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    drag_op: DragOperation,
}

impl InteractionController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture
    pub fn drag_op(&self) -> &DragOperation {
        &self.drag_op
    }

    /// Whether no gesture is active
    pub fn is_idle(&self) -> bool {
        self.drag_op == DragOperation::None
    }

    /// Start moving `block` with the pointer at `x`
    pub fn begin_drag(&mut self, store: &BlockStore, block: BlockId, x: f64) -> bool {
        let Some(target) = store.get(block) else {
            return false;
        };
        self.drag_op = DragOperation::Move {
            block,
            origin_x: x,
            original_start: target.start_time,
        };
        tracing::debug!("Drag started on block {}", block);
        true
    }

    /// Start stretching `edge` of `block` with the pointer at `x`
    pub fn begin_stretch(&mut self, store: &BlockStore, block: BlockId, edge: StretchEdge, x: f64) -> bool {
        let Some(target) = store.get(block) else {
            return false;
        };
        self.drag_op = DragOperation::Stretch {
            block,
            edge,
            origin_x: x,
            original_start: target.start_time,
            original_duration: target.duration,
        };
        tracing::debug!("Stretch ({:?}) started on block {}", edge, block);
        true
    }

    /// Turn the pointer position into a candidate update and try to apply it
    pub fn pointer_move(&mut self, store: &mut BlockStore, scale: &TimeScale, x: f64) -> MoveOutcome {
        let Some(id) = self.drag_op.block() else {
            return MoveOutcome::Ignored;
        };
        let Some(kind) = store.get(id).map(|b| b.kind()) else {
            tracing::debug!("Block {} vanished during a gesture", id);
            self.drag_op = DragOperation::None;
            return MoveOutcome::Ignored;
        };

        let update = self.candidate(kind, store, scale, x);
        match store.update(id, &update) {
            Ok(Placement::Committed) => MoveOutcome::Committed(update),
            Ok(Placement::Rejected) => MoveOutcome::Rejected,
            Err(e) => {
                tracing::debug!("Gesture update dropped: {}", e);
                self.drag_op = DragOperation::None;
                MoveOutcome::Ignored
            }
        }
    }

    fn candidate(&self, kind: BlockKind, store: &BlockStore, scale: &TimeScale, x: f64) -> BlockUpdate {
        let min_duration = store.min_durations().for_kind(kind);
        match self.drag_op {
            DragOperation::None => BlockUpdate::default(),
            DragOperation::Move { origin_x, original_start, .. } => {
                let dt = scale.pixels_to_time(x - origin_x);
                BlockUpdate::start((original_start + dt).max(0.0))
            }
            DragOperation::Stretch {
                edge: StretchEdge::Right,
                origin_x,
                original_duration,
                ..
            } => {
                let dt = scale.pixels_to_time(x - origin_x);
                BlockUpdate::duration((original_duration + dt).max(min_duration))
            }
            DragOperation::Stretch {
                edge: StretchEdge::Left,
                origin_x,
                original_start,
                original_duration,
                ..
            } => {
                let dt = scale.pixels_to_time(x - origin_x);
                BlockUpdate::placement(
                    (original_start + dt).max(0.0),
                    (original_duration - dt).max(min_duration),
                )
            }
        }
    }

    /// Finish the gesture; returns the block it targeted
    pub fn end(&mut self) -> Option<BlockId> {
        let block = self.drag_op.block();
        if let Some(block) = block {
            tracing::debug!("Gesture ended on block {}", block);
        }
        self.drag_op = DragOperation::None;
        block
    }

    /// Abort the gesture and put the block back where it started
    pub fn cancel(&mut self, store: &mut BlockStore) -> Option<BlockId> {
        let restore = match self.drag_op {
            DragOperation::None => None,
            DragOperation::Move { block, original_start, .. } => {
                Some((block, BlockUpdate::start(original_start)))
            }
            DragOperation::Stretch {
                block,
                original_start,
                original_duration,
                ..
            } => Some((block, BlockUpdate::placement(original_start, original_duration))),
        };
        self.drag_op = DragOperation::None;

        let (block, update) = restore?;
        match store.update(block, &update) {
            Ok(_) => {
                tracing::debug!("Gesture cancelled on block {}", block);
                Some(block)
            }
            Err(_) => None,
        }
    }
}
