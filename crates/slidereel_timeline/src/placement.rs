// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collision and boundary rules for block placement.

use crate::block::{BlockId, BlockKind};
use crate::config::MinDurations;

/// Result of trying to commit a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The update was applied
    Committed,
    /// The update would overlap another slide and was discarded
    Rejected,
}

impl Placement {
    /// Whether the update was applied
    pub fn is_committed(&self) -> bool {
        matches!(self, Placement::Committed)
    }
}

/// Half-open interval overlap test for `[a_start, a_start + a_duration)`
/// against `[b_start, b_start + b_duration)`.
pub fn intervals_overlap(a_start: f64, a_duration: f64, b_start: f64, b_duration: f64) -> bool {
    a_start < b_start + b_duration && a_start + a_duration > b_start
}

/// First sibling whose interval overlaps the candidate.
///
/// `siblings` yields `(id, start, duration)`; the entry equal to `self_id`
/// is skipped.
pub fn find_collision<I>(self_id: BlockId, start: f64, duration: f64, siblings: I) -> Option<BlockId>
where
    I: IntoIterator<Item = (BlockId, f64, f64)>,
{
    siblings
        .into_iter()
        .filter(|(id, _, _)| *id != self_id)
        .find(|(_, s, d)| intervals_overlap(start, duration, *s, *d))
        .map(|(id, _, _)| id)
}

/// Clamp a start time to the timeline
pub fn clamp_start(start: f64) -> f64 {
    if start.is_finite() {
        start.max(0.0)
    } else {
        0.0
    }
}

/// Clamp a duration to the kind's minimum
pub fn clamp_duration(kind: BlockKind, duration: f64, mins: &MinDurations) -> f64 {
    let min = mins.for_kind(kind);
    if duration.is_finite() {
        duration.max(min)
    } else {
        min
    }
}

/// Clamp a volume to 0-100
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 100.0)
    } else {
        100.0
    }
}

/// Clamp a fade length to be non-negative
pub fn clamp_fade(fade: f64) -> f64 {
    if fade.is_finite() {
        fade.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_half_open() {
        assert!(intervals_overlap(0.0, 5.0, 4.0, 5.0));
        assert!(!intervals_overlap(0.0, 5.0, 5.0, 5.0));
        assert!(!intervals_overlap(5.0, 5.0, 0.0, 5.0));
        assert!(intervals_overlap(1.0, 1.0, 0.0, 5.0));
    }

    #[test]
    fn test_find_collision_skips_self() {
        let me = BlockId::new();
        let other = BlockId::new();
        let siblings = vec![(me, 0.0, 5.0), (other, 5.0, 5.0)];
        assert_eq!(find_collision(me, 0.0, 5.0, siblings.clone()), None);
        assert_eq!(find_collision(me, 1.0, 5.0, siblings), Some(other));
    }

    #[test]
    fn test_clamps() {
        let mins = MinDurations::default();
        assert_eq!(clamp_start(-3.0), 0.0);
        assert_eq!(clamp_start(f64::NAN), 0.0);
        assert_eq!(clamp_duration(BlockKind::Slide, 0.2, &mins), 1.0);
        assert_eq!(clamp_duration(BlockKind::Video, 0.2, &mins), 0.5);
        assert_eq!(clamp_duration(BlockKind::Audio, 4.0, &mins), 4.0);
        assert_eq!(clamp_volume(140.0), 100.0);
        assert_eq!(clamp_volume(-1.0), 0.0);
        assert_eq!(clamp_fade(-2.0), 0.0);
    }
}
