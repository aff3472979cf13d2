// SPDX-License-Identifier: MIT OR Apache-2.0
//! Active slide tracking.

use crate::block::{Block, BlockContent, BlockId, SlidePlacement};
use crate::event::TimelineEvent;
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};

/// What the navigator reports once the playhead passes the last slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PastEndPolicy {
    /// Keep the last slide active
    #[default]
    HoldLast,
    /// No slide is active
    Clear,
}

/// Receives every change of the playhead position
pub trait TimeObserver {
    /// Called after the playhead moved to `time`
    fn on_time(&mut self, time: f64, store: &BlockStore, events: &mut Vec<TimelineEvent>);
}

/// Effective `(id, start, duration)` of each slide, in slide order.
///
/// Explicit slides use their own start time; sequential slides start where
/// the cumulative durations of the preceding slides end.
pub fn slide_intervals(slides: &[&Block]) -> Vec<(BlockId, f64, f64)> {
    let mut cursor = 0.0;
    slides
        .iter()
        .map(|slide| {
            let start = match &slide.content {
                BlockContent::Slide(data) if data.placement == SlidePlacement::Sequential => cursor,
                _ => slide.start_time,
            };
            cursor += slide.duration;
            (slide.id, start, slide.duration)
        })
        .collect()
}

/// Index of the slide active at `time`
pub fn active_slide_at(slides: &[&Block], time: f64, policy: PastEndPolicy) -> Option<usize> {
    let intervals = slide_intervals(slides);
    if let Some(index) = intervals
        .iter()
        .position(|(_, start, duration)| time >= *start && time < start + duration)
    {
        return Some(index);
    }

    match policy {
        PastEndPolicy::Clear => None,
        PastEndPolicy::HoldLast => {
            let last_end = intervals
                .iter()
                .map(|(_, start, duration)| start + duration)
                .fold(f64::NEG_INFINITY, f64::max);
            if !intervals.is_empty() && time >= last_end {
                intervals
                    .iter()
                    .enumerate()
                    .max_by(|a, b| (a.1 .1 + a.1 .2).total_cmp(&(b.1 .1 + b.1 .2)))
                    .map(|(index, _)| index)
            } else {
                None
            }
        }
    }
}

/// Tracks which slide is active and reports changes
#[derive(Debug, Clone, Default)]
pub struct SlideNavigator {
    active: Option<(usize, BlockId)>,
    policy: PastEndPolicy,
}

impl SlideNavigator {
    /// Create a navigator with a past-the-end policy
    pub fn new(policy: PastEndPolicy) -> Self {
        Self { active: None, policy }
    }

    /// Active slide index, in slide order
    pub fn active_index(&self) -> Option<usize> {
        self.active.map(|(index, _)| index)
    }

    /// Active slide block
    pub fn active_block(&self) -> Option<BlockId> {
        self.active.map(|(_, id)| id)
    }

    /// Recompute the active slide; returns the event if it changed
    pub fn observe(&mut self, slides: &[&Block], time: f64) -> Option<TimelineEvent> {
        let next = active_slide_at(slides, time, self.policy).map(|index| (index, slides[index].id));
        if next == self.active {
            return None;
        }

        self.active = next;
        match next {
            Some((index, block)) => {
                tracing::debug!("Slide {} active at {:.3}s", index, time);
                Some(TimelineEvent::SlideActivated { index, block })
            }
            None => Some(TimelineEvent::SlideCleared),
        }
    }
}

impl TimeObserver for SlideNavigator {
    fn on_time(&mut self, time: f64, store: &BlockStore, events: &mut Vec<TimelineEvent>) {
        if let Some(event) = self.observe(&store.slides(), time) {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_slides() -> Vec<Block> {
        vec![
            Block::slide("a.png", 5.0).at(0.0),
            Block::slide("b.png", 5.0).at(5.0),
            Block::slide("c.png", 5.0).at(10.0),
        ]
    }

    #[test]
    fn test_active_slide_lookup() {
        let blocks = explicit_slides();
        let slides: Vec<&Block> = blocks.iter().collect();
        assert_eq!(active_slide_at(&slides, 7.0, PastEndPolicy::Clear), Some(1));
        assert_eq!(active_slide_at(&slides, 0.0, PastEndPolicy::Clear), Some(0));
        assert_eq!(active_slide_at(&slides, 10.0, PastEndPolicy::Clear), Some(2));
        assert_eq!(active_slide_at(&slides, 15.0, PastEndPolicy::Clear), None);
        assert_eq!(active_slide_at(&slides, 15.0, PastEndPolicy::HoldLast), Some(2));
        assert_eq!(active_slide_at(&[], 1.0, PastEndPolicy::HoldLast), None);
    }

    #[test]
    fn test_sequential_fallback() {
        // sequential slides ignore a stale start_time
        let blocks = vec![
            Block::slide("a.png", 2.0),
            Block::slide("b.png", 3.0),
            Block::slide("c.png", 4.0),
        ];
        let slides: Vec<&Block> = blocks.iter().collect();
        let intervals = slide_intervals(&slides);
        assert_eq!(intervals[1].1, 2.0);
        assert_eq!(intervals[2].1, 5.0);
        assert_eq!(active_slide_at(&slides, 4.0, PastEndPolicy::Clear), Some(1));
    }

    #[test]
    fn test_gap_between_slides() {
        let blocks = vec![Block::slide("a.png", 2.0).at(0.0), Block::slide("b.png", 2.0).at(5.0)];
        let slides: Vec<&Block> = blocks.iter().collect();
        assert_eq!(active_slide_at(&slides, 3.0, PastEndPolicy::HoldLast), None);
    }

    #[test]
    fn test_navigator_emits_changes_only() {
        let blocks = explicit_slides();
        let slides: Vec<&Block> = blocks.iter().collect();
        let mut navigator = SlideNavigator::new(PastEndPolicy::Clear);

        assert_eq!(
            navigator.observe(&slides, 1.0),
            Some(TimelineEvent::SlideActivated { index: 0, block: blocks[0].id })
        );
        assert_eq!(navigator.observe(&slides, 2.0), None);
        assert_eq!(
            navigator.observe(&slides, 7.0),
            Some(TimelineEvent::SlideActivated { index: 1, block: blocks[1].id })
        );
        assert_eq!(navigator.observe(&slides, 16.0), Some(TimelineEvent::SlideCleared));
        assert_eq!(navigator.active_index(), None);
    }

    #[test]
    fn test_navigator_holds_last() {
        let blocks = explicit_slides();
        let slides: Vec<&Block> = blocks.iter().collect();
        let mut navigator = SlideNavigator::new(PastEndPolicy::HoldLast);
        navigator.observe(&slides, 12.0);
        assert_eq!(navigator.observe(&slides, 20.0), None);
        assert_eq!(navigator.active_index(), Some(2));
        assert_eq!(navigator.active_block(), Some(blocks[2].id));
    }
}
