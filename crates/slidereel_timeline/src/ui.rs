// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline panel rendering.
//!
//! Features:
//! - Toolbar with playback and zoom controls
//! - Time ruler with a draggable playhead
//! - One row per track with draggable, stretchable blocks
//! - Fade ramps and loop markers on media blocks
//! - Keyboard shortcuts (Space, Home, End, Delete, Escape, +/-)

use crate::block::{Block, BlockContent, BlockId, BlockKind};
use crate::interaction::StretchEdge;
use crate::sync::SyncStatus;
use crate::timeline::Timeline;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};

const TRACK_HEIGHT: f32 = 40.0;
const TRACK_HEADER_WIDTH: f32 = 120.0;
const RULER_HEIGHT: f32 = 24.0;
const EDGE_HANDLE_WIDTH: f32 = 6.0;
const PLAYHEAD_WIDTH: f32 = 2.0;
const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(255, 100, 100);

/// Which part of a block a pointer x falls on
pub fn edge_at(block_rect: Rect, x: f32) -> Option<StretchEdge> {
    let handle = EDGE_HANDLE_WIDTH.min(block_rect.width() / 3.0);
    if x < block_rect.min.x || x > block_rect.max.x {
        None
    } else if x <= block_rect.min.x + handle {
        Some(StretchEdge::Left)
    } else if x >= block_rect.max.x - handle {
        Some(StretchEdge::Right)
    } else {
        None
    }
}

fn kind_color(kind: BlockKind) -> Color32 {
    let [r, g, b] = kind.color();
    Color32::from_rgb(r, g, b)
}

/// What a block row needs to be painted and hit-tested
struct BlockLayout {
    id: BlockId,
    kind: BlockKind,
    rect: Rect,
    label: String,
    selected: bool,
    unavailable: bool,
    /// x positions where a looped source restarts
    loop_marks: Vec<f32>,
    /// Fade in/out widths in pixels
    fades: Option<(f32, f32)>,
}

/// Timeline editor panel
#[derive(Debug, Clone)]
pub struct TimelinePanel {
    /// Horizontal scroll (seconds at the left edge of the content area)
    scroll_offset: f64,
    /// Keep the playhead visible while playing
    pub auto_scroll: bool,
    /// Playhead is being dragged in the ruler
    scrubbing: bool,
}

impl TimelinePanel {
    /// Create a panel scrolled to the start
    pub fn new() -> Self {
        Self {
            scroll_offset: 0.0,
            auto_scroll: true,
            scrubbing: false,
        }
    }

    /// Convert time to an absolute x position
    fn time_to_x(&self, timeline: &Timeline, content_left: f32, time: f64) -> f32 {
        content_left + timeline.time_to_pixels(time - self.scroll_offset) as f32
    }

    /// Convert an absolute x position to time
    fn x_to_time(&self, timeline: &Timeline, content_left: f32, x: f32) -> f64 {
        timeline.pixels_to_time(f64::from(x - content_left)) + self.scroll_offset
    }

    /// Render the full panel
    pub fn ui(&mut self, ui: &mut egui::Ui, timeline: &mut Timeline) {
        self.render_toolbar(ui, timeline);
        ui.separator();

        let rect = ui.available_rect_before_wrap();
        let ruler_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), RULER_HEIGHT));
        let tracks_rect = Rect::from_min_max(Pos2::new(rect.min.x, ruler_rect.max.y), rect.max);
        let content_left = rect.min.x + TRACK_HEADER_WIDTH;

        self.render_ruler(ui, ruler_rect, content_left, timeline);
        self.render_tracks(ui, tracks_rect, content_left, timeline);
        self.handle_input(ui, rect, timeline);

        if self.auto_scroll && timeline.is_playing() {
            let visible = timeline.pixels_to_time(f64::from(rect.max.x - content_left));
            let time = timeline.current_time();
            if time > self.scroll_offset + visible || time < self.scroll_offset {
                self.scroll_offset = (time - visible * 0.2).max(0.0);
            }
        }
    }

    /// Render toolbar with playback and zoom controls
    fn render_toolbar(&mut self, ui: &mut egui::Ui, timeline: &mut Timeline) {
        ui.horizontal(|ui| {
            let play_icon = if timeline.is_playing() { "⏸" } else { "▶" };
            if ui.button(play_icon).on_hover_text("Play/Pause (Space)").clicked() {
                timeline.toggle_playback();
            }
            if ui.button("⏮").on_hover_text("Go to Start").clicked() {
                timeline.on_seek(0.0);
            }

            ui.separator();
            ui.monospace(format!(
                "{} / {}",
                timeline.format_time(timeline.current_time()),
                timeline.format_time(timeline.total_duration())
            ));

            ui.separator();
            ui.label("Zoom:");
            if ui.button("-").clicked() {
                timeline.zoom_out();
            }
            ui.monospace(format!("{:.2}x", timeline.zoom()));
            if ui.button("+").clicked() {
                timeline.zoom_in();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} blocks", timeline.store().len()));
            });
        });
    }

    /// Render the time ruler and handle playhead scrubbing
    fn render_ruler(&mut self, ui: &mut egui::Ui, rect: Rect, content_left: f32, timeline: &mut Timeline) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        let visible_end = self.x_to_time(timeline, content_left, rect.max.x);
        for tick in timeline.scale().ruler_ticks(self.scroll_offset, visible_end) {
            let x = self.time_to_x(timeline, content_left, tick.time);
            let (height, color) = if tick.is_major {
                (12.0, Color32::from_gray(180))
            } else {
                (6.0, Color32::from_gray(100))
            };
            painter.line_segment(
                [Pos2::new(x, rect.max.y - height), Pos2::new(x, rect.max.y)],
                Stroke::new(1.0, color),
            );
            if tick.is_major {
                painter.text(
                    Pos2::new(x + 2.0, rect.min.y + 2.0),
                    egui::Align2::LEFT_TOP,
                    timeline.format_time(tick.time),
                    egui::FontId::monospace(10.0),
                    Color32::from_gray(180),
                );
            }
        }

        let playhead_x = self.time_to_x(timeline, content_left, timeline.current_time());
        if playhead_x >= content_left && playhead_x <= rect.max.x {
            let triangle = vec![
                Pos2::new(playhead_x, rect.max.y),
                Pos2::new(playhead_x - 6.0, rect.max.y - 8.0),
                Pos2::new(playhead_x + 6.0, rect.max.y - 8.0),
            ];
            painter.add(egui::Shape::convex_polygon(triangle, PLAYHEAD_COLOR, Stroke::NONE));
        }

        let response = ui.interact(rect, ui.id().with("timeline_ruler"), Sense::click_and_drag());
        if response.drag_started() || response.clicked() {
            self.scrubbing = true;
        }
        if self.scrubbing && (response.dragged() || response.clicked()) {
            if let Some(pos) = response.interact_pointer_pos() {
                timeline.on_seek(self.x_to_time(timeline, content_left, pos.x));
            }
        }
        if response.drag_stopped() || response.clicked() {
            self.scrubbing = false;
        }
    }

    /// Render tracks with their blocks and route pointer gestures
    fn render_tracks(&mut self, ui: &mut egui::Ui, rect: Rect, content_left: f32, timeline: &mut Timeline) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));

        // clicks on empty space clear the selection
        let background = ui.interact(rect, ui.id().with("timeline_tracks"), Sense::click());
        if background.clicked() {
            timeline.on_block_select(None);
        }

        let mut layouts = Vec::new();
        for (row, track) in timeline.tracks().iter().enumerate() {
            let row_rect = Rect::from_min_size(
                Pos2::new(rect.min.x, rect.min.y + row as f32 * TRACK_HEIGHT),
                Vec2::new(rect.width(), TRACK_HEIGHT),
            );
            if row_rect.min.y > rect.max.y {
                break;
            }

            let bg = if row % 2 == 0 {
                Color32::from_gray(32)
            } else {
                Color32::from_gray(28)
            };
            painter.rect_filled(row_rect, 0.0, bg);

            let header = Rect::from_min_size(row_rect.min, Vec2::new(TRACK_HEADER_WIDTH, TRACK_HEIGHT));
            painter.rect_filled(header, 0.0, Color32::from_gray(35));
            painter.rect_filled(
                Rect::from_min_size(header.min, Vec2::new(4.0, TRACK_HEIGHT)),
                0.0,
                kind_color(track.kind()),
            );
            painter.text(
                Pos2::new(header.min.x + 10.0, header.center().y),
                egui::Align2::LEFT_CENTER,
                track.name(),
                egui::FontId::proportional(12.0),
                Color32::from_gray(200),
            );
            painter.line_segment(
                [Pos2::new(row_rect.min.x, row_rect.max.y), Pos2::new(row_rect.max.x, row_rect.max.y)],
                Stroke::new(1.0, Color32::from_gray(45)),
            );

            for block in track.blocks() {
                layouts.push(self.layout_block(timeline, content_left, row_rect, block));
            }
        }

        let content_rect = Rect::from_min_max(Pos2::new(content_left, rect.min.y), rect.max);
        let content_painter = ui.painter_at(content_rect);
        for layout in &layouts {
            Self::paint_block(&content_painter, layout);
        }

        for layout in &layouts {
            if !content_rect.intersects(layout.rect) {
                continue;
            }
            self.route_block_input(ui, layout, timeline);
        }

        let playhead_x = self.time_to_x(timeline, content_left, timeline.current_time());
        if playhead_x >= content_left && playhead_x <= rect.max.x {
            painter.line_segment(
                [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
                Stroke::new(PLAYHEAD_WIDTH, PLAYHEAD_COLOR),
            );
        }
    }

    fn layout_block(&self, timeline: &Timeline, content_left: f32, row: Rect, block: &Block) -> BlockLayout {
        let x0 = self.time_to_x(timeline, content_left, block.start_time);
        let x1 = self.time_to_x(timeline, content_left, block.end_time());
        let rect = Rect::from_min_max(Pos2::new(x0, row.min.y + 4.0), Pos2::new(x1, row.max.y - 4.0));

        let mut loop_marks = Vec::new();
        if let Some(original) = block.original_duration().filter(|d| *d > 0.0) {
            let mut restart = original;
            while restart < block.duration {
                loop_marks.push(self.time_to_x(timeline, content_left, block.start_time + restart));
                restart += original;
            }
        }

        let fades = match &block.content {
            BlockContent::Audio(audio) => Some((
                timeline.time_to_pixels(audio.fade_in) as f32,
                timeline.time_to_pixels(audio.fade_out) as f32,
            )),
            _ => None,
        };

        BlockLayout {
            id: block.id,
            kind: block.kind(),
            rect,
            label: block.display_name().to_string(),
            selected: timeline.selected_block() == Some(block.id),
            unavailable: timeline
                .synchronizer(block.id)
                .is_some_and(|s| s.status() == SyncStatus::Unavailable),
            loop_marks,
            fades,
        }
    }

    fn paint_block(painter: &egui::Painter, layout: &BlockLayout) {
        let rect = layout.rect;
        let base = kind_color(layout.kind);
        let fill = if layout.unavailable {
            Color32::from_gray(70)
        } else {
            base.gamma_multiply(0.7)
        };
        painter.rect_filled(rect, 3.0, fill);

        if let Some((fade_in, fade_out)) = layout.fades {
            let shade = Color32::from_black_alpha(90);
            if fade_in > 0.0 {
                let ramp = vec![
                    rect.left_top(),
                    Pos2::new(rect.min.x + fade_in.min(rect.width()), rect.min.y),
                    rect.left_bottom(),
                ];
                painter.add(egui::Shape::convex_polygon(ramp, shade, Stroke::NONE));
            }
            if fade_out > 0.0 {
                let ramp = vec![
                    Pos2::new(rect.max.x - fade_out.min(rect.width()), rect.min.y),
                    rect.right_top(),
                    rect.right_bottom(),
                ];
                painter.add(egui::Shape::convex_polygon(ramp, shade, Stroke::NONE));
            }
        }

        for x in &layout.loop_marks {
            painter.line_segment(
                [Pos2::new(*x, rect.min.y), Pos2::new(*x, rect.max.y)],
                Stroke::new(1.0, Color32::from_white_alpha(120)),
            );
        }

        let stroke = if layout.selected {
            Stroke::new(2.0, Color32::WHITE)
        } else if layout.unavailable {
            Stroke::new(1.0, Color32::from_rgb(220, 80, 80))
        } else {
            Stroke::new(1.0, base)
        };
        painter.rect_stroke(rect, 3.0, stroke);

        painter.text(
            Pos2::new(rect.min.x + EDGE_HANDLE_WIDTH + 2.0, rect.center().y),
            egui::Align2::LEFT_CENTER,
            &layout.label,
            egui::FontId::proportional(11.0),
            Color32::WHITE,
        );
    }

    /// Body drags move the block; drags starting on an edge stretch it
    fn route_block_input(&mut self, ui: &mut egui::Ui, layout: &BlockLayout, timeline: &mut Timeline) {
        let id = layout.id;
        let rect = layout.rect;
        let response = ui.interact(rect, ui.id().with(("block", id.0)), Sense::click_and_drag());
        let response = match response.hover_pos().and_then(|pos| edge_at(rect, pos.x)) {
            Some(_) => response.on_hover_cursor(egui::CursorIcon::ResizeHorizontal),
            None => response,
        };

        if response.clicked() {
            timeline.on_block_select(Some(id));
        }
        if response.drag_stopped() {
            timeline.pointer_up();
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let x = f64::from(pos.x);
        if response.drag_started() {
            // the press position decides the gesture
            let press_x = ui
                .input(|input| input.pointer.press_origin())
                .map_or(pos.x, |origin| origin.x);
            match edge_at(rect, press_x) {
                Some(edge) => timeline.pointer_down_stretch(id, edge, f64::from(press_x)),
                None => timeline.pointer_down_drag(id, f64::from(press_x)),
            };
            timeline.pointer_move(x);
        } else if response.dragged() {
            timeline.pointer_move(x);
        }
    }

    /// Handle keyboard shortcuts and wheel zoom/scroll.
    ///
    /// Only while the pointer is over the panel, so keys typed into other
    /// widgets never reach the timeline.
    fn handle_input(&mut self, ui: &mut egui::Ui, rect: Rect, timeline: &mut Timeline) {
        if !ui.rect_contains_pointer(rect) {
            return;
        }

        let (space, home, end, delete, escape, plus, minus, scroll, ctrl) = ui.input(|input| {
            (
                input.key_pressed(egui::Key::Space),
                input.key_pressed(egui::Key::Home),
                input.key_pressed(egui::Key::End),
                input.key_pressed(egui::Key::Delete),
                input.key_pressed(egui::Key::Escape),
                input.key_pressed(egui::Key::Plus),
                input.key_pressed(egui::Key::Minus),
                input.smooth_scroll_delta,
                input.modifiers.ctrl,
            )
        });

        if space {
            timeline.toggle_playback();
        }
        if home {
            timeline.on_seek(0.0);
        }
        if end {
            timeline.on_seek(timeline.total_duration());
        }
        if delete {
            if let Some(id) = timeline.selected_block() {
                if let Err(e) = timeline.remove_block(id) {
                    tracing::debug!("Delete ignored: {}", e);
                }
            }
        }
        if escape {
            timeline.pointer_cancel();
        }
        if plus || (ctrl && scroll.y > 0.0) {
            timeline.zoom_in();
        }
        if minus || (ctrl && scroll.y < 0.0) {
            timeline.zoom_out();
        }
        if !ctrl && scroll.x != 0.0 {
            self.scroll_offset = (self.scroll_offset - timeline.pixels_to_time(f64::from(scroll.x))).max(0.0);
        }
    }
}

impl Default for TimelinePanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::media::SimulatedBackend;

    #[test]
    fn test_edge_hit_zones() {
        let rect = Rect::from_min_max(Pos2::new(100.0, 0.0), Pos2::new(200.0, 30.0));
        assert_eq!(edge_at(rect, 102.0), Some(StretchEdge::Left));
        assert_eq!(edge_at(rect, 198.0), Some(StretchEdge::Right));
        assert_eq!(edge_at(rect, 150.0), None);
        assert_eq!(edge_at(rect, 50.0), None);

        // narrow blocks keep a draggable middle
        let narrow = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(9.0, 30.0));
        assert_eq!(edge_at(narrow, 4.5), None);
    }

    #[test]
    fn test_panel_renders_headless() {
        let backend = SimulatedBackend::new()
            .with_source("music.mp3", 12.0)
            .with_source("clip.mp4", 3.0);
        let mut timeline = Timeline::new(TimelineConfig::default(), Box::new(backend)).unwrap();
        timeline.add_slide("a.png", 5.0).unwrap();
        let music = timeline.import_media(BlockKind::Audio, "music.mp3", 0.0).unwrap();
        timeline
            .on_block_update(music, &crate::block::BlockUpdate::fades(1.0, 2.0))
            .unwrap();
        let clip = timeline.import_media(BlockKind::Video, "clip.mp4", 1.0).unwrap();
        timeline
            .on_block_update(clip, &crate::block::BlockUpdate::duration(7.0))
            .unwrap();

        let mut panel = TimelinePanel::new();
        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| panel.ui(ui, &mut timeline));
            });
        }
        assert_eq!(timeline.store().len(), 3);
        assert_eq!(timeline.current_time(), 0.0);
    }

    fn key_press(key: egui::Key) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_shortcuts_ignored_without_pointer() {
        let backend = SimulatedBackend::new().with_source("music.mp3", 12.0);
        let mut timeline = Timeline::new(TimelineConfig::default(), Box::new(backend)).unwrap();
        let music = timeline.import_media(BlockKind::Audio, "music.mp3", 0.0).unwrap();
        timeline.on_block_select(Some(music));
        timeline.play();

        let mut panel = TimelinePanel::new();
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            events: vec![key_press(egui::Key::Delete), key_press(egui::Key::Space)],
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| panel.ui(ui, &mut timeline));
        });

        assert!(timeline.block(music).is_some());
        assert_eq!(timeline.selected_block(), Some(music));
        assert!(timeline.is_playing());
    }
}
