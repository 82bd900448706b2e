use glam::DVec2;
use three_d::egui::{Color32, Context, LayerId, Pos2, Shape, Stroke, pos2};

use super::color32;
use crate::gfx::scene::Scene;

const TRAIL_WIDTH: f32 = 1.0;
const HOVER_RING_WIDTH: f32 = 1.5;
const HOVER_RING_GAP: f32 = 4.0;

/// Projected discs can get enormous right next to a body. egui only needs
/// enough to cover the window.
const MAX_PAINTED_RADIUS: f64 = 1e5;

#[inline]
fn to_pos(point: DVec2) -> Pos2 {
    pos2(point.x as f32, point.y as f32)
}

/// Paints trails, then bodies far to near, underneath every egui window.
pub(super) fn paint_scene(ctx: &Context, scene: &Scene) {
    let painter = ctx.layer_painter(LayerId::background());

    for stroke in &scene.trails {
        let points = stroke.points.iter().copied().map(to_pos).collect();
        painter.add(Shape::line(
            points,
            Stroke::new(TRAIL_WIDTH, color32(stroke.color)),
        ));
    }

    for disc in &scene.bodies {
        let center = to_pos(disc.center);
        let radius = disc.radius.min(MAX_PAINTED_RADIUS) as f32;
        painter.circle_filled(center, radius, color32(disc.color));

        if disc.hovered {
            painter.circle_stroke(
                center,
                radius + HOVER_RING_GAP,
                Stroke::new(HOVER_RING_WIDTH, Color32::WHITE),
            );
        }
    }
}
