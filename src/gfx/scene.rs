//! Turns the simulation into flat 2D primitives for the painter.

use glam::{DVec2, DVec3};
use three_d::Srgba;

use super::projection::{Projector, sort_far_to_near};
use crate::camera::CameraView;
use crate::sim::{Simulation, universe::Id};

/// How far off-screen, in pixels, a point may be and still be drawn.
pub const OFFSCREEN_MARGIN: f64 = 100.0;

/// Distant bodies are never drawn smaller than this, in pixels.
pub const MIN_BODY_SCREEN_RADIUS: f64 = 1.5;

/// One unbroken run of a trail.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailStroke {
    pub points: Vec<DVec2>,
    pub color: Srgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDisc {
    pub id: Id,
    pub center: DVec2,
    pub radius: f64,
    pub depth: f64,
    pub color: Srgba,
    pub hovered: bool,
}

/// Everything to paint this frame. Trails go underneath; bodies are
/// ordered farthest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub trails: Vec<TrailStroke>,
    pub bodies: Vec<BodyDisc>,
}

impl Scene {
    pub fn build(
        sim: &Simulation,
        view: &CameraView,
        projector: &Projector,
        show_trails: bool,
        hovered: Option<Id>,
    ) -> Self {
        let mut scene = Self::default();

        for (&id, body) in sim.universe.get_bodies() {
            if show_trails && let Some(trail) = sim.trails.trail(id) {
                split_strokes(
                    trail.render_path(body.position),
                    view,
                    projector,
                    body.color,
                    &mut scene.trails,
                );
            }

            let Some(projection) = projector.project(view, body.position) else {
                continue;
            };
            if !projector.is_on_screen(projection.screen, OFFSCREEN_MARGIN) {
                continue;
            }

            scene.bodies.push(BodyDisc {
                id,
                center: projection.screen,
                radius: projection
                    .apparent_radius(body.radius)
                    .max(MIN_BODY_SCREEN_RADIUS),
                depth: projection.depth,
                color: body.color,
                hovered: hovered == Some(id),
            });
        }

        sort_far_to_near(&mut scene.bodies, |disc| disc.depth);
        scene
    }
}

/// Projects a path, breaking it wherever a point is behind the camera or
/// too far off-screen.
fn split_strokes(
    path: impl Iterator<Item = DVec3>,
    view: &CameraView,
    projector: &Projector,
    color: Srgba,
    out: &mut Vec<TrailStroke>,
) {
    let mut current = Vec::new();

    for point in path {
        let visible = projector
            .project(view, point)
            .map(|p| p.screen)
            .filter(|&screen| projector.is_on_screen(screen, OFFSCREEN_MARGIN));

        match visible {
            Some(screen) => current.push(screen),
            None => flush(&mut current, color, out),
        }
    }
    flush(&mut current, color, out);
}

fn flush(current: &mut Vec<DVec2>, color: Srgba, out: &mut Vec<TrailStroke>) {
    if current.len() > 1 {
        out.push(TrailStroke {
            points: std::mem::take(current),
            color,
        });
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraBasis;
    use crate::sim::{SimulationParams, body::Body, universe::Universe};

    fn view() -> CameraView {
        CameraView {
            position: DVec3::ZERO,
            basis: CameraBasis::default(),
        }
    }

    fn projector() -> Projector {
        Projector::new(800.0, 600.0, 90f64.to_radians())
    }

    fn sim_with(bodies: &[(&str, DVec3)]) -> Simulation {
        let mut universe = Universe::new(Some(0.0));
        for &(name, position) in bodies {
            universe
                .add_body(Body::new(name.into(), 1.0, position, DVec3::ZERO, 1.0))
                .unwrap();
        }
        Simulation::new(
            universe,
            SimulationParams {
                trail_distance: 1.0,
                ..Default::default()
            },
        )
    }

    #[test]
    fn bodies_are_sorted_and_culled() {
        let sim = sim_with(&[
            ("near", DVec3::new(0.0, 0.0, 10.0)),
            ("behind", DVec3::new(0.0, 0.0, -10.0)),
            ("far", DVec3::new(1.0, 0.0, 100.0)),
            ("offscreen", DVec3::new(-100.0, 0.0, 10.0)),
        ]);
        let scene = Scene::build(&sim, &view(), &projector(), true, Some(2));

        let ids: Vec<_> = scene.bodies.iter().map(|b| b.id).collect();
        assert_eq!(ids, [2, 0]);
        assert!(scene.bodies[0].hovered);
        assert!(!scene.bodies[1].hovered);
        assert!(scene.bodies[0].radius >= MIN_BODY_SCREEN_RADIUS);
    }

    #[test]
    fn trails_break_behind_the_camera() {
        let mut sim = sim_with(&[("mover", DVec3::new(0.0, 0.0, 10.0))]);
        let id = 0;
        // Walk the body through the camera plane and back out in front.
        for z in [8.0, 6.0, -6.0, -8.0] {
            sim.universe.get_body_mut(id).unwrap().position.z = z;
            sim.trails.observe(&sim.universe);
        }
        sim.universe.get_body_mut(id).unwrap().position = DVec3::new(0.0, 0.0, 12.0);
        sim.trails.observe(&sim.universe);

        let scene = Scene::build(&sim, &view(), &projector(), true, None);
        assert!(scene.trails.len() >= 2);
        assert!(scene.trails.iter().all(|s| s.points.len() > 1));

        let hidden = Scene::build(&sim, &view(), &projector(), false, None);
        assert!(hidden.trails.is_empty());
    }
}
