use glam::DVec2;

use super::projection::Projector;
use crate::camera::CameraView;
use crate::control::HoverSource;
use crate::sim::universe::{Id, Universe};

/// Bodies smaller than this on screen are still this easy to hover.
pub const MIN_PICK_RADIUS: f64 = 10.0;

/// Finds the body under `pointer`, preferring the one nearest the camera
/// when several overlap.
pub fn pick(
    universe: &Universe,
    view: &CameraView,
    projector: &Projector,
    pointer: DVec2,
    margin: f64,
) -> Option<Id> {
    universe
        .get_bodies()
        .iter()
        .filter_map(|(&id, body)| {
            let projection = projector.project(view, body.position)?;
            if !projector.is_on_screen(projection.screen, margin) {
                return None;
            }
            let radius = projection.apparent_radius(body.radius).max(MIN_PICK_RADIUS);
            (projection.screen.distance(pointer) <= radius).then_some((id, projection.depth))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

/// Tracks what the mouse pointer is over from frame to frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerPicker {
    pointer: Option<DVec2>,
    hovered: Option<Id>,
}

impl PointerPicker {
    /// `None` when the pointer has left the window.
    pub fn set_pointer(&mut self, pointer: Option<DVec2>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn update(
        &mut self,
        universe: &Universe,
        view: &CameraView,
        projector: &Projector,
        margin: f64,
    ) {
        self.hovered = self
            .pointer
            .and_then(|pointer| pick(universe, view, projector, pointer, margin));
    }
}

impl HoverSource for PointerPicker {
    fn current_hover_target(&self) -> Option<Id> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraBasis;
    use crate::sim::body::Body;
    use glam::DVec3;

    fn universe() -> Universe {
        let mut universe = Universe::new(None);
        for (name, z, radius) in [("far", 100.0, 5.0), ("near", 50.0, 0.01), ("side", 50.0, 1.0)] {
            let x = if name == "side" { -20.0 } else { 0.0 };
            universe
                .add_body(Body::new(
                    name.into(),
                    1.0,
                    DVec3::new(x, 0.0, z),
                    DVec3::ZERO,
                    radius,
                ))
                .unwrap();
        }
        universe
    }

    fn setup() -> (CameraView, Projector) {
        let view = CameraView {
            position: DVec3::ZERO,
            basis: CameraBasis::default(),
        };
        (view, Projector::new(800.0, 600.0, 90f64.to_radians()))
    }

    #[test]
    fn nearest_wins() {
        let (view, projector) = setup();
        let center = DVec2::new(400.0, 300.0);
        // Both "far" and "near" cover the center; "near" is closer.
        assert_eq!(pick(&universe(), &view, &projector, center, 100.0), Some(1));
    }

    #[test]
    fn small_bodies_get_a_minimum_radius() {
        let (view, projector) = setup();
        // "side" is at x = -20, z = 50, i.e. 120 px right of center.
        let near_side = DVec2::new(520.0 + MIN_PICK_RADIUS - 1.0, 300.0);
        assert_eq!(pick(&universe(), &view, &projector, near_side, 100.0), Some(2));

        let miss = DVec2::new(700.0, 100.0);
        assert_eq!(pick(&universe(), &view, &projector, miss, 100.0), None);
    }

    #[test]
    fn picker_reports_hover() {
        let (view, projector) = setup();
        let mut picker = PointerPicker::default();
        picker.update(&universe(), &view, &projector, 100.0);
        assert_eq!(picker.current_hover_target(), None);

        picker.set_pointer(Some(DVec2::new(400.0, 300.0)));
        picker.update(&universe(), &view, &projector, 100.0);
        assert_eq!(picker.current_hover_target(), Some(1));
    }
}
