use std::cmp::Reverse;

use glam::{DVec2, DVec3};
use ordered_float::OrderedFloat;

use crate::camera::CameraView;

pub const DEFAULT_FOV_DEGREES: f64 = 60.0;

/// A point in camera space, mapped onto the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Pixels from the top-left corner, y growing downward.
    pub screen: DVec2,
    /// Distance along the view direction. Painter's sort key.
    pub depth: f64,
    /// Pixels per meter at this depth.
    pub scale: f64,
}

impl Projection {
    pub fn apparent_radius(&self, radius: f64) -> f64 {
        radius * self.scale
    }
}

/// Pinhole perspective projection onto a `width` by `height` viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    width: f64,
    height: f64,
    /// Vertical field of view, in radians.
    fov: f64,
    focal_length: f64,
}

impl Projector {
    pub fn new(width: f64, height: f64, fov: f64) -> Self {
        let mut projector = Self {
            width: 1.0,
            height: 1.0,
            fov,
            focal_length: 1.0,
        };
        projector.resize(width, height);
        projector
    }

    /// Updates the viewport size, in logical pixels.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.focal_length = (self.height / 2.0) / (self.fov / 2.0).tan();
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Returns `None` for points on or behind the camera plane.
    pub fn project(&self, view: &CameraView, point: DVec3) -> Option<Projection> {
        let relative = point - view.position;
        let basis = &view.basis;
        let x = relative.dot(basis.right);
        let y = relative.dot(basis.up);
        let z = relative.dot(basis.forward);

        if !(z > 0.0) {
            return None;
        }

        let scale = self.focal_length / z;
        let screen = DVec2::new(
            x * scale + self.width / 2.0,
            -y * scale + self.height / 2.0,
        );
        if !screen.is_finite() {
            return None;
        }

        Some(Projection {
            screen,
            depth: z,
            scale,
        })
    }

    /// Whether a screen point lies within the viewport grown by `margin`
    /// pixels on every side.
    pub fn is_on_screen(&self, screen: DVec2, margin: f64) -> bool {
        (-margin..=self.width + margin).contains(&screen.x)
            && (-margin..=self.height + margin).contains(&screen.y)
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(1280.0, 720.0, DEFAULT_FOV_DEGREES.to_radians())
    }
}

/// Orders items farthest first, so nearer ones are painted over them.
pub fn sort_far_to_near<T>(items: &mut [T], depth: impl Fn(&T) -> f64) {
    items.sort_by_key(|item| Reverse(OrderedFloat(depth(item))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraBasis;

    fn view() -> CameraView {
        CameraView {
            position: DVec3::ZERO,
            basis: CameraBasis::default(),
        }
    }

    #[test]
    fn center_and_axes() {
        let projector = Projector::new(800.0, 600.0, 90f64.to_radians());
        assert!((projector.focal_length() - 300.0).abs() < 1e-9);

        let p = projector.project(&view(), DVec3::new(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(p.screen, DVec2::new(400.0, 300.0));
        assert_eq!(p.depth, 10.0);

        // Up is up on screen, and the camera's right is -X.
        let p = projector.project(&view(), DVec3::new(-1.0, 1.0, 10.0)).unwrap();
        assert!(p.screen.x > 400.0);
        assert!(p.screen.y < 300.0);
        assert!((p.screen - DVec2::new(430.0, 270.0)).length() < 1e-9);
    }

    #[test]
    fn behind_camera_is_invisible() {
        let projector = Projector::default();
        assert!(projector.project(&view(), DVec3::new(0.0, 0.0, -1.0)).is_none());
        assert!(projector.project(&view(), DVec3::new(5.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn apparent_radius_shrinks_with_depth() {
        let projector = Projector::default();
        let near = projector.project(&view(), DVec3::Z * 10.0).unwrap();
        let far = projector.project(&view(), DVec3::Z * 20.0).unwrap();
        assert!((near.apparent_radius(1.0) - 2.0 * far.apparent_radius(1.0)).abs() < 1e-9);
    }

    #[test]
    fn sorts_descending_depth() {
        let mut depths = vec![3.0, 10.0, 1.0, 7.0];
        sort_far_to_near(&mut depths, |d| *d);
        assert_eq!(depths, [10.0, 7.0, 3.0, 1.0]);
    }

    #[test]
    fn margin_check() {
        let projector = Projector::new(100.0, 100.0, 1.0);
        assert!(projector.is_on_screen(DVec2::new(-50.0, 150.0), 100.0));
        assert!(!projector.is_on_screen(DVec2::new(-101.0, 50.0), 100.0));
    }
}
