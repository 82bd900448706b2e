//! The camera controller: a small state machine over three modes.
//!
//! * Normal: free flight with yaw about the world up axis.
//! * Lock: orbits a body at a fixed radius, always facing it.
//! * Planetary: stands on a body's surface and walks around it.

use std::f64::consts::FRAC_PI_2;

use glam::{DQuat, DVec2, DVec3};
use strum_macros::IntoStaticStr;

use crate::camera::{CameraBasis, CameraView, WORLD_UP};
use crate::sim::universe::{Id, Universe};

pub const DEFAULT_POSITION: DVec3 = DVec3::new(0.0, 0.0, -11e11);

/// Free-flight speed at a speed multiplier of 1, in meters per second.
pub const MOVE_SPEED: f64 = 6e11;

/// Radians per second.
pub const ROTATION_SPEED: f64 = 1.2;

/// Angular speed around a locked body, in radians per second.
pub const LOCK_ORBIT_SPEED: f64 = 1.0;

/// Angular speed over a body's surface, in radians per second.
pub const PLANETARY_WALK_SPEED: f64 = 0.5;

/// Exponential rate at which Q/E change the lock radius, per second.
pub const ZOOM_SPEED: f64 = 1.5;

/// How quickly the lock radius approaches the desired one, per second.
const ZOOM_APPROACH_SPEED: f64 = 30.0;

pub const MIN_SPEED_MULTIPLIER: f64 = 0.1;
pub const MAX_SPEED_MULTIPLIER: f64 = 10.0;
const SPEED_MULTIPLIER_STEP: f64 = 1.5;

/// A locked camera never gets closer than this many body radii. Entering a
/// lock from closer than that starts at this distance instead.
const MIN_LOCK_RADIUS_FACTOR: f64 = 1.1;
pub const MAX_LOCK_RADIUS: f64 = 1e14;

const BASIS_TOLERANCE: f64 = 1e-9;

/// Supplies the body currently under the pointer, if any.
pub trait HoverSource {
    fn current_hover_target(&self) -> Option<Id>;
}

impl HoverSource for Option<Id> {
    fn current_hover_target(&self) -> Option<Id> {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, IntoStaticStr)]
pub enum CameraMode {
    Normal,
    Lock {
        target: Id,
        /// Current distance to the target's center.
        radius: f64,
        /// Where Q/E want the radius to be.
        desired_radius: f64,
        /// Unit vector from the target to the camera.
        direction: DVec3,
    },
    Planetary {
        anchor: Id,
        /// Unit vector from the anchor's center to the camera.
        normal: DVec3,
        /// Unit tangent the camera faces when level.
        heading: DVec3,
        /// Look angle above the local horizon.
        pitch: f64,
    },
}

impl CameraMode {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn target(&self) -> Option<Id> {
        match *self {
            CameraMode::Normal => None,
            CameraMode::Lock { target, .. } => Some(target),
            CameraMode::Planetary { anchor, .. } => Some(anchor),
        }
    }
}

/// Per-frame movement intent, with each component in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    /// x: right, y: up, z: forward.
    pub movement: DVec3,
    /// x: turn right, y: look up.
    pub rotation: DVec2,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    position: DVec3,
    /// Only meaningful in Normal mode; refreshed when returning to it.
    yaw: f64,
    pitch: f64,
    basis: CameraBasis,
    speed_multiplier: f64,
    mode: CameraMode,
}

impl CameraController {
    pub fn new(position: DVec3, yaw: f64, pitch: f64) -> Self {
        let pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        Self {
            position,
            yaw,
            pitch,
            basis: CameraBasis::from_angles(yaw, pitch),
            speed_multiplier: 1.0,
            mode: CameraMode::Normal,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    #[inline]
    pub fn basis(&self) -> CameraBasis {
        self.basis
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            basis: self.basis,
        }
    }

    /// Yaw and pitch of the current view direction.
    pub fn angles(&self) -> (f64, f64) {
        match self.mode {
            CameraMode::Normal => (self.yaw, self.pitch),
            _ => self.basis.angles(),
        }
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Clamped into [`MIN_SPEED_MULTIPLIER`, `MAX_SPEED_MULTIPLIER`].
    /// NaN is ignored.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        if multiplier.is_nan() {
            return;
        }
        self.speed_multiplier = multiplier.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER);
    }

    pub fn speed_up(&mut self) {
        self.set_speed_multiplier(self.speed_multiplier * SPEED_MULTIPLIER_STEP);
    }

    pub fn slow_down(&mut self) {
        self.set_speed_multiplier(self.speed_multiplier / SPEED_MULTIPLIER_STEP);
    }

    /// Handles the lock key.
    ///
    /// Returns whether the mode changed.
    pub fn toggle_lock(&mut self, hover: &impl HoverSource, universe: &Universe) -> bool {
        let hovered = hover.current_hover_target();
        match self.mode {
            CameraMode::Normal => {
                let Some(id) = hovered else {
                    return false;
                };
                self.enter_lock(id, universe)
            }
            CameraMode::Lock { target, .. } => {
                if hovered == Some(target) {
                    return false;
                }
                self.release();
                true
            }
            CameraMode::Planetary { .. } => false,
        }
    }

    /// Handles the anchor key.
    ///
    /// Returns whether the mode changed.
    pub fn toggle_anchor(&mut self, hover: &impl HoverSource, universe: &Universe) -> bool {
        let hovered = hover.current_hover_target();
        match self.mode {
            CameraMode::Normal => {
                let Some(id) = hovered else {
                    return false;
                };
                self.enter_planetary(id, universe)
            }
            CameraMode::Planetary { anchor, .. } => {
                if hovered == Some(anchor) {
                    return false;
                }
                self.release();
                true
            }
            CameraMode::Lock { .. } => false,
        }
    }

    fn enter_lock(&mut self, id: Id, universe: &Universe) -> bool {
        let Some(body) = universe.get_body(id) else {
            return false;
        };

        let offset = self.position - body.position;
        let radius = offset
            .length()
            .clamp(min_lock_radius(body.radius), MAX_LOCK_RADIUS);
        let direction = offset
            .try_normalize()
            .unwrap_or(-self.basis.forward);

        self.mode = CameraMode::Lock {
            target: id,
            radius,
            desired_radius: radius,
            direction,
        };
        self.position = body.position + direction * radius;
        self.face_towards(body.position);

        tracing::info!("Camera locked onto {}", body.name);
        true
    }

    fn enter_planetary(&mut self, id: Id, universe: &Universe) -> bool {
        let Some(body) = universe.get_body(id) else {
            return false;
        };

        let normal = WORLD_UP;
        let forward = self.basis.forward;
        let heading = tangent_component(forward, normal)
            .or_else(|| tangent_component(self.basis.up, normal))
            .unwrap_or(DVec3::Z);
        let pitch = forward.dot(normal).clamp(-1.0, 1.0).asin();

        self.mode = CameraMode::Planetary {
            anchor: id,
            normal,
            heading,
            pitch,
        };
        self.position = body.position + normal * body.radius;
        self.basis = surface_basis(normal, heading, pitch);

        tracing::info!("Camera anchored to {}", body.name);
        true
    }

    /// Returns to Normal mode where the camera currently is, facing the
    /// same way.
    pub fn release(&mut self) {
        if self.mode == CameraMode::Normal {
            return;
        }

        let (yaw, pitch) = self.basis.angles();
        self.yaw = yaw;
        self.pitch = pitch;
        self.basis = CameraBasis::from_angles(yaw, pitch);
        self.mode = CameraMode::Normal;

        tracing::info!("Camera released");
    }

    fn face_towards(&mut self, point: DVec3) {
        if let Some(basis) = CameraBasis::looking_along(point - self.position, self.basis.up) {
            self.basis = basis;
        }
    }

    /// Applies one frame of input. `dt` is the frame time in seconds.
    pub fn update(&mut self, input: &CameraInput, dt: f64, universe: &Universe) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.mode {
            CameraMode::Normal => self.update_normal(input, dt),
            CameraMode::Lock {
                target,
                radius,
                desired_radius,
                direction,
            } => match universe.get_body(target) {
                Some(body) => self.update_lock(
                    input,
                    dt,
                    target,
                    body.position,
                    body.radius,
                    (radius, desired_radius),
                    direction,
                ),
                None => self.release(),
            },
            CameraMode::Planetary {
                anchor,
                normal,
                heading,
                pitch,
            } => match universe.get_body(anchor) {
                Some(body) => self.update_planetary(
                    input,
                    dt,
                    anchor,
                    (body.position, body.radius),
                    normal,
                    heading,
                    pitch,
                ),
                None => self.release(),
            },
        }

        self.basis = self
            .basis
            .orthonormalized()
            .filter(CameraBasis::is_finite)
            .unwrap_or_else(|| CameraBasis::from_angles(self.yaw, self.pitch));

        debug_assert!(self.basis.is_orthonormal(BASIS_TOLERANCE));
    }

    fn update_normal(&mut self, input: &CameraInput, dt: f64) {
        let turn = ROTATION_SPEED * dt;
        self.yaw -= input.rotation.x * turn;
        self.pitch = (self.pitch + input.rotation.y * turn).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.basis = CameraBasis::from_angles(self.yaw, self.pitch);

        let step = MOVE_SPEED * self.speed_multiplier * dt;
        let movement = self.basis.right * input.movement.x
            + self.basis.up * input.movement.y
            + self.basis.forward * input.movement.z;
        self.position += movement * step;
    }

    #[allow(clippy::too_many_arguments)]
    fn update_lock(
        &mut self,
        input: &CameraInput,
        dt: f64,
        target: Id,
        center: DVec3,
        body_radius: f64,
        (radius, desired_radius): (f64, f64),
        direction: DVec3,
    ) {
        let min_radius = min_lock_radius(body_radius);

        // Forward (E) shrinks the orbit.
        let zoom = (-input.movement.z * ZOOM_SPEED.ln() * self.speed_multiplier * dt).exp();
        let desired_radius = (desired_radius * zoom).clamp(min_radius, MAX_LOCK_RADIUS);
        let approach = (-ZOOM_APPROACH_SPEED * dt).exp().min(1.0);
        let radius = (desired_radius - (desired_radius - radius) * approach)
            .clamp(min_radius, MAX_LOCK_RADIUS);

        let step = (self.basis.right * input.movement.x + self.basis.up * input.movement.y)
            * (LOCK_ORBIT_SPEED * self.speed_multiplier * dt);
        let tangent_step = step - direction * step.dot(direction);
        let direction = (direction + tangent_step)
            .try_normalize()
            .unwrap_or(direction);

        self.mode = CameraMode::Lock {
            target,
            radius,
            desired_radius,
            direction,
        };
        self.position = center + direction * radius;
        self.face_towards(center);
    }

    #[allow(clippy::too_many_arguments)]
    fn update_planetary(
        &mut self,
        input: &CameraInput,
        dt: f64,
        anchor: Id,
        (center, body_radius): (DVec3, f64),
        normal: DVec3,
        heading: DVec3,
        pitch: f64,
    ) {
        let turn = ROTATION_SPEED * dt;
        // Yaw turns about the world up axis, as in free flight. The result is
        // projected back onto the surface.
        let yawed = DQuat::from_axis_angle(WORLD_UP, -input.rotation.x * turn) * heading;
        let heading = tangent_component(yawed, normal)
            .or_else(|| tangent_component(heading, normal))
            .unwrap_or(heading);
        let pitch = (pitch + input.rotation.y * turn).clamp(-FRAC_PI_2, FRAC_PI_2);

        // W/S walk along the heading, A/D strafe.
        let right = heading.cross(normal);
        let step = (heading * input.movement.y + right * input.movement.x)
            * (PLANETARY_WALK_SPEED * self.speed_multiplier * dt);
        let tangent_step = step - normal * step.dot(normal);
        let new_normal = (normal + tangent_step).try_normalize().unwrap_or(normal);

        let transported = DQuat::from_rotation_arc(normal, new_normal) * heading;
        let heading = tangent_component(transported, new_normal)
            .or_else(|| tangent_component(heading, new_normal))
            .or_else(|| tangent_component(DVec3::Z, new_normal))
            .or_else(|| tangent_component(DVec3::X, new_normal))
            .unwrap_or(heading);
        let normal = new_normal;

        self.mode = CameraMode::Planetary {
            anchor,
            normal,
            heading,
            pitch,
        };
        self.position = center + normal * body_radius;
        self.basis = surface_basis(normal, heading, pitch);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION, 0.0, 0.0)
    }
}

fn min_lock_radius(body_radius: f64) -> f64 {
    (body_radius * MIN_LOCK_RADIUS_FACTOR).min(MAX_LOCK_RADIUS)
}

/// The unit part of `v` perpendicular to the unit vector `normal`
/// (one Gram-Schmidt step).
fn tangent_component(v: DVec3, normal: DVec3) -> Option<DVec3> {
    (v - normal * v.dot(normal)).try_normalize()
}

fn surface_basis(normal: DVec3, heading: DVec3, pitch: f64) -> CameraBasis {
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let right = heading.cross(normal);
    let forward = heading * cos_pitch + normal * sin_pitch;
    let up = right.cross(forward);
    CameraBasis { forward, up, right }
}
