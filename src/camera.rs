use glam::DVec3;

pub const WORLD_UP: DVec3 = DVec3::Y;

/// Orthonormal camera axes, with `forward × up = right`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: DVec3,
    pub up: DVec3,
    pub right: DVec3,
}

impl CameraBasis {
    /// Yaw turns about the world up axis (positive turns left), then pitch
    /// tilts about the resulting right axis (positive looks up).
    ///
    /// Yaw 0 and pitch 0 look along +Z.
    pub fn from_angles(yaw: f64, pitch: f64) -> Self {
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();

        let forward = DVec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);
        let right = DVec3::new(-cos_yaw, 0.0, sin_yaw);
        let up = right.cross(forward);

        Self { forward, up, right }
    }

    /// Builds a basis looking along `forward`, with `up` as close to
    /// `up_hint` as possible.
    ///
    /// Falls back to the world axes when `up_hint` is parallel to
    /// `forward`. Returns `None` only if `forward` can't be normalized.
    pub fn looking_along(forward: DVec3, up_hint: DVec3) -> Option<Self> {
        let forward = forward.try_normalize()?;
        let right = forward
            .cross(up_hint)
            .try_normalize()
            .or_else(|| forward.cross(WORLD_UP).try_normalize())
            .or_else(|| forward.cross(DVec3::X).try_normalize())?;
        let up = right.cross(forward);

        Some(Self { forward, up, right })
    }

    /// Recovers `(yaw, pitch)` such that
    /// `CameraBasis::from_angles(yaw, pitch).forward == self.forward`.
    pub fn angles(&self) -> (f64, f64) {
        let forward = self.forward;
        let pitch = forward.y.clamp(-1.0, 1.0).asin();

        let yaw = if forward.x.hypot(forward.z) > 1e-9 {
            forward.x.atan2(forward.z)
        } else {
            // Looking straight up or down; the right axis still knows
            // which way we were turned.
            self.right.z.atan2(-self.right.x)
        };

        (yaw, pitch)
    }

    /// Re-derives the basis from `forward` and `up`, removing drift.
    pub fn orthonormalized(&self) -> Option<Self> {
        Self::looking_along(self.forward, self.up)
    }

    pub fn is_finite(&self) -> bool {
        self.forward.is_finite() && self.up.is_finite() && self.right.is_finite()
    }

    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let unit = |v: DVec3| (v.length() - 1.0).abs() <= tolerance;

        unit(self.forward)
            && unit(self.up)
            && unit(self.right)
            && self.forward.dot(self.up).abs() <= tolerance
            && self.forward.dot(self.right).abs() <= tolerance
            && self.up.dot(self.right).abs() <= tolerance
            && self.forward.cross(self.up).distance(self.right) <= tolerance
    }
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self::from_angles(0.0, 0.0)
    }
}

/// Where the camera is and which way it faces, as seen by the projector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub position: DVec3,
    pub basis: CameraBasis,
}
