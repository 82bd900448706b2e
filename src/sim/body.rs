use glam::{DQuat, DVec3};
use three_d::Srgba;

/// A struct representing a gravitating body.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// The name of the body. Unique within a universe.
    pub name: String,

    /// The mass of the body, in kilograms.
    pub mass: f64,

    /// The position of the body, in meters.
    pub position: DVec3,

    /// The velocity of the body, in meters per second.
    pub velocity: DVec3,

    /// The display radius of the body, in meters.
    ///
    /// This is only used for rendering, hover picking and surface
    /// anchoring. It plays no part in the gravitational interaction.
    pub radius: f64,

    /// The color of the body.
    pub color: Srgba,
}

impl Body {
    /// Creates a new white `Body`.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the body.
    /// * `mass` - The mass of the body, in kilograms.
    /// * `position` - The position of the body, in meters.
    /// * `velocity` - The velocity of the body, in meters per second.
    /// * `radius` - The display radius of the body, in meters.
    pub fn new(name: String, mass: f64, position: DVec3, velocity: DVec3, radius: f64) -> Self {
        Self {
            name,
            mass,
            position,
            velocity,
            radius,
            color: Srgba::WHITE,
        }
    }

    pub fn with_color(mut self, color: Srgba) -> Self {
        self.color = color;
        self
    }

    /// Tilts the body's orbit by rotating both its position and its
    /// velocity about the +X axis.
    ///
    /// `inclination` is in radians. This is meant to be applied once,
    /// when the body is placed; the result is an ordinary state vector.
    pub fn inclined(mut self, inclination: f64) -> Self {
        if inclination != 0.0 {
            let rotation = DQuat::from_rotation_x(inclination);
            self.position = rotation * self.position;
            self.velocity = rotation * self.velocity;
        }
        self
    }

    /// Whether every component of the state vectors is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    /// Linear momentum of the body, in kg m/s.
    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }
}

impl Default for Body {
    /// Creates a default `Body` instance.
    ///
    /// Currently, this function returns the Earth at one astronomical
    /// unit on the +X axis, moving along +Z.
    /// However, do not rely on this behavior, as it may change in the future.
    fn default() -> Self {
        Self {
            name: "Earth".to_string(),
            mass: 5.972e24,
            position: DVec3::new(1.496e11, 0.0, 0.0),
            velocity: DVec3::new(0.0, 0.0, 29780.0),
            radius: 6.371e6,
            color: Srgba::WHITE,
        }
    }
}
