//! The built-in solar system.
//!
//! Planets start on the +X axis moving along +Z with their mean orbital
//! speed, then get tilted by their inclination about the X axis.

use glam::DVec3;
use three_d::Srgba;

use super::body::Body;

/// Display radii below are in units of this many meters.
pub const DISPLAY_SCALE: f64 = 1e8;

const fn rgb(r: u8, g: u8, b: u8) -> Srgba {
    Srgba { r, g, b, a: 255 }
}

pub const SUN_COLOR: Srgba = rgb(255, 255, 100);
pub const MERCURY_COLOR: Srgba = rgb(169, 169, 169);
pub const VENUS_COLOR: Srgba = rgb(255, 165, 0);
pub const EARTH_COLOR: Srgba = rgb(100, 150, 255);
pub const MARS_COLOR: Srgba = rgb(255, 100, 100);
pub const JUPITER_COLOR: Srgba = rgb(255, 200, 150);
pub const SATURN_COLOR: Srgba = rgb(255, 220, 180);
pub const URANUS_COLOR: Srgba = rgb(150, 200, 255);
pub const NEPTUNE_COLOR: Srgba = rgb(50, 100, 255);
pub const PLUTO_COLOR: Srgba = rgb(200, 180, 160);

fn planet(
    name: &str,
    mass: f64,
    distance: f64,
    speed: f64,
    display_radius: f64,
    inclination_deg: f64,
    color: Srgba,
) -> Body {
    Body::new(
        name.to_string(),
        mass,
        DVec3::new(distance, 0.0, 0.0),
        DVec3::new(0.0, 0.0, speed),
        display_radius * DISPLAY_SCALE,
    )
    .with_color(color)
    .inclined(inclination_deg.to_radians())
}

pub fn sun() -> Body {
    Body::new(
        "Sun".to_string(),
        1.989e30,
        DVec3::ZERO,
        DVec3::ZERO,
        80.0 * DISPLAY_SCALE,
    )
    .with_color(SUN_COLOR)
}

pub fn mercury() -> Body {
    planet("Mercury", 3.301e23, 5.79e10, 47870.0, 15.0, 7.0, MERCURY_COLOR)
}

pub fn venus() -> Body {
    planet("Venus", 4.867e24, 1.082e11, 35020.0, 25.0, 3.4, VENUS_COLOR)
}

pub fn earth() -> Body {
    planet("Earth", 5.972e24, 1.496e11, 29780.0, 30.0, 0.0, EARTH_COLOR)
}

pub fn mars() -> Body {
    planet("Mars", 6.39e23, 2.279e11, 24070.0, 20.0, 1.9, MARS_COLOR)
}

pub fn jupiter() -> Body {
    planet("Jupiter", 1.898e27, 7.785e11, 13070.0, 60.0, 1.3, JUPITER_COLOR)
}

pub fn saturn() -> Body {
    planet("Saturn", 5.683e26, 1.434e12, 9680.0, 50.0, 2.5, SATURN_COLOR)
}

pub fn uranus() -> Body {
    planet("Uranus", 8.681e25, 2.873e12, 6800.0, 35.0, 0.8, URANUS_COLOR)
}

pub fn neptune() -> Body {
    planet("Neptune", 1.024e26, 4.495e12, 5430.0, 33.0, 1.8, NEPTUNE_COLOR)
}

pub fn pluto() -> Body {
    planet("Pluto", 1.309e22, 5.906e12, 4740.0, 10.0, 17.2, PLUTO_COLOR)
}
