//! JSON system files: loading a universe from disk and saving snapshots.

use std::{
    error::Error,
    fmt::Display,
    fs::OpenOptions,
    io::{self, Read},
    path::Path,
};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use three_d::Srgba;

use super::storage::{WriteError, write_atomically};
use crate::sim::{
    Simulation, SimulationParams,
    body::Body,
    default_universe, preset_color,
    universe::{BodyAddError, Universe},
};

pub const DEFAULT_DISTANCE_SCALE: f64 = 1e8;
pub const DEFAULT_BODY_RADIUS: f64 = 10.0;
pub const MAX_TRAIL_LENGTH: usize = 100_000;

/// Where snapshots go when no system file was given.
pub const DEFAULT_SNAPSHOT_PATH: &str = "system.json";

/// A color as written in a system file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Rgb([i64; 3]),
    /// A `#rrggbb` hex string or the name of a built-in body.
    Text(String),
    /// Anything else. Kept so that a bad color does not reject the file.
    Other(serde_json::Value),
}

impl ColorSpec {
    pub fn parse(&self) -> Option<Srgba> {
        match self {
            ColorSpec::Rgb(channels) => {
                let [r, g, b] = channels.map(|c| u8::try_from(c).ok());
                Some(Srgba::new_opaque(r?, g?, b?))
            }
            ColorSpec::Text(text) => parse_hex(text).or_else(|| preset_color(text.trim())),
            ColorSpec::Other(_) => None,
        }
    }
}

impl From<Srgba> for ColorSpec {
    fn from(color: Srgba) -> Self {
        ColorSpec::Rgb([color.r.into(), color.g.into(), color.b.into()])
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        Srgba::WHITE.into()
    }
}

fn parse_hex(text: &str) -> Option<Srgba> {
    let hex = text.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Srgba::new_opaque(channel(0)?, channel(2)?, channel(4)?))
}

fn default_distance_scale() -> f64 {
    DEFAULT_DISTANCE_SCALE
}

fn default_body_radius() -> f64 {
    DEFAULT_BODY_RADIUS
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub name: String,
    /// Kilograms.
    pub mass: f64,
    /// Meters.
    pub position: [f64; 3],
    /// Meters per second.
    pub velocity: [f64; 3],
    /// In units of the file's `distance_scale`.
    #[serde(default = "default_body_radius")]
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    /// Degrees, about the +X axis.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub inclination: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemFile {
    #[serde(default = "default_distance_scale")]
    pub distance_scale: f64,
    #[serde(default)]
    pub default_color: ColorSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravitational_constant: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softening: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trail_length: Option<usize>,
    pub bodies: Vec<BodyRecord>,
}

/// A fully validated system, ready to hand to a [`Simulation`].
#[derive(Clone, Debug)]
pub struct SystemConfig {
    pub universe: Universe,
    pub params: SimulationParams,
    pub distance_scale: f64,
}

impl SystemConfig {
    pub fn default_system() -> Self {
        Self {
            universe: default_universe(),
            params: SimulationParams::default(),
            distance_scale: DEFAULT_DISTANCE_SCALE,
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<f64, LoadError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LoadError::InvalidParameter { name, value })
    }
}

impl SystemFile {
    /// Captures the live state of a simulation.
    ///
    /// Inclinations are already part of the state vectors, so they are
    /// written as zero.
    pub fn capture(sim: &Simulation, distance_scale: f64) -> Self {
        let params = sim.params();
        let universe = &sim.universe;

        let bodies = universe
            .get_bodies()
            .values()
            .map(|body| BodyRecord {
                name: body.name.clone(),
                mass: body.mass,
                position: body.position.to_array(),
                velocity: body.velocity.to_array(),
                radius: body.radius / distance_scale,
                color: Some(body.color.into()),
                inclination: 0.0,
            })
            .collect();

        Self {
            distance_scale,
            default_color: ColorSpec::default(),
            gravitational_constant: Some(universe.get_gravitational_constant()),
            timestep: Some(params.timestep),
            softening: Some(params.softening),
            trail_distance: Some(params.trail_distance),
            trail_length: Some(params.trail_length),
            bodies,
        }
    }

    /// Validates the file and builds the universe it describes.
    pub fn into_config(self) -> Result<SystemConfig, LoadError> {
        let distance_scale = check_positive("distance_scale", self.distance_scale)?;
        let defaults = SimulationParams::default();

        let g = self
            .gravitational_constant
            .map(|g| check_positive("gravitational_constant", g))
            .transpose()?;
        let params = SimulationParams {
            timestep: match self.timestep {
                Some(dt) => check_positive("timestep", dt)?,
                None => defaults.timestep,
            },
            softening: match self.softening {
                Some(eps) => check_positive("softening", eps)?,
                None => defaults.softening,
            },
            trail_distance: match self.trail_distance {
                Some(d) => check_positive("trail_distance", d)?,
                None => defaults.trail_distance,
            },
            trail_length: match self.trail_length {
                Some(len) if len > MAX_TRAIL_LENGTH => {
                    return Err(LoadError::InvalidParameter {
                        name: "trail_length",
                        value: len as f64,
                    });
                }
                Some(len) => len,
                None => defaults.trail_length,
            },
        };

        if self.bodies.is_empty() {
            return Err(LoadError::NoBodies);
        }

        let default_color = self.default_color.parse().unwrap_or_else(|| {
            tracing::warn!(
                "Invalid default color {:?}, using white",
                self.default_color
            );
            Srgba::WHITE
        });

        let mut universe = Universe::new(g);
        for record in self.bodies {
            let color = match &record.color {
                None => default_color,
                Some(spec) => spec.parse().unwrap_or_else(|| {
                    tracing::warn!("Invalid color for {}, using default", record.name);
                    default_color
                }),
            };

            let body = Body::new(
                record.name,
                record.mass,
                DVec3::from_array(record.position),
                DVec3::from_array(record.velocity),
                record.radius * distance_scale,
            )
            .with_color(color)
            .inclined(record.inclination.to_radians());

            universe.add_body(body).map_err(LoadError::InvalidBody)?;
        }

        Ok(SystemConfig {
            universe,
            params,
            distance_scale,
        })
    }
}

pub fn load_system(path: &Path) -> Result<SystemConfig, LoadError> {
    let mut file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(LoadError::OpenFile)?;

    let mut string = String::new();
    file.read_to_string(&mut string)
        .map_err(LoadError::ReadFile)?;
    drop(file);

    let system: SystemFile = serde_json::from_str(&string).map_err(LoadError::Parse)?;
    system.into_config()
}

/// Loads the given system file, or `system.json` in the working directory
/// when none is given, falling back to the built-in solar system.
///
/// On fallback the returned message explains what went wrong. A missing
/// default file is only logged.
pub fn load_or_default(path: Option<&Path>) -> (SystemConfig, Option<String>) {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SNAPSHOT_PATH));

    match load_system(path) {
        Ok(config) => {
            tracing::info!(
                "Loaded {} bodies from {}",
                config.universe.len(),
                path.display()
            );
            (config, None)
        }
        Err(LoadError::OpenFile(e)) if !explicit && e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                "No {} found, using the default solar system",
                path.display()
            );
            (SystemConfig::default_system(), None)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load {}, using the default solar system: {e}",
                path.display()
            );
            let message = format!("Could not load {}: {e}", path.display());
            (SystemConfig::default_system(), Some(message))
        }
    }
}

pub fn save_system(sim: &Simulation, distance_scale: f64, path: &Path) -> Result<(), SaveError> {
    let system = SystemFile::capture(sim, distance_scale);
    let json = serde_json::to_string_pretty(&system).map_err(SaveError::Serialize)?;
    write_atomically(path, json.as_bytes()).map_err(SaveError::Write)?;
    tracing::info!("Saved {} bodies to {}", system.bodies.len(), path.display());
    Ok(())
}

#[derive(Debug)]
pub enum LoadError {
    OpenFile(io::Error),
    ReadFile(io::Error),
    Parse(serde_json::Error),
    InvalidParameter { name: &'static str, value: f64 },
    NoBodies,
    InvalidBody(BodyAddError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::OpenFile(error) => write!(f, "OpenFile: {error}"),
            LoadError::ReadFile(error) => write!(f, "ReadFile: {error}"),
            LoadError::Parse(error) => write!(f, "Parse: {error}"),
            LoadError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {name}: {value}")
            }
            LoadError::NoBodies => write!(f, "The system has no bodies"),
            LoadError::InvalidBody(error) => write!(f, "{error}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::OpenFile(error) | LoadError::ReadFile(error) => Some(error),
            LoadError::Parse(error) => Some(error),
            LoadError::InvalidBody(error) => Some(error),
            LoadError::InvalidParameter { .. } | LoadError::NoBodies => None,
        }
    }
}

#[derive(Debug)]
pub enum SaveError {
    Serialize(serde_json::Error),
    Write(WriteError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Serialize(error) => write!(f, "Serialize: {error}"),
            SaveError::Write(error) => write!(f, "{error}"),
        }
    }
}

impl Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::presets;

    fn parse(json: &str) -> Result<SystemConfig, LoadError> {
        serde_json::from_str::<SystemFile>(json)
            .map_err(LoadError::Parse)?
            .into_config()
    }

    #[test]
    fn colors() {
        let text = |s: &str| ColorSpec::Text(s.into()).parse();
        assert_eq!(text("#ff8000"), Some(Srgba::new_opaque(255, 128, 0)));
        assert_eq!(text("Mars"), Some(presets::MARS_COLOR));
        assert_eq!(text("#ff80"), None);
        assert_eq!(text("#gg0000"), None);
        assert_eq!(text("plaid"), None);
        assert_eq!(
            ColorSpec::Rgb([1, 2, 3]).parse(),
            Some(Srgba::new_opaque(1, 2, 3))
        );
        assert_eq!(ColorSpec::Rgb([0, 256, 0]).parse(), None);
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let config = parse(
            r#"{ "bodies": [
                { "name": "Star", "mass": 2e30, "position": [0, 0, 0], "velocity": [0, 0, 0] }
            ] }"#,
        )
        .unwrap();

        let star = config.universe.get_body(0).unwrap();
        assert_eq!(star.radius, DEFAULT_BODY_RADIUS * DEFAULT_DISTANCE_SCALE);
        assert_eq!(star.color, Srgba::WHITE);
        assert_eq!(config.params, SimulationParams::default());
    }

    #[test]
    fn bad_color_falls_back_to_default_color() {
        let config = parse(
            r##"{
                "default_color": "#102030",
                "bodies": [
                    { "name": "A", "mass": 1, "position": [0, 0, 0], "velocity": [0, 0, 0],
                      "color": "no-such-color" },
                    { "name": "B", "mass": 1, "position": [1, 0, 0], "velocity": [0, 0, 0],
                      "color": [1.5, 2, 3] }
                ]
            }"##,
        )
        .unwrap();

        let expected = Srgba::new_opaque(0x10, 0x20, 0x30);
        assert!(
            config
                .universe
                .get_bodies()
                .values()
                .all(|b| b.color == expected)
        );
    }

    #[test]
    fn inclination_is_applied_in_degrees() {
        let config = parse(
            r#"{ "bodies": [
                { "name": "P", "mass": 1, "position": [0, 0, 1], "velocity": [0, 0, 0],
                  "inclination": 90 }
            ] }"#,
        )
        .unwrap();

        let p = config.universe.get_body(0).unwrap();
        assert!((p.position - DVec3::new(0.0, -1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn rejects_invalid_files() {
        assert!(matches!(parse("{"), Err(LoadError::Parse(_))));
        assert!(matches!(parse(r#"{ "bodies": [] }"#), Err(LoadError::NoBodies)));
        assert!(matches!(
            parse(r#"{ "distance_scale": -1, "bodies": [] }"#),
            Err(LoadError::InvalidParameter {
                name: "distance_scale",
                ..
            })
        ));
        assert!(matches!(
            parse(
                r#"{ "bodies": [
                    { "name": "A", "mass": 1, "position": [0, 0, 0], "velocity": [0, 0, 0] },
                    { "name": "A", "mass": 1, "position": [1, 0, 0], "velocity": [0, 0, 0] }
                ] }"#
            ),
            Err(LoadError::InvalidBody(_))
        ));
        assert!(matches!(
            parse(
                r#"{ "bodies": [
                    { "name": "A", "mass": 0, "position": [0, 0, 0], "velocity": [0, 0, 0] }
                ] }"#
            ),
            Err(LoadError::InvalidBody(_))
        ));
        assert!(matches!(
            parse(
                r#"{ "bodies": [
                    { "name": "A", "mass": 1, "position": [0, 0], "velocity": [0, 0, 0] }
                ] }"#
            ),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let (config, message) = load_or_default(Some(&missing));
        assert_eq!(config.universe, default_universe());
        assert!(message.is_some());
    }
}
