use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use super::body::Body;
use glam::DVec3;

pub type Id = u64;

/// The gravitational constant, in m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.6743e-11;

/// The registry of every body taking part in the simulation.
///
/// Bodies are keyed by an [`Id`] handed out in insertion order, and
/// iteration always follows that order. Bodies are never removed while
/// a run is in progress; a whole new universe is swapped in instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    /// The bodies in the universe.
    bodies: BTreeMap<Id, Body>,

    /// The next ID to assign to a body.
    next_id: Id,

    /// The gravitational constant, in m^3 kg^-1 s^-2.
    g: f64,
}

#[derive(Clone, Debug)]
pub struct BodyAddError {
    cause: BodyAddErrorCause,
    body: Box<Body>,
}

impl BodyAddError {
    pub fn cause(&self) -> &BodyAddErrorCause {
        &self.cause
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum BodyAddErrorCause {
    DuplicateName { existing_id: Id },
    InvalidMass { mass: f64 },
    InvalidRadius { radius: f64 },
    NonFiniteState,
}

impl fmt::Display for BodyAddErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyAddErrorCause::DuplicateName { existing_id } => write!(
                f,
                "A body with the same name already exists with ID {existing_id}"
            ),
            BodyAddErrorCause::InvalidMass { mass } => {
                write!(f, "Mass must be positive and finite, got {mass}")
            }
            BodyAddErrorCause::InvalidRadius { radius } => {
                write!(f, "Radius must be positive and finite, got {radius}")
            }
            BodyAddErrorCause::NonFiniteState => {
                write!(f, "Position and velocity must be finite")
            }
        }
    }
}

impl Error for BodyAddErrorCause {}

impl fmt::Display for BodyAddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to add body {:?} to the universe: {}",
            self.body.name, self.cause
        )
    }
}

impl Error for BodyAddError {}

impl Universe {
    /// Creates an empty universe.
    pub fn new(g: Option<f64>) -> Universe {
        let g = g.unwrap_or(GRAVITATIONAL_CONSTANT);

        Universe {
            bodies: BTreeMap::new(),
            next_id: 0,
            g,
        }
    }

    fn get_and_inc_id(&mut self) -> Id {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn validate(&self, body: &Body) -> Result<(), BodyAddErrorCause> {
        if !(body.mass > 0.0 && body.mass.is_finite()) {
            return Err(BodyAddErrorCause::InvalidMass { mass: body.mass });
        }
        if !(body.radius > 0.0 && body.radius.is_finite()) {
            return Err(BodyAddErrorCause::InvalidRadius {
                radius: body.radius,
            });
        }
        if !body.is_finite() {
            return Err(BodyAddErrorCause::NonFiniteState);
        }
        if let Some(existing_id) = self.get_body_index_with_name(&body.name) {
            return Err(BodyAddErrorCause::DuplicateName { existing_id });
        }
        Ok(())
    }

    /// Adds a body to the universe.
    ///
    /// `body`: The body to add into the universe.
    /// Returns: The ID of the newly-added body.
    pub fn add_body(&mut self, body: Body) -> Result<Id, BodyAddError> {
        if let Err(cause) = self.validate(&body) {
            return Err(BodyAddError {
                cause,
                body: Box::new(body),
            });
        }

        let id = self.get_and_inc_id();
        self.bodies.insert(id, body);
        Ok(id)
    }

    /// Gets a reference to a map of all bodies in the universe.
    pub fn get_bodies(&self) -> &BTreeMap<Id, Body> {
        &self.bodies
    }

    /// Iterates mutably over the bodies, in ID order.
    pub(crate) fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.values_mut()
    }

    /// Gets a mutable reference to a body in the universe.
    pub fn get_body_mut(&mut self, id: Id) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Gets an immutable reference to a body in the universe.
    pub fn get_body(&self, id: Id) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Gets the ID of the body with a given name, if any.
    pub fn get_body_index_with_name(&self, name: &str) -> Option<Id> {
        self.bodies
            .iter()
            .find(|(_, b)| b.name == name)
            .map(|(id, _)| *id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn get_gravitational_constant(&self) -> f64 {
        self.g
    }

    /// Sum of the linear momenta of every body, in kg m/s.
    pub fn total_momentum(&self) -> DVec3 {
        self.bodies.values().map(Body::momentum).sum()
    }
}

impl Default for Universe {
    /// Creates an empty universe with default parameters.
    fn default() -> Universe {
        Universe::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str) -> Body {
        Body::new(name.into(), 1.0, DVec3::ZERO, DVec3::ZERO, 1.0)
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut universe = Universe::default();
        let a = universe.add_body(body("a")).unwrap();
        let b = universe.add_body(body("b")).unwrap();
        assert!(a < b);
        let names: Vec<_> = universe.get_bodies().values().map(|b| &b.name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(universe.get_body_index_with_name("b"), Some(b));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut universe = Universe::default();
        let a = universe.add_body(body("a")).unwrap();
        let err = universe.add_body(body("a")).unwrap_err();
        assert_eq!(
            err.cause(),
            &BodyAddErrorCause::DuplicateName { existing_id: a }
        );
        assert_eq!(universe.len(), 1);
    }

    #[test]
    fn rejects_invalid_mass_and_radius() {
        let mut universe = Universe::default();

        let mut massless = body("massless");
        massless.mass = 0.0;
        assert!(matches!(
            universe.add_body(massless).unwrap_err().cause(),
            BodyAddErrorCause::InvalidMass { .. }
        ));

        let mut pointlike = body("pointlike");
        pointlike.radius = -1.0;
        assert!(matches!(
            universe.add_body(pointlike).unwrap_err().cause(),
            BodyAddErrorCause::InvalidRadius { .. }
        ));

        let mut lost = body("lost");
        lost.position.x = f64::NAN;
        assert!(matches!(
            universe.add_body(lost).unwrap_err().cause(),
            BodyAddErrorCause::NonFiniteState
        ));

        assert!(universe.is_empty());
    }
}
