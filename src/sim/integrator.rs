//! Fixed-step N-body integration.
//!
//! Every tick computes all pairwise accelerations from one snapshot of
//! the positions, then applies a semi-implicit (symplectic) Euler update:
//! velocities first, then positions from the updated velocities.

use glam::DVec3;

use super::clock::SimulationClock;
use super::universe::Universe;

/// One day, in seconds.
pub const DEFAULT_TIMESTEP: f64 = 86400.0;

/// Default softening length, in meters.
pub const DEFAULT_SOFTENING_LENGTH: f64 = 1.0e6;

/// Smallest softening length the integrator accepts, in meters.
///
/// Keeps `r^3` well away from zero so the force term stays finite.
pub const MIN_SOFTENING_LENGTH: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    /// Seconds of simulated time per tick at a time multiplier of 1.
    base_timestep: f64,

    /// Separation below which the force stops growing, in meters.
    softening: f64,
}

impl Integrator {
    /// Creates a new integrator.
    ///
    /// `softening` is raised to [`MIN_SOFTENING_LENGTH`] if smaller.
    pub fn new(base_timestep: f64, softening: f64) -> Self {
        let softening = if softening.is_nan() {
            DEFAULT_SOFTENING_LENGTH
        } else {
            softening.max(MIN_SOFTENING_LENGTH)
        };
        Self {
            base_timestep,
            softening,
        }
    }

    #[inline]
    pub fn base_timestep(&self) -> f64 {
        self.base_timestep
    }

    #[inline]
    pub fn softening(&self) -> f64 {
        self.softening
    }

    /// The size of the next step, in simulated seconds.
    pub fn step_size(&self, clock: &SimulationClock) -> f64 {
        self.base_timestep * clock.multiplier()
    }

    /// Advances the universe by one time-scaled step and moves the clock
    /// along with it. Does nothing while the clock is paused.
    ///
    /// Returns whether a step was taken.
    pub fn step(&self, universe: &mut Universe, clock: &mut SimulationClock) -> bool {
        if clock.is_paused() {
            return false;
        }

        let dt = self.step_size(clock);
        self.advance(universe, dt);
        clock.advance(dt);
        true
    }

    /// Advances the universe by exactly `dt` seconds.
    pub fn advance(&self, universe: &mut Universe, dt: f64) {
        let accelerations = self.accelerations(universe);

        // v_n+1 = v_n + dt * a(x_n)
        for (body, acceleration) in universe.bodies_mut().zip(&accelerations) {
            body.velocity += *acceleration * dt;
        }

        // x_n+1 = x_n + dt * v_n+1
        for body in universe.bodies_mut() {
            body.position += body.velocity * dt;
        }
    }

    /// Computes the acceleration of every body, in ID order.
    ///
    /// Each unordered pair is visited once and the equal and opposite
    /// contributions are applied to both bodies.
    pub fn accelerations(&self, universe: &Universe) -> Vec<DVec3> {
        let g = universe.get_gravitational_constant();
        let snapshot: Box<[(DVec3, f64)]> = universe
            .get_bodies()
            .values()
            .map(|body| (body.position, body.mass))
            .collect();

        let mut accelerations = vec![DVec3::ZERO; snapshot.len()];

        for (i, &(position_i, mass_i)) in snapshot.iter().enumerate() {
            for (j, &(position_j, mass_j)) in snapshot.iter().enumerate().skip(i + 1) {
                let displacement = position_j - position_i;
                let distance = displacement.length().max(self.softening);
                let inv_cube = (distance * distance * distance).recip();

                accelerations[i] += displacement * (g * mass_j * inv_cube);
                accelerations[j] -= displacement * (g * mass_i * inv_cube);
            }
        }

        accelerations
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTEP, DEFAULT_SOFTENING_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::super::body::Body;
    use super::*;

    fn two_bodies(separation: f64) -> Universe {
        let mut universe = Universe::new(Some(1.0));
        universe
            .add_body(Body::new(
                "a".into(),
                2.0,
                DVec3::ZERO,
                DVec3::ZERO,
                1.0,
            ))
            .unwrap();
        universe
            .add_body(Body::new(
                "b".into(),
                3.0,
                DVec3::new(separation, 0.0, 0.0),
                DVec3::ZERO,
                1.0,
            ))
            .unwrap();
        universe
    }

    #[test]
    fn newton_third_law() {
        let universe = two_bodies(10.0);
        let integrator = Integrator::new(1.0, 1.0);
        let acc = integrator.accelerations(&universe);

        // a_a = G m_b / r^2 towards b, a_b = G m_a / r^2 towards a
        assert!((acc[0] - DVec3::new(3.0 / 100.0, 0.0, 0.0)).length() < 1e-15);
        assert!((acc[1] - DVec3::new(-2.0 / 100.0, 0.0, 0.0)).length() < 1e-15);
        let net_force = acc[0] * 2.0 + acc[1] * 3.0;
        assert!(net_force.length() < 1e-15);
    }

    #[test]
    fn softening_bounds_close_encounters() {
        let integrator = Integrator::new(1.0, 4.0);

        let acc = integrator.accelerations(&two_bodies(2.0));
        // r is clamped to 4, so |a| = G m d / 4^3 rather than G m / d^2.
        assert!((acc[0].x - 3.0 * 2.0 / 64.0).abs() < 1e-15);

        let acc = integrator.accelerations(&two_bodies(0.0));
        assert_eq!(acc, vec![DVec3::ZERO, DVec3::ZERO]);
    }

    #[test]
    fn paused_clock_is_a_no_op() {
        let mut universe = two_bodies(10.0);
        let before = universe.clone();
        let mut clock = SimulationClock::new();
        clock.set_paused(true);

        assert!(!Integrator::default().step(&mut universe, &mut clock));
        assert_eq!(universe, before);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn velocity_is_updated_before_position() {
        let mut universe = two_bodies(10.0);
        let integrator = Integrator::new(1.0, 1.0);
        integrator.advance(&mut universe, 1.0);

        // Starting at rest, explicit Euler would leave positions unchanged.
        let a = universe.get_body(0).unwrap();
        assert!((a.velocity.x - 0.03).abs() < 1e-15);
        assert!((a.position.x - 0.03).abs() < 1e-15);
    }

    #[test]
    fn step_uses_time_multiplier() {
        let mut universe = two_bodies(1e3);
        let mut clock = SimulationClock::new();
        clock.speed_up();
        let integrator = Integrator::new(10.0, 1.0);

        assert!(integrator.step(&mut universe, &mut clock));
        assert_eq!(clock.elapsed(), 20.0);
    }

    #[test]
    fn coincident_bodies_stay_finite() {
        let mut universe = two_bodies(0.0);
        let mut clock = SimulationClock::new();
        let integrator = Integrator::new(DEFAULT_TIMESTEP, 0.0);
        for _ in 0..100 {
            integrator.step(&mut universe, &mut clock);
        }
        assert!(universe.get_bodies().values().all(Body::is_finite));
    }

    #[test]
    fn momentum_is_conserved() {
        let mut universe = two_bodies(5.0);
        universe.get_body_mut(1).unwrap().velocity = DVec3::new(0.0, 0.4, 0.1);
        let before = universe.total_momentum();

        let integrator = Integrator::new(0.01, 1e-3);
        for _ in 0..100 {
            integrator.advance(&mut universe, 0.01);
        }
        assert!((universe.total_momentum() - before).length() < 1e-10);
    }
}
