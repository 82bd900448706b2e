pub mod body;
pub mod clock;
pub mod integrator;
pub mod presets;
pub mod trail;
pub mod universe;

use three_d::Srgba;

use clock::SimulationClock;
use integrator::{DEFAULT_SOFTENING_LENGTH, DEFAULT_TIMESTEP, Integrator};
use trail::{DEFAULT_TRAIL_DISTANCE, DEFAULT_TRAIL_LENGTH, TrailSampler};
use universe::Universe;

macro_rules! declare_presets {
    { $($name:ident),* $(,)? } => {
        /// Builds the built-in solar system.
        pub fn default_universe() -> Universe {
            let mut universe = Universe::default();
            $(
                if let Err(e) = universe.add_body(presets::$name()) {
                    tracing::error!("{e}");
                }
            )*
            universe
        }

        /// Looks up the color of a built-in body by name, ignoring case.
        pub fn preset_color(name: &str) -> Option<Srgba> {
            ::pastey::paste! {
                $(
                    if name.eq_ignore_ascii_case(stringify!($name)) {
                        return Some(presets::[<$name:upper _COLOR>]);
                    }
                )*
            }
            None
        }
    };
}

declare_presets! {
    sun,
    mercury,
    venus,
    earth,
    mars,
    jupiter,
    saturn,
    uranus,
    neptune,
    pluto,
}

/// Tunables that come with a system rather than with the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    /// Base timestep, in seconds.
    pub timestep: f64,
    /// Softening length, in meters.
    pub softening: f64,
    pub trail_length: usize,
    /// Minimum trail sample spacing, in meters.
    pub trail_distance: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            timestep: DEFAULT_TIMESTEP,
            softening: DEFAULT_SOFTENING_LENGTH,
            trail_length: DEFAULT_TRAIL_LENGTH,
            trail_distance: DEFAULT_TRAIL_DISTANCE,
        }
    }
}

/// Everything that evolves with simulated time, plus the snapshot it
/// started from.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub universe: Universe,
    initial: Universe,
    pub clock: SimulationClock,
    pub integrator: Integrator,
    pub trails: TrailSampler,
}

impl Simulation {
    pub fn new(universe: Universe, params: SimulationParams) -> Self {
        let mut trails = TrailSampler::new(params.trail_length, params.trail_distance);
        trails.observe(&universe);

        Self {
            initial: universe.clone(),
            universe,
            clock: SimulationClock::new(),
            integrator: Integrator::new(params.timestep, params.softening),
            trails,
        }
    }

    /// The state that [`Simulation::reset`] returns to.
    pub fn initial(&self) -> &Universe {
        &self.initial
    }

    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            timestep: self.integrator.base_timestep(),
            softening: self.integrator.softening(),
            trail_length: self.trails.capacity(),
            trail_distance: self.trails.min_distance(),
        }
    }

    /// Runs one tick: integrate (unless paused), then sample trails.
    ///
    /// Returns whether simulated time advanced.
    pub fn step(&mut self) -> bool {
        let stepped = self.integrator.step(&mut self.universe, &mut self.clock);
        self.trails.observe(&self.universe);
        stepped
    }

    /// Restores the initial snapshot, zeroes the clock and clears trails.
    pub fn reset(&mut self) {
        self.universe.clone_from(&self.initial);
        self.clock.reset();
        self.trails.clear();
        self.trails.observe(&self.universe);
    }

    /// Replaces both the live state and the reset snapshot.
    pub fn load(&mut self, universe: Universe, params: SimulationParams) {
        self.initial = universe.clone();
        self.universe = universe;
        self.integrator = Integrator::new(params.timestep, params.softening);
        self.clock.reset();
        self.trails
            .configure(params.trail_length, params.trail_distance);
        self.trails.observe(&self.universe);
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(default_universe(), SimulationParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_every_preset() {
        let universe = default_universe();
        assert_eq!(universe.len(), 10);
        assert_eq!(universe.get_body_index_with_name("Sun"), Some(0));
        assert!(universe.get_body_index_with_name("Pluto").is_some());
    }

    #[test]
    fn preset_colors_ignore_case() {
        assert_eq!(preset_color("earth"), Some(presets::EARTH_COLOR));
        assert_eq!(preset_color("NEPTUNE"), Some(presets::NEPTUNE_COLOR));
        assert_eq!(preset_color("Vulcan"), None);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut sim = Simulation::default();
        sim.clock.speed_up();
        for _ in 0..50 {
            sim.step();
        }
        assert_ne!(&sim.universe, sim.initial());

        sim.reset();
        assert_eq!(&sim.universe, sim.initial());
        assert_eq!(sim.clock, SimulationClock::new());
        assert!(sim.trails.trails().values().all(|t| t.len() == 1));
    }

    #[test]
    fn paused_step_keeps_state() {
        let mut sim = Simulation::default();
        sim.clock.toggle_pause();
        let before = sim.universe.clone();
        assert!(!sim.step());
        assert_eq!(sim.universe, before);
    }
}
