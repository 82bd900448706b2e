pub const MIN_TIME_MULTIPLIER: f64 = 0.01;
pub const MAX_TIME_MULTIPLIER: f64 = 100.0;
pub const DEFAULT_TIME_MULTIPLIER: f64 = 1.0;

const SPEED_UP_FACTOR: f64 = 2.0;
const SLOW_DOWN_FACTOR: f64 = 1.5;

/// Simulated time bookkeeping: how much time has passed, how fast it
/// passes, and whether it passes at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationClock {
    /// Simulated seconds since the start (or the last reset).
    elapsed: f64,

    /// Factor applied to the integrator's base timestep.
    /// Always within [`MIN_TIME_MULTIPLIER`, `MAX_TIME_MULTIPLIER`].
    multiplier: f64,

    paused: bool,
}

impl SimulationClock {
    pub const fn new() -> Self {
        Self {
            elapsed: 0.0,
            multiplier: DEFAULT_TIME_MULTIPLIER,
            paused: false,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the time multiplier, clamping it into the allowed range.
    ///
    /// NaN is ignored.
    pub fn set_multiplier(&mut self, multiplier: f64) {
        if multiplier.is_nan() {
            return;
        }
        self.multiplier = multiplier.clamp(MIN_TIME_MULTIPLIER, MAX_TIME_MULTIPLIER);
    }

    pub fn speed_up(&mut self) {
        self.set_multiplier(self.multiplier * SPEED_UP_FACTOR);
    }

    pub fn slow_down(&mut self) {
        self.set_multiplier(self.multiplier / SLOW_DOWN_FACTOR);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Flips the paused flag, returning the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused ^= true;
        self.paused
    }

    pub(crate) fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}
