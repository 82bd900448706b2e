//! Distance-sampled orbit trails.

use std::collections::{BTreeMap, VecDeque};
use std::iter;

use glam::DVec3;

use super::universe::{Id, Universe};

/// Minimum spacing between stored trail samples, in meters.
pub const DEFAULT_TRAIL_DISTANCE: f64 = 5.0e9;

/// Maximum number of stored samples per body.
pub const DEFAULT_TRAIL_LENGTH: usize = 100;

/// A bounded history of positions for one body.
///
/// Consecutive samples are always at least `min_distance` apart, and
/// there are never more than `capacity` of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    points: VecDeque<DVec3>,
    capacity: usize,
    min_distance: f64,
}

impl Trail {
    pub fn new(capacity: usize, min_distance: f64) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            min_distance: sanitize_distance(min_distance),
        }
    }

    #[inline]
    pub fn points(&self) -> &VecDeque<DVec3> {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    fn push(&mut self, point: DVec3) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Records the body's latest position.
    ///
    /// Nothing is stored until the body has moved `min_distance` away from
    /// the last sample. A jump of several thresholds is filled in with
    /// evenly spaced points along the chord, so the trail has no holes no
    /// matter how large the timestep is.
    pub fn observe(&mut self, position: DVec3) {
        if self.capacity == 0 || !position.is_finite() {
            return;
        }

        let Some(&last) = self.points.back() else {
            self.push(position);
            return;
        };

        let offset = position - last;
        let distance = offset.length();
        if distance < self.min_distance {
            return;
        }

        let steps = (distance / self.min_distance).floor() as usize;
        let direction = offset / distance;

        // Anything older than the newest `capacity` points would be evicted
        // straight away.
        let first = steps.saturating_sub(self.capacity).max(1);
        let mut previous = last;
        for k in first..steps {
            let point = last + direction * (k as f64 * self.min_distance);
            // Far from the origin, rounding can leave a fill point a hair
            // short of the spacing on either side.
            if point.distance(previous) >= self.min_distance
                && position.distance(point) >= self.min_distance
            {
                self.push(point);
                previous = point;
            }
        }
        self.push(position);
    }

    /// The stored samples followed by the body's live position, so the
    /// drawn trail always reaches the body.
    pub fn render_path(&self, live: DVec3) -> impl Iterator<Item = DVec3> + '_ {
        self.points.iter().copied().chain(iter::once(live))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

fn sanitize_distance(min_distance: f64) -> f64 {
    if min_distance.is_finite() && min_distance > 0.0 {
        min_distance
    } else {
        DEFAULT_TRAIL_DISTANCE
    }
}

/// Owns one [`Trail`] per body and feeds them after every step.
#[derive(Clone, Debug)]
pub struct TrailSampler {
    trails: BTreeMap<Id, Trail>,
    enabled: bool,
    capacity: usize,
    min_distance: f64,
}

impl TrailSampler {
    pub fn new(capacity: usize, min_distance: f64) -> Self {
        Self {
            trails: BTreeMap::new(),
            enabled: true,
            capacity,
            min_distance: sanitize_distance(min_distance),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Turning trails off discards every stored sample; turning them back
    /// on starts fresh trails from the bodies' current positions.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.trails.clear();
        }
    }

    /// Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Changes the sampling parameters. Existing trails are dropped.
    pub fn configure(&mut self, capacity: usize, min_distance: f64) {
        self.capacity = capacity;
        self.min_distance = sanitize_distance(min_distance);
        self.trails.clear();
    }

    pub fn observe(&mut self, universe: &Universe) {
        if !self.enabled {
            return;
        }

        for (&id, body) in universe.get_bodies() {
            self.trails
                .entry(id)
                .or_insert_with(|| Trail::new(self.capacity, self.min_distance))
                .observe(body.position);
        }
    }

    pub fn trail(&self, id: Id) -> Option<&Trail> {
        self.trails.get(&id)
    }

    pub fn trails(&self) -> &BTreeMap<Id, Trail> {
        &self.trails
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }
}

impl Default for TrailSampler {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LENGTH, DEFAULT_TRAIL_DISTANCE)
    }
}
