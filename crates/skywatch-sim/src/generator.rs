//! Per-pattern position math and the tick-owning simulator.
//!
//! The tick counter is the single source of truth for every closed-form
//! pattern: circle, eight, and zig-zag positions are recomputed from the
//! tick on each advance, never accumulated. Only the random walk carries
//! path-dependent state, and it draws from a seeded generator so a run
//! can be reproduced from its configuration.
//!
//! # Design Principles
//!
//! - The tick counter advances with checked arithmetic (no silent wrap).
//! - Closed-form positions are pure functions of the tick and therefore
//!   idempotent for a given tick value.
//! - The random walk is deliberately unbounded, matching the behavior
//!   the relay's viewers expect from the legacy simulator.

use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use skywatch_types::{MotionPattern, Position};

/// Fixed origin all patterns start from (a dry lake bed in Nevada).
pub const ORIGIN: Position = Position::new(37.272011, -115.815498);

/// Number of ticks in one full cycle of the closed-form patterns.
const POINTS_PER_CYCLE: f64 = 50.0;

/// Circle radius in meters.
const CIRCLE_RADIUS_METERS: f64 = 500.0;

/// Meters per degree of latitude/longitude. Equatorial approximation,
/// not latitude-corrected; acceptable at a 500 m radius.
const METERS_PER_DEGREE: f64 = 111_300.0;

/// Radius of the figure-eight curve in degrees.
const EIGHT_RADIUS_DEGREES: f64 = 0.01;

/// North/south amplitude of the zig-zag in degrees.
const ZIGZAG_AMPLITUDE_DEGREES: f64 = 0.01;

/// Eastward drift of the zig-zag per full cycle, in degrees.
const ZIGZAG_DRIFT_DEGREES: f64 = 0.1;

/// Maximum per-axis step of the random walk, in degrees per tick.
const RANDOM_STEP_DEGREES: f64 = 0.04;

/// Errors that can occur while advancing a simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Fraction of one full pattern cycle completed at `tick`.
fn cycle_fraction(tick: u64) -> f64 {
    // Tick counts stay far below 2^52 in practice; safe to represent
    // as f64.
    #[allow(clippy::cast_precision_loss)]
    let t = tick as f64;
    t / POINTS_PER_CYCLE
}

/// Position on the 500 m circle at the given tick.
///
/// One revolution takes 50 ticks; tick 50 lands back on the tick-0
/// point (within floating-point tolerance).
pub fn circle_position(tick: u64) -> Position {
    let radius_deg = CIRCLE_RADIUS_METERS / METERS_PER_DEGREE;
    let angle = cycle_fraction(tick) * TAU;
    Position::new(
        ORIGIN.latitude + radius_deg * angle.sin(),
        ORIGIN.longitude + radius_deg * angle.cos(),
    )
}

/// Position on the figure-eight curve at the given tick.
///
/// The angle sweeps twice as fast as the circle's while the latitude
/// oscillates at double frequency, tracing a lemniscate-like loop that
/// repeats every 25 ticks.
pub fn eight_position(tick: u64) -> Position {
    let angle = cycle_fraction(tick) * 2.0 * TAU;
    Position::new(
        ORIGIN.latitude + EIGHT_RADIUS_DEGREES * (2.0 * angle).sin(),
        ORIGIN.longitude + EIGHT_RADIUS_DEGREES * angle.cos(),
    )
}

/// Position on the zig-zag track at the given tick.
///
/// Drifts monotonically east (unbounded over time; the process never
/// restarts the counter) while oscillating north/south.
pub fn zigzag_position(tick: u64) -> Position {
    let fraction = cycle_fraction(tick);
    Position::new(
        ORIGIN.latitude + ZIGZAG_AMPLITUDE_DEGREES * (fraction * TAU).sin(),
        ORIGIN.longitude + fraction * ZIGZAG_DRIFT_DEGREES,
    )
}

/// One pattern's simulator: the tick counter, the current position, and
/// the seeded generator backing the random walk.
///
/// Owned exclusively by the publisher task that ticks it; one instance
/// exists per pattern for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct FlightSimulator {
    pattern: MotionPattern,
    tick: u64,
    position: Position,
    rng: SmallRng,
}

impl FlightSimulator {
    /// Create a simulator for `pattern` at tick 0, positioned at the
    /// origin. `seed` fixes the random walk's trajectory; closed-form
    /// patterns ignore it.
    pub fn new(pattern: MotionPattern, seed: u64) -> Self {
        Self {
            pattern,
            tick: 0,
            position: ORIGIN,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a simulator from explicit parts (useful for testing the
    /// tick counter's edge behavior).
    pub fn from_parts(pattern: MotionPattern, tick: u64, position: Position, seed: u64) -> Self {
        Self {
            pattern,
            tick,
            position,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The pattern this simulator flies.
    pub const fn pattern(&self) -> MotionPattern {
        self.pattern
    }

    /// The current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The position computed by the most recent advance (the origin
    /// before the first tick).
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Advance by one tick and return the new position.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::TickOverflow`] if the tick counter would
    /// exceed `u64::MAX`.
    pub fn advance(&mut self) -> Result<Position, SimError> {
        self.tick = self.tick.checked_add(1).ok_or(SimError::TickOverflow)?;
        self.position = match self.pattern {
            MotionPattern::Random => self.random_step(),
            MotionPattern::Circle => circle_position(self.tick),
            MotionPattern::Eight => eight_position(self.tick),
            MotionPattern::ZigZag => zigzag_position(self.tick),
        };
        Ok(self.position)
    }

    /// One step of the random walk: each axis moves by an independent
    /// uniform draw from `[-0.04, 0.04]` degrees.
    fn random_step(&mut self) -> Position {
        let lat_step = RANDOM_STEP_DEGREES * self.rng.random_range(-1.0..=1.0);
        let lng_step = RANDOM_STEP_DEGREES * self.rng.random_range(-1.0..=1.0);
        Position::new(
            self.position.latitude + lat_step,
            self.position.longitude + lng_step,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Assert two positions agree to within `tol` degrees on each axis.
    fn assert_close(a: Position, b: Position, tol: f64) {
        assert!(
            (a.latitude - b.latitude).abs() < tol,
            "latitude {} vs {}",
            a.latitude,
            b.latitude
        );
        assert!(
            (a.longitude - b.longitude).abs() < tol,
            "longitude {} vs {}",
            a.longitude,
            b.longitude
        );
    }

    #[test]
    fn closed_form_patterns_are_deterministic() {
        for tick in [0, 1, 7, 49, 50, 1_000_003] {
            assert_close(circle_position(tick), circle_position(tick), f64::EPSILON);
            assert_close(eight_position(tick), eight_position(tick), f64::EPSILON);
            assert_close(zigzag_position(tick), zigzag_position(tick), f64::EPSILON);
        }
    }

    #[test]
    fn circle_tick_zero_sits_east_of_origin() {
        let pos = circle_position(0);
        let expected_lng = ORIGIN.longitude + 500.0 / 111_300.0;
        assert_close(pos, Position::new(ORIGIN.latitude, expected_lng), 1e-12);
        // Reference value, rounded to microdegrees.
        assert!((pos.longitude - -115.811007).abs() < 1e-5);
    }

    #[test]
    fn circle_closes_after_one_cycle() {
        assert_close(circle_position(50), circle_position(0), 1e-9);
    }

    #[test]
    fn eight_repeats_every_twenty_five_ticks() {
        assert_close(eight_position(25), eight_position(0), 1e-9);
        assert_close(eight_position(75), eight_position(0), 1e-9);
    }

    #[test]
    fn eight_tick_zero_sits_east_of_origin() {
        let pos = eight_position(0);
        assert_close(
            pos,
            Position::new(ORIGIN.latitude, ORIGIN.longitude + 0.01),
            1e-12,
        );
    }

    #[test]
    fn zigzag_drifts_monotonically_east() {
        let mut last = zigzag_position(0).longitude;
        for tick in 1..200 {
            let lng = zigzag_position(tick).longitude;
            assert!(lng > last, "longitude must increase at tick {tick}");
            last = lng;
        }
    }

    #[test]
    fn zigzag_latitude_stays_within_amplitude() {
        for tick in 0..500 {
            let lat = zigzag_position(tick).latitude;
            assert!((lat - ORIGIN.latitude).abs() <= 0.01 + 1e-12);
        }
    }

    #[test]
    fn zigzag_half_cycle_crosses_the_centerline() {
        // At tick 25 the sine term is sin(pi) ~ 0 and the drift is half
        // of one cycle's 0.1 degrees.
        let pos = zigzag_position(25);
        assert_close(
            pos,
            Position::new(ORIGIN.latitude, ORIGIN.longitude + 0.05),
            1e-9,
        );
    }

    #[test]
    fn simulator_starts_at_origin() {
        let sim = FlightSimulator::new(MotionPattern::Circle, 42);
        assert_eq!(sim.tick(), 0);
        assert_close(sim.position(), ORIGIN, f64::EPSILON);
    }

    #[test]
    fn simulator_advance_tracks_the_closed_form() {
        let mut sim = FlightSimulator::new(MotionPattern::Circle, 42);
        let first = sim.advance().unwrap();
        assert_eq!(sim.tick(), 1);
        assert_close(first, circle_position(1), f64::EPSILON);

        let second = sim.advance().unwrap();
        assert_close(second, circle_position(2), f64::EPSILON);
        assert_close(sim.position(), second, f64::EPSILON);
    }

    #[test]
    fn random_walk_is_reproducible_for_a_seed() {
        let mut a = FlightSimulator::new(MotionPattern::Random, 7);
        let mut b = FlightSimulator::new(MotionPattern::Random, 7);
        for _ in 0..100 {
            assert_close(a.advance().unwrap(), b.advance().unwrap(), f64::EPSILON);
        }
    }

    #[test]
    fn random_walk_steps_are_bounded() {
        let mut sim = FlightSimulator::new(MotionPattern::Random, 99);
        let mut previous = sim.position();
        for _ in 0..1000 {
            let next = sim.advance().unwrap();
            assert!((next.latitude - previous.latitude).abs() <= 0.04 + 1e-12);
            assert!((next.longitude - previous.longitude).abs() <= 0.04 + 1e-12);
            assert!(next.is_finite());
            previous = next;
        }
    }

    #[test]
    fn tick_overflow_is_an_error() {
        let mut sim =
            FlightSimulator::from_parts(MotionPattern::Circle, u64::MAX, ORIGIN, 0);
        assert!(matches!(sim.advance(), Err(SimError::TickOverflow)));
        assert_eq!(sim.tick(), u64::MAX);
    }
}
