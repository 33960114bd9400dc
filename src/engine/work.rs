//! Simulated critical-section work.
//!
//! The delay is a literal spin on `Instant`: the holder keeps the core busy
//! instead of handing it back to the scheduler, so the lock is held for real
//! CPU time.

use std::{
    hint,
    time::{Duration, Instant},
};

use rand::Rng;

/// Body executed while the lock is held.
pub trait CriticalWork: Send + Sync {
    fn perform<R: Rng>(&self, rng: &mut R);
}

/// Busy-waits for a uniformly random duration in `[0, max_work_nanos)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSimulator {
    max_work_nanos: u64,
}

impl WorkSimulator {
    pub fn new(max_work_nanos: u64) -> Self {
        Self { max_work_nanos }
    }

    /// Draws the spin duration for one call.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_work_nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rng.random_range(0..self.max_work_nanos))
    }

    pub fn simulate<R: Rng>(&self, rng: &mut R) {
        let work = self.draw(rng);
        if work.is_zero() {
            return;
        }
        spin_for(work);
    }
}

impl CriticalWork for WorkSimulator {
    #[inline]
    fn perform<R: Rng>(&self, rng: &mut R) {
        self.simulate(rng);
    }
}

/// Spins until `duration` has elapsed on the monotonic clock.
#[inline]
pub fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_draw_stays_below_bound() {
        let sim = WorkSimulator::new(100);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert!(sim.draw(&mut rng) < Duration::from_nanos(100));
        }
    }

    #[test]
    fn test_draw_mean_is_about_half_the_bound() {
        let sim = WorkSimulator::new(1_000);
        let mut rng = StdRng::seed_from_u64(42);
        let samples = 20_000u64;
        let total: u128 = (0..samples).map(|_| sim.draw(&mut rng).as_nanos()).sum();
        let mean = total as f64 / samples as f64;
        assert!((450.0..550.0).contains(&mean), "mean draw was {}", mean);
    }

    #[test]
    fn test_zero_bound_never_waits() {
        let sim = WorkSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sim.draw(&mut rng), Duration::ZERO);
        sim.simulate(&mut rng);
    }

    #[test]
    fn test_spin_for_waits_at_least_duration() {
        let start = Instant::now();
        spin_for(Duration::from_micros(200));
        assert!(start.elapsed() >= Duration::from_micros(200));
    }
}
