//! Phase runner: the per-worker critical-section loop.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::CachePadded;
use rand::Rng;

use crate::engine::{lock::LockStrategy, work::CriticalWork};

/// Counter incremented inside the critical section.
///
/// The increment is a separate load and store, not an atomic add: only the
/// lock keeps concurrent increments from being lost.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: CachePadded<AtomicU64>,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `_held` must be a guard of the lock protecting this counter.
    #[inline]
    pub fn increment<G>(&self, _held: &G) {
        let current = self.value.load(Ordering::Relaxed);
        self.value.store(current.wrapping_add(1), Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

/// Runs `iterations` rounds of acquire → work → increment → release.
pub fn run_phase<L, W, R>(
    lock: &L,
    counter: &SharedCounter,
    work: &W,
    rng: &mut R,
    iterations: u64,
) where
    L: LockStrategy,
    W: CriticalWork,
    R: Rng,
{
    for _ in 0..iterations {
        let guard = lock.acquire();
        work.perform(rng);
        counter.increment(&guard);
        drop(guard);
    }
}
