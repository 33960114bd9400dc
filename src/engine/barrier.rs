//! Reusable rendezvous for the workers of one run.
//!
//! Behaves like `std::sync::Barrier` with two additions: a participant can
//! break the barrier (waking everyone with `Broken`), and waits can be bounded
//! by a timeout, after which the barrier breaks itself.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BarrierError {
    #[error("barrier was broken by another participant")]
    Broken,

    #[error("barrier wait timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

/// Outcome of a successful wait; exactly one participant per generation leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
}

impl BarrierWaitResult {
    pub fn is_leader(&self) -> bool {
        self.leader
    }
}

#[derive(Debug)]
pub struct RunBarrier {
    parties: usize,
    timeout: Option<Duration>,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl RunBarrier {
    pub fn new(parties: usize, timeout: Option<Duration>) -> Self {
        Self {
            parties,
            timeout,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                broken: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Blocks until `parties` callers have arrived, the barrier is broken, or
    /// the timeout elapses.
    pub fn wait(&self) -> Result<BarrierWaitResult, BarrierError> {
        let mut state = self.state.lock();
        if state.broken {
            return Err(BarrierError::Broken);
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived >= self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(BarrierWaitResult { leader: true });
        }

        let deadline = self.timeout.map(|t| (t, Instant::now() + t));
        loop {
            if state.generation != generation {
                return Ok(BarrierWaitResult { leader: false });
            }
            if state.broken {
                return Err(BarrierError::Broken);
            }
            match deadline {
                None => self.cvar.wait(&mut state),
                Some((timeout, at)) => {
                    let timed_out = self.cvar.wait_until(&mut state, at).timed_out();
                    if timed_out && state.generation == generation && !state.broken {
                        state.broken = true;
                        self.cvar.notify_all();
                        return Err(BarrierError::TimedOut(timeout));
                    }
                }
            }
        }
    }

    /// Marks the barrier broken and wakes every waiter.
    pub fn break_barrier(&self) {
        let mut state = self.state.lock();
        if !state.broken {
            state.broken = true;
            self.cvar.notify_all();
        }
    }

    pub fn is_broken(&self) -> bool {
        self.state.lock().broken
    }
}
