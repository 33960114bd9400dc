//! lock.rs
//! Mutual-exclusion strategies under test.
//!
//! - Reentrant: `parking_lot::ReentrantMutex`; the owning thread may re-enter.
//! - Monitor: a plain `std::sync::Mutex<()>` used purely as a token.
//!
//! Both hand out an RAII guard from `acquire`; dropping the guard is the only
//! way to release, so a panic unwinding through the critical section still
//! unlocks.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    Reentrant,
    Monitor,
}

impl LockKind {
    /// Value written to the `lock_type` CSV column.
    pub fn label(&self) -> &'static str {
        match self {
            LockKind::Reentrant => "reentrant",
            LockKind::Monitor => "monitor",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "reentrant" => Ok(LockKind::Reentrant),
            "2" | "monitor" => Ok(LockKind::Monitor),
            other => Err(format!(
                "unknown lock type '{}': expected 1 (reentrant) or 2 (monitor)",
                other
            )),
        }
    }
}

/// A lock the benchmark can contend on.
///
/// `acquire` blocks until the lock is held; the returned guard releases it on
/// drop.
pub trait LockStrategy: Send + Sync + Sized + 'static {
    type Guard<'a>
    where
        Self: 'a;

    const KIND: LockKind;

    fn acquire(&self) -> Self::Guard<'_>;

    /// Lock handle for the next run, given the one used by the previous run.
    fn for_next_run(previous: Option<&Arc<Self>>) -> Arc<Self>;

    fn label() -> &'static str {
        Self::KIND.label()
    }
}

/// Re-entrant mutex; a fresh instance is created for every run.
#[derive(Debug, Default)]
pub struct ReentrantMutexLock {
    inner: ReentrantMutex<()>,
}

impl ReentrantMutexLock {
    pub fn new() -> Self {
        Self {
            inner: ReentrantMutex::new(()),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl LockStrategy for ReentrantMutexLock {
    type Guard<'a> = ReentrantMutexGuard<'a, ()>;

    const KIND: LockKind = LockKind::Reentrant;

    #[inline]
    fn acquire(&self) -> Self::Guard<'_> {
        self.inner.lock()
    }

    fn for_next_run(_previous: Option<&Arc<Self>>) -> Arc<Self> {
        Arc::new(Self::new())
    }
}

/// Monitor-style token shared by every run of one benchmark execution.
#[derive(Debug, Default)]
pub struct MonitorLock {
    token: Mutex<()>,
}

impl MonitorLock {
    pub fn new() -> Self {
        Self {
            token: Mutex::new(()),
        }
    }

    /// True when another holder currently owns the token.
    pub fn is_locked(&self) -> bool {
        match self.token.try_lock() {
            Ok(_) => false,
            Err(std::sync::TryLockError::Poisoned(_)) => false,
            Err(std::sync::TryLockError::WouldBlock) => true,
        }
    }
}

impl LockStrategy for MonitorLock {
    type Guard<'a> = MutexGuard<'a, ()>;

    const KIND: LockKind = LockKind::Monitor;

    #[inline]
    fn acquire(&self) -> Self::Guard<'_> {
        // A panicking holder poisons the mutex; the token itself guards no data.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn for_next_run(previous: Option<&Arc<Self>>) -> Arc<Self> {
        previous
            .cloned()
            .unwrap_or_else(|| Arc::new(Self::new()))
    }
}
