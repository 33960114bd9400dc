//! Best-effort CPU pinning for benchmark workers.
//!
//! Worker `i` is pinned to core `i % available_cores`. Pinning is advisory:
//! any failure is reported to the caller, logged, and the benchmark goes on.

use core_affinity::{CoreId, get_core_ids, set_for_current};
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AffinityError {
    #[error("CPU affinity is not supported on this platform")]
    Unsupported,

    #[error("failed to pin thread to core {core}")]
    Failed { core: usize },
}

/// Pins the calling thread to a core.
pub trait AffinityBinder: Send + Sync {
    fn bind(&self, core_index: usize) -> Result<(), AffinityError>;
}

/// Binder backed by `core_affinity`; the core list is captured once.
#[derive(Debug, Clone)]
pub struct CoreAffinityBinder {
    cores: Vec<CoreId>,
}

impl CoreAffinityBinder {
    pub fn detect() -> Self {
        let cores = get_core_ids().unwrap_or_default();
        let binder = Self::from_cores(cores);
        if binder.cores.is_empty() {
            warn!(
                "No core list available ({} logical CPUs); workers will run unpinned",
                num_cpus::get()
            );
        }
        binder
    }

    pub fn from_cores(cores: Vec<CoreId>) -> Self {
        Self { cores }
    }

    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Core that worker `core_index` will be pinned to.
    pub fn core_for(&self, core_index: usize) -> Option<CoreId> {
        if self.cores.is_empty() {
            return None;
        }
        Some(self.cores[core_index % self.cores.len()])
    }

    pub fn describe_mapping(&self) -> String {
        format!(
            "worker i -> core i mod {} (available cores: {:?})",
            self.cores.len(),
            self.cores.iter().map(|c| c.id).collect::<Vec<_>>()
        )
    }
}

impl AffinityBinder for CoreAffinityBinder {
    fn bind(&self, core_index: usize) -> Result<(), AffinityError> {
        let core = self.core_for(core_index).ok_or(AffinityError::Unsupported)?;
        if set_for_current(core) {
            debug!("Worker {}: pinned to core {}", core_index, core.id);
            Ok(())
        } else {
            Err(AffinityError::Failed { core: core.id })
        }
    }
}

/// Binder for platforms (or tests) without pinning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAffinity;

impl AffinityBinder for NoAffinity {
    fn bind(&self, _core_index: usize) -> Result<(), AffinityError> {
        Err(AffinityError::Unsupported)
    }
}

/// Binds and downgrades any failure to a warning.
pub fn bind_or_warn(binder: &dyn AffinityBinder, worker: usize) -> bool {
    match binder.bind(worker) {
        Ok(()) => true,
        Err(e) => {
            warn!("Worker {}: {}; continuing unpinned", worker, e);
            false
        }
    }
}
