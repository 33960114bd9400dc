//! Error types for lock_bench

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::engine::barrier::BarrierError;

/// Top-level benchmark error
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker {worker} faulted during run {run}: {message}")]
    WorkerFault {
        run: usize,
        worker: usize,
        message: String,
    },

    #[error("Run {run}: barrier rendezvous did not complete within {timeout:?}")]
    BarrierTimeout { run: usize, timeout: Duration },

    #[error("Run {run}: barrier error: {source}")]
    Barrier {
        run: usize,
        #[source]
        source: BarrierError,
    },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("CSV output error: {0}")]
    Output(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BenchError {
    /// Failures confined to a single run; later runs can still proceed.
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            BenchError::WorkerFault { .. }
                | BenchError::BarrierTimeout { .. }
                | BenchError::Barrier { .. }
        )
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_fault_message_carries_context() {
        let err = BenchError::WorkerFault {
            run: 3,
            worker: 1,
            message: "boom".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Worker 1"));
        assert!(text.contains("run 3"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_run_failures_are_distinguished() {
        let fault = BenchError::WorkerFault {
            run: 1,
            worker: 0,
            message: "boom".into(),
        };
        let timeout = BenchError::BarrierTimeout {
            run: 2,
            timeout: Duration::from_millis(10),
        };
        assert!(fault.is_run_failure());
        assert!(timeout.is_run_failure());
        assert!(!BenchError::Config("bad".into()).is_run_failure());
        assert!(!BenchError::Io(io::Error::other("closed")).is_run_failure());
    }

    #[test]
    fn test_config_error_display() {
        let err = BenchError::Config("num_workers must be > 0".into());
        assert_eq!(err.to_string(), "Configuration error: num_workers must be > 0");
    }
}
