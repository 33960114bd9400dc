//! Platform capabilities the engine calls through narrow traits.

pub mod affinity;
