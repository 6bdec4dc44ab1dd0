//! Checkpoint persistence: atomic directory snapshots of network weights,
//! training state and metrics.

pub mod manager;
pub mod metadata;

pub use manager::{CheckpointManager, CheckpointManagerConfig};
pub use metadata::{CheckpointMetadata, CheckpointMetrics, TrainingState};
