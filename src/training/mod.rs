//! The training loop: replay memory, the self-play environment and rolling
//! metrics.

pub mod environment;
pub mod metrics;
pub mod replay_memory;

pub use environment::{Environment, EpisodeStats};
pub use metrics::{EpisodeOutcome, TrainingMetrics};
pub use replay_memory::{ReplayElement, ReplayMemory};
