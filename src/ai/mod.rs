//! Agents and learning machinery: the [`Agent`] trait, a random baseline,
//! move/feature encodings and the DQN itself.

pub mod action_space;
pub mod agent;
pub mod dqn;
pub mod encoding;
pub mod networks;
pub mod random;

pub use action_space::ActionSpace;
pub use agent::Agent;
pub use dqn::{DqnAgent, DqnConfig, TrainInfo};
pub use encoding::FeatureEncoder;
pub use random::{random_legal_move, RandomAgent};
