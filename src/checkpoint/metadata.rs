use serde::{Deserialize, Serialize};

use crate::training::TrainingMetrics;

/// Agent-side state that must survive a restart for training to resume
/// where it left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    pub epsilon: f32,
    pub epsilon_decay: f32,
    pub last_sync_episode: Option<usize>,
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub min_epsilon: f32,
    pub update_target_every: usize,
}

/// Rolling metrics snapshot stored next to the weights, for eyeballing a
/// checkpoint without loading it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    pub win_rate: f32,
    pub loss_rate: f32,
    pub tie_rate: f32,
    pub disqualification_rate: f32,
    pub opponent_disqualification_rate: f32,
    pub mean_episode_reward: f32,
    pub mean_loss: f32,
}

impl From<&TrainingMetrics> for CheckpointMetrics {
    fn from(metrics: &TrainingMetrics) -> Self {
        CheckpointMetrics {
            win_rate: metrics.win_rate(),
            loss_rate: metrics.loss_rate(),
            tie_rate: metrics.tie_rate(),
            disqualification_rate: metrics.disqualification_rate(),
            opponent_disqualification_rate: metrics.opponent_disqualification_rate(),
            mean_episode_reward: metrics.mean_episode_reward(),
            mean_loss: metrics.mean_loss(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    /// Unix timestamp, seconds.
    pub saved_at: u64,
    pub metrics: CheckpointMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::EpisodeOutcome;

    #[test]
    fn test_metadata_json_roundtrip() {
        let mut metrics = TrainingMetrics::new(4);
        metrics.record_episode(EpisodeOutcome::Win, 20.0);
        metrics.record_episode(EpisodeOutcome::Tie, -0.2);

        let metadata = CheckpointMetadata {
            episode: 5000,
            saved_at: 1_700_000_000,
            metrics: CheckpointMetrics::from(&metrics),
        };

        let json = serde_json::to_string_pretty(&metadata).unwrap();
        let back: CheckpointMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.episode, 5000);
        assert!((back.metrics.win_rate - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_training_state_json_roundtrip() {
        let state = TrainingState {
            epsilon: 0.42,
            epsilon_decay: 0.014,
            last_sync_episode: Some(400),
            learning_rate: 1e-3,
            gamma: 0.90,
            epsilon_start: 0.95,
            min_epsilon: 0.01,
            update_target_every: 200,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<TrainingState>(&json).unwrap(), state);
    }
}
