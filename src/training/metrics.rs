use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crate::ai::TrainInfo;

/// How an episode ended, from the learning agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Win,
    Loss,
    /// The agent played an illegal move.
    Disqualified,
    /// The opponent played an illegal move.
    OpponentDisqualified,
    Tie,
}

/// Rolling training statistics over the last `window` episodes.
pub struct TrainingMetrics {
    window: usize,
    outcomes: VecDeque<EpisodeOutcome>,
    episode_rewards: VecDeque<f32>,
    losses: VecDeque<f32>,
    train_durations: VecDeque<Duration>,
    episodes_recorded: usize,
}

impl TrainingMetrics {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "metrics window must be positive");
        TrainingMetrics {
            window,
            outcomes: VecDeque::with_capacity(window),
            episode_rewards: VecDeque::with_capacity(window),
            losses: VecDeque::with_capacity(window),
            train_durations: VecDeque::with_capacity(window),
            episodes_recorded: 0,
        }
    }

    pub fn record_episode(&mut self, outcome: EpisodeOutcome, total_reward: f32) {
        push_bounded(&mut self.outcomes, outcome, self.window);
        push_bounded(&mut self.episode_rewards, total_reward, self.window);
        self.episodes_recorded += 1;
    }

    pub fn record_train(&mut self, info: TrainInfo) {
        push_bounded(&mut self.losses, info.loss, self.window);
        push_bounded(&mut self.train_durations, info.duration, self.window);
    }

    pub fn episodes_recorded(&self) -> usize {
        self.episodes_recorded
    }

    fn outcome_rate(&self, target: EpisodeOutcome) -> f32 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let hits = self.outcomes.iter().filter(|&&o| o == target).count();
        hits as f32 / self.outcomes.len() as f32
    }

    pub fn win_rate(&self) -> f32 {
        self.outcome_rate(EpisodeOutcome::Win)
    }

    pub fn loss_rate(&self) -> f32 {
        self.outcome_rate(EpisodeOutcome::Loss)
    }

    pub fn disqualification_rate(&self) -> f32 {
        self.outcome_rate(EpisodeOutcome::Disqualified)
    }

    pub fn opponent_disqualification_rate(&self) -> f32 {
        self.outcome_rate(EpisodeOutcome::OpponentDisqualified)
    }

    pub fn tie_rate(&self) -> f32 {
        self.outcome_rate(EpisodeOutcome::Tie)
    }

    pub fn mean_episode_reward(&self) -> f32 {
        mean(self.episode_rewards.iter().copied())
    }

    pub fn mean_loss(&self) -> f32 {
        mean(self.losses.iter().copied())
    }

    pub fn mean_train_millis(&self) -> f32 {
        mean(
            self.train_durations
                .iter()
                .map(|d| d.as_secs_f32() * 1000.0),
        )
    }
}

impl fmt::Display for TrainingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "win {:.1}% | loss {:.1}% | tie {:.1}% | dq {:.1}% | opp-dq {:.1}% | \
             reward {:+.2} | train-loss {:.4} | train {:.1}ms",
            self.win_rate() * 100.0,
            self.loss_rate() * 100.0,
            self.tie_rate() * 100.0,
            self.disqualification_rate() * 100.0,
            self.opponent_disqualification_rate() * 100.0,
            self.mean_episode_reward(),
            self.mean_loss(),
            self.mean_train_millis(),
        )
    }
}

fn push_bounded<T>(deque: &mut VecDeque<T>, value: T, window: usize) {
    if deque.len() == window {
        deque.pop_front();
    }
    deque.push_back(value);
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}
