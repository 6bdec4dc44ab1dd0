use crate::ai::{Agent, DqnAgent};
use crate::checkpoint::CheckpointManager;
use crate::config::{RewardConfig, TrainingConfig};
use crate::error::CheckpointError;
use crate::game::{Game, Seat, StepResult};
use crate::training::{EpisodeOutcome, ReplayElement, ReplayMemory, TrainingMetrics};

/// The agent's seat. The opponent sits at P1 so that `reset`'s order coin
/// flip decides who actually opens the game.
const AGENT_SEAT: Seat = Seat::P2;
const OPPONENT_SEAT: Seat = Seat::P1;

#[derive(Debug, Clone, Copy)]
pub struct EpisodeStats {
    pub outcome: EpisodeOutcome,
    pub total_reward: f32,
}

/// Self-play training environment: runs episodes of the learning agent
/// against a fixed opponent, records transitions into replay memory and
/// trains the agent from sampled batches.
///
/// A transition spans the agent's move plus the opponent's reply, so the
/// "next state" the agent learns from is the one it will actually move
/// from again.
pub struct Environment {
    game: Game,
    agent: DqnAgent,
    opponent: Box<dyn Agent>,
    replay: ReplayMemory,
    rewards: RewardConfig,
    training: TrainingConfig,
    metrics: TrainingMetrics,
    checkpoints: Option<CheckpointManager>,
}

impl Environment {
    pub fn new(
        game: Game,
        agent: DqnAgent,
        opponent: Box<dyn Agent>,
        replay: ReplayMemory,
        rewards: RewardConfig,
        training: TrainingConfig,
        checkpoints: Option<CheckpointManager>,
    ) -> Self {
        let metrics = TrainingMetrics::new(training.log_interval.max(1));
        Environment {
            game,
            agent,
            opponent,
            replay,
            rewards,
            training,
            metrics,
            checkpoints,
        }
    }

    pub fn agent(&self) -> &DqnAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut DqnAgent {
        &mut self.agent
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Run the full training loop: `num_games` episodes with periodic
    /// logging and checkpointing, plus a final checkpoint at the end.
    pub fn run(&mut self) -> Result<(), CheckpointError> {
        self.agent.init();
        self.opponent.init();

        let num_games = self.training.num_games;
        println!(
            "training {} vs {} for {num_games} episodes",
            self.agent.name(),
            self.opponent.name()
        );

        for episode in 1..=num_games {
            let stats = self.run_episode(episode);
            self.metrics.record_episode(stats.outcome, stats.total_reward);

            if episode % self.training.log_interval == 0 {
                println!(
                    "episode {episode:>6}/{num_games} | eps {:.3} | {}",
                    self.agent.epsilon(),
                    self.metrics
                );
            }

            // Skip early checkpoints; the first quarter of the run is
            // mostly exploration noise.
            if episode % self.training.save_model_every == 0 && episode > num_games / 4 {
                self.save_checkpoint(episode)?;
            }
        }

        self.save_checkpoint(num_games)?;
        Ok(())
    }

    fn save_checkpoint(&self, episode: usize) -> Result<(), CheckpointError> {
        if let Some(manager) = &self.checkpoints {
            let path = manager.save_checkpoint(&self.agent, &self.metrics, episode)?;
            println!("saved checkpoint {}", path.display());
        }
        Ok(())
    }

    /// Play one episode, appending every agent transition to replay memory,
    /// then train on one sampled batch once memory has filled.
    pub fn run_episode(&mut self, episode: usize) -> EpisodeStats {
        self.game.reset(&mut *self.opponent, &mut self.agent);

        let mut total_reward = 0.0;
        let mut outcome = None;

        // When the opponent opens, its first move is not part of any agent
        // transition.
        if self.game.to_move() == OPPONENT_SEAT {
            match self.game.step(&mut *self.opponent) {
                StepResult::InProgress { .. } => {}
                StepResult::Won { .. } => outcome = Some(EpisodeOutcome::Loss),
                StepResult::Disqualified { .. } => {
                    outcome = Some(EpisodeOutcome::OpponentDisqualified)
                }
                StepResult::Tied { .. } => outcome = Some(EpisodeOutcome::Tie),
            }
        }

        while outcome.is_none() {
            let agent_symbol = self.game.symbol_of(AGENT_SEAT);
            let board_before = self.game.board().clone();
            let double_used_before = self.game.double_used_by(AGENT_SEAT);

            let agent_result = self.game.step(&mut self.agent);
            let action = *agent_result.action();

            let reward = match agent_result {
                StepResult::Won { .. } => {
                    outcome = Some(EpisodeOutcome::Win);
                    self.rewards.win
                }
                StepResult::Disqualified { .. } => {
                    outcome = Some(EpisodeOutcome::Disqualified);
                    self.rewards.disqualification
                }
                StepResult::Tied { .. } => {
                    outcome = Some(EpisodeOutcome::Tie);
                    self.rewards.tie
                }
                StepResult::InProgress { .. } => match self.game.step(&mut *self.opponent) {
                    StepResult::Won { .. } => {
                        outcome = Some(EpisodeOutcome::Loss);
                        self.rewards.loss
                    }
                    StepResult::Disqualified { .. } => {
                        outcome = Some(EpisodeOutcome::OpponentDisqualified);
                        self.rewards.opponent_disqualification
                    }
                    StepResult::Tied { .. } => {
                        outcome = Some(EpisodeOutcome::Tie);
                        self.rewards.tie
                    }
                    StepResult::InProgress { .. } => self.rewards.step_penalty,
                },
            };
            total_reward += reward;

            self.replay.append(ReplayElement {
                agent_symbol,
                board_before,
                action,
                reward,
                board_after: self.game.board().clone(),
                done: outcome.is_some(),
                double_used_before,
                double_used_after: self.game.double_used_by(AGENT_SEAT),
                outcome,
            });
        }

        let batch = self.replay.sample(self.training.batch_size);
        if !batch.is_empty() {
            let info = self.agent.train(&batch, episode);
            self.metrics.record_train(info);
        }

        EpisodeStats {
            outcome: outcome.unwrap_or(EpisodeOutcome::Tie),
            total_reward,
        }
    }
}
