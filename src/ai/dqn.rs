use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

use burn::backend::Autodiff;
use burn::backend::Wgpu;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::TensorData;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::ai::action_space::ActionSpace;
use crate::ai::agent::Agent;
use crate::ai::encoding::FeatureEncoder;
use crate::ai::networks::{QNetwork, QNetworkConfig};
use crate::ai::random::random_legal_move;
use crate::checkpoint::TrainingState;
use crate::game::{Board, Mark, Move, Variant};
use crate::training::ReplayElement;

type InferBackend = Wgpu<f32, i32>;
type TrainBackend = Autodiff<InferBackend>;

/// DQN hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub min_epsilon: f32,
    /// Target sync + epsilon decay cadence, counted in episodes.
    pub update_target_every: usize,
    /// Double-move probability of the exploration move generator.
    pub exploration_double_move_prob: f64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            learning_rate: 1e-3,
            gamma: 0.90,
            epsilon_start: 0.95,
            min_epsilon: 0.01,
            update_target_every: 200,
            exploration_double_move_prob: 0.25,
        }
    }
}

impl DqnConfig {
    /// Linear epsilon decay per target update, sized so that roughly the
    /// last third of the run is played at `min_epsilon`.
    pub fn epsilon_decay_per_update(&self, num_games: usize) -> f32 {
        if self.update_target_every == 0 {
            return self.epsilon_start - self.min_epsilon;
        }
        let epochs_total = num_games / self.update_target_every;
        let epochs_at_min = (0.33 * epochs_total as f32).ceil() as usize;
        let updates = epochs_total.saturating_sub(epochs_at_min);
        if updates == 0 {
            return self.epsilon_start - self.min_epsilon;
        }
        (self.epsilon_start - self.min_epsilon) / updates as f32
    }
}

/// Stats from one training invocation.
#[derive(Debug, Clone, Copy)]
pub struct TrainInfo {
    pub loss: f32,
    pub duration: Duration,
}

/// Double-DQN agent: epsilon-greedy move selection over the online network,
/// MSE updates against a periodically synced target network.
pub struct DqnAgent {
    variant: Variant,
    config: DqnConfig,
    encoder: FeatureEncoder,
    actions: ActionSpace,
    online: QNetwork<TrainBackend>,
    target: QNetwork<InferBackend>,
    optimizer: burn::optim::adaptor::OptimizerAdaptor<
        burn::optim::Adam,
        QNetwork<TrainBackend>,
        TrainBackend,
    >,
    device: <TrainBackend as Backend>::Device,
    epsilon: f32,
    epsilon_decay: f32,
    symbol: Mark,
    has_made_double_move: bool,
    last_sync_episode: Option<usize>,
    rng: StdRng,
}

impl DqnAgent {
    pub fn new(variant: Variant, config: DqnConfig, epsilon_decay: f32) -> Self {
        let device = Default::default();
        let encoder = FeatureEncoder::new(variant.cell_width());
        let actions = ActionSpace::new(variant);

        let net_config = QNetworkConfig::new(encoder.feature_len(), actions.len());
        let online: QNetwork<TrainBackend> = net_config.init(&device);
        // Start the target network from the online weights.
        let target: QNetwork<InferBackend> = online.valid();
        let optimizer = AdamConfig::new().init();

        let epsilon = config.epsilon_start;

        DqnAgent {
            variant,
            config,
            encoder,
            actions,
            online,
            target,
            optimizer,
            device,
            epsilon,
            epsilon_decay,
            symbol: Mark::O,
            has_made_double_move: false,
            last_sync_episode: None,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Set epsilon directly (e.g. 0.0 for pure greedy play).
    pub fn set_epsilon(&mut self, eps: f32) {
        self.epsilon = eps;
    }

    pub fn has_made_double_move(&self) -> bool {
        self.has_made_double_move
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Greedy move: argmax of the online network's Q-values for the current
    /// features, decoded through the fixed action enumeration. The decoded
    /// move may still be illegal; the engine disqualifies it, which is a
    /// game outcome rather than a fault.
    fn greedy_move(&mut self, board: &Board) -> Move {
        let features = self
            .encoder
            .encode(board, self.symbol, self.has_made_double_move);
        let input = Tensor::<InferBackend, 1>::from_data(
            TensorData::from(features.as_slice()),
            &self.device,
        )
        .reshape([1, features.len() as i32]);

        let q_values: Vec<f32> = self
            .online
            .valid()
            .forward(input)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        let mut best_action = 0;
        let mut best_q = f32::NEG_INFINITY;
        for (action, &q) in q_values.iter().enumerate() {
            if q > best_q {
                best_q = q;
                best_action = action;
            }
        }

        let positions = self.actions.decode(best_action);
        let mv = Move {
            positions,
            symbol: self.symbol,
        };
        if mv.is_double() {
            self.has_made_double_move = true;
        }
        mv
    }

    /// One gradient step on a sampled replay batch. Every
    /// `update_target_every` episodes (by the caller's episode index) the
    /// target network is synced from the online network and epsilon decays
    /// one linear step toward its floor.
    pub fn train(&mut self, batch: &[ReplayElement], episode_index: usize) -> TrainInfo {
        assert!(!batch.is_empty(), "train called with an empty batch");
        let start = Instant::now();
        let batch_size = batch.len();
        let num_actions = self.actions.len();
        let feature_len = self.encoder.feature_len();

        let mut inputs = Vec::with_capacity(batch_size * feature_len);
        let mut next_inputs = Vec::with_capacity(batch_size * feature_len);
        let mut action_mask = vec![0.0f32; batch_size * num_actions];
        let mut rewards = Vec::with_capacity(batch_size);
        let mut not_done = Vec::with_capacity(batch_size);

        for (i, element) in batch.iter().enumerate() {
            inputs.extend_from_slice(&self.encoder.encode(
                &element.board_before,
                element.agent_symbol,
                element.double_used_before,
            ));
            next_inputs.extend_from_slice(&self.encoder.encode(
                &element.board_after,
                element.agent_symbol,
                element.double_used_after,
            ));
            let action = self.actions.encode(element.action.positions);
            action_mask[i * num_actions + action] = 1.0;
            rewards.push(element.reward);
            not_done.push(if element.done { 0.0 } else { 1.0 });
        }

        // Q(s, a) from the online network, via the action one-hot mask.
        let input_tensor = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(inputs.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, feature_len as i32]);
        let q_all = self.online.forward(input_tensor);

        let mask_tensor = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(action_mask.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, num_actions as i32]);
        let q_taken = (q_all * mask_tensor).sum_dim(1);

        // Bellman targets from the target network:
        //   target = reward + gamma * max_a Q_target(s')   while not done
        //   target = reward                                 when done
        let next_tensor = Tensor::<InferBackend, 1>::from_data(
            TensorData::from(next_inputs.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, feature_len as i32]);
        let next_q_data: Vec<f32> = self
            .target
            .forward(next_tensor)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        let mut target_data = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let max_next = next_q_data[i * num_actions..(i + 1) * num_actions]
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            target_data.push(rewards[i] + self.config.gamma * max_next * not_done[i]);
        }
        let targets = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(target_data.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, 1]);

        let diff = q_taken - targets;
        let loss = (diff.clone() * diff).mean();
        let loss_val: f32 = loss
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.online);
        self.online = self
            .optimizer
            .step(self.config.learning_rate, self.online.clone(), grads);

        if episode_index > 0
            && episode_index % self.config.update_target_every == 0
            && self.last_sync_episode != Some(episode_index)
        {
            self.last_sync_episode = Some(episode_index);
            self.target = self.online.valid();
            if self.epsilon > self.min_epsilon() {
                self.epsilon = (self.epsilon - self.epsilon_decay).max(self.min_epsilon());
            }
        }

        TrainInfo {
            loss: loss_val,
            duration: start.elapsed(),
        }
    }

    fn min_epsilon(&self) -> f32 {
        self.config.min_epsilon
    }

    /// Save network weights to a directory.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), Box<dyn Error>> {
        let recorder = DefaultRecorder::default();
        self.online
            .clone()
            .valid()
            .save_file(dir.join("online_network"), &recorder)?;
        self.target
            .clone()
            .save_file(dir.join("target_network"), &recorder)?;
        Ok(())
    }

    /// Load network weights from a directory.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), Box<dyn Error>> {
        let recorder = DefaultRecorder::default();
        let net_config = QNetworkConfig::new(self.encoder.feature_len(), self.actions.len());

        let online: QNetwork<TrainBackend> = net_config
            .init(&self.device)
            .load_file(dir.join("online_network"), &recorder, &self.device)?;
        self.online = online;

        let target: QNetwork<InferBackend> = net_config
            .init(&self.device)
            .load_file(dir.join("target_network"), &recorder, &self.device)?;
        self.target = target;
        Ok(())
    }

    /// Export current training state for checkpointing.
    pub fn training_state(&self) -> TrainingState {
        TrainingState {
            epsilon: self.epsilon,
            epsilon_decay: self.epsilon_decay,
            last_sync_episode: self.last_sync_episode,
            learning_rate: self.config.learning_rate,
            gamma: self.config.gamma,
            epsilon_start: self.config.epsilon_start,
            min_epsilon: self.config.min_epsilon,
            update_target_every: self.config.update_target_every,
        }
    }

    /// Restore training state from a checkpoint.
    pub fn restore_training_state(&mut self, state: &TrainingState) {
        self.epsilon = state.epsilon;
        self.epsilon_decay = state.epsilon_decay;
        self.last_sync_episode = state.last_sync_episode;
        self.config = DqnConfig {
            learning_rate: state.learning_rate,
            gamma: state.gamma,
            epsilon_start: state.epsilon_start,
            min_epsilon: state.min_epsilon,
            update_target_every: state.update_target_every,
            ..self.config.clone()
        };
    }
}

impl Agent for DqnAgent {
    fn name(&self) -> &str {
        "DQN"
    }

    fn start_game(&mut self, symbol: Mark) {
        self.symbol = symbol;
        self.has_made_double_move = false;
    }

    fn choose_move(&mut self, board: &Board, _opponent_double_used: bool) -> Move {
        if self.rng.random_range(0.0..1.0) < self.epsilon {
            let double_available =
                self.variant.allows_double_moves() && !self.has_made_double_move;
            let mv = random_legal_move(
                &mut self.rng,
                board,
                self.symbol,
                double_available,
                self.config.exploration_double_move_prob,
            );
            if mv.is_double() {
                self.has_made_double_move = true;
            }
            mv
        } else {
            self.greedy_move(board)
        }
    }
}
