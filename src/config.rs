use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::DqnConfig;
use crate::error::ConfigError;
use crate::game::Variant;

/// Top-level configuration, loaded from TOML. Every section and field has a
/// default, so a partial file (or none at all) is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub dqn: DqnConfig,
    pub rewards: RewardConfig,
    pub training: TrainingConfig,
    pub checkpoint: CheckpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    /// Coin-flip the opening seat each game.
    pub randomize_order: bool,
    /// Coin-flip the symbol assignment each game.
    pub randomize_symbol: bool,
    /// Double-move probability of the random opponent.
    pub opponent_double_move_prob: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            variant: Variant::TicTacTwo,
            randomize_order: true,
            randomize_symbol: true,
            opponent_double_move_prob: 0.25,
        }
    }
}

/// Rewards from the learning agent's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub win: f32,
    pub loss: f32,
    /// The agent played an illegal move.
    pub disqualification: f32,
    /// The opponent played an illegal move; not the agent's doing either way.
    pub opponent_disqualification: f32,
    pub tie: f32,
    /// Applied to every non-terminal transition, nudging toward short wins.
    pub step_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            win: 20.0,
            loss: -10.0,
            disqualification: -30.0,
            opponent_disqualification: 0.0,
            tie: 0.0,
            step_penalty: -0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub num_games: usize,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub log_interval: usize,
    pub save_model_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            num_games: 20_000,
            batch_size: 256,
            replay_capacity: 8_000,
            log_interval: 100,
            save_model_every: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub dir: PathBuf,
    /// Checkpoints beyond this count are pruned, oldest first.
    pub keep_last: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig {
            dir: PathBuf::from("checkpoints"),
            keep_last: 5,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => AppConfig::load(path),
            None => {
                let config = AppConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, message: &str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Validation(message.to_string()))
            }
        }

        check(
            self.dqn.learning_rate > 0.0,
            "dqn.learning_rate must be positive",
        )?;
        check(
            (0.0..=1.0).contains(&self.dqn.gamma),
            "dqn.gamma must be in [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.dqn.epsilon_start),
            "dqn.epsilon_start must be in [0, 1]",
        )?;
        check(
            (0.0..=self.dqn.epsilon_start).contains(&self.dqn.min_epsilon),
            "dqn.min_epsilon must be in [0, epsilon_start]",
        )?;
        check(
            self.dqn.update_target_every > 0,
            "dqn.update_target_every must be positive",
        )?;
        check(
            (0.0..=1.0).contains(&self.dqn.exploration_double_move_prob),
            "dqn.exploration_double_move_prob must be in [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.game.opponent_double_move_prob),
            "game.opponent_double_move_prob must be in [0, 1]",
        )?;
        check(self.training.num_games > 0, "training.num_games must be positive")?;
        check(
            self.training.batch_size > 0,
            "training.batch_size must be positive",
        )?;
        check(
            self.training.replay_capacity >= self.training.batch_size,
            "training.replay_capacity must be at least training.batch_size",
        )?;
        check(
            self.training.log_interval > 0,
            "training.log_interval must be positive",
        )?;
        check(
            self.training.save_model_every > 0,
            "training.save_model_every must be positive",
        )?;
        check(
            self.checkpoint.keep_last > 0,
            "checkpoint.keep_last must be positive",
        )?;
        Ok(())
    }

    /// The default configuration rendered as TOML, for `--print-config`.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default())
            .unwrap_or_else(|e| panic!("default config must serialize: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[training]\nnum_games = 500\n\n[dqn]\ngamma = 0.99\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.training.num_games, 500);
        assert!((config.dqn.gamma - 0.99).abs() < 1e-6);
        // untouched sections keep defaults
        assert_eq!(config.training.batch_size, 256);
        assert_eq!(config.game.variant, Variant::TicTacTwo);
    }

    #[test]
    fn test_classic_variant_parses() {
        let config: AppConfig = toml::from_str("[game]\nvariant = \"classic\"\n").unwrap();
        assert_eq!(config.game.variant, Variant::Classic);
    }

    #[test]
    fn test_invalid_gamma_rejected() {
        let config: AppConfig = toml::from_str("[dqn]\ngamma = 1.5\n").unwrap();
        match config.validate() {
            Err(ConfigError::Validation(message)) => {
                assert!(message.contains("gamma"), "{message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_replay_smaller_than_batch_rejected() {
        let config: AppConfig =
            toml::from_str("[training]\nreplay_capacity = 10\nbatch_size = 64\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_parses_back() {
        let rendered = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&rendered).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.checkpoint.dir, PathBuf::from("checkpoints"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
