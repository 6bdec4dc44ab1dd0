use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ml_tic_tac_two::ai::{DqnAgent, RandomAgent};
use ml_tic_tac_two::checkpoint::{CheckpointManager, CheckpointManagerConfig};
use ml_tic_tac_two::config::AppConfig;
use ml_tic_tac_two::game::Game;
use ml_tic_tac_two::training::{Environment, ReplayMemory};

/// Train a DQN agent against a random opponent.
#[derive(Parser, Debug)]
#[command(name = "train", version, about)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of training episodes.
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Override the learning rate.
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Override the checkpoint directory.
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Resume from the latest checkpoint, if one exists.
    #[arg(long)]
    resume: bool,

    /// Print the default configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(episodes) = cli.episodes {
        config.training.num_games = episodes;
    }
    if let Some(learning_rate) = cli.learning_rate {
        config.dqn.learning_rate = learning_rate;
    }
    if let Some(dir) = cli.checkpoint_dir {
        config.checkpoint.dir = dir;
    }
    config.validate().context("invalid configuration")?;

    let variant = config.game.variant;
    let epsilon_decay = config.dqn.epsilon_decay_per_update(config.training.num_games);
    let mut agent = DqnAgent::new(variant, config.dqn.clone(), epsilon_decay);

    let manager = CheckpointManager::new(CheckpointManagerConfig {
        checkpoint_dir: config.checkpoint.dir.clone(),
        keep_last_n: config.checkpoint.keep_last,
    })
    .context("failed to set up checkpoint directory")?;

    if cli.resume {
        match manager
            .load_latest(&mut agent)
            .context("failed to load latest checkpoint")?
        {
            Some(metadata) => println!(
                "resumed from episode {} (win rate {:.1}%)",
                metadata.episode,
                metadata.metrics.win_rate * 100.0
            ),
            None => println!("no checkpoint found, starting fresh"),
        }
    }

    let opponent_double_prob = if variant.allows_double_moves() {
        config.game.opponent_double_move_prob
    } else {
        0.0
    };
    let opponent = RandomAgent::new(opponent_double_prob);
    let game = Game::new(
        variant,
        config.game.randomize_order,
        config.game.randomize_symbol,
    );

    let mut environment = Environment::new(
        game,
        agent,
        Box::new(opponent),
        ReplayMemory::new(config.training.replay_capacity),
        config.rewards.clone(),
        config.training.clone(),
        Some(manager),
    );

    environment.run().context("training failed")?;

    println!(
        "done: {} episodes, final epsilon {:.3}",
        environment.metrics().episodes_recorded(),
        environment.agent().epsilon()
    );
    Ok(())
}
