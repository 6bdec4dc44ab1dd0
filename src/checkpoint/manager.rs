use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::DqnAgent;
use crate::checkpoint::{CheckpointMetadata, CheckpointMetrics, TrainingState};
use crate::error::CheckpointError;
use crate::training::TrainingMetrics;

const CHECKPOINT_PREFIX: &str = "checkpoint-";
const LATEST_LINK: &str = "latest";
const METADATA_FILE: &str = "metadata.json";
const TRAINING_STATE_FILE: &str = "training_state.json";

#[derive(Debug, Clone)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    /// Checkpoints beyond this count are pruned, oldest first.
    pub keep_last_n: usize,
}

/// Writes and restores training checkpoints.
///
/// Each checkpoint is one directory holding the network weights, the
/// agent's training state and a metrics snapshot. Directories are staged
/// under a dot-prefixed name and renamed into place, so a crash mid-save
/// never leaves a half-written checkpoint that `load_latest` would pick up.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(CheckpointManager { config })
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    fn checkpoint_path(&self, episode: usize) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("{CHECKPOINT_PREFIX}{episode:06}"))
    }

    /// Save a checkpoint for `episode`, update the `latest` link and prune
    /// old checkpoints.
    pub fn save_checkpoint(
        &self,
        agent: &DqnAgent,
        metrics: &TrainingMetrics,
        episode: usize,
    ) -> Result<PathBuf, CheckpointError> {
        let staging = self
            .config
            .checkpoint_dir
            .join(format!(".{CHECKPOINT_PREFIX}{episode:06}"));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        agent
            .save_to_dir(&staging)
            .map_err(|e| CheckpointError::Weights(e.to_string()))?;

        let state_json = serde_json::to_string_pretty(&agent.training_state())?;
        fs::write(staging.join(TRAINING_STATE_FILE), state_json)?;

        let metadata = CheckpointMetadata {
            episode,
            saved_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            metrics: CheckpointMetrics::from(metrics),
        };
        fs::write(
            staging.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        let target = self.checkpoint_path(episode);
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target)?;

        self.update_latest_link(&target)?;
        self.prune()?;
        Ok(target)
    }

    /// Restore the most recent checkpoint into `agent`. Returns `None` when
    /// no checkpoint exists yet.
    pub fn load_latest(
        &self,
        agent: &mut DqnAgent,
    ) -> Result<Option<CheckpointMetadata>, CheckpointError> {
        let Some(dir) = self.latest_checkpoint()? else {
            return Ok(None);
        };

        agent
            .load_from_dir(&dir)
            .map_err(|e| CheckpointError::Weights(e.to_string()))?;

        let state: TrainingState =
            serde_json::from_str(&fs::read_to_string(dir.join(TRAINING_STATE_FILE))?)?;
        agent.restore_training_state(&state);

        let metadata: CheckpointMetadata =
            serde_json::from_str(&fs::read_to_string(dir.join(METADATA_FILE))?)?;
        Ok(Some(metadata))
    }

    /// The newest checkpoint directory, by episode number.
    pub fn latest_checkpoint(&self) -> Result<Option<PathBuf>, CheckpointError> {
        Ok(self
            .list_checkpoints()?
            .into_iter()
            .last()
            .map(|(_, path)| path))
    }

    fn update_latest_link(&self, target: &Path) -> Result<(), CheckpointError> {
        let link = self.config.checkpoint_dir.join(LATEST_LINK);
        if link.symlink_metadata().is_ok() {
            fs::remove_file(&link)?;
        }
        // Relative link, so the checkpoint directory stays relocatable.
        let name = target
            .file_name()
            .expect("checkpoint path has a file name");
        #[cfg(unix)]
        std::os::unix::fs::symlink(name, &link)?;
        #[cfg(not(unix))]
        fs::write(&link, name.to_string_lossy().as_bytes())?;
        Ok(())
    }

    fn prune(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        if checkpoints.len() <= self.config.keep_last_n {
            return Ok(());
        }
        let excess = checkpoints.len() - self.config.keep_last_n;
        for (_, path) in checkpoints.into_iter().take(excess) {
            fs::remove_dir_all(&path)?;
        }
        Ok(())
    }

    /// All checkpoint directories, sorted by episode ascending.
    fn list_checkpoints(&self) -> Result<Vec<(usize, PathBuf)>, CheckpointError> {
        let mut checkpoints = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(suffix) = name.strip_prefix(CHECKPOINT_PREFIX) {
                if let Ok(episode) = suffix.parse::<usize>() {
                    checkpoints.push((episode, entry.path()));
                }
            }
        }
        checkpoints.sort_by_key(|(episode, _)| *episode);
        Ok(checkpoints)
    }
}
