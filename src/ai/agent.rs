use crate::game::{Board, Mark, Move};

/// Capability contract every player implements. Random, scripted, and
/// learned agents are all interchangeable behind this trait.
pub trait Agent {
    /// Display name.
    fn name(&self) -> &str;

    /// One-time setup before a run (e.g. loading model weights). Synchronous;
    /// the training loop only calls it before the first episode.
    fn init(&mut self) {}

    /// Called at every game reset with the symbol assigned for this game.
    /// Agents reset per-game state (like their double-move flag) here.
    fn start_game(&mut self, symbol: Mark);

    /// Produce a move for the current board. `opponent_double_used` reveals
    /// whether the other player has spent their double move this game; it is
    /// the only opponent-private information an agent sees.
    fn choose_move(&mut self, board: &Board, opponent_double_used: bool) -> Move;
}
