//! Core game logic: multi-slot board, move legality, and the turn-taking
//! state machine shared by both game variants.

mod board;
mod engine;
mod moves;
mod player;

pub use board::{Board, Cell, Variant, Win, LINES, NUM_CELLS};
pub use engine::{Game, StepResult};
pub use moves::{IllegalMove, IllegalMoveKind, Move, MovePositions};
pub use player::{Mark, Seat};
