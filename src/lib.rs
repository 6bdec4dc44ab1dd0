//! Tic-tac-two: a tic-tac-toe variant where every cell holds three mark
//! slots, cells are owned by strict majority, and each player may once per
//! game place two marks in a single turn — plus a DQN that learns to play it
//! through self-play against a random opponent.

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
