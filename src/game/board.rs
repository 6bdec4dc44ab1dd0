use serde::{Deserialize, Serialize};

use super::moves::{IllegalMove, IllegalMoveKind, Move};
use super::player::Mark;

pub const NUM_CELLS: usize = 9;

/// The 8 winning lines in canonical scan order: rows top to bottom, columns
/// left to right, then the two diagonals. The first fully-owned line found in
/// this order is the one reported.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Which game is being played. Fixes the number of mark slots per cell and
/// whether double moves exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain tic-tac-toe: one mark per cell, no double moves.
    Classic,
    /// Tic-tac-two: three mark slots per cell, majority ownership, one
    /// double move per player per game.
    TicTacTwo,
}

impl Variant {
    pub fn cell_width(self) -> usize {
        match self {
            Variant::Classic => 1,
            Variant::TicTacTwo => 3,
        }
    }

    pub fn allows_double_moves(self) -> bool {
        matches!(self, Variant::TicTacTwo)
    }
}

/// One board cell: a fixed number of mark slots filled in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    slots: Vec<Option<Mark>>,
}

impl Cell {
    pub fn empty(width: usize) -> Self {
        Cell {
            slots: vec![None; width],
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Mark>] {
        &self.slots
    }

    /// The owner of this cell, if any: the mark holding a strict majority of
    /// the slots (for a 1-slot cell, any mark; for a 3-slot cell, two marks).
    pub fn owner(&self) -> Option<Mark> {
        let half = self.slots.len() / 2;
        for mark in [Mark::X, Mark::O] {
            let count = self.slots.iter().filter(|s| **s == Some(mark)).count();
            if count > half {
                return Some(mark);
            }
        }
        None
    }

    /// A cell is full once it is owned or has no empty slot left.
    pub fn is_full(&self) -> bool {
        self.owner().is_some() || self.slots.iter().all(|s| s.is_some())
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Place a mark into the first empty slot. Callers must validate first.
    fn place(&mut self, mark: Mark) {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.is_none())
            .expect("place called on a cell with no free slot");
        *slot = Some(mark);
    }
}

/// The result of scanning the board for a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Win {
    pub symbol: Mark,
    pub cells: [usize; 3],
}

/// A 3x3 board of multi-slot cells, row-major, indices 0..=8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board with `cell_width` slots per cell.
    pub fn empty(cell_width: usize) -> Self {
        Board {
            cells: (0..NUM_CELLS).map(|_| Cell::empty(cell_width)).collect(),
        }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_width(&self) -> usize {
        self.cells[0].width()
    }

    /// Apply a validated move: each target position receives one mark in its
    /// first empty slot.
    pub fn apply(&mut self, mv: &Move) {
        for position in mv.positions.iter() {
            self.cells[position].place(mv.symbol);
        }
    }

    /// Scan the 8 lines in canonical order, returning the first one whose
    /// three cells share an owner.
    pub fn winner(&self) -> Option<Win> {
        for line in LINES {
            if let (Some(a), Some(b), Some(c)) = (
                self.cells[line[0]].owner(),
                self.cells[line[1]].owner(),
                self.cells[line[2]].owner(),
            ) {
                if a == b && b == c {
                    return Some(Win {
                        symbol: a,
                        cells: line,
                    });
                }
            }
        }
        None
    }

    /// The board is full once every cell is full.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_full())
    }

    /// Validate a move in order: double-move budget, same-cell double room,
    /// bounds, cell fullness. The first failing check wins; later checks do
    /// not run.
    pub fn check_move(&self, mv: &Move, double_already_used: bool) -> Option<IllegalMove> {
        if mv.is_double() && double_already_used {
            return Some(IllegalMove {
                error_cell: mv.positions.first(),
                kind: IllegalMoveKind::DoubleMoveNotAvailable,
            });
        }

        if let super::moves::MovePositions::Two(p1, p2) = mv.positions {
            if p1 == p2 && p1 < NUM_CELLS && self.cells[p1].free_slots() < 2 {
                return Some(IllegalMove {
                    error_cell: p1,
                    kind: IllegalMoveKind::DoubleMoveNotPossible,
                });
            }
        }

        for position in mv.positions.iter() {
            if position >= NUM_CELLS {
                return Some(IllegalMove {
                    error_cell: position,
                    kind: IllegalMoveKind::OutOfBounds,
                });
            }
            if self.cells[position].is_full() {
                return Some(IllegalMove {
                    error_cell: position,
                    kind: IllegalMoveKind::CellFull,
                });
            }
        }

        None
    }

    /// Indices of cells that can still take a mark.
    pub fn open_cells(&self) -> Vec<usize> {
        (0..NUM_CELLS).filter(|&i| !self.cells[i].is_full()).collect()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            write!(f, "|")?;
            for col in 0..3 {
                let cell = &self.cells[row * 3 + col];
                for slot in cell.slots() {
                    match slot {
                        Some(mark) => write!(f, "{}", mark.as_char())?,
                        None => write!(f, "-")?,
                    }
                }
                write!(f, "|")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
