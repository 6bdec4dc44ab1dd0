use super::player::Mark;

/// Target cell(s) of a move. A double move carries two positions which may
/// name the same cell (legal only while that cell has two free slots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovePositions {
    One(usize),
    Two(usize, usize),
}

impl MovePositions {
    /// Iterate the target positions in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let (a, b) = match *self {
            MovePositions::One(p) => (p, None),
            MovePositions::Two(p1, p2) => (p1, Some(p2)),
        };
        std::iter::once(a).chain(b)
    }

    pub fn first(&self) -> usize {
        match *self {
            MovePositions::One(p) | MovePositions::Two(p, _) => p,
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, MovePositions::Two(_, _))
    }
}

/// A move as returned by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub positions: MovePositions,
    pub symbol: Mark,
}

impl Move {
    pub fn single(position: usize, symbol: Mark) -> Self {
        Move {
            positions: MovePositions::One(position),
            symbol,
        }
    }

    pub fn double(position1: usize, position2: usize, symbol: Mark) -> Self {
        Move {
            positions: MovePositions::Two(position1, position2),
            symbol,
        }
    }

    pub fn is_double(&self) -> bool {
        self.positions.is_double()
    }
}

/// Why a move was illegal. An illegal move disqualifies the player; it is a
/// game outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMoveKind {
    DoubleMoveNotAvailable,
    DoubleMoveNotPossible,
    OutOfBounds,
    CellFull,
}

impl IllegalMoveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IllegalMoveKind::DoubleMoveNotAvailable => "double-move-not-available",
            IllegalMoveKind::DoubleMoveNotPossible => "double-move-not-possible",
            IllegalMoveKind::OutOfBounds => "out-of-bounds",
            IllegalMoveKind::CellFull => "cell-full",
        }
    }
}

/// An illegal move report: which cell triggered it and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalMove {
    pub error_cell: usize,
    pub kind: IllegalMoveKind,
}
