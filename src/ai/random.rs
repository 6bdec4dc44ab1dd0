use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::game::{Board, Mark, Move};

use super::agent::Agent;

/// Pick a uniform random legal move. Respects the caller's double-move
/// budget and cell fullness; with probability `double_move_prob` (and the
/// budget unspent) attempts a double move.
///
/// Panics if the board has no open cell; callers must detect terminal boards
/// before asking for a move.
pub fn random_legal_move(
    rng: &mut StdRng,
    board: &Board,
    symbol: Mark,
    double_available: bool,
    double_move_prob: f64,
) -> Move {
    let open = board.open_cells();
    assert!(
        !open.is_empty(),
        "no legal moves on board:\n{board}"
    );

    if double_available && rng.random_range(0.0..1.0) < double_move_prob {
        if open.len() > 1 {
            // Two open cells exist, so a double move is always completable:
            // either two distinct cells, or one cell with two free slots.
            let p1 = open[rng.random_range(0..open.len())];
            let p2 = loop {
                let candidate = open[rng.random_range(0..open.len())];
                if candidate != p1 {
                    break candidate;
                }
                if board.cell(p1).free_slots() > 1 {
                    break candidate;
                }
            };
            return Move::double(p1, p2, symbol);
        }
        // Only one open cell left; fall through to a single move there.
        return Move::single(open[0], symbol);
    }

    Move::single(open[rng.random_range(0..open.len())], symbol)
}

/// An agent that plays uniformly random legal moves, occasionally spending
/// its double move.
pub struct RandomAgent {
    symbol: Mark,
    double_move_prob: f64,
    has_made_double_move: bool,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(double_move_prob: f64) -> Self {
        RandomAgent::with_rng(double_move_prob, StdRng::from_os_rng())
    }

    pub fn with_rng(double_move_prob: f64, rng: StdRng) -> Self {
        RandomAgent {
            symbol: Mark::X,
            double_move_prob,
            has_made_double_move: false,
            rng,
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn start_game(&mut self, symbol: Mark) {
        self.symbol = symbol;
        self.has_made_double_move = false;
    }

    fn choose_move(&mut self, board: &Board, _opponent_double_used: bool) -> Move {
        let mv = random_legal_move(
            &mut self.rng,
            board,
            self.symbol,
            !self.has_made_double_move,
            self.double_move_prob,
        );
        if mv.is_double() {
            self.has_made_double_move = true;
        }
        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_moves_are_legal() {
        let mut agent = RandomAgent::new(0.25);
        agent.start_game(Mark::O);
        let board = Board::empty(3);
        for _ in 0..100 {
            let mv = agent.choose_move(&board, false);
            assert!(board.check_move(&mv, false).is_none(), "illegal move {mv:?}");
        }
    }

    #[test]
    fn test_at_most_one_double_per_game() {
        let mut agent = RandomAgent::new(1.0); // always try to double
        let board = Board::empty(3);

        for _ in 0..20 {
            agent.start_game(Mark::X);
            let mut doubles = 0;
            for _ in 0..5 {
                if agent.choose_move(&board, false).is_double() {
                    doubles += 1;
                }
            }
            assert_eq!(doubles, 1, "double budget is one per game");
        }
    }

    #[test]
    fn test_zero_prob_never_doubles() {
        let mut agent = RandomAgent::new(0.0);
        agent.start_game(Mark::X);
        let board = Board::empty(3);
        for _ in 0..50 {
            assert!(!agent.choose_move(&board, false).is_double());
        }
    }

    #[test]
    fn test_single_open_cell_falls_back_to_single_move() {
        let mut board = Board::empty(1);
        for i in 0..8 {
            board.apply(&Move::single(i, if i % 2 == 0 { Mark::X } else { Mark::O }));
        }
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mv = random_legal_move(&mut rng, &board, Mark::X, true, 1.0);
            assert_eq!(mv, Move::single(8, Mark::X));
        }
    }

    #[test]
    fn test_same_cell_double_only_with_room() {
        // One open cell with 3 free slots: a forced same-cell double is legal.
        let mut board = Board::empty(3);
        for i in 0..8 {
            board.apply(&Move::single(i, Mark::X));
            board.apply(&Move::single(i, Mark::X));
        }
        let mut rng = StdRng::seed_from_u64(11);
        // open.len() == 1 so the generator plays a single move instead.
        let mv = random_legal_move(&mut rng, &board, Mark::O, true, 1.0);
        assert!(!mv.is_double());
        assert_eq!(mv.positions.first(), 8);
    }

    #[test]
    #[should_panic(expected = "no legal moves")]
    fn test_full_board_panics() {
        let mut board = Board::empty(1);
        for i in 0..9 {
            board.apply(&Move::single(i, if i % 2 == 0 { Mark::X } else { Mark::O }));
        }
        let mut rng = StdRng::seed_from_u64(3);
        random_legal_move(&mut rng, &board, Mark::X, false, 0.0);
    }
}
