use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::ai::Agent;

use super::board::{Board, Variant, Win};
use super::moves::{IllegalMove, Move};
use super::player::{Mark, Seat};

/// Result of advancing the game by one move.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    InProgress {
        action: Move,
    },
    Won {
        action: Move,
        seat: Seat,
        win: Win,
    },
    /// The mover's move was illegal; the game ends with the mover
    /// disqualified. Reward semantics are the caller's concern.
    Disqualified {
        action: Move,
        seat: Seat,
        error: IllegalMove,
    },
    Tied {
        action: Move,
    },
}

impl StepResult {
    pub fn done(&self) -> bool {
        !matches!(self, StepResult::InProgress { .. })
    }

    pub fn action(&self) -> &Move {
        match self {
            StepResult::InProgress { action }
            | StepResult::Won { action, .. }
            | StepResult::Disqualified { action, .. }
            | StepResult::Tied { action } => action,
        }
    }
}

/// Turn-taking state machine around a [`Board`]. Drives agents through the
/// [`Agent`] hook; all randomness (seat order, symbol assignment) happens in
/// `reset`, never in `step`, so a fixed move sequence replays identically.
pub struct Game {
    variant: Variant,
    board: Board,
    symbols: [Mark; 2],
    double_used: [bool; 2],
    to_move: Seat,
    randomize_order: bool,
    randomize_symbol: bool,
    finished: bool,
    rng: StdRng,
}

impl Game {
    pub fn new(variant: Variant, randomize_order: bool, randomize_symbol: bool) -> Self {
        Game::with_rng(variant, randomize_order, randomize_symbol, StdRng::from_os_rng())
    }

    pub fn with_rng(
        variant: Variant,
        randomize_order: bool,
        randomize_symbol: bool,
        rng: StdRng,
    ) -> Self {
        Game {
            variant,
            board: Board::empty(variant.cell_width()),
            symbols: [Mark::X, Mark::O],
            double_used: [false, false],
            to_move: Seat::P1,
            randomize_order,
            randomize_symbol,
            finished: true,
            rng,
        }
    }

    /// Start a fresh game: clear the board and double-move flags, reassign
    /// seat order and symbols per configuration, and notify both agents.
    pub fn reset(&mut self, p1: &mut dyn Agent, p2: &mut dyn Agent) {
        self.to_move = if self.randomize_order && self.rng.random_range(0.0..1.0) < 0.5 {
            Seat::P2
        } else {
            Seat::P1
        };

        if self.randomize_symbol && self.rng.random_range(0.0..1.0) < 0.5 {
            self.symbols = [Mark::O, Mark::X];
        } else {
            self.symbols = [Mark::X, Mark::O];
        }

        self.board = Board::empty(self.variant.cell_width());
        self.double_used = [false, false];
        self.finished = false;

        p1.start_game(self.symbols[Seat::P1.index()]);
        p2.start_game(self.symbols[Seat::P2.index()]);
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The seat that moves next.
    pub fn to_move(&self) -> Seat {
        self.to_move
    }

    pub fn symbol_of(&self, seat: Seat) -> Mark {
        self.symbols[seat.index()]
    }

    pub fn double_used_by(&self, seat: Seat) -> bool {
        self.double_used[seat.index()]
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Advance the game one move. `player` must be the agent seated at
    /// [`Game::to_move`]. Panics if called on a finished game; terminal
    /// outcomes are final.
    pub fn step(&mut self, player: &mut dyn Agent) -> StepResult {
        assert!(!self.finished, "step called on a finished game");

        let seat = self.to_move;
        let opponent_double_used = self.double_used[seat.other().index()];
        let action = player.choose_move(&self.board, opponent_double_used);

        if let Some(error) = self
            .board
            .check_move(&action, self.double_used[seat.index()])
        {
            self.finished = true;
            return StepResult::Disqualified { action, seat, error };
        }

        self.board.apply(&action);
        if action.is_double() {
            self.double_used[seat.index()] = true;
        }

        if let Some(win) = self.board.winner() {
            self.finished = true;
            return StepResult::Won { action, seat, win };
        }

        if self.board.is_full() {
            self.finished = true;
            return StepResult::Tied { action };
        }

        self.to_move = seat.other();
        StepResult::InProgress { action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::NUM_CELLS;

    /// Plays back a fixed move list.
    struct ScriptedAgent {
        symbol: Mark,
        moves: Vec<Move>,
        next: usize,
        games_started: usize,
    }

    impl ScriptedAgent {
        fn new(moves: Vec<Move>) -> Self {
            ScriptedAgent {
                symbol: Mark::X,
                moves,
                next: 0,
                games_started: 0,
            }
        }
    }

    impl Agent for ScriptedAgent {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn start_game(&mut self, symbol: Mark) {
            self.symbol = symbol;
            self.games_started += 1;
        }

        fn choose_move(&mut self, _board: &Board, _opp_double: bool) -> Move {
            let mut mv = self.moves[self.next];
            self.next += 1;
            mv.symbol = self.symbol;
            mv
        }
    }

    fn fixed_game(variant: Variant) -> Game {
        // No randomization: P1 always starts as x.
        Game::new(variant, false, false)
    }

    #[test]
    fn test_reset_clears_board_and_notifies_agents() {
        let mut game = fixed_game(Variant::TicTacTwo);
        let mut p1 = ScriptedAgent::new(vec![Move::single(0, Mark::X)]);
        let mut p2 = ScriptedAgent::new(vec![]);

        game.reset(&mut p1, &mut p2);
        game.step(&mut p1);
        assert!(game.board().cell(0).free_slots() < 3);

        game.reset(&mut p1, &mut p2);
        assert_eq!(p1.games_started, 2);
        assert_eq!(p2.games_started, 2);
        for i in 0..NUM_CELLS {
            assert_eq!(game.board().cell(i).free_slots(), 3);
        }
        assert!(!game.double_used_by(Seat::P1));
        assert!(!game.double_used_by(Seat::P2));

        // Idempotent: resetting again with no steps still yields empty cells.
        game.reset(&mut p1, &mut p2);
        for i in 0..NUM_CELLS {
            assert_eq!(game.board().cell(i).free_slots(), 3);
        }
    }

    #[test]
    fn test_fixed_config_assigns_p1_x_first() {
        let mut game = fixed_game(Variant::Classic);
        let mut p1 = ScriptedAgent::new(vec![]);
        let mut p2 = ScriptedAgent::new(vec![]);
        game.reset(&mut p1, &mut p2);
        assert_eq!(game.to_move(), Seat::P1);
        assert_eq!(game.symbol_of(Seat::P1), Mark::X);
        assert_eq!(game.symbol_of(Seat::P2), Mark::O);
    }

    #[test]
    fn test_classic_row_win() {
        let mut game = fixed_game(Variant::Classic);
        let mut p1 = ScriptedAgent::new(vec![
            Move::single(0, Mark::X),
            Move::single(1, Mark::X),
            Move::single(2, Mark::X),
        ]);
        let mut p2 = ScriptedAgent::new(vec![Move::single(3, Mark::O), Move::single(4, Mark::O)]);
        game.reset(&mut p1, &mut p2);

        assert!(!game.step(&mut p1).done()); // x 0
        assert!(!game.step(&mut p2).done()); // o 3
        assert!(!game.step(&mut p1).done()); // x 1
        assert!(!game.step(&mut p2).done()); // o 4
        let result = game.step(&mut p1); // x 2: wins row 0
        match result {
            StepResult::Won { seat, win, .. } => {
                assert_eq!(seat, Seat::P1);
                assert_eq!(win.symbol, Mark::X);
                assert_eq!(win.cells, [0, 1, 2]);
            }
            other => panic!("expected a win, got {other:?}"),
        }
        assert!(game.finished());
    }

    #[test]
    fn test_illegal_move_disqualifies_mover() {
        let mut game = fixed_game(Variant::Classic);
        let mut p1 = ScriptedAgent::new(vec![Move::single(9, Mark::X)]);
        let mut p2 = ScriptedAgent::new(vec![]);
        game.reset(&mut p1, &mut p2);

        match game.step(&mut p1) {
            StepResult::Disqualified { seat, error, .. } => {
                assert_eq!(seat, Seat::P1);
                assert_eq!(error.kind, crate::game::IllegalMoveKind::OutOfBounds);
            }
            other => panic!("expected disqualification, got {other:?}"),
        }
        assert!(game.finished());
    }

    #[test]
    #[should_panic(expected = "finished game")]
    fn test_step_after_terminal_panics() {
        let mut game = fixed_game(Variant::Classic);
        let mut p1 = ScriptedAgent::new(vec![Move::single(9, Mark::X), Move::single(0, Mark::X)]);
        let mut p2 = ScriptedAgent::new(vec![]);
        game.reset(&mut p1, &mut p2);
        let _ = game.step(&mut p1); // disqualified
        let _ = game.step(&mut p1); // must panic
    }

    #[test]
    fn test_double_move_sets_flag_and_places_two_marks() {
        let mut game = fixed_game(Variant::TicTacTwo);
        let mut p1 = ScriptedAgent::new(vec![Move::double(4, 4, Mark::X)]);
        let mut p2 = ScriptedAgent::new(vec![]);
        game.reset(&mut p1, &mut p2);

        let result = game.step(&mut p1);
        assert!(!result.done());
        assert!(game.double_used_by(Seat::P1));
        assert!(!game.double_used_by(Seat::P2));
        // Two x marks in cell 4: owned.
        assert_eq!(game.board().cell(4).owner(), Some(Mark::X));
    }

    #[test]
    fn test_second_double_move_is_disqualified() {
        let mut game = fixed_game(Variant::TicTacTwo);
        let mut p1 = ScriptedAgent::new(vec![
            Move::double(0, 1, Mark::X),
            Move::double(2, 3, Mark::X),
        ]);
        let mut p2 = ScriptedAgent::new(vec![Move::single(8, Mark::O)]);
        game.reset(&mut p1, &mut p2);

        assert!(!game.step(&mut p1).done());
        assert!(!game.step(&mut p2).done());
        match game.step(&mut p1) {
            StepResult::Disqualified { error, .. } => {
                assert_eq!(
                    error.kind,
                    crate::game::IllegalMoveKind::DoubleMoveNotAvailable
                );
            }
            other => panic!("expected disqualification, got {other:?}"),
        }
    }

    #[test]
    fn test_turn_alternation() {
        let mut game = fixed_game(Variant::TicTacTwo);
        let mut p1 = ScriptedAgent::new(vec![Move::single(0, Mark::X)]);
        let mut p2 = ScriptedAgent::new(vec![Move::single(1, Mark::O)]);
        game.reset(&mut p1, &mut p2);
        assert_eq!(game.to_move(), Seat::P1);
        game.step(&mut p1);
        assert_eq!(game.to_move(), Seat::P2);
        game.step(&mut p2);
        assert_eq!(game.to_move(), Seat::P1);
    }
}
