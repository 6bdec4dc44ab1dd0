use std::collections::HashMap;

use crate::game::{MovePositions, Variant, NUM_CELLS};

/// The fixed move enumeration for a variant: all 9 single moves, followed by
/// all 81 ordered double-move position pairs when the variant allows them.
/// `encode` and `decode` are total inverses over this enumeration; a lookup
/// miss is a programmer error and panics.
pub struct ActionSpace {
    moves: Vec<MovePositions>,
    index: HashMap<MovePositions, usize>,
}

impl ActionSpace {
    pub fn new(variant: Variant) -> Self {
        let mut moves = Vec::new();
        for p in 0..NUM_CELLS {
            moves.push(MovePositions::One(p));
        }
        if variant.allows_double_moves() {
            for p1 in 0..NUM_CELLS {
                for p2 in 0..NUM_CELLS {
                    // Equal pairs stay in the enumeration; whether the cell
                    // has two free slots is checked at apply time.
                    moves.push(MovePositions::Two(p1, p2));
                }
            }
        }

        let index = moves
            .iter()
            .enumerate()
            .map(|(i, &m)| (m, i))
            .collect();

        ActionSpace { moves, index }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn encode(&self, positions: MovePositions) -> usize {
        *self
            .index
            .get(&positions)
            .unwrap_or_else(|| panic!("no action id for positions {positions:?}"))
    }

    pub fn decode(&self, action: usize) -> MovePositions {
        *self
            .moves
            .get(action)
            .unwrap_or_else(|| panic!("no positions for action id {action} (of {})", self.moves.len()))
    }
}
