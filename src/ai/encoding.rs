use std::collections::HashMap;

use crate::game::{Board, Mark, NUM_CELLS};

/// Canonical content of one slot, ordered so sorting slot contents yields a
/// canonical signature regardless of fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum SlotContent {
    Empty,
    O,
    X,
}

impl From<Option<Mark>> for SlotContent {
    fn from(slot: Option<Mark>) -> Self {
        match slot {
            None => SlotContent::Empty,
            Some(Mark::O) => SlotContent::O,
            Some(Mark::X) => SlotContent::X,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    board: Board,
    symbol: Mark,
    double_used: bool,
}

/// Encodes `(board, symbol, double-move-used)` into a fixed-length one-hot
/// feature vector.
///
/// Each cell maps to one of the canonical multiset signatures of its slot
/// contents (10 for 3-slot cells, 3 for 1-slot cells); the signature one-hots
/// for all 9 cells are concatenated with one-hot(symbol) and
/// one-hot(double-used). Encoding is memoized in a bounded cache since the
/// same positions recur constantly during training.
pub struct FeatureEncoder {
    cell_width: usize,
    signature_index: HashMap<Vec<SlotContent>, usize>,
    num_signatures: usize,
    cache: HashMap<CacheKey, Vec<f32>>,
    max_cache_entries: usize,
}

impl FeatureEncoder {
    pub fn new(cell_width: usize) -> Self {
        FeatureEncoder::with_cache_capacity(cell_width, 100_000)
    }

    /// `max_cache_entries` bounds the memo cache; once full, new encodings
    /// are computed but not retained.
    pub fn with_cache_capacity(cell_width: usize, max_cache_entries: usize) -> Self {
        let signatures = enumerate_signatures(cell_width);
        let num_signatures = signatures.len();
        let signature_index = signatures
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s, i))
            .collect();

        FeatureEncoder {
            cell_width,
            signature_index,
            num_signatures,
            cache: HashMap::new(),
            max_cache_entries,
        }
    }

    /// Feature vector length: 9 cell one-hots plus symbol and double flags.
    pub fn feature_len(&self) -> usize {
        NUM_CELLS * self.num_signatures + 4
    }

    pub fn num_signatures(&self) -> usize {
        self.num_signatures
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Encode one input. Panics on an out-of-enumeration cell signature —
    /// that is corrupt data, never silently defaulted.
    pub fn encode(&mut self, board: &Board, symbol: Mark, double_used: bool) -> Vec<f32> {
        let key = CacheKey {
            board: board.clone(),
            symbol,
            double_used,
        };
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let features = self.encode_uncached(board, symbol, double_used);
        if self.cache.len() < self.max_cache_entries {
            self.cache.insert(key, features.clone());
        }
        features
    }

    fn encode_uncached(&self, board: &Board, symbol: Mark, double_used: bool) -> Vec<f32> {
        assert_eq!(
            board.cell_width(),
            self.cell_width,
            "board cell width {} does not match encoder width {}",
            board.cell_width(),
            self.cell_width
        );

        let mut features = vec![0.0f32; self.feature_len()];

        for (i, cell) in board.cells().iter().enumerate() {
            let mut signature: Vec<SlotContent> =
                cell.slots().iter().map(|&s| s.into()).collect();
            signature.sort();
            let index = *self
                .signature_index
                .get(&signature)
                .unwrap_or_else(|| panic!("unrecognized cell signature {signature:?} in board:\n{board}"));
            features[i * self.num_signatures + index] = 1.0;
        }

        let tail = NUM_CELLS * self.num_signatures;
        let symbol_slot = match symbol {
            Mark::X => 0,
            Mark::O => 1,
        };
        features[tail + symbol_slot] = 1.0;
        features[tail + 2 + usize::from(double_used)] = 1.0;

        features
    }
}

/// All multisets of {empty, o, x} of size `width`, i.e. every canonical cell
/// signature. (width+1)(width+2)/2 entries: 10 for width 3, 3 for width 1.
fn enumerate_signatures(width: usize) -> Vec<Vec<SlotContent>> {
    let mut signatures = Vec::new();
    for empties in 0..=width {
        for os in 0..=(width - empties) {
            let xs = width - empties - os;
            let mut signature = Vec::with_capacity(width);
            signature.extend(std::iter::repeat(SlotContent::Empty).take(empties));
            signature.extend(std::iter::repeat(SlotContent::O).take(os));
            signature.extend(std::iter::repeat(SlotContent::X).take(xs));
            signatures.push(signature);
        }
    }
    signatures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;

    #[test]
    fn test_signature_counts() {
        assert_eq!(enumerate_signatures(3).len(), 10);
        assert_eq!(enumerate_signatures(1).len(), 3);
    }

    #[test]
    fn test_feature_lengths() {
        assert_eq!(FeatureEncoder::new(3).feature_len(), 9 * 10 + 4);
        assert_eq!(FeatureEncoder::new(1).feature_len(), 9 * 3 + 4);
    }

    #[test]
    fn test_one_hot_per_cell() {
        let mut encoder = FeatureEncoder::new(3);
        let board = Board::empty(3);
        let features = encoder.encode(&board, Mark::X, false);

        for cell in 0..NUM_CELLS {
            let hot: Vec<f32> = features[cell * 10..(cell + 1) * 10].to_vec();
            assert_eq!(hot.iter().filter(|&&v| v == 1.0).count(), 1);
        }
        // symbol x, double unused
        assert_eq!(features[90], 1.0);
        assert_eq!(features[91], 0.0);
        assert_eq!(features[92], 1.0);
        assert_eq!(features[93], 0.0);
    }

    #[test]
    fn test_fill_order_does_not_change_encoding() {
        let mut encoder = FeatureEncoder::new(3);

        let mut a = Board::empty(3);
        a.apply(&Move::single(0, Mark::X));
        a.apply(&Move::single(0, Mark::O));

        let mut b = Board::empty(3);
        b.apply(&Move::single(0, Mark::O));
        b.apply(&Move::single(0, Mark::X));

        assert_eq!(
            encoder.encode(&a, Mark::X, false),
            encoder.encode(&b, Mark::X, false)
        );
    }

    #[test]
    fn test_symbol_and_double_flags_distinguish_inputs() {
        let mut encoder = FeatureEncoder::new(3);
        let board = Board::empty(3);
        let base = encoder.encode(&board, Mark::X, false);
        assert_ne!(base, encoder.encode(&board, Mark::O, false));
        assert_ne!(base, encoder.encode(&board, Mark::X, true));
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut encoder = FeatureEncoder::with_cache_capacity(1, 2);
        let mut board = Board::empty(1);
        encoder.encode(&board, Mark::X, false);
        encoder.encode(&board, Mark::O, false);
        board.apply(&Move::single(0, Mark::X));
        encoder.encode(&board, Mark::X, false);
        assert_eq!(encoder.cache_len(), 2);
    }

    #[test]
    fn test_cached_and_uncached_agree() {
        let mut encoder = FeatureEncoder::new(3);
        let mut board = Board::empty(3);
        board.apply(&Move::double(4, 4, Mark::O));

        let first = encoder.encode(&board, Mark::O, true);
        let second = encoder.encode(&board, Mark::O, true);
        assert_eq!(first, second);
        assert_eq!(encoder.cache_len(), 1);
    }
}
