use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::game::{Board, Mark, Move};
use crate::training::EpisodeOutcome;

/// One recorded transition: the agent's move plus the opponent's reply,
/// collapsed into a single before/after pair from the agent's side.
#[derive(Debug, Clone)]
pub struct ReplayElement {
    pub agent_symbol: Mark,
    pub board_before: Board,
    pub action: Move,
    pub reward: f32,
    pub board_after: Board,
    pub done: bool,
    pub double_used_before: bool,
    pub double_used_after: bool,
    /// Set on terminal transitions only.
    pub outcome: Option<EpisodeOutcome>,
}

/// Fixed-capacity ring buffer of transitions. Sampling is fail-closed: it
/// returns nothing until the buffer has filled once, so early training never
/// runs on a lopsided sliver of experience.
pub struct ReplayMemory {
    elements: Vec<ReplayElement>,
    head: usize,
    capacity: usize,
    rng: StdRng,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        ReplayMemory {
            elements: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            rng: StdRng::from_os_rng(),
        }
    }

    #[cfg(test)]
    pub fn seeded(capacity: usize, seed: u64) -> Self {
        let mut memory = ReplayMemory::new(capacity);
        memory.rng = StdRng::seed_from_u64(seed);
        memory
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_full(&self) -> bool {
        self.elements.len() == self.capacity
    }

    /// Append one transition, overwriting the oldest once at capacity.
    pub fn append(&mut self, element: ReplayElement) {
        if self.elements.len() < self.capacity {
            self.elements.push(element);
        } else {
            self.elements[self.head] = element;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    /// Sample up to `n` distinct transitions uniformly at random. Empty
    /// until the buffer is full.
    pub fn sample(&mut self, n: usize) -> Vec<ReplayElement> {
        if !self.is_full() {
            return Vec::new();
        }
        let mut indices: Vec<usize> = (0..self.elements.len()).collect();
        indices.shuffle(&mut self.rng);
        indices
            .into_iter()
            .take(n)
            .map(|i| self.elements[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(reward: f32) -> ReplayElement {
        let board = Board::empty(3);
        ReplayElement {
            agent_symbol: Mark::O,
            board_before: board.clone(),
            action: Move::single(0, Mark::O),
            reward,
            board_after: board,
            done: false,
            double_used_before: false,
            double_used_after: false,
            outcome: None,
        }
    }

    #[test]
    fn test_append_grows_to_capacity() {
        let mut memory = ReplayMemory::new(3);
        assert_eq!(memory.size(), 0);
        memory.append(element(1.0));
        memory.append(element(2.0));
        assert_eq!(memory.size(), 2);
        assert!(!memory.is_full());
        memory.append(element(3.0));
        assert!(memory.is_full());
    }

    #[test]
    fn test_overwrites_oldest_first() {
        let mut memory = ReplayMemory::new(3);
        for r in 1..=5 {
            memory.append(element(r as f32));
        }
        // Capacity 3 with 5 appends: 1 and 2 overwritten, 3..5 retained.
        assert_eq!(memory.size(), 3);
        let mut rewards: Vec<f32> = memory.elements.iter().map(|e| e.reward).collect();
        rewards.sort_by(f32::total_cmp);
        assert_eq!(rewards, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_sample_is_empty_until_full() {
        let mut memory = ReplayMemory::seeded(4, 7);
        memory.append(element(1.0));
        memory.append(element(2.0));
        memory.append(element(3.0));
        assert!(memory.sample(2).is_empty());

        memory.append(element(4.0));
        assert_eq!(memory.sample(2).len(), 2);
    }

    #[test]
    fn test_sample_has_distinct_elements() {
        let mut memory = ReplayMemory::seeded(8, 42);
        for r in 0..8 {
            memory.append(element(r as f32));
        }
        let batch = memory.sample(8);
        let mut rewards: Vec<f32> = batch.iter().map(|e| e.reward).collect();
        rewards.sort_by(f32::total_cmp);
        rewards.dedup();
        assert_eq!(rewards.len(), 8);
    }

    #[test]
    fn test_sample_capped_at_size() {
        let mut memory = ReplayMemory::seeded(2, 1);
        memory.append(element(1.0));
        memory.append(element(2.0));
        assert_eq!(memory.sample(10).len(), 2);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_rejected() {
        ReplayMemory::new(0);
    }
}
