use iat_core::{Block, Category, Stimulus};
use rand::Rng;

use crate::error::ConfigError;

/// Draws stimuli for a block uniformly, with replacement, from the pool
/// items whose category is active in that block.
#[derive(Debug, Clone)]
pub struct StimulusSampler {
    pool: Vec<Stimulus>,
    /// Pool indices eligible for each block, in block order.
    candidates: Vec<Vec<usize>>,
}

impl StimulusSampler {
    /// Fails if any block would have nothing to draw from.
    pub fn new(blocks: &[Block], pool: Vec<Stimulus>) -> Result<Self, ConfigError> {
        let mut candidates = Vec::with_capacity(blocks.len());
        for block in blocks {
            let active: Vec<Category> = block.categories().collect();
            let eligible: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, s)| active.contains(&s.category))
                .map(|(i, _)| i)
                .collect();
            if eligible.is_empty() {
                return Err(ConfigError::EmptyPool { block_id: block.id });
            }
            candidates.push(eligible);
        }
        Ok(Self { pool, candidates })
    }

    pub fn candidates(&self, block_index: usize) -> impl Iterator<Item = &Stimulus> {
        self.candidates[block_index].iter().map(|&i| &self.pool[i])
    }

    pub fn sample<R: Rng>(&self, block_index: usize, rng: &mut R) -> &Stimulus {
        let eligible = &self.candidates[block_index];
        &self.pool[eligible[rng.random_range(0..eligible.len())]]
    }
}
