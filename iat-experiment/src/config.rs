use std::collections::HashSet;

use iat_core::{Block, Side, Stimulus};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::standard;

/// Fixed test data: the ordered blocks and the stimulus pool. Built once at
/// startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub blocks: Vec<Block>,
    pub pool: Vec<Stimulus>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            blocks: standard::blocks(),
            pool: standard::stimulus_pool(),
        }
    }
}

impl ExperimentConfig {
    pub fn new(blocks: Vec<Block>, pool: Vec<Stimulus>) -> Self {
        Self { blocks, pool }
    }

    /// Trials across all blocks, i.e. the number of results a full run
    /// produces.
    pub fn total_trials(&self) -> usize {
        self.blocks.iter().map(|b| b.trial_count).sum()
    }

    /// Structural checks on blocks and pool. Pool coverage per block is
    /// checked when the sampler is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks.is_empty() {
            return Err(ConfigError::NoBlocks);
        }

        let mut block_ids = HashSet::new();
        for block in &self.blocks {
            if !block_ids.insert(block.id) {
                return Err(ConfigError::DuplicateBlockId(block.id));
            }
            if block.trial_count == 0 {
                return Err(ConfigError::ZeroTrials { block_id: block.id });
            }
            for (side, categories) in [
                (Side::Left, &block.left_categories),
                (Side::Right, &block.right_categories),
            ] {
                if categories.is_empty() {
                    return Err(ConfigError::NoCategories {
                        block_id: block.id,
                        side: match side {
                            Side::Left => "left",
                            Side::Right => "right",
                        },
                    });
                }
            }
            if let Some(category) = block.overlapping_category() {
                return Err(ConfigError::OverlappingSides {
                    block_id: block.id,
                    category,
                });
            }
        }

        let mut stimulus_ids = HashSet::new();
        for stimulus in &self.pool {
            if !stimulus_ids.insert(stimulus.id.as_str()) {
                return Err(ConfigError::DuplicateStimulusId(stimulus.id.clone()));
            }
        }

        Ok(())
    }
}
