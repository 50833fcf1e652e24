use iat_core::Category;

/// Problems with the fixed block and stimulus data. All are fatal at
/// startup: the engine refuses to start rather than show no stimulus.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no blocks configured")]
    NoBlocks,

    #[error("block {block_id} has no trials")]
    ZeroTrials { block_id: u32 },

    #[error("block {block_id} has no categories on the {side} side")]
    NoCategories { block_id: u32, side: &'static str },

    #[error("block {block_id} maps {category:?} to both sides")]
    OverlappingSides { block_id: u32, category: Category },

    #[error("block id {0} is used more than once")]
    DuplicateBlockId(u32),

    #[error("stimulus id `{0}` is used more than once")]
    DuplicateStimulusId(String),

    #[error("no stimuli in the pool match the categories of block {block_id}")]
    EmptyPool { block_id: u32 },
}
