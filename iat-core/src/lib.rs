pub mod block;
pub mod category;
pub mod input;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use block::Block;
pub use category::{Category, Side};
pub use input::Input;
pub use phase::Phase;
pub use stimulus::{Stimulus, StimulusKind};
pub use trial::{TrialResult, TrialState};
