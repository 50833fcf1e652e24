pub mod config;
pub mod error;
pub mod sampler;
pub mod standard;
pub mod state;
pub mod trial;

pub use config::ExperimentConfig;
pub use error::ConfigError;
pub use sampler::StimulusSampler;
pub use state::{ExperimentEvent, IatStateMachine, SaveStatus, Submission};
pub use trial::Trial;
