pub mod scheduler;
pub mod synthesizer;

pub use scheduler::{ImmediateScheduler, ManualScheduler, Scheduler, TokioScheduler};
pub use synthesizer::{RandomSynthesizer, ResultSynthesizer};
