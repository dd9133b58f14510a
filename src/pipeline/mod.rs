pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::{AnalysisPipeline, ObserverSet, PipelineObserver, RunRegistry};
pub use services::{RandomSynthesizer, ResultSynthesizer, Scheduler};
pub use types::{DetectionResult, FrameAnalysis, PipelineEvent, PipelineStage, Verdict};
