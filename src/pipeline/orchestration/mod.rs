pub mod analysis_pipeline;
pub mod observer;
pub mod run_registry;
pub mod stage_machine;

pub use analysis_pipeline::AnalysisPipeline;
pub use observer::{ObserverSet, PipelineObserver};
pub use run_registry::{RunGuard, RunRegistry};
pub use stage_machine::{RunState, StageMachine, Transition};
