pub mod app;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod pipeline;

pub use error::AppError;

pub use common::FileDescriptor;
pub use config::{Configuration, ReentryPolicy};
pub use coordinator::{Coordinator, CoordinatorBuilder, RunHandle};
pub use intake::{IntakeValidator, RejectionReason, ValidationOutcome};
pub use pipeline::{DetectionResult, FrameAnalysis, PipelineEvent, PipelineObserver, Verdict};
