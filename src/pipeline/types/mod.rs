mod detection_result;
mod event;
mod frame_analysis;
mod stage;

pub use detection_result::{AnalysisReport, Classification, DetectionResult, Verdict};
pub use event::{PipelineEvent, RunToken};
pub use frame_analysis::{FrameAnalysis, ANOMALY_CATALOG};
pub use stage::{PipelineStage, ANALYSIS_STAGES};
