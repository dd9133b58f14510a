use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::{DetectionResult, PipelineStage};

/// Identifies one run. `generation` is what the registry compares at each
/// stage transition; `run_id` is for logs and presenters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunToken {
    pub generation: u64,
    pub run_id: Uuid,
}

impl RunToken {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            run_id: Uuid::new_v4(),
        }
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.run_id, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    Progress {
        run_id: Uuid,
        percent: u8,
        label: String,
    },
    Completed {
        run_id: Uuid,
        result: DetectionResult,
    },
}

impl PipelineEvent {
    pub fn progress(token: &RunToken, stage: &PipelineStage) -> Self {
        PipelineEvent::Progress {
            run_id: token.run_id,
            percent: stage.percent,
            label: stage.label.to_string(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            PipelineEvent::Progress { run_id, .. } | PipelineEvent::Completed { run_id, .. } => {
                *run_id
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Completed { .. })
    }
}
