use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FrameAnalysis;
use crate::common::FileDescriptor;

/// Outcome of one completed run. A new run replaces it rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub confidence: f64,
    pub is_deepfake: bool,
    pub frame_analysis: Vec<FrameAnalysis>,
    pub processing_time_seconds: f64,
    pub model_used: String,
}

impl DetectionResult {
    pub const SAMPLED_FRAMES: u32 = 5;
    pub const PROCESSING_TIME_SECONDS: f64 = 4.2;

    pub fn verdict(&self) -> Verdict {
        Verdict {
            is_deepfake: self.is_deepfake,
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    LikelyDeepfake,
    LikelyAuthentic,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::LikelyDeepfake => "Likely deepfake",
            Classification::LikelyAuthentic => "Likely authentic",
        }
    }
}

/// The boolean classification plus its confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub is_deepfake: bool,
    pub confidence: f64,
}

impl Verdict {
    pub fn classification(&self) -> Classification {
        if self.is_deepfake {
            Classification::LikelyDeepfake
        } else {
            Classification::LikelyAuthentic
        }
    }

    /// One-line summary meant for notifications.
    pub fn headline(&self) -> String {
        if self.is_deepfake {
            format!(
                "Potential deepfake detected ({:.1}% confidence)",
                self.confidence
            )
        } else {
            format!(
                "Video appears authentic ({:.1}% manipulation confidence)",
                self.confidence
            )
        }
    }
}

/// Serializable record handed to presenters once a run completes.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub file: FileDescriptor,
    pub classification: Classification,
    pub headline: String,
    pub result: DetectionResult,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn new(file: FileDescriptor, result: DetectionResult) -> Self {
        let verdict = result.verdict();
        Self {
            file,
            classification: verdict.classification(),
            headline: verdict.headline(),
            result,
            completed_at: Utc::now(),
        }
    }
}
