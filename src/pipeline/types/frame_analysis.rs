use serde::Serialize;

/// Anomaly descriptions attached to frames of a deepfake verdict, in the
/// order they are reported.
pub const ANOMALY_CATALOG: [&str; 3] = [
    "Facial boundary inconsistencies",
    "Temporal flickering detected",
    "Compression artifacts mismatch",
];

/// Per-frame detail of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAnalysis {
    pub frame_index: u32,
    pub timestamp_seconds: f64,
    pub confidence: f64,
    pub anomalies: Vec<String>,
}

impl FrameAnalysis {
    pub const FRAME_STRIDE: u32 = 30;
    pub const SECONDS_PER_SAMPLE: f64 = 1.5;

    /// Builds the entry for the `sample`-th sampled frame. The confidence is
    /// clamped into [0, 100] and `anomaly_count` is capped by the catalog size.
    pub fn sampled(sample: u32, confidence: f64, anomaly_count: usize) -> Self {
        Self {
            frame_index: sample * Self::FRAME_STRIDE + 1,
            timestamp_seconds: f64::from(sample) * Self::SECONDS_PER_SAMPLE,
            confidence: confidence.clamp(0.0, 100.0),
            anomalies: ANOMALY_CATALOG
                .iter()
                .take(anomaly_count)
                .map(|anomaly| anomaly.to_string())
                .collect(),
        }
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}
