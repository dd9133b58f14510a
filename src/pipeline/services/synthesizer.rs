use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

use crate::config::Configuration;
use crate::pipeline::types::{DetectionResult, FrameAnalysis, ANOMALY_CATALOG};

/// Produces the verdict at the end of a run. Stands in for model inference.
pub trait ResultSynthesizer: Send {
    fn synthesize(&mut self) -> DetectionResult;
}

#[derive(Debug, Clone)]
pub struct RandomSynthesizer {
    rng: StdRng,
    deepfake_probability: f64,
    model_label: String,
}

impl RandomSynthesizer {
    pub const DEEPFAKE_BAND: Range<f64> = 75.0..95.0;
    pub const AUTHENTIC_BAND: Range<f64> = 15.0..40.0;
    pub const FRAME_JITTER: f64 = 10.0;

    pub fn new(deepfake_probability: f64, model_label: impl Into<String>) -> Self {
        Self::with_rng(StdRng::from_os_rng(), deepfake_probability, model_label)
    }

    /// Reproducible variant: the same seed always yields the same results.
    pub fn seeded(seed: u64, deepfake_probability: f64, model_label: impl Into<String>) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), deepfake_probability, model_label)
    }

    pub fn from_configuration(configuration: &Configuration) -> Self {
        match configuration.seed {
            Some(seed) => Self::seeded(
                seed,
                configuration.deepfake_probability,
                configuration.model_label.clone(),
            ),
            None => Self::new(
                configuration.deepfake_probability,
                configuration.model_label.clone(),
            ),
        }
    }

    fn with_rng(rng: StdRng, deepfake_probability: f64, model_label: impl Into<String>) -> Self {
        let deepfake_probability = if deepfake_probability.is_nan() {
            0.0
        } else {
            deepfake_probability.clamp(0.0, 1.0)
        };
        Self {
            rng,
            deepfake_probability,
            model_label: model_label.into(),
        }
    }
}

impl ResultSynthesizer for RandomSynthesizer {
    fn synthesize(&mut self) -> DetectionResult {
        let is_deepfake = self.rng.random_bool(self.deepfake_probability);
        let confidence = if is_deepfake {
            self.rng.random_range(Self::DEEPFAKE_BAND)
        } else {
            self.rng.random_range(Self::AUTHENTIC_BAND)
        };

        let frame_analysis = (0..DetectionResult::SAMPLED_FRAMES)
            .map(|sample| {
                let jitter = self
                    .rng
                    .random_range(-Self::FRAME_JITTER..Self::FRAME_JITTER);
                let anomaly_count = if is_deepfake {
                    self.rng.random_range(1..=ANOMALY_CATALOG.len())
                } else {
                    0
                };
                FrameAnalysis::sampled(sample, confidence + jitter, anomaly_count)
            })
            .collect();

        tracing::debug!(
            "Synthesized verdict: deepfake={} confidence={:.2}",
            is_deepfake,
            confidence
        );

        DetectionResult {
            confidence,
            is_deepfake,
            frame_analysis,
            processing_time_seconds: DetectionResult::PROCESSING_TIME_SECONDS,
            model_used: self.model_label.clone(),
        }
    }
}
