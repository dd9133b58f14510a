use serde::Serialize;

/// One named step of the analysis sequence and the progress it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub percent: u8,
    pub label: &'static str,
}

impl PipelineStage {
    pub const fn new(percent: u8, label: &'static str) -> Self {
        Self { percent, label }
    }
}

/// Fixed stage table shared by every run. Percents strictly increase and the
/// last entry is always 100.
pub static ANALYSIS_STAGES: [PipelineStage; 7] = [
    PipelineStage::new(10, "Extracting video frames"),
    PipelineStage::new(25, "Detecting faces"),
    PipelineStage::new(40, "Analyzing facial landmarks"),
    PipelineStage::new(60, "Checking temporal consistency"),
    PipelineStage::new(80, "Running deepfake classifier"),
    PipelineStage::new(95, "Aggregating frame scores"),
    PipelineStage::new(100, "Analysis complete"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_percents_match_reference_sequence() {
        let percents: Vec<u8> = ANALYSIS_STAGES.iter().map(|stage| stage.percent).collect();
        assert_eq!(percents, vec![10, 25, 40, 60, 80, 95, 100]);
    }

    #[test]
    fn stage_percents_strictly_increase_and_end_at_100() {
        assert!(ANALYSIS_STAGES
            .windows(2)
            .all(|pair| pair[0].percent < pair[1].percent));
        assert_eq!(ANALYSIS_STAGES.last().map(|stage| stage.percent), Some(100));
        assert!(ANALYSIS_STAGES.iter().all(|stage| !stage.label.is_empty()));
    }
}
